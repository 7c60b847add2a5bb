pub mod entity;
pub mod geom;
pub mod physics;
pub mod rules;
pub mod sprite;
pub mod tile;
pub mod tilemap;
