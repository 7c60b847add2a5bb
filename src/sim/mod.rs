pub mod event;
pub mod level;
pub mod stage;
pub mod step;
pub mod world;
