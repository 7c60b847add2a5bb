/// Tilemap: static level geometry plus a grid spatial index.
///
/// ## Storage
///
/// Grid tiles live in a map keyed by their grid coordinate, so there is at
/// most one tile per cell. Free tiles are a plain list; they are rendered
/// and never collide.
///
/// ## Neighbourhood queries
///
/// A position is mapped to its cell by floor-dividing by `tile_size`.
/// Queries return tiles from the 3×3 block of cells centred on that cell.
/// For an actor no larger than one tile whose top-left corner lies in the
/// centre cell, every tile its rectangle can overlap is inside this block.
/// Larger actors need a wider radius.

use std::collections::HashMap;

use super::geom::Rect;
use super::tile::{FreeTile, GridPos, Tile, TileKind};

/// Scan order of the 3×3 neighbourhood.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0),
    (0, 0), (-1, 1), (0, 1), (1, 1),
];

#[derive(Clone, Debug)]
pub struct Tilemap {
    tile_size: u32,
    tiles: HashMap<GridPos, Tile>,
    free_tiles: Vec<FreeTile>,
}

impl Tilemap {
    pub fn new(tile_size: u32) -> Self {
        Tilemap {
            tile_size: tile_size.max(1),
            tiles: HashMap::new(),
            free_tiles: Vec::new(),
        }
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    // ── Mutation (level source / stage construction only) ──

    /// Place a tile, replacing whatever occupied the cell.
    pub fn place(&mut self, kind: TileKind, pos: GridPos) -> Option<Tile> {
        self.tiles.insert(pos, Tile { kind, pos })
    }

    pub fn add_free_tile(&mut self, kind: TileKind, pos: (f32, f32)) {
        self.free_tiles.push(FreeTile { kind, pos });
    }

    /// Pop every tile that becomes an actor or puzzle element.
    /// Returned in row-major order so stage construction is deterministic.
    pub fn take_consumed(&mut self) -> Vec<Tile> {
        let mut keys: Vec<GridPos> = self.tiles.iter()
            .filter(|(_, t)| t.kind.is_consumed_at_load())
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|&(x, y)| (y, x));
        keys.into_iter().filter_map(|k| self.tiles.remove(&k)).collect()
    }

    // ── Read access ──

    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn free_tiles(&self) -> &[FreeTile] {
        &self.free_tiles
    }

    /// Inclusive grid bounds `(min, max)` of placed tiles, if any.
    pub fn bounds(&self) -> Option<(GridPos, GridPos)> {
        let mut it = self.tiles.keys();
        let first = *it.next()?;
        Some(it.fold((first, first), |(lo, hi), &(x, y)| {
            ((lo.0.min(x), lo.1.min(y)), (hi.0.max(x), hi.1.max(y)))
        }))
    }

    // ── Geometry ──

    /// Cell containing a world position.
    #[inline]
    pub fn cell_of(&self, pos: (f32, f32)) -> GridPos {
        let ts = self.tile_size as f32;
        ((pos.0 / ts).floor() as i32, (pos.1 / ts).floor() as i32)
    }

    /// Footprint of a grid cell.
    pub fn cell_rect(&self, pos: GridPos) -> Rect {
        let ts = self.tile_size as f32;
        Rect::new(pos.0 as f32 * ts, pos.1 as f32 * ts, ts, ts)
    }

    /// Overlap volume of a tile: its cell, stretched downward for kinds
    /// whose trigger is taller than the graphic.
    pub fn trigger_rect(&self, tile: &Tile) -> Rect {
        let mut r = self.cell_rect(tile.pos);
        r.h *= tile.kind.trigger_height_tiles() as f32;
        r
    }

    // ── Neighbourhood queries ──

    /// Every tile in the 3×3 block around `pos`, in scan order.
    pub fn tiles_near(&self, pos: (f32, f32)) -> Vec<Tile> {
        let (cx, cy) = self.cell_of(pos);
        NEIGHBOR_OFFSETS.iter()
            .filter_map(|&(dx, dy)| self.get((cx + dx, cy + dy)).copied())
            .collect()
    }

    /// Rectangles of solid tiles in the 3×3 block around `pos`.
    pub fn solid_rects_near(&self, pos: (f32, f32)) -> Vec<Rect> {
        self.tiles_near(pos).into_iter()
            .filter(|t| t.kind.is_solid())
            .map(|t| self.cell_rect(t.pos))
            .collect()
    }
}
