/// WorldState: the complete snapshot of a running game.
///
/// ## Level layers
///
/// Two copies of the level, like a save point and the live game:
///   - `base_tilemap` is the level as delivered by the level source.
///     **Never mutated** after load; restart rebuilds from it.
///   - `stage` is the live level: grid minus consumed spawn tiles, plus
///     every actor and puzzle element.
///
/// Only `sim::level` replaces either of them.

use crate::config::PhysicsConfig;
use crate::domain::tilemap::Tilemap;
use super::stage::Stage;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameComplete,
}

pub struct WorldState {
    // ── Level ──
    /// Level as loaded. Source of every restart.
    pub base_tilemap: Tilemap,
    pub stage: Stage,
    pub tile_size: u32,

    // ── Physics constants ──
    pub physics: PhysicsConfig,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(physics: PhysicsConfig, tile_size: u32) -> Self {
        let base_tilemap = Tilemap::new(tile_size);
        WorldState {
            stage: Stage::from_tilemap(base_tilemap.clone()),
            base_tilemap,
            tile_size: tile_size.max(1),
            physics,
            phase: Phase::Playing,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            tick: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count the message down one frame, clearing it at zero.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}
