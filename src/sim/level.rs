/// Level data source and level transitions.
///
/// ## Sources
///
/// Anything implementing `LevelSource` can feed the game. The built-in
/// `EmbeddedLevels` keeps a handful of levels compiled into the binary as
/// ASCII rows.
///
/// ## Level text format:
///   Map rows, one character per grid cell, row 0 at the top.
///   Optional free-tile lines: `* <tag> <x>,<y>` put a decorative tile at
///   world position (x, y), off the grid.
///
/// ## Tile legend:
///   '#' = Stone (solid)          '^' = Spikes
///   'E' = Exit (door top)        '@' = Player spawn
///   'x' = Crate spawn            'm' = Enemy spawn
///   'r' 'g' 'b' = Button         'R' 'G' 'B' = Door (same colour)
///   't' = Torch                  '+' = Grave
///   ' ' or '.' = Empty
///
/// ## Transitions
///
/// `load_level` swaps in a fresh stage, `restart_level` rebuilds the
/// current one from its pristine tilemap, `advance_level` moves on or
/// finishes the game.

use log::{error, info};
use thiserror::Error;

use crate::domain::tile::{Decoration, PuzzleColor, TileKind};
use crate::domain::tilemap::Tilemap;
use super::event::GameEvent;
use super::stage::Stage;
use super::world::{Phase, WorldState};

#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("level {id} does not exist ({count} levels available)")]
    UnknownLevel { id: usize, count: usize },
    #[error("level {level}: unknown glyph {glyph:?} at column {x}, row {y}")]
    UnknownGlyph { level: usize, glyph: char, x: usize, y: usize },
    #[error("level {level} has no player spawn")]
    MissingPlayer { level: usize },
    #[error("level {level} has more than one player spawn")]
    DuplicatePlayer { level: usize },
    #[error("level {level}: malformed free tile line {line:?}")]
    BadFreeTile { level: usize, line: String },
}

/// Supplier of level data, indexed from 0.
pub trait LevelSource {
    fn level_count(&self) -> usize;
    fn name(&self, id: usize) -> Option<&str>;
    fn load(&self, id: usize, tile_size: u32) -> Result<Tilemap, LevelError>;
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Decode one map character.
fn glyph_kind(ch: char) -> Option<Option<TileKind>> {
    let kind = match ch {
        ' ' | '.' => return Some(None),
        '#' => TileKind::Stone,
        '^' => TileKind::Spikes,
        'E' => TileKind::Exit,
        '@' => TileKind::PlayerSpawn,
        'x' => TileKind::CrateSpawn,
        'm' => TileKind::EnemySpawn,
        'r' => TileKind::Button(PuzzleColor::Red),
        'g' => TileKind::Button(PuzzleColor::Green),
        'b' => TileKind::Button(PuzzleColor::Blue),
        'R' => TileKind::Door(PuzzleColor::Red),
        'G' => TileKind::Door(PuzzleColor::Green),
        'B' => TileKind::Door(PuzzleColor::Blue),
        't' => TileKind::Decor(Decoration::Torch),
        '+' => TileKind::Decor(Decoration::Grave),
        _ => return None,
    };
    Some(Some(kind))
}

/// Parse `* <tag> <x>,<y>`. Only decorations may float.
fn parse_free_tile(line: &str) -> Option<(TileKind, (f32, f32))> {
    let mut parts = line.strip_prefix('*')?.split_whitespace();
    let kind = TileKind::from_tag(parts.next()?)?;
    let (x, y) = parts.next()?.split_once(',')?;
    if parts.next().is_some() || !matches!(kind, TileKind::Decor(_)) {
        return None;
    }
    Some((kind, (x.trim().parse().ok()?, y.trim().parse().ok()?)))
}

/// Build a tilemap from level text. `level` only labels errors.
pub fn parse_level<S: AsRef<str>>(level: usize, lines: &[S], tile_size: u32) -> Result<Tilemap, LevelError> {
    let mut map = Tilemap::new(tile_size);
    let mut players = 0;
    let mut y = 0;

    for line in lines.iter().map(AsRef::as_ref) {
        if line.starts_with('*') {
            let (kind, pos) = parse_free_tile(line)
                .ok_or_else(|| LevelError::BadFreeTile { level, line: line.to_string() })?;
            map.add_free_tile(kind, pos);
            continue;
        }
        for (x, ch) in line.chars().enumerate() {
            let kind = glyph_kind(ch)
                .ok_or(LevelError::UnknownGlyph { level, glyph: ch, x, y })?;
            if let Some(kind) = kind {
                if kind == TileKind::PlayerSpawn {
                    players += 1;
                }
                map.place(kind, (x as i32, y as i32));
            }
        }
        y += 1;
    }

    match players {
        0 => Err(LevelError::MissingPlayer { level }),
        1 => Ok(map),
        _ => Err(LevelError::DuplicatePlayer { level }),
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

/// Runtime level data.
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

pub struct EmbeddedLevels {
    levels: Vec<LevelDef>,
}

impl EmbeddedLevels {
    pub fn new() -> Self {
        EmbeddedLevels { levels: embedded_levels() }
    }
}

impl Default for EmbeddedLevels {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelSource for EmbeddedLevels {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn name(&self, id: usize) -> Option<&str> {
        self.levels.get(id).map(|l| l.name.as_str())
    }

    fn load(&self, id: usize, tile_size: u32) -> Result<Tilemap, LevelError> {
        let def = self.levels.get(id)
            .ok_or(LevelError::UnknownLevel { id, count: self.levels.len() })?;
        parse_level(id, def.rows.as_slice(), tile_size)
    }
}

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("First Steps", &[
            "####################",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#         ##     E #",
            "# @  t   ###       #",
            "####################",
        ]),
        make_embedded("Mind the Gap", &[
            "####################",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                E #",
            "# @   +     +      #",
            "#####^^####^^#######",
            "####################",
        ]),
        make_embedded("Heavy Lifting", &[
            "####################",
            "#            #     #",
            "#            #     #",
            "#            #     #",
            "#            #     #",
            "#            #     #",
            "#  t         #  t  #",
            "#            #   E #",
            "# @  x   r   R     #",
            "####################",
            "* torch 100,40",
        ]),
        make_embedded("Patrol", &[
            "####################",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#                  #",
            "#    t         E   #",
            "# @                #",
            "#####   ###   ######",
            "#####m  ###  m######",
            "####################",
        ]),
        make_embedded("Colour Theory", &[
            "####################",
            "#         #      # #",
            "#         #      # #",
            "#         #      # #",
            "#         #      # #",
            "#         #      # #",
            "#         #      # #",
            "#         #      #E#",
            "#+ @ x  r R x  g G #",
            "####################",
            "* rip 232,128",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

// ══════════════════════════════════════════════════════════════
// Transitions
// ══════════════════════════════════════════════════════════════

/// Load level `id` into the world, replacing the whole stage.
/// On error the world is left untouched.
pub fn load_level(world: &mut WorldState, source: &dyn LevelSource, id: usize) -> Result<(), LevelError> {
    let tilemap = source.load(id, world.tile_size)?;
    let stage = Stage::from_tilemap(tilemap.clone());

    info!(
        "level {} loaded: {} tiles, {} enemies, {} crates, {} buttons, {} doors",
        id, stage.tilemap.len(), stage.enemies.len(), stage.crates.len(),
        stage.buttons.len(), stage.doors.len(),
    );

    world.base_tilemap = tilemap;
    world.stage = stage;
    world.current_level = id;
    world.total_levels = source.level_count();
    world.phase = Phase::Playing;
    world.tick = 0;
    let name = source.name(id).unwrap_or_default().to_string();
    world.set_message(&name, 90);
    world.level_name = name;
    Ok(())
}

/// Rebuild the current level from its pristine tilemap.
pub fn restart_level(world: &mut WorldState) -> GameEvent {
    info!("level {} restarted", world.current_level);
    world.stage = Stage::from_tilemap(world.base_tilemap.clone());
    world.tick = 0;
    GameEvent::LevelRestarted { level: world.current_level }
}

/// Move to the next level, or finish the game after the last one.
pub fn advance_level(world: &mut WorldState, source: &dyn LevelSource) -> GameEvent {
    let next = world.current_level + 1;
    if next >= source.level_count() {
        info!("all {} levels complete", source.level_count());
        world.phase = Phase::GameComplete;
        world.set_message("All levels complete!", 0);
        return GameEvent::GameComplete;
    }
    match load_level(world, source, next) {
        Ok(()) => {
            info!("advanced to level {}", next);
            GameEvent::LevelAdvanced { level: next }
        }
        Err(e) => {
            // Broken data: stay playable on the level we have.
            error!("{e}");
            world.set_message("Next level could not be loaded", 120);
            restart_level(world)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;

    fn world() -> WorldState {
        WorldState::new(PhysicsConfig::default(), 16)
    }

    // ── parsing ──

    #[test]
    fn parses_legend() {
        let map = parse_level(0, &[
            "#^E@",
            "xmrR",
            "t+. ",
        ], 16).unwrap();
        assert_eq!(map.get((0, 0)).map(|t| t.kind), Some(TileKind::Stone));
        assert_eq!(map.get((1, 0)).map(|t| t.kind), Some(TileKind::Spikes));
        assert_eq!(map.get((2, 1)).map(|t| t.kind), Some(TileKind::Button(PuzzleColor::Red)));
        assert_eq!(map.get((3, 1)).map(|t| t.kind), Some(TileKind::Door(PuzzleColor::Red)));
        assert_eq!(map.get((1, 2)).map(|t| t.kind), Some(TileKind::Decor(Decoration::Grave)));
        assert!(map.get((2, 2)).is_none());
        assert_eq!(map.len(), 10);
    }

    #[test]
    fn unknown_glyph_is_reported_with_position() {
        let err = parse_level(4, &["@ ", " ?"], 16).unwrap_err();
        assert_eq!(err, LevelError::UnknownGlyph { level: 4, glyph: '?', x: 1, y: 1 });
    }

    #[test]
    fn player_spawn_count_is_validated() {
        assert_eq!(parse_level(1, &["###"], 16).unwrap_err(), LevelError::MissingPlayer { level: 1 });
        assert_eq!(parse_level(2, &["@ @"], 16).unwrap_err(), LevelError::DuplicatePlayer { level: 2 });
    }

    #[test]
    fn free_tile_lines_do_not_count_as_rows() {
        let map = parse_level(0, &[
            "* torch 12.5,3",
            "@",
            "#",
        ], 16).unwrap();
        assert_eq!(map.free_tiles().len(), 1);
        assert_eq!(map.free_tiles()[0].pos, (12.5, 3.0));
        assert_eq!(map.get((0, 1)).map(|t| t.kind), Some(TileKind::Stone));
    }

    #[test]
    fn malformed_free_tile_lines_are_rejected() {
        for line in ["* torch", "* lava 1,2", "* torch a,b", "* stone 1,2", "* torch 1,2 extra"] {
            let err = parse_level(0, &[line, "@"], 16).unwrap_err();
            assert!(matches!(err, LevelError::BadFreeTile { .. }), "{line}");
        }
    }

    // ── embedded source ──

    #[test]
    fn every_embedded_level_loads() {
        let levels = EmbeddedLevels::new();
        assert!(levels.level_count() >= 5);
        for id in 0..levels.level_count() {
            let map = levels.load(id, 16).unwrap();
            assert!(map.tiles().any(|t| t.kind == TileKind::Exit), "level {id} has no exit");
            assert!(levels.name(id).is_some());
        }
    }

    #[test]
    fn unknown_level_id() {
        let levels = EmbeddedLevels::new();
        let count = levels.level_count();
        assert_eq!(levels.load(count, 16).unwrap_err(), LevelError::UnknownLevel { id: count, count });
        assert!(levels.name(count).is_none());
    }

    // ── transitions ──

    #[test]
    fn load_sets_meta_and_stage() {
        let levels = EmbeddedLevels::new();
        let mut w = world();
        load_level(&mut w, &levels, 2).unwrap();
        assert_eq!(w.current_level, 2);
        assert_eq!(w.level_name, "Heavy Lifting");
        assert_eq!(w.total_levels, levels.level_count());
        assert_eq!(w.stage.crates.len(), 1);
        assert_eq!(w.phase, Phase::Playing);
        // The pristine copy still has its spawn tiles.
        assert!(w.base_tilemap.tiles().any(|t| t.kind == TileKind::PlayerSpawn));
        assert!(!w.stage.tilemap.tiles().any(|t| t.kind == TileKind::PlayerSpawn));
    }

    #[test]
    fn failed_load_keeps_world() {
        let levels = EmbeddedLevels::new();
        let mut w = world();
        load_level(&mut w, &levels, 1).unwrap();
        assert!(load_level(&mut w, &levels, 99).is_err());
        assert_eq!(w.current_level, 1);
    }

    #[test]
    fn restart_rebuilds_from_base() {
        let levels = EmbeddedLevels::new();
        let mut w = world();
        load_level(&mut w, &levels, 0).unwrap();
        let spawn = w.stage.player.body.pos;
        w.stage.player.body.pos = (100.0, 20.0);
        assert_eq!(restart_level(&mut w), GameEvent::LevelRestarted { level: 0 });
        assert_eq!(w.stage.player.body.pos, spawn);
    }

    #[test]
    fn advancing_past_last_level_completes_game() {
        let levels = EmbeddedLevels::new();
        let last = levels.level_count() - 1;
        let mut w = world();
        load_level(&mut w, &levels, last - 1).unwrap();
        assert_eq!(advance_level(&mut w, &levels), GameEvent::LevelAdvanced { level: last });
        assert_eq!(advance_level(&mut w, &levels), GameEvent::GameComplete);
        assert_eq!(w.phase, Phase::GameComplete);
        assert_eq!(w.current_level, last);
    }
}
