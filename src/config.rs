/// External configuration loader.
///
/// Reads `config.toml` from an explicit path, or searches the executable's
/// directory, the CWD and `~/.local/share/plateshift`.
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
}

/// Per-frame physics constants. Units are world units and frames.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub jump_velocity: f32,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
    pub tile_size: u32,
    pub start_level: usize,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            jump_velocity: default_jump_velocity(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_max_fall")]
    max_fall_speed: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    #[serde(default)]
    start_level: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_gravity() -> f32 { 0.1 }
fn default_max_fall() -> f32 { 5.0 }
fn default_jump_velocity() -> f32 { -3.04 }
fn default_tick_rate() -> u64 { 16 }    // ~60 frames per second
fn default_tile_size() -> u32 { 16 }

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            jump_velocity: default_jump_velocity(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            tile_size: default_tile_size(),
            start_level: 0,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `explicit` if given, otherwise search the
    /// candidate directories for `config.toml`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let found = match explicit {
            Some(path) => read_config(path),
            None => search_config(&candidate_dirs()),
        };
        found.unwrap_or_default()
    }

    /// Parse config text. Absent keys take their defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            physics: PhysicsConfig {
                gravity: cfg.physics.gravity,
                max_fall_speed: cfg.physics.max_fall_speed,
                jump_velocity: cfg.physics.jump_velocity,
            },
            general: GeneralConfig {
                tick_rate_ms: cfg.general.tick_rate_ms.max(1),
                tile_size: cfg.general.tile_size.max(1),
                start_level: cfg.general.start_level,
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                restart: cfg.gamepad.restart,
                quit: cfg.gamepad.quit,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (symlinks resolved)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/plateshift)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/plateshift");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn search_config(search_dirs: &[PathBuf]) -> Option<GameConfig> {
    search_dirs.iter()
        .map(|dir| dir.join("config.toml"))
        .find(|path| path.exists())
        .and_then(|path| read_config(&path))
}

/// Read and parse one file. Errors are logged, never fatal.
fn read_config(path: &Path) -> Option<GameConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            return None;
        }
    };
    match GameConfig::parse(&text) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            Some(cfg)
        }
        Err(e) => {
            warn!("{} parse error: {e}; using default settings", path.display());
            None
        }
    }
}
