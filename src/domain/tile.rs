/// Tile types and their properties.
/// Tags are decoded once at level load into `TileKind`; gameplay code
/// never inspects tag strings. Properties are queried via methods, not
/// stored as flags, so tile semantics are centralized here.

/// Colour shared by linked buttons and doors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PuzzleColor {
    Red,
    Green,
    Blue,
}

impl PuzzleColor {
    pub const ALL: [PuzzleColor; 3] = [PuzzleColor::Red, PuzzleColor::Green, PuzzleColor::Blue];

    pub fn name(self) -> &'static str {
        match self {
            PuzzleColor::Red => "red",
            PuzzleColor::Green => "green",
            PuzzleColor::Blue => "blue",
        }
    }

    pub fn from_name(s: &str) -> Option<PuzzleColor> {
        PuzzleColor::ALL.into_iter().find(|c| c.name() == s)
    }
}

/// Non-colliding scenery.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decoration {
    Torch,
    Grave,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileKind {
    Stone,                // Terrain: the only physics-solid kind
    Spikes,               // Hazard trigger
    Exit,                 // Level-exit trigger (double-height volume)
    Decor(Decoration),
    PlayerSpawn,          // Consumed into the Player at load
    EnemySpawn,           // Consumed into an Enemy at load
    CrateSpawn,           // Consumed into a Crate at load
    Button(PuzzleColor),  // Consumed into a Button at load
    Door(PuzzleColor),    // Consumed into a Door at load
}

impl TileKind {
    /// Decode a level-data tag (`"stone"`, `"button_red"`, ...).
    pub fn from_tag(tag: &str) -> Option<TileKind> {
        let kind = match tag {
            "stone" => TileKind::Stone,
            "spikes" => TileKind::Spikes,
            "exit" => TileKind::Exit,
            "torch" => TileKind::Decor(Decoration::Torch),
            "rip" => TileKind::Decor(Decoration::Grave),
            "player" => TileKind::PlayerSpawn,
            "enemy" => TileKind::EnemySpawn,
            "box" => TileKind::CrateSpawn,
            _ => {
                let (prefix, color) = tag.split_once('_')?;
                let color = PuzzleColor::from_name(color)?;
                match prefix {
                    "button" => TileKind::Button(color),
                    "door" => TileKind::Door(color),
                    _ => return None,
                }
            }
        };
        Some(kind)
    }

    /// Does this tile block actor movement during the sweep?
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Stone)
    }

    /// Is this tile turned into an actor or puzzle element at load time?
    pub fn is_consumed_at_load(self) -> bool {
        matches!(
            self,
            TileKind::PlayerSpawn
                | TileKind::EnemySpawn
                | TileKind::CrateSpawn
                | TileKind::Button(_)
                | TileKind::Door(_)
        )
    }

    /// Does overlapping this tile raise a level signal?
    pub fn is_trigger(self) -> bool {
        matches!(self, TileKind::Spikes | TileKind::Exit)
    }

    /// Trigger volume height in tiles. The exit reaches one tile below
    /// its graphic.
    pub fn trigger_height_tiles(self) -> u32 {
        if self == TileKind::Exit { 2 } else { 1 }
    }
}

/// Integer grid coordinate of a cell.
pub type GridPos = (i32, i32);

/// A grid-aligned tile. Its map key is its own `pos`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Tile {
    pub kind: TileKind,
    pub pos: GridPos,
}

/// A free-floating decorative tile. Rendered only.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FreeTile {
    pub kind: TileKind,
    pub pos: (f32, f32),
}
