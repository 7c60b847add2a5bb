/// Sprite selection: a pure mapping from entity variant + state to a
/// sprite identifier. Renderers key their glyphs/images off `SpriteId`.

use super::entity::{Button, Door};
use super::tile::{Decoration, PuzzleColor, TileKind};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SpriteId {
    Stone,
    Spikes,
    Exit,
    Torch,
    Grave,
    Player,
    Enemy,
    Crate,
    Button { color: PuzzleColor, pressed: bool },
    Door { color: PuzzleColor, open: bool },
}

/// Sprite for a static tile. Every kind has one so an unconsumed map
/// (e.g. in an editor) still draws.
pub fn tile_sprite(kind: TileKind) -> SpriteId {
    match kind {
        TileKind::Stone => SpriteId::Stone,
        TileKind::Spikes => SpriteId::Spikes,
        TileKind::Exit => SpriteId::Exit,
        TileKind::Decor(Decoration::Torch) => SpriteId::Torch,
        TileKind::Decor(Decoration::Grave) => SpriteId::Grave,
        TileKind::PlayerSpawn => SpriteId::Player,
        TileKind::EnemySpawn => SpriteId::Enemy,
        TileKind::CrateSpawn => SpriteId::Crate,
        TileKind::Button(color) => SpriteId::Button { color, pressed: false },
        TileKind::Door(color) => SpriteId::Door { color, open: false },
    }
}

pub fn button_sprite(button: &Button) -> SpriteId {
    SpriteId::Button { color: button.color, pressed: button.pressed }
}

pub fn door_sprite(door: &Door) -> SpriteId {
    SpriteId::Door { color: door.color, open: door.open }
}
