/// Stage: everything that lives in one loaded level.
///
/// ## Ownership
///
/// The stage owns the tilemap and one `Vec` per entity kind. Indices into
/// those vectors are the actors' identities (`ActorId`) and never shift:
/// nothing is inserted or removed while a level runs. Restart and advance
/// build a brand new `Stage` and drop the old one wholesale.
///
/// ## Occupancy snapshots
///
/// Entity-vs-entity checks read an `Occupancy`: a copy of every other
/// actor's rectangle plus the closed doors, taken right before the
/// checking actor acts. The actor then writes only its own body (pushes
/// are the one exception and commit on the pushed crate immediately, so
/// the next snapshot sees them).

use crate::domain::entity::{ActorId, Button, Crate, Door, Enemy, Player};
use crate::domain::geom::Rect;
use crate::domain::rules;
use crate::domain::tile::TileKind;
use crate::domain::tilemap::Tilemap;

#[derive(Clone, Debug)]
pub struct Stage {
    pub tilemap: Tilemap,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub crates: Vec<Crate>,
    pub buttons: Vec<Button>,
    pub doors: Vec<Door>,
}

/// Rectangles of everything except one actor, frozen at snapshot time.
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    pub player: Option<Rect>,
    pub enemies: Vec<Rect>,
    /// Crates keep their index so a hit can be turned into a push.
    pub crates: Vec<(usize, Rect)>,
    pub closed_doors: Vec<Rect>,
}

impl Occupancy {
    pub fn crate_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.crates.iter().map(|&(_, r)| r)
    }

    /// Everything a pushed crate may not move into.
    pub fn all(&self) -> Vec<Rect> {
        self.crate_rects()
            .chain(self.enemies.iter().copied())
            .chain(self.player)
            .chain(self.closed_doors.iter().copied())
            .collect()
    }
}

// ── Construction ──

impl Stage {
    /// Turn spawn and puzzle tiles into entities, removing them from the
    /// grid. Tiles are consumed in row-major order, so identical level
    /// data always yields identical indices.
    pub fn from_tilemap(mut tilemap: Tilemap) -> Self {
        let ts = tilemap.tile_size() as f32;
        let size = (ts, ts);

        let mut player = None;
        let mut enemies = vec![];
        let mut crates = vec![];
        let mut buttons = vec![];
        let mut doors = vec![];

        for tile in tilemap.take_consumed() {
            let pos = (tile.pos.0 as f32 * ts, tile.pos.1 as f32 * ts);
            let footprint = Rect::new(pos.0, pos.1, ts, ts);
            match tile.kind {
                TileKind::PlayerSpawn => {
                    // Extra spawns are rejected by level sources; keep the first.
                    if player.is_none() {
                        player = Some(Player::new(pos, size));
                    }
                }
                TileKind::EnemySpawn => enemies.push(Enemy::new(pos, size)),
                TileKind::CrateSpawn => crates.push(Crate::new(pos, size)),
                TileKind::Button(color) => buttons.push(Button::new(color, footprint)),
                TileKind::Door(color) => doors.push(Door::new(color, footprint)),
                _ => {}
            }
        }

        Stage {
            tilemap,
            player: player.unwrap_or_else(|| Player::new((0.0, 0.0), size)),
            enemies,
            crates,
            buttons,
            doors,
        }
    }
}

// ── Queries ──

impl Stage {
    /// Current rectangle of an actor. Out-of-range ids have none.
    pub fn rect_of(&self, id: ActorId) -> Option<Rect> {
        match id {
            ActorId::Player => Some(self.player.body.rect()),
            ActorId::Enemy(i) => self.enemies.get(i).map(|e| e.body.rect()),
            ActorId::Crate(i) => self.crates.get(i).map(|c| c.body.rect()),
        }
    }

    pub fn closed_door_rects(&self) -> Vec<Rect> {
        self.doors.iter().filter(|d| d.is_closed()).map(|d| d.rect).collect()
    }

    pub fn enemy_rects(&self) -> Vec<Rect> {
        self.enemies.iter().map(|e| e.body.rect()).collect()
    }

    /// Player, crates and enemies: everything that can weigh down a button.
    pub fn actor_rects(&self) -> Vec<Rect> {
        std::iter::once(self.player.body.rect())
            .chain(self.crates.iter().map(|c| c.body.rect()))
            .chain(self.enemies.iter().map(|e| e.body.rect()))
            .collect()
    }

    /// Snapshot of everything except `except`.
    pub fn occupancy(&self, except: ActorId) -> Occupancy {
        Occupancy {
            player: (except != ActorId::Player).then(|| self.player.body.rect()),
            enemies: self.enemies.iter().enumerate()
                .filter(|&(i, _)| except != ActorId::Enemy(i))
                .map(|(_, e)| e.body.rect())
                .collect(),
            crates: self.crates.iter().enumerate()
                .filter(|&(i, _)| except != ActorId::Crate(i))
                .map(|(i, c)| (i, c.body.rect()))
                .collect(),
            closed_doors: self.closed_door_rects(),
        }
    }
}

// ── Push ──

impl Stage {
    /// Try to slide crate `idx` horizontally by `dx`.
    ///
    /// Fails, leaving the crate untouched, when the destination overlaps
    /// another crate, an enemy, the player, a closed door or a solid tile.
    /// Otherwise the displacement is committed at once.
    pub fn try_push_crate(&mut self, idx: usize, dx: f32) -> bool {
        let Some(current) = self.rect_of(ActorId::Crate(idx)) else {
            return false;
        };
        let dest = current.translated(dx, 0.0);
        let obstacles = self.occupancy(ActorId::Crate(idx)).all();
        if !rules::push_clear(&dest, &obstacles, &self.tilemap) {
            return false;
        }
        if let Some(c) = self.crates.get_mut(idx) {
            c.body.pos.0 += dx;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::PuzzleColor;
    use crate::domain::tilemap::tests::map_from;

    fn stage_from(rows: &[&str]) -> Stage {
        Stage::from_tilemap(map_from(rows))
    }

    // ── construction ──

    #[test]
    fn spawns_become_entities_and_leave_the_grid() {
        let stage = stage_from(&[
            "@ x m",
            "r R##",
        ]);
        assert_eq!(stage.player.body.pos, (0.0, 0.0));
        assert_eq!(stage.crates.len(), 1);
        assert_eq!(stage.crates[0].body.pos, (32.0, 0.0));
        assert_eq!(stage.enemies.len(), 1);
        assert_eq!(stage.enemies[0].body.pos, (64.0, 0.0));
        assert_eq!(stage.buttons[0].color, PuzzleColor::Red);
        assert_eq!(stage.buttons[0].rect, Rect::new(0.0, 16.0, 16.0, 16.0));
        assert_eq!(stage.doors[0].rect, Rect::new(32.0, 16.0, 16.0, 16.0));
        assert!(stage.doors[0].is_closed());
        // Only the two stones remain as tiles.
        assert_eq!(stage.tilemap.len(), 2);
    }

    #[test]
    fn indices_follow_row_major_order() {
        let stage = stage_from(&[
            "  x",
            "x  ",
            " x ",
        ]);
        let xs: Vec<(f32, f32)> = stage.crates.iter().map(|c| c.body.pos).collect();
        assert_eq!(xs, vec![(32.0, 0.0), (0.0, 16.0), (16.0, 32.0)]);
    }

    #[test]
    fn missing_player_defaults_to_origin() {
        let stage = stage_from(&["##"]);
        assert_eq!(stage.player.body.pos, (0.0, 0.0));
    }

    // ── occupancy ──

    #[test]
    fn occupancy_excludes_the_asking_actor() {
        let stage = stage_from(&["@xxmR"]);
        let occ = stage.occupancy(ActorId::Crate(0));
        assert!(occ.player.is_some());
        assert_eq!(occ.crates.len(), 1);
        assert_eq!(occ.crates[0].0, 1);
        assert_eq!(occ.enemies.len(), 1);
        assert_eq!(occ.closed_doors.len(), 1);
        assert_eq!(occ.all().len(), 4);

        let occ = stage.occupancy(ActorId::Player);
        assert!(occ.player.is_none());
        assert_eq!(occ.crates.len(), 2);
    }

    #[test]
    fn open_doors_are_not_occupancy() {
        let mut stage = stage_from(&["@ R"]);
        stage.doors[0].open = true;
        assert!(stage.occupancy(ActorId::Player).closed_doors.is_empty());
    }

    // ── push ──

    #[test]
    fn push_into_clear_space_moves_exactly_dx() {
        let mut stage = stage_from(&[
            "@x   ",
            "#####",
        ]);
        stage.player.body.pos.0 = -1.0; // not touching the destination
        assert!(stage.try_push_crate(0, 1.0));
        assert_eq!(stage.crates[0].body.pos, (17.0, 0.0));
        assert!(stage.try_push_crate(0, -1.0));
        assert_eq!(stage.crates[0].body.pos, (16.0, 0.0));
    }

    #[test]
    fn push_blocked_by_wall_leaves_crate() {
        let mut stage = stage_from(&["@x#"]);
        assert!(!stage.try_push_crate(0, 1.0));
        assert_eq!(stage.crates[0].body.pos, (16.0, 0.0));
    }

    #[test]
    fn push_blocked_by_second_crate() {
        let mut stage = stage_from(&["@xx "]);
        assert!(!stage.try_push_crate(0, 1.0));
        assert_eq!(stage.crates[0].body.pos.0, 16.0);
        // The far crate itself is free to move.
        assert!(stage.try_push_crate(1, 1.0));
    }

    #[test]
    fn push_blocked_by_closed_door_only() {
        let mut stage = stage_from(&[" xR"]);
        assert!(!stage.try_push_crate(0, 1.0));
        stage.doors[0].open = true;
        assert!(stage.try_push_crate(0, 1.0));
    }

    #[test]
    fn push_blocked_by_enemy_and_player() {
        let mut stage = stage_from(&["@xm"]);
        assert!(!stage.try_push_crate(0, 1.0));
        assert!(!stage.try_push_crate(0, -1.0));
        assert_eq!(stage.crates[0].body.pos.0, 16.0);
    }

    #[test]
    fn push_unknown_crate_fails() {
        let mut stage = stage_from(&["@"]);
        assert!(!stage.try_push_crate(3, 1.0));
    }
}
