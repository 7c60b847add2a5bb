/// Physics body and the axis-separated sweep.
///
/// ## Sweep
///
/// Each frame an actor moves by `movement + velocity`, one axis at a time:
///
///   1. Clear all collision flags.
///   2. Apply the horizontal component, then clamp against every solid
///      tile rectangle it now overlaps (right edge to the tile's left edge
///      when moving right, left edge to the tile's right edge when moving
///      left).
///   3. Apply the vertical component, then clamp the same way on y
///      (`down` when falling, `up` when rising).
///   4. Integrate gravity, capped at the maximum fall speed.
///   5. A vertical collision cancels vertical velocity.
///
/// The horizontal axis is fully resolved before the vertical one, so a
/// diagonal step can never slip through the corner between two tiles.
///
/// When several rectangles overlap on one axis, each clamp is applied in
/// query order and the last one wins. This is not a minimum-translation
/// solver; with actors no larger than a tile and speeds below one tile per
/// frame only one rectangle matters in practice.
///
/// ## Settle
///
/// After the sweep, actors resolve leftover vertical overlap against other
/// actors and closed doors with the same rule, using the sign of the
/// (post-gravity) vertical velocity to pick the edge.

use crate::config::PhysicsConfig;
use super::geom::Rect;
use super::tilemap::Tilemap;

/// Which sides touched something during the last update.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    #[inline]
    pub fn vertical(&self) -> bool {
        self.up || self.down
    }

    #[inline]
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

/// Position, size, velocity and contact flags of one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Top-left corner in world units.
    pub pos: (f32, f32),
    pub size: (f32, f32),
    pub velocity: (f32, f32),
    pub collisions: Collisions,
}

impl Body {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Body {
            pos,
            size,
            velocity: (0.0, 0.0),
            collisions: Collisions::default(),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.0, self.pos.1, self.size.0, self.size.1)
    }

    /// Move by `movement + velocity` against the tilemap's solid tiles.
    pub fn sweep(&mut self, map: &Tilemap, movement: (f32, f32), phys: &PhysicsConfig) {
        self.collisions = Collisions::default();
        let frame = (movement.0 + self.velocity.0, movement.1 + self.velocity.1);

        // ── x axis ──
        self.pos.0 += frame.0;
        let mut r = self.rect();
        for tile in map.solid_rects_near(self.pos) {
            if r.overlaps(&tile) {
                if frame.0 > 0.0 {
                    r.set_right(tile.left());
                    self.collisions.right = true;
                } else if frame.0 < 0.0 {
                    r.set_left(tile.right());
                    self.collisions.left = true;
                }
                self.pos.0 = r.x;
            }
        }

        // ── y axis ──
        self.pos.1 += frame.1;
        let mut r = self.rect();
        for tile in map.solid_rects_near(self.pos) {
            if r.overlaps(&tile) {
                if frame.1 > 0.0 {
                    r.set_bottom(tile.top());
                    self.collisions.down = true;
                } else if frame.1 < 0.0 {
                    r.set_top(tile.bottom());
                    self.collisions.up = true;
                }
                self.pos.1 = r.y;
            }
        }

        self.velocity.1 = (self.velocity.1 + phys.gravity).min(phys.max_fall_speed);
        if self.collisions.vertical() {
            self.velocity.1 = 0.0;
        }
    }

    /// Push out of vertical overlap with `blockers`, in order.
    /// Flags accumulate on top of the sweep's flags.
    pub fn settle(&mut self, blockers: &[Rect]) {
        let mut r = self.rect();
        for b in blockers {
            if r.overlaps(b) {
                if self.velocity.1 > 0.0 {
                    r.set_bottom(b.top());
                    self.collisions.down = true;
                } else if self.velocity.1 < 0.0 {
                    r.set_top(b.bottom());
                    self.collisions.up = true;
                }
                self.pos.1 = r.y;
            }
        }
        if self.collisions.vertical() {
            self.velocity.1 = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tilemap::tests::map_from;

    const EPS: f32 = 1e-4;

    fn phys() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn body_at(x: f32, y: f32) -> Body {
        Body::new((x, y), (16.0, 16.0))
    }

    fn overlaps_any_solid(map: &Tilemap, b: &Body) -> bool {
        let r = b.rect();
        map.solid_rects_near(b.pos).iter().any(|t| t.overlaps(&r))
    }

    // ── gravity ──

    #[test]
    fn gravity_accumulates_and_caps() {
        let map = map_from(&[" "]);
        let mut b = body_at(0.0, 0.0);
        b.sweep(&map, (0.0, 0.0), &phys());
        assert!((b.velocity.1 - 0.1).abs() < EPS);
        for _ in 0..200 {
            b.sweep(&map, (0.0, 0.0), &phys());
        }
        assert!((b.velocity.1 - 5.0).abs() < EPS);
    }

    #[test]
    fn lands_flush_on_floor() {
        let map = map_from(&[
            " ",
            " ",
            "#",
        ]);
        let mut b = body_at(0.0, 13.0);
        b.velocity.1 = 4.0;
        b.sweep(&map, (0.0, 0.0), &phys());
        assert!(b.collisions.down);
        assert_eq!(b.pos.1, 16.0);
        assert_eq!(b.velocity.1, 0.0);
        assert!(!overlaps_any_solid(&map, &b));
    }

    #[test]
    fn resting_body_alternates_contact() {
        let map = map_from(&[" ", "#"]);
        let mut b = body_at(0.0, 0.0);
        b.sweep(&map, (0.0, 0.0), &phys());
        assert!(!b.collisions.down); // touching, not overlapping
        b.sweep(&map, (0.0, 0.0), &phys());
        assert!(b.collisions.down);
        assert_eq!(b.pos.1, 0.0);
        assert_eq!(b.velocity.1, 0.0);
    }

    #[test]
    fn ceiling_hit_cancels_jump() {
        let map = map_from(&["#", " ", " "]);
        let mut b = body_at(0.0, 17.0);
        b.velocity.1 = -3.04;
        b.sweep(&map, (0.0, 0.0), &phys());
        assert!(b.collisions.up);
        assert_eq!(b.pos.1, 16.0);
        assert_eq!(b.velocity.1, 0.0);
    }

    // ── horizontal ──

    #[test]
    fn wall_clamps_rightward_move() {
        let map = map_from(&["  #"]);
        let mut b = body_at(15.5, 0.0);
        b.sweep(&map, (1.0, 0.0), &phys());
        assert!(b.collisions.right);
        assert_eq!(b.pos.0, 16.0);
    }

    #[test]
    fn wall_clamps_leftward_move() {
        let map = map_from(&["#  "]);
        let mut b = body_at(16.5, 0.0);
        b.sweep(&map, (-1.0, 0.0), &phys());
        assert!(b.collisions.left);
        assert_eq!(b.pos.0, 16.0);
    }

    #[test]
    fn free_move_sets_no_flags() {
        let map = map_from(&["   "]);
        let mut b = body_at(10.0, 0.0);
        b.sweep(&map, (1.0, 0.0), &phys());
        assert_eq!(b.collisions, Collisions::default());
        assert_eq!(b.pos.0, 11.0);
    }

    #[test]
    fn diagonal_step_into_corner_does_not_tunnel() {
        // Floor below, wall to the right: moving right and down at once.
        let map = map_from(&[
            "  #",
            "###",
        ]);
        let mut b = body_at(15.5, 0.0);
        b.velocity.1 = 2.0;
        b.sweep(&map, (1.0, 0.0), &phys());
        assert!(b.collisions.right && b.collisions.down);
        assert_eq!(b.pos, (16.0, 0.0));
        assert!(!overlaps_any_solid(&map, &b));
    }

    #[test]
    fn no_tunneling_at_terminal_velocity() {
        let map = map_from(&[
            " ",
            " ",
            " ",
            "#",
        ]);
        for start in 0..32 {
            let mut b = body_at(0.0, start as f32 * 0.5);
            b.velocity.1 = 5.0;
            for _ in 0..20 {
                b.sweep(&map, (0.0, 0.0), &phys());
                assert!(b.rect().bottom() <= 48.0 + EPS);
            }
            assert!(!overlaps_any_solid(&map, &b));
        }
    }

    // ── settle ──

    #[test]
    fn settle_lands_on_blocker_when_falling() {
        let mut b = body_at(0.0, 2.0);
        b.velocity.1 = 0.5;
        b.settle(&[Rect::new(0.0, 16.0, 16.0, 16.0)]);
        assert!(b.collisions.down);
        assert_eq!(b.pos.1, 0.0);
        assert_eq!(b.velocity.1, 0.0);
    }

    #[test]
    fn settle_bumps_head_when_rising() {
        let mut b = body_at(0.0, 14.0);
        b.velocity.1 = -1.0;
        b.settle(&[Rect::new(0.0, 0.0, 16.0, 16.0)]);
        assert!(b.collisions.up);
        assert_eq!(b.pos.1, 16.0);
    }

    #[test]
    fn settle_without_vertical_velocity_leaves_position() {
        let mut b = body_at(4.0, 0.0);
        b.settle(&[Rect::new(0.0, 0.0, 16.0, 16.0)]);
        assert_eq!(b.pos, (4.0, 0.0));
        assert!(!b.collisions.vertical());
    }
}
