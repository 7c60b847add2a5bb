/// Entities: Player, Enemy, Crate (actors with a physics body) and the
/// Button / Door puzzle elements.
///
/// Actors hold only their own state. Everything that involves another
/// entity (pushing, blocking, stacking, sensing) is resolved by the stage,
/// which sees all collections at once.

use super::geom::Rect;
use super::physics::Body;
use super::tile::PuzzleColor;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Frame input: held horizontal direction plus an edge-triggered jump.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub movement: Option<Facing>,
    pub jump: bool,
}

impl FrameInput {
    /// Horizontal intent in {-1, 0, +1}.
    pub fn horizontal(&self) -> f32 {
        self.movement.map_or(0.0, Facing::sign)
    }
}

/// Stable handle to an actor within one stage.
/// Indices never shift: collections are only rebuilt wholesale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ActorId {
    Player,
    Enemy(usize),
    Crate(usize),
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    /// 1 when a jump is available, 0 once spent. Recharged on landing.
    pub jump_charge: u8,
}

impl Player {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Player { body: Body::new(pos, size), jump_charge: 0 }
    }

    /// Spend the jump charge. Returns false (and does nothing) without one.
    pub fn jump(&mut self, jump_velocity: f32) -> bool {
        if self.jump_charge == 0 {
            return false;
        }
        self.body.velocity.1 = jump_velocity;
        self.jump_charge = 0;
        true
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    pub facing: Facing,
}

impl Enemy {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Enemy { body: Body::new(pos, size), facing: Facing::Right }
    }

    pub fn turn_around(&mut self) {
        self.facing = self.facing.reversed();
    }
}

/// Pushable box. Never moves horizontally on its own.
#[derive(Clone, Debug)]
pub struct Crate {
    pub body: Body,
}

impl Crate {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Crate { body: Body::new(pos, size) }
    }
}

/// Pressure plate. `pressed` is recomputed every frame.
#[derive(Clone, Debug)]
pub struct Button {
    pub color: PuzzleColor,
    pub rect: Rect,
    pub pressed: bool,
}

impl Button {
    pub fn new(color: PuzzleColor, rect: Rect) -> Self {
        Button { color, rect, pressed: false }
    }

    /// Only the lower half of the footprint senses weight.
    pub fn sensor(&self) -> Rect {
        self.rect.lower_half()
    }
}

/// Coloured door. Blocks and collides only while closed.
#[derive(Clone, Debug)]
pub struct Door {
    pub color: PuzzleColor,
    pub rect: Rect,
    pub open: bool,
}

impl Door {
    pub fn new(color: PuzzleColor, rect: Rect) -> Self {
        Door { color, rect, open: false }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_spends_single_charge() {
        let mut p = Player::new((0.0, 0.0), (16.0, 16.0));
        p.jump_charge = 1;
        assert!(p.jump(-3.04));
        assert_eq!(p.body.velocity.1, -3.04);
        assert_eq!(p.jump_charge, 0);

        p.body.velocity.1 = 1.0;
        assert!(!p.jump(-3.04)); // no charge: no-op
        assert_eq!(p.body.velocity.1, 1.0);
    }

    #[test]
    fn enemy_starts_right_and_turns() {
        let mut e = Enemy::new((0.0, 0.0), (16.0, 16.0));
        assert_eq!(e.facing, Facing::Right);
        e.turn_around();
        assert_eq!(e.facing, Facing::Left);
        assert_eq!(e.facing.sign(), -1.0);
    }

    #[test]
    fn frame_input_intent() {
        assert_eq!(FrameInput::default().horizontal(), 0.0);
        let left = FrameInput { movement: Some(Facing::Left), jump: false };
        assert_eq!(left.horizontal(), -1.0);
    }

    #[test]
    fn button_senses_lower_half() {
        let b = Button::new(PuzzleColor::Red, Rect::new(0.0, 0.0, 16.0, 16.0));
        assert_eq!(b.sensor(), Rect::new(0.0, 8.0, 16.0, 8.0));
    }
}
