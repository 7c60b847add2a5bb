/// Events emitted during a simulation step.
/// The presentation layer consumes these for messages/animation.

use crate::domain::tile::PuzzleColor;

#[derive(Clone, Debug, PartialEq)]
#[allow(dead_code)]
pub enum GameEvent {
    ButtonPressed { index: usize, color: PuzzleColor },
    ButtonReleased { index: usize, color: PuzzleColor },
    DoorOpened { index: usize, color: PuzzleColor },
    DoorClosed { index: usize, color: PuzzleColor },
    CratePushed { index: usize },
    PlayerJumped,
    PlayerLanded,
    LevelRestarted { level: usize },
    LevelAdvanced { level: usize },
    GameComplete,
}

/// Level transition requested by the player's contacts this frame.
/// At most one per frame; anything but `None` ends the frame early.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LevelSignal {
    #[default]
    None,
    Restart,
    Advance,
}
