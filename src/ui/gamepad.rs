/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Walk left / right
///   A / B                 →  Jump
///   Y                     →  Restart level
///   Select                →  Quit
///
/// Without the `gamepad` feature the tracker compiles to an always-idle
/// stub so the game loop does not need to care.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use log::{info, warn};

use crate::config::GamepadConfig;
use crate::domain::entity::{Facing, FrameInput};
use super::input::intent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping.
#[derive(Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    restart: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump: vec![Btn::A, Btn::B],
            restart: vec![Btn::Y],
            quit: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad_left: bool,
    dpad_right: bool,
    stick_x: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                if has_pad {
                    info!("gamepad detected");
                }
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Lists that name no known button
    /// keep the default mapping.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String], keep: &mut Vec<Btn>) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *keep = parsed;
            }
        }
        parse_list(&cfg.jump, &mut self.action_map.jump);
        parse_list(&cfg.restart, &mut self.action_map.restart);
        parse_list(&cfg.quit, &mut self.action_map.quit);
    }

    /// Poll pending events. Call once per frame.
    pub fn update(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick_x = value;
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        match gilrs_btn {
            Button::DPadLeft => self.dpad_left = held,
            Button::DPadRight => self.dpad_right = held,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    let state = &mut self.buttons[btn as usize];
                    state.held = held;
                    state.just_pressed |= held;
                }
            }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad_left = false;
        self.dpad_right = false;
        self.stick_x = 0.0;
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn left_held(&self) -> bool {
        self.dpad_left || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.dpad_right || self.stick_x > STICK_DEADZONE
    }

    pub fn movement(&self) -> Option<Facing> {
        intent(self.left_held(), self.right_held())
    }

    pub fn jump_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.jump)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }

    /// Merge pad intent into keyboard intent. Keyboard wins on movement
    /// when both are active; jumps from either source count.
    pub fn merge_into(&self, input: FrameInput) -> FrameInput {
        FrameInput {
            movement: input.movement.or(self.movement()),
            jump: input.jump || self.jump_pressed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_pad() -> GamepadState {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_only_valid_lists() {
        let mut pad = idle_pad();
        pad.load_button_config(&GamepadConfig {
            jump: vec!["X".into()],
            restart: vec!["nonsense".into()],
            quit: vec![],
        });
        assert_eq!(pad.action_map.jump, vec![Btn::X]);
        assert_eq!(pad.action_map.restart, vec![Btn::Y]);
        assert_eq!(pad.action_map.quit, vec![Btn::Select]);
    }

    #[test]
    fn stick_deadzone() {
        let mut pad = idle_pad();
        pad.stick_x = -0.2;
        assert_eq!(pad.movement(), None);
        pad.stick_x = -0.6;
        assert_eq!(pad.movement(), Some(Facing::Left));
    }

    #[test]
    fn keyboard_movement_wins_jumps_combine() {
        let mut pad = idle_pad();
        pad.dpad_right = true;
        pad.buttons[Btn::A as usize].just_pressed = true;

        let kb = FrameInput { movement: Some(Facing::Left), jump: false };
        let merged = pad.merge_into(kb);
        assert_eq!(merged.movement, Some(Facing::Left));
        assert!(merged.jump);

        let merged = pad.merge_into(FrameInput::default());
        assert_eq!(merged.movement, Some(Facing::Right));
    }
}
