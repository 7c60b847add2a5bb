/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::execute;
use log::{error, info};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level::{self, EmbeddedLevels, LevelSource};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(name = "plateshift", version, about = "Terminal puzzle platformer: crates, pressure plates and doors")]
struct Args {
    /// Level to start on, counting from 1 (overrides config.toml)
    #[arg(short, long)]
    level: Option<usize>,

    /// Read this config file instead of searching for config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the built-in levels and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let levels = EmbeddedLevels::new();

    if args.list {
        for id in 0..levels.level_count() {
            println!("{:>2}. {}", id + 1, levels.name(id).unwrap_or_default());
        }
        return;
    }

    let config = GameConfig::load(args.config.as_deref());
    let start = args.level
        .map(|n| n.saturating_sub(1))
        .unwrap_or(config.general.start_level);

    let mut world = WorldState::new(config.physics.clone(), config.general.tile_size);
    if let Err(e) = level::load_level(&mut world, &levels, start) {
        eprintln!("Cannot start: {e}");
        std::process::exit(1);
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    let honor_release = enable_release_events();

    let result = game_loop(&mut world, &levels, &mut renderer, &config, honor_release);

    if honor_release {
        if let Err(e) = execute!(io::stdout(), PopKeyboardEnhancementFlags) {
            eprintln!("Terminal cleanup failed: {e}");
        }
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Plateshift!");
    if world.phase == Phase::GameComplete {
        println!("All {} levels cleared.", world.total_levels);
    } else {
        println!("Reached level {} of {}.", world.current_level + 1, world.total_levels);
    }
}

/// Ask the terminal for key release events. Returns whether it agreed.
fn enable_release_events() -> bool {
    if !matches!(crossterm::terminal::supports_keyboard_enhancement(), Ok(true)) {
        info!("terminal reports no key releases; using hold timeout");
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    ).is_ok()
}

fn game_loop(
    world: &mut WorldState,
    levels: &dyn LevelSource,
    renderer: &mut Renderer,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = Duration::from_millis(config.general.tick_rate_ms);
    let mut last_tick = Instant::now();

    // Jump presses land between ticks; keep them until the next step.
    let mut pending_jump = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break;
        }

        if world.phase == Phase::Playing {
            if kb.restart_pressed() || gp.restart_pressed() {
                let event = level::restart_level(world);
                announce(world, &[event]);
                pending_jump = false;
            }
            pending_jump |= kb.frame_input().jump || gp.jump_pressed();
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Playing {
                let input = gp.merge_into(FrameInput {
                    jump: pending_jump,
                    ..kb.frame_input()
                });
                pending_jump = false;
                let events = step::step(world, levels, input);
                announce(world, &events);
            }
            renderer.render(world)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Turn notable events into message-bar text.
fn announce(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::LevelRestarted { .. } => world.set_message("Try again!", 60),
            GameEvent::DoorOpened { color, .. } => {
                world.set_message(&format!("A {} door opens", color.name()), 45);
            }
            _ => {}
        }
    }
}
