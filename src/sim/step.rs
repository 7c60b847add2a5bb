/// The step function: advances the world by one frame.
///
/// Processing order:
///   0. Jump (edge-triggered input, before any movement)
///   1. Buttons  (sensor vs player / crates / enemies)
///   2. Doors    (open iff a same-colour button is pressed)
///   3. Enemies  (in index order)
///   4. Player   (push, block, sweep, settle, contacts)
///   5. Crates   (in index order)
///
/// The order is load-bearing: the player's block check sees this frame's
/// doors but last frame's crate positions until the crates update.
///
/// Every actor follows the same shape:
///   read  = take an `Occupancy` snapshot of everyone else
///   check = pre-movement push/block decisions against the snapshot
///   write = sweep its own body against terrain, then settle vertically
///           against a fresh snapshot
///
/// A level signal from the player (spikes, exit, enemy touch) ends the
/// frame on the spot. Crates do not update; the stage is replaced.

use crate::config::PhysicsConfig;
use crate::domain::entity::{ActorId, FrameInput};
use crate::domain::geom::Rect;
use crate::domain::rules::{self, Contact};
use super::event::{GameEvent, LevelSignal};
use super::level::{self, LevelSource};
use super::stage::{Occupancy, Stage};
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, levels: &dyn LevelSource, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.tick_message();

    match step_stage(&mut world.stage, &world.physics, input, &mut events) {
        LevelSignal::None => {}
        LevelSignal::Restart => events.push(level::restart_level(world)),
        LevelSignal::Advance => events.push(level::advance_level(world, levels)),
    }

    events
}

/// One frame of a single stage. Returns the level signal raised by the
/// player, if any; the caller owns level transitions.
pub fn step_stage(
    stage: &mut Stage,
    phys: &PhysicsConfig,
    input: FrameInput,
    events: &mut Vec<GameEvent>,
) -> LevelSignal {
    if input.jump && stage.player.jump(phys.jump_velocity) {
        events.push(GameEvent::PlayerJumped);
    }

    resolve_buttons(stage, events);
    resolve_doors(stage, events);
    resolve_enemies(stage, phys, events);
    let signal = resolve_player(stage, phys, input.horizontal(), events);
    if signal != LevelSignal::None { return signal; }
    resolve_crates(stage, phys);

    LevelSignal::None
}

// ══════════════════════════════════════════════════════════════
// Puzzle elements
// ══════════════════════════════════════════════════════════════

fn resolve_buttons(stage: &mut Stage, events: &mut Vec<GameEvent>) {
    let actors = stage.actor_rects();
    for (index, button) in stage.buttons.iter_mut().enumerate() {
        let pressed = rules::sensor_pressed(&button.sensor(), &actors);
        if pressed != button.pressed {
            let color = button.color;
            events.push(if pressed {
                GameEvent::ButtonPressed { index, color }
            } else {
                GameEvent::ButtonReleased { index, color }
            });
        }
        button.pressed = pressed;
    }
}

fn resolve_doors(stage: &mut Stage, events: &mut Vec<GameEvent>) {
    for (index, door) in stage.doors.iter_mut().enumerate() {
        let open = rules::door_open(door.color, &stage.buttons);
        if open != door.open {
            let color = door.color;
            events.push(if open {
                GameEvent::DoorOpened { index, color }
            } else {
                GameEvent::DoorClosed { index, color }
            });
        }
        door.open = open;
    }
}

// ══════════════════════════════════════════════════════════════
// Shared pre-movement check
// ══════════════════════════════════════════════════════════════

/// Push every crate in the way of `future` by `dx`, in snapshot order.
/// Returns false at the first crate that will not budge; pushes already
/// made stay committed.
fn push_crates_in_way(
    stage: &mut Stage,
    occ: &Occupancy,
    future: &Rect,
    dx: f32,
    events: &mut Vec<GameEvent>,
) -> bool {
    for &(index, r) in &occ.crates {
        if !future.overlaps(&r) { continue; }
        if !stage.try_push_crate(index, dx) {
            return false;
        }
        if dx != 0.0 {
            events.push(GameEvent::CratePushed { index });
        }
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// Patrol: one unit per frame in the facing direction.
/// A stuck crate, another enemy or a closed door ahead turns the enemy
/// around without moving it (no sweep, so no gravity either). Bumping
/// into terrain during the sweep turns it around too.
fn resolve_enemies(stage: &mut Stage, phys: &PhysicsConfig, events: &mut Vec<GameEvent>) {
    for i in 0..stage.enemies.len() {
        let id = ActorId::Enemy(i);
        let occ = stage.occupancy(id);
        let dir = stage.enemies[i].facing.sign();
        let future = stage.enemies[i].body.rect().translated(dir, 0.0);

        let blocked = !push_crates_in_way(stage, &occ, &future, dir, events)
            || occ.enemies.iter().any(|e| e.overlaps(&future))
            || occ.closed_doors.iter().any(|d| d.overlaps(&future));
        if blocked {
            stage.enemies[i].turn_around();
            continue;
        }

        stage.enemies[i].body.sweep(&stage.tilemap, (dir, 0.0), phys);

        let occ = stage.occupancy(id);
        let blockers: Vec<Rect> = occ.crate_rects()
            .chain(occ.enemies.iter().copied())
            .chain(occ.closed_doors.iter().copied())
            .collect();
        let enemy = &mut stage.enemies[i];
        enemy.body.settle(&blockers);
        if enemy.body.collisions.horizontal() {
            enemy.turn_around();
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(
    stage: &mut Stage,
    phys: &PhysicsConfig,
    horizontal: f32,
    events: &mut Vec<GameEvent>,
) -> LevelSignal {
    let occ = stage.occupancy(ActorId::Player);
    let future = stage.player.body.rect().translated(horizontal, 0.0);

    let mut dx = horizontal;
    if !push_crates_in_way(stage, &occ, &future, horizontal, events) {
        dx = 0.0;
    }
    if occ.closed_doors.iter().any(|d| d.overlaps(&future)) {
        dx = 0.0;
    }

    stage.player.body.sweep(&stage.tilemap, (dx, 0.0), phys);

    // Player stands on crates and closed doors, never on enemies.
    let occ = stage.occupancy(ActorId::Player);
    let blockers: Vec<Rect> = occ.crate_rects()
        .chain(occ.closed_doors.iter().copied())
        .collect();
    let player = &mut stage.player;
    player.body.settle(&blockers);
    if player.body.collisions.down {
        if player.jump_charge == 0 {
            events.push(GameEvent::PlayerLanded);
        }
        player.jump_charge = 1;
    }

    let rect = stage.player.body.rect();
    match rules::player_contact(&rect, &stage.tilemap, &stage.enemy_rects()) {
        Contact::Clear => LevelSignal::None,
        Contact::Spikes | Contact::Enemy => LevelSignal::Restart,
        Contact::Exit => LevelSignal::Advance,
    }
}

// ══════════════════════════════════════════════════════════════
// Crates
// ══════════════════════════════════════════════════════════════

/// Crates only fall; horizontal motion comes from pushes alone.
fn resolve_crates(stage: &mut Stage, phys: &PhysicsConfig) {
    for i in 0..stage.crates.len() {
        stage.crates[i].body.sweep(&stage.tilemap, (0.0, 0.0), phys);

        let occ = stage.occupancy(ActorId::Crate(i));
        let blockers: Vec<Rect> = occ.crate_rects()
            .chain(occ.player)
            .chain(occ.enemies.iter().copied())
            .chain(occ.closed_doors.iter().copied())
            .collect();
        stage.crates[i].body.settle(&blockers);
    }
}
