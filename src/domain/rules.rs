/// Interaction rules, table driven.
///
/// Pure functions over rectangles and puzzle state, no side effects.
/// These decide "what happens" without performing the action; the stage
/// applies the outcome.
///
/// ## Push (crate displaced by dx)
/// ┌────────────────────────────────────────┬─────────┐
/// │ Destination rectangle overlaps          │ Result  │
/// ├────────────────────────────────────────┼─────────┤
/// │ another crate                           │ BLOCKED │
/// │ any enemy                               │ BLOCKED │
/// │ the player                              │ BLOCKED │
/// │ a closed door                           │ BLOCKED │
/// │ a solid tile near the destination       │ BLOCKED │
/// │ otherwise                               │ MOVES   │
/// └────────────────────────────────────────┴─────────┘
///
/// ## Button
/// Pressed iff its sensor (lower half) overlaps the player, a crate or an
/// enemy this frame. No memory between frames.
///
/// ## Door
/// Open iff some button of the same colour is pressed this frame.
/// A colour without buttons keeps its doors shut forever.
///
/// ## Player contact (checked after all movement)
/// ┌──────────────────────────────┬──────────────┐
/// │ Condition (priority order)    │ Outcome      │
/// ├──────────────────────────────┼──────────────┤
/// │ overlaps a spikes tile        │ Spikes       │
/// │ overlaps an exit volume       │ Exit         │
/// │ overlaps an enemy             │ Enemy        │
/// │ otherwise                     │ Clear        │
/// └──────────────────────────────┴──────────────┘
/// Spikes short-circuit: nothing else is examined once they are touched.

use super::entity::Button;
use super::geom::Rect;
use super::tile::{PuzzleColor, TileKind};
use super::tilemap::Tilemap;

/// Can a crate occupy `dest`? `obstacles` are the other actors plus closed
/// doors; solid tiles are looked up around `dest`.
pub fn push_clear(dest: &Rect, obstacles: &[Rect], map: &Tilemap) -> bool {
    if obstacles.iter().any(|o| o.overlaps(dest)) {
        return false;
    }
    !map.solid_rects_near((dest.x, dest.y)).iter().any(|t| t.overlaps(dest))
}

/// Is a button sensor weighed down by any of `actors`?
pub fn sensor_pressed(sensor: &Rect, actors: &[Rect]) -> bool {
    actors.iter().any(|a| a.overlaps(sensor))
}

/// Is any button of `color` pressed?
pub fn door_open(color: PuzzleColor, buttons: &[Button]) -> bool {
    buttons.iter().any(|b| b.color == color && b.pressed)
}

/// What the player is touching after movement.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Clear,
    Spikes,
    Exit,
    Enemy,
}

pub fn player_contact(player: &Rect, map: &Tilemap, enemies: &[Rect]) -> Contact {
    let hits: Vec<TileKind> = map.tiles_near((player.x, player.y)).into_iter()
        .filter(|t| t.kind.is_trigger() && map.trigger_rect(t).overlaps(player))
        .map(|t| t.kind)
        .collect();

    if hits.contains(&TileKind::Spikes) {
        return Contact::Spikes;
    }
    if hits.contains(&TileKind::Exit) {
        return Contact::Exit;
    }
    if enemies.iter().any(|e| e.overlaps(player)) {
        return Contact::Enemy;
    }
    Contact::Clear
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tilemap::tests::map_from;

    fn tile_rect(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 16.0, 16.0)
    }

    // ── push_clear ──

    #[test]
    fn push_into_open_space() {
        let map = map_from(&["    ", "####"]);
        assert!(push_clear(&tile_rect(17.0, 0.0), &[], &map));
    }

    #[test]
    fn push_into_wall_blocked() {
        let map = map_from(&["  # ", "####"]);
        assert!(!push_clear(&tile_rect(17.0, 0.0), &[], &map));
    }

    #[test]
    fn push_into_actor_blocked() {
        let map = map_from(&["    "]);
        let others = [tile_rect(33.0, 0.0)];
        assert!(!push_clear(&tile_rect(18.0, 0.0), &others, &map));
        assert!(push_clear(&tile_rect(17.0, 0.0), &others, &map));
    }

    // ── buttons / doors ──

    #[test]
    fn sensor_ignores_actor_above_it() {
        let sensor = tile_rect(0.0, 16.0).lower_half();
        // Standing on top of the button tile: touches the footprint's top,
        // not the sensor.
        assert!(!sensor_pressed(&sensor, &[tile_rect(0.0, 0.0)]));
        assert!(sensor_pressed(&sensor, &[tile_rect(0.0, 16.0)]));
        assert!(sensor_pressed(&sensor, &[tile_rect(0.0, 9.0)]));
    }

    #[test]
    fn door_follows_matching_color_only() {
        let mut red = Button::new(PuzzleColor::Red, tile_rect(0.0, 0.0));
        let green = Button::new(PuzzleColor::Green, tile_rect(16.0, 0.0));
        assert!(!door_open(PuzzleColor::Red, &[red.clone(), green.clone()]));
        red.pressed = true;
        let buttons = [red, green];
        assert!(door_open(PuzzleColor::Red, &buttons));
        assert!(!door_open(PuzzleColor::Green, &buttons));
        assert!(!door_open(PuzzleColor::Blue, &buttons));
    }

    #[test]
    fn door_without_buttons_stays_closed() {
        assert!(!door_open(PuzzleColor::Blue, &[]));
    }

    // ── contact ──

    #[test]
    fn spikes_take_priority() {
        let map = map_from(&[
            "E ",
            "^ ",
        ]);
        // Player overlapping both the exit volume and the spikes.
        let p = tile_rect(4.0, 12.0);
        let enemy = [tile_rect(8.0, 12.0)];
        assert_eq!(player_contact(&p, &map, &enemy), Contact::Spikes);
    }

    #[test]
    fn exit_volume_reaches_one_tile_below() {
        let map = map_from(&[
            " E",
            "  ",
            "##",
        ]);
        // Standing on the floor in the cell under the exit graphic.
        let p = tile_rect(16.0, 16.0);
        assert_eq!(player_contact(&p, &map, &[]), Contact::Exit);
        // One tile further down is outside the volume.
        let p = tile_rect(16.0, 32.0);
        assert_eq!(player_contact(&p, &map, &[]), Contact::Clear);
    }

    #[test]
    fn exit_beats_enemy() {
        let map = map_from(&["E"]);
        let p = tile_rect(0.0, 0.0);
        assert_eq!(player_contact(&p, &map, &[tile_rect(2.0, 0.0)]), Contact::Exit);
    }

    #[test]
    fn scenery_and_terrain_raise_nothing() {
        let map = map_from(&["#t+"]);
        for x in [0.0, 16.0, 32.0] {
            assert_eq!(player_contact(&tile_rect(x, 0.0), &map, &[]), Contact::Clear);
        }
    }

    #[test]
    fn enemy_touch_detected() {
        let map = map_from(&["  "]);
        let p = tile_rect(0.0, 0.0);
        assert_eq!(player_contact(&p, &map, &[tile_rect(15.0, 0.0)]), Contact::Enemy);
        assert_eq!(player_contact(&p, &map, &[tile_rect(16.0, 0.0)]), Contact::Clear);
    }
}
