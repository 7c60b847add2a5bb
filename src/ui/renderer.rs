/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// One grid cell is drawn as two terminal columns. Actors are drawn at the
/// grid cell nearest to their top-left corner; the simulation itself keeps
/// sub-cell positions.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::sprite::{self, SpriteId};
use crate::domain::tile::{GridPos, PuzzleColor};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" cell, so the gap colour
    /// between rows matches the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Self::BASE_BG } else { bg };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Glyphs ──

/// Two-column glyph and colours for a sprite.
fn glyph(sprite: SpriteId) -> ([char; 2], Color, Color) {
    let none = Color::Reset;
    match sprite {
        SpriteId::Stone => (['▓', '▓'], Color::Rgb { r: 120, g: 110, b: 100 }, none),
        SpriteId::Spikes => (['▲', '▲'], Color::Rgb { r: 220, g: 220, b: 230 }, none),
        SpriteId::Exit => (['▯', '▯'], Color::Rgb { r: 80, g: 255, b: 120 }, none),
        SpriteId::Torch => (['¡', ' '], Color::Rgb { r: 255, g: 160, b: 40 }, none),
        SpriteId::Grave => (['†', ' '], Color::DarkGrey, none),
        SpriteId::Player => (['☺', ' '], Color::Rgb { r: 100, g: 200, b: 255 }, none),
        SpriteId::Enemy => (['ö', ' '], Color::Rgb { r: 255, g: 70, b: 70 }, none),
        SpriteId::Crate => (['[', ']'], Color::Rgb { r: 200, g: 150, b: 80 }, none),
        SpriteId::Button { color, pressed: false } => (['▄', '▄'], puzzle_color(color), none),
        SpriteId::Button { color, pressed: true } => (['_', '_'], puzzle_color(color), none),
        SpriteId::Door { color, open: false } => (['█', '█'], puzzle_color(color), none),
        SpriteId::Door { color, open: true } => (['░', '░'], puzzle_color(color), none),
    }
}

fn puzzle_color(c: PuzzleColor) -> Color {
    match c {
        PuzzleColor::Red => Color::Rgb { r: 230, g: 60, b: 60 },
        PuzzleColor::Green => Color::Rgb { r: 60, g: 200, b: 80 },
        PuzzleColor::Blue => Color::Rgb { r: 70, g: 120, b: 255 },
    }
}

// ── Viewport ──

/// Top-left grid cell of the visible window along one axis.
/// Maps that fit are shown whole; larger maps scroll to keep `focus`
/// centred, clamped to the map edges.
fn view_origin(lo: i32, hi: i32, view: usize, focus: i32) -> i32 {
    let span = hi - lo + 1;
    let view = view as i32;
    if span <= view {
        return lo;
    }
    (focus - view / 2).clamp(lo, hi - view + 1)
}

/// Grid cell used to draw an actor at world position `pos`.
fn draw_cell(pos: (f32, f32), tile_size: u32) -> GridPos {
    let ts = tile_size as f32;
    ((pos.0 / ts).round() as i32, (pos.1 / ts).round() as i32)
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Match buffers to the terminal size. Returns true when it changed.
    fn fit_terminal(&mut self) -> bool {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw == self.term_w && th == self.term_h {
            return false;
        }
        self.term_w = tw;
        self.term_h = th;
        self.front.resize(tw, th);
        self.back.resize(tw, th);
        // Force full repaint: back != front for every cell.
        self.back.cells.fill(Cell::INVALID);
        true
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let resized = self.fit_terminal();
        let phase_changed = self.last_phase != Some(world.phase);
        if resized || phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Playing => self.compose_game(world),
            Phase::GameComplete => self.compose_game_complete(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours, never ResetColor (terminal default may differ).
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        let hud = format!(
            " Level {:>2}/{:<2}  {} ",
            w.current_level + 1, w.total_levels, w.level_name,
        );
        self.front.fill_row(HUD_ROW, hud_bg);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Map window ──
        let ts = w.tile_size;
        let Some((lo, hi)) = w.base_tilemap.bounds() else { return };
        let reserved_rows = MAP_ROW + 4; // HUD + gap + message + help
        let view_w = (self.term_w / CELL_W).max(1);
        let view_h = self.term_h.saturating_sub(reserved_rows).max(1);
        let focus = draw_cell(w.stage.player.body.pos, ts);
        let origin = (
            view_origin(lo.0, hi.0, view_w, focus.0),
            view_origin(lo.1, hi.1, view_h, focus.1),
        );
        let shown_h = ((hi.1 - lo.1 + 1) as usize).min(view_h);

        let stage = &w.stage;
        for tile in stage.tilemap.tiles() {
            self.put_sprite(origin, tile.pos, sprite::tile_sprite(tile.kind), view_w, view_h);
        }
        for free in stage.tilemap.free_tiles() {
            let cell = stage.tilemap.cell_of(free.pos);
            self.put_sprite(origin, cell, sprite::tile_sprite(free.kind), view_w, view_h);
        }
        for b in &stage.buttons {
            let cell = draw_cell((b.rect.x, b.rect.y), ts);
            self.put_sprite(origin, cell, sprite::button_sprite(b), view_w, view_h);
        }
        for d in &stage.doors {
            let cell = draw_cell((d.rect.x, d.rect.y), ts);
            self.put_sprite(origin, cell, sprite::door_sprite(d), view_w, view_h);
        }
        for c in &stage.crates {
            self.put_sprite(origin, draw_cell(c.body.pos, ts), SpriteId::Crate, view_w, view_h);
        }
        for e in &stage.enemies {
            self.put_sprite(origin, draw_cell(e.body.pos, ts), SpriteId::Enemy, view_w, view_h);
        }
        self.put_sprite(origin, focus, SpriteId::Player, view_w, view_h);

        // ── Message bar ──
        let msg_row = MAP_ROW + shown_h + 1;
        if !w.message.is_empty() && msg_row < self.front.height {
            let msg_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, msg_bg);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, msg_bg);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + shown_h + 3;
        if help_row < self.front.height {
            let help = " A/D:Move  W/Space:Jump  R:Restart  Q/Esc:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Draw one sprite at grid cell `pos` if it falls inside the window.
    fn put_sprite(&mut self, origin: GridPos, pos: GridPos, sprite: SpriteId, view_w: usize, view_h: usize) {
        let vx = pos.0 - origin.0;
        let vy = pos.1 - origin.1;
        if vx < 0 || vy < 0 || vx as usize >= view_w || vy as usize >= view_h {
            return;
        }
        let (chars, fg, bg) = glyph(sprite);
        let col = vx as usize * CELL_W;
        let row = MAP_ROW + vy as usize;
        for (i, ch) in chars.into_iter().enumerate() {
            self.front.set(col + i, row, Cell::new(ch, fg, bg));
        }
    }

    fn compose_game_complete(&mut self, w: &WorldState) {
        let box_art = [
            "╔══════════════════════════════╗",
            "║   ★  ALL LEVELS COMPLETE  ★   ║",
            "╚══════════════════════════════╝",
        ];
        let banner = Color::Rgb { r: 255, g: 220, b: 50 };
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, banner, Color::Reset);
        }
        let levels = format!("◈ {} levels cleared", w.total_levels);
        self.front.put_str(6, 9, &levels, Color::White, Color::Reset);
        self.front.put_str(6, 11, "▸ Q / ESC: Quit", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_map_is_not_scrolled() {
        assert_eq!(view_origin(0, 19, 40, 18), 0);
        assert_eq!(view_origin(-3, 5, 9, 5), -3);
    }

    #[test]
    fn large_map_follows_focus_within_edges() {
        // 100 cells wide, 20 visible
        assert_eq!(view_origin(0, 99, 20, 50), 40);
        assert_eq!(view_origin(0, 99, 20, 2), 0);
        assert_eq!(view_origin(0, 99, 20, 98), 80);
    }

    #[test]
    fn actors_snap_to_nearest_cell() {
        assert_eq!(draw_cell((16.0, 32.0), 16), (1, 2));
        assert_eq!(draw_cell((23.9, 32.0), 16), (1, 2));
        assert_eq!(draw_cell((24.1, 40.5), 16), (2, 3));
    }

    #[test]
    fn door_glyph_changes_with_state() {
        let closed = glyph(SpriteId::Door { color: PuzzleColor::Red, open: false });
        let open = glyph(SpriteId::Door { color: PuzzleColor::Red, open: true });
        assert_ne!(closed.0, open.0);
        assert_eq!(closed.1, open.1);
    }

    #[test]
    fn frame_buffer_clips_writes() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.put_str(2, 0, "abcd", Color::White, Color::Reset);
        assert_eq!(fb.get(3, 0).ch, 'b');
        fb.set(9, 9, Cell::INVALID); // ignored
        assert_eq!(fb.get(9, 9), Cell::BLANK);
        assert_eq!(fb.get(2, 0).bg, Cell::BASE_BG);
    }
}
