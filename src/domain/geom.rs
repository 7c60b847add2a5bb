/// Axis-aligned rectangle: the single collidable shape.
///
/// Tiles, actors, door panels and button sensors are all `Rect`s.
/// Coordinates are world units with y growing downward; `(x, y)` is the
/// top-left corner.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 { self.x }
    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w }
    #[inline]
    pub fn top(&self) -> f32 { self.y }
    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }

    /// Move so the right edge sits at `edge`.
    pub fn set_right(&mut self, edge: f32) { self.x = edge - self.w; }
    /// Move so the left edge sits at `edge`.
    pub fn set_left(&mut self, edge: f32) { self.x = edge; }
    /// Move so the bottom edge sits at `edge`.
    pub fn set_bottom(&mut self, edge: f32) { self.y = edge - self.h; }
    /// Move so the top edge sits at `edge`.
    pub fn set_top(&mut self, edge: f32) { self.y = edge; }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    /// An actor resting on a floor touches it without overlapping it.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Lower half of the rectangle (button sensor footprint).
    pub fn lower_half(&self) -> Rect {
        let half = (self.h / 2.0).floor();
        Rect { x: self.x, y: self.y + half, w: self.w, h: half }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        assert!(!a.overlaps(&Rect::new(16.0, 0.0, 16.0, 16.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 16.0, 16.0, 16.0)));
        assert!(a.overlaps(&Rect::new(15.5, 15.5, 16.0, 16.0)));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(10.0, 10.0, 16.0, 8.0);
        r.set_right(40.0);
        assert_eq!(r.x, 24.0);
        r.set_bottom(32.0);
        assert_eq!(r.y, 24.0);
        r.set_top(2.0);
        r.set_left(3.0);
        assert_eq!((r.x, r.y, r.w, r.h), (3.0, 2.0, 16.0, 8.0));
    }

    #[test]
    fn lower_half_of_tile() {
        let s = Rect::new(32.0, 48.0, 16.0, 16.0).lower_half();
        assert_eq!(s, Rect::new(32.0, 56.0, 16.0, 8.0));
    }
}
