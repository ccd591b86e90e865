//! Float layout primitives.
//!
//! Coordinates are device pixels with the origin at the top-left corner of the surface.
//! Widths and heights never go negative: constructors and helpers clamp them at zero, so a
//! degenerate layout collapses into zero-area rects instead of inverted ones.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    pub fn from_size(w: f32, h: f32) -> Self {
        Self::new(0.0, 0.0, w, h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Inclusive on every edge: a tap that lands exactly on a border still hits.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when the interiors overlap. Rects that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns the rectangle inset by `insets` (i.e. the inner content area).
    ///
    /// If insets exceed the rect size, the resulting width/height clamp to 0.
    pub fn inset(&self, insets: Insets) -> Self {
        Self::new(
            self.x + insets.left,
            self.y + insets.top,
            self.w - (insets.left + insets.right),
            self.h - (insets.top + insets.bottom),
        )
    }

    /// Grows the rect by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }

    /// Places a child of `size` inside this rect using the requested `anchor`.
    ///
    /// If `size` exceeds this rect, it is clamped to fit.
    pub fn place(&self, size: Size, anchor: Anchor) -> Self {
        let w = size.w.clamp(0.0, self.w);
        let h = size.h.clamp(0.0, self.h);

        let x = match anchor {
            Anchor::TopLeft | Anchor::CenterLeft | Anchor::BottomLeft => self.x,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => {
                self.x + (self.w - w) / 2.0
            }
            Anchor::TopRight | Anchor::CenterRight | Anchor::BottomRight => self.x + self.w - w,
        };

        let y = match anchor {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => self.y,
            Anchor::CenterLeft | Anchor::Center | Anchor::CenterRight => {
                self.y + (self.h - h) / 2.0
            }
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => self.y + self.h - h,
        };

        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    pub fn square(side: f32) -> Self {
        Self::new(side, side)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub fn all(v: f32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_rect_and_moves_origin() {
        let r = Rect::from_size(100.0, 80.0);
        let inner = r.inset(Insets::all(10.0));
        assert_eq!(inner, Rect::new(10.0, 10.0, 80.0, 60.0));
    }

    #[test]
    fn oversized_inset_collapses_to_zero_area() {
        let r = Rect::from_size(10.0, 10.0);
        let inner = r.inset(Insets::all(20.0));
        assert_eq!(inner.w, 0.0);
        assert_eq!(inner.h, 0.0);
        assert!(inner.is_empty());
    }

    #[test]
    fn place_center_positions_child_in_parent() {
        let parent = Rect::from_size(100.0, 100.0);
        let child = parent.place(Size::new(20.0, 10.0), Anchor::Center);
        assert_eq!(child, Rect::new(40.0, 45.0, 20.0, 10.0));
    }

    #[test]
    fn place_bottom_right_positions_child_in_corner() {
        let parent = Rect::new(10.0, 10.0, 100.0, 100.0);
        let child = parent.place(Size::new(20.0, 10.0), Anchor::BottomRight);
        assert_eq!(child, Rect::new(90.0, 100.0, 20.0, 10.0));
    }

    #[test]
    fn place_clamps_size_to_parent() {
        let parent = Rect::from_size(50.0, 40.0);
        let child = parent.place(Size::new(999.0, 999.0), Anchor::TopLeft);
        assert_eq!(child, Rect::new(0.0, 0.0, 50.0, 40.0));
    }

    #[test]
    fn contains_is_inclusive_on_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(30.5, 30.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let r = Rect::new(5.0, 5.0, -3.0, -1.0);
        assert_eq!(r.w, 0.0);
        assert_eq!(r.h, 0.0);
    }
}
