//! Axis-aligned rectangles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge in world units.
    pub left: f32,
    /// Top edge in world units.
    pub top: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extents.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a rectangle of `size` centred on `centre`.
    #[must_use]
    pub fn from_centre(centre: Vec2, size: Vec2) -> Self {
        Self::new(
            centre.x - size.x / 2.0,
            centre.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    /// Right edge in world units.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge in world units.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Top-left corner.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Geometric centre.
    #[must_use]
    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Surface area, zero for degenerate rectangles.
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.width * self.height).max(0.0)
    }

    /// Reports whether `point` lies inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are
    /// exclusive, so adjacent rectangles never both contain a point.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }

    /// Overlapping region of two rectangles, if their interiors intersect.
    ///
    /// Rectangles that merely touch along an edge do not intersect.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Reports whether the interiors of the two rectangles overlap.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Intersection-over-union of the two rectangles, in `[0, 1]`.
    ///
    /// The result is zero exactly when the rectangles do not intersect.
    #[must_use]
    pub fn iou(&self, other: &Rect) -> f32 {
        let Some(overlap) = self.intersection(other) else {
            return 0.0;
        };

        let overlap_area = overlap.area();
        let union = self.area() + other.area() - overlap_area;
        if union <= 0.0 {
            return 0.0;
        }

        (overlap_area / union).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_overlap_has_one_third_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 0.0, 10.0, 10.0);
        let iou = a.iou(&b);
        assert!((iou - 1.0 / 3.0).abs() < 1e-5, "unexpected iou {iou}");
        assert!((a.iou(&b) - b.iou(&a)).abs() < f32::EPSILON);
    }

    #[test]
    fn disjoint_and_touching_rectangles_have_zero_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&Rect::new(20.0, 0.0, 10.0, 10.0)), 0.0);
        assert_eq!(a.iou(&Rect::new(10.0, 0.0, 10.0, 10.0)), 0.0);
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn identical_rectangles_have_unit_iou() {
        let a = Rect::new(3.0, 4.0, 8.0, 2.0);
        assert!((a.iou(&a) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn contains_uses_half_open_edges() {
        let a = Rect::from_centre(Vec2::new(16.0, 16.0), Vec2::new(32.0, 32.0));
        assert!(a.contains(Vec2::new(0.0, 0.0)));
        assert!(a.contains(Vec2::new(16.0, 16.0)));
        assert!(!a.contains(Vec2::new(32.0, 16.0)));
        assert!(!a.contains(Vec2::new(16.0, 32.0)));
        assert!(!a.contains(Vec2::new(-0.5, 16.0)));
        assert!(!a.contains(Vec2::new(16.0, -0.5)));
        assert!(a.contains(Vec2::new(31.9, 31.9)));
    }
}
