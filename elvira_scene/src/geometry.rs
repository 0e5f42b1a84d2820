// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout-space geometry: integer points and boxes, float boxes, output transforms.

use elvira_region::Aabb;

/// An integer point in layout space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset `(dx, dy)` that moves this point onto `other`.
    pub const fn offset_to(self, other: Self) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        kurbo::Point::new(f64::from(self.x), f64::from(self.y))
            .distance(kurbo::Point::new(f64::from(other.x), f64::from(other.y)))
    }
}

/// An integer layout box: origin plus size.
///
/// Negative or zero sizes are legal and mean "empty".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width; empty when `<= 0`.
    pub width: i32,
    /// Height; empty when `<= 0`.
    pub height: i32,
}

impl Rect {
    /// The canonical zero-area box.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a box from origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge, saturating at `i32::MAX`.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge, saturating at `i32::MAX`.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// The canonical zero-area box.
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// True if the box covers no area.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `pt` lies strictly inside the box; points on the boundary are outside.
    pub const fn contains_point(&self, pt: Point) -> bool {
        if self.is_empty() {
            return false;
        }
        pt.x > self.x && pt.x < self.right() && pt.y > self.y && pt.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this box. Empty boxes contain nothing
    /// and are contained nowhere.
    pub const fn contains_rect(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlap of two boxes, or [`Rect::EMPTY`] when they do not overlap.
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        let out = Self::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1));
        if out.is_empty() { Self::EMPTY } else { out }
    }

    /// Smallest box containing both; empty inputs are ignored.
    pub fn union(&self, other: &Self) -> Self {
        Self::from(Aabb::from(*self).union(&Aabb::from(*other)))
    }

    /// Map the box into the frame produced by applying `transform` to a
    /// `width × height` space.
    ///
    /// Quarter-turn transforms swap the box's width and height.
    pub const fn transform(&self, transform: Transform, width: i32, height: i32) -> Self {
        let (w, h) = if transform.is_rotated_quarter() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        let (x, y) = match transform {
            Transform::Normal => (self.x, self.y),
            Transform::Rotate90 => (height - self.y - self.height, self.x),
            Transform::Rotate180 => (width - self.x - self.width, height - self.y - self.height),
            Transform::Rotate270 => (self.y, width - self.x - self.width),
            Transform::Flipped => (width - self.x - self.width, self.y),
            Transform::Flipped90 => (self.y, self.x),
            Transform::Flipped180 => (self.x, height - self.y - self.height),
            Transform::Flipped270 => (height - self.y - self.height, width - self.x - self.width),
        };
        Self::new(x, y, w, h)
    }

    /// Float copy of this box.
    pub fn to_frect(self) -> FRect {
        FRect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

impl From<Aabb> for Rect {
    fn from(b: Aabb) -> Self {
        if b.is_empty() {
            return Self::EMPTY;
        }
        Self::new(b.min_x, b.min_y, b.width(), b.height())
    }
}

impl From<Rect> for Aabb {
    fn from(r: Rect) -> Self {
        if r.is_empty() {
            return Self::ZERO;
        }
        Self::from_xywh(r.x, r.y, r.width, r.height)
    }
}

/// A floating-point box, used for sub-pixel and scaled coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width; empty when `<= 0`.
    pub width: f64,
    /// Height; empty when `<= 0`.
    pub height: f64,
}

impl FRect {
    /// Create a float box from origin and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if the box covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Scale origin and size by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Smallest integer box containing this one.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Edges are rounded outward first; out-of-range values saturate."
    )]
    pub fn to_rect_outward(&self) -> Rect {
        if self.is_empty() {
            return Rect::EMPTY;
        }
        let r = kurbo::Rect::from(*self).expand();
        Rect::new(
            r.x0 as i32,
            r.y0 as i32,
            (r.x1 - r.x0) as i32,
            (r.y1 - r.y0) as i32,
        )
    }
}

impl From<FRect> for kurbo::Rect {
    fn from(r: FRect) -> Self {
        Self::new(r.x, r.y, r.x + r.width, r.y + r.height)
    }
}

impl From<kurbo::Rect> for FRect {
    fn from(r: kurbo::Rect) -> Self {
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// Output orientation: a rotation by a multiple of 90° counter-clockwise, optionally
/// preceded by a horizontal flip. Values match the `wl_output.transform` enum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Transform {
    /// No transform.
    #[default]
    Normal = 0,
    /// 90° rotation.
    Rotate90 = 1,
    /// 180° rotation.
    Rotate180 = 2,
    /// 270° rotation.
    Rotate270 = 3,
    /// Horizontal flip.
    Flipped = 4,
    /// Flip, then 90° rotation.
    Flipped90 = 5,
    /// Flip, then 180° rotation.
    Flipped180 = 6,
    /// Flip, then 270° rotation.
    Flipped270 = 7,
}

impl Transform {
    /// True for the 90°/270° family, where width and height swap.
    pub const fn is_rotated_quarter(self) -> bool {
        (self as u8) % 2 == 1
    }

    /// The transform that undoes this one.
    pub const fn invert(self) -> Self {
        match self {
            Self::Rotate90 => Self::Rotate270,
            Self::Rotate270 => Self::Rotate90,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_offset_and_distance() {
        let a = Point::new(1, 2);
        let b = Point::new(4, 6);
        assert_eq!(a.offset_to(b), (3, 4));
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_boxes() {
        assert!(Rect::empty().is_empty());
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(Rect::new(5, 5, 10, -1).is_empty());
        assert!(!Rect::new(5, 5, 1, 1).is_empty());
    }

    #[test]
    fn contains_point_excludes_boundary() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(Point::new(5, 5)));
        assert!(!r.contains_point(Point::new(0, 5)));
        assert!(!r.contains_point(Point::new(10, 5)));
        assert!(!Rect::EMPTY.contains_point(Point::new(0, 0)));
    }

    #[test]
    fn intersect_is_canonical_when_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
        assert_eq!(a.intersect(&Rect::new(10, 0, 5, 5)), Rect::EMPTY);
        assert!(a.contains_rect(&Rect::new(2, 2, 3, 3)));
        assert!(!a.contains_rect(&Rect::new(8, 8, 3, 3)));
    }

    #[test]
    fn edges_saturate_near_the_i32_limits() {
        let far = Rect::new(i32::MAX - 10, i32::MAX - 10, 100, 100);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(
            far.intersect(&Rect::new(i32::MAX - 5, i32::MAX - 5, 50, 50)),
            Rect::new(i32::MAX - 5, i32::MAX - 5, 5, 5)
        );
        assert_eq!(far.intersect(&Rect::new(i32::MIN, i32::MIN, 10, 10)), Rect::EMPTY);
        assert!(far.contains_point(Point::new(i32::MAX - 1, i32::MAX - 1)));
    }

    #[test]
    fn transform_quarter_turn_swaps_size() {
        let b = Rect::new(0, 0, 10, 20);
        assert_eq!(b.transform(Transform::Rotate90, 100, 50), Rect::new(30, 0, 20, 10));
        assert_eq!(b.transform(Transform::Rotate270, 100, 50), Rect::new(0, 90, 20, 10));
        assert_eq!(b.transform(Transform::Flipped, 100, 50), Rect::new(90, 0, 10, 20));
        assert_eq!(b.transform(Transform::Rotate180, 100, 50), Rect::new(90, 30, 10, 20));
        assert_eq!(b.transform(Transform::Normal, 100, 50), b);
    }

    #[test]
    fn transform_then_invert_round_trips() {
        let b = Rect::new(7, 3, 11, 5);
        let (w, h) = (100, 40);
        for t in [
            Transform::Rotate90,
            Transform::Rotate270,
            Transform::Flipped90,
            Transform::Flipped270,
        ] {
            let there = b.transform(t, w, h);
            // Quarter turns swap the frame, so the inverse runs in the h×w space.
            assert_eq!(there.transform(t.invert(), h, w), b, "{t:?}");
        }
    }

    #[test]
    fn frect_rounds_outward() {
        let f = FRect::new(0.5, 0.5, 10.0, 10.0);
        assert_eq!(f.to_rect_outward(), Rect::new(0, 0, 11, 11));
        assert_eq!(Rect::new(0, 0, 10, 10).to_frect().scale(1.5).to_rect_outward(), Rect::new(0, 0, 15, 15));
    }
}
