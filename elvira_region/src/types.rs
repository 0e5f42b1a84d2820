// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive box type shared by every region backend.

/// Half-open integer axis-aligned box: `[min_x, max_x) × [min_y, max_y)`.
///
/// This is the unit a region is made of. It carries corners rather than an
/// origin and size so that region algebra never has to re-derive edges.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Aabb {
    /// Minimum x (left, inclusive)
    pub min_x: i32,
    /// Minimum y (top, inclusive)
    pub min_y: i32,
    /// Maximum x (right, exclusive)
    pub max_x: i32,
    /// Maximum y (bottom, exclusive)
    pub max_y: i32,
}

impl Aabb {
    /// The canonical empty box at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a new box from min/max corners.
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a box from origin and size. Far edges saturate at the `i32` range.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x.saturating_add(width),
            max_y: y.saturating_add(height),
        }
    }

    /// Width of the box (may be negative for inverted boxes).
    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Height of the box (may be negative for inverted boxes).
    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// True if the box covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Whether the pixel at `(x, y)` lies inside the box.
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        self.min_x <= x && x < self.max_x && self.min_y <= y && y < self.max_y
    }

    /// Whether `other` lies entirely inside this box. Empty boxes are contained everywhere.
    pub const fn contains(&self, other: &Self) -> bool {
        other.is_empty()
            || (self.min_x <= other.min_x
                && self.min_y <= other.min_y
                && other.max_x <= self.max_x
                && other.max_y <= self.max_y)
    }

    /// The intersection of two boxes. The result may be empty.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// True if the two boxes share at least one pixel.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Smallest box containing both. Empty inputs are ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Offset the box by `(dx, dy)`.
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Number of pixels covered. Zero for empty boxes.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        u64::from(self.width().unsigned_abs()) * u64::from(self.height().unsigned_abs())
    }
}

/// Pieces of `a` left after removing `b`: at most four disjoint boxes.
///
/// Bands are produced top, bottom, then left and right of the overlap row.
pub(crate) fn subtract_box(a: Aabb, b: Aabb) -> impl Iterator<Item = Aabb> {
    let overlap = a.intersect(&b);
    if overlap.is_empty() {
        return [Some(a), None, None, None].into_iter().flatten();
    }
    let top = (a.min_y < overlap.min_y).then(|| Aabb::new(a.min_x, a.min_y, a.max_x, overlap.min_y));
    let bottom =
        (overlap.max_y < a.max_y).then(|| Aabb::new(a.min_x, overlap.max_y, a.max_x, a.max_y));
    let left = (a.min_x < overlap.min_x)
        .then(|| Aabb::new(a.min_x, overlap.min_y, overlap.min_x, overlap.max_y));
    let right = (overlap.max_x < a.max_x)
        .then(|| Aabb::new(overlap.max_x, overlap.min_y, a.max_x, overlap.max_y));
    [top, bottom, left, right].into_iter().flatten()
}
