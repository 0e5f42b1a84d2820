// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The region capability consumed by the scene graph.

use core::fmt::Debug;

use crate::types::Aabb;

/// A set of pixels described by disjoint integer boxes.
///
/// Every operation is total over well-formed inputs; empty regions are an ordinary state.
/// Implementations are free to pick their own internal representation (banded
/// rectangles, a flat list, a bitmap), but must keep [`Region::rects`] disjoint.
pub trait Region: Clone + Default + Debug + 'static {
    /// Region covering exactly `rect` (empty if `rect` is empty).
    fn from_rect(rect: Aabb) -> Self;

    /// Iterate the disjoint boxes making up the region, in unspecified order.
    fn rects(&self) -> impl Iterator<Item = Aabb> + '_;

    /// Number of boxes in [`Region::rects`].
    fn rect_count(&self) -> usize {
        self.rects().count()
    }

    /// `self ∪= other`
    fn union(&mut self, other: &Self);

    /// `self ∪= rect`
    fn union_rect(&mut self, rect: Aabb);

    /// `self −= other`
    fn subtract(&mut self, other: &Self);

    /// `self −= rect`
    fn subtract_rect(&mut self, rect: Aabb);

    /// `self ∩= other`
    fn intersect(&mut self, other: &Self);

    /// `self ∩= rect`
    fn intersect_rect(&mut self, rect: Aabb);

    /// Offset every box by `(dx, dy)`.
    fn translate(&mut self, dx: i32, dy: i32);

    /// Scale every box about the origin.
    ///
    /// With `round_up` each scaled box is rounded outward (floor of the minimum
    /// corner, ceiling of the maximum corner) so the result always covers the exact
    /// scaled area; otherwise corners are rounded to the nearest integer.
    fn scale(&mut self, factor: f64, round_up: bool);

    /// Grow every box by `distance` on all four sides.
    fn expand(&mut self, distance: i32);

    /// Bounding box of the region, [`Aabb::ZERO`] when empty.
    fn extents(&self) -> Aabb;

    /// True if the region covers no pixels.
    fn is_empty(&self) -> bool;

    /// Number of pixels covered.
    fn area(&self) -> u64;

    /// Remove every box.
    fn clear(&mut self);

    /// Whether the pixel at `(x, y)` is covered.
    fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects().any(|r| r.contains_point(x, y))
    }

    /// Set equality: both regions cover exactly the same pixels.
    ///
    /// Box decomposition may differ between equal regions, so this compares coverage.
    fn same_as(&self, other: &Self) -> bool {
        if self.area() != other.area() {
            return false;
        }
        let mut rest = self.clone();
        rest.subtract(other);
        rest.is_empty()
    }
}
