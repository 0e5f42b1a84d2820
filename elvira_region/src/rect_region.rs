// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat list backend: disjoint boxes in a vector, linear algorithms. Small and simple.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::region::Region;
use crate::types::{Aabb, subtract_box};

/// Region stored as a flat vector of disjoint, non-empty boxes.
///
/// Operations are quadratic in the number of boxes, which stays small for the
/// window-sized rectangles a compositor deals with. Adjacent boxes sharing a full
/// edge are merged after every mutation to keep the list short.
#[derive(Clone, Default)]
pub struct RectRegion {
    rects: Vec<Aabb>,
}

impl Debug for RectRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RectRegion")
            .field("extents", &self.extents())
            .field("rects", &self.rects)
            .finish()
    }
}

impl PartialEq for RectRegion {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for RectRegion {}

impl From<Aabb> for RectRegion {
    fn from(rect: Aabb) -> Self {
        Self::from_rect(rect)
    }
}

impl FromIterator<Aabb> for RectRegion {
    fn from_iter<I: IntoIterator<Item = Aabb>>(iter: I) -> Self {
        let mut region = Self::default();
        for rect in iter {
            region.union_rect(rect);
        }
        region
    }
}

impl RectRegion {
    /// Create an empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the underlying boxes.
    pub fn as_slice(&self) -> &[Aabb] {
        &self.rects
    }

    /// Rebuild from possibly-overlapping boxes.
    fn rebuild(&mut self, boxes: Vec<Aabb>) {
        self.rects.clear();
        for b in boxes {
            self.insert_disjoint(b);
        }
        self.coalesce();
    }

    /// Add the part of `rect` not already covered. Does not coalesce.
    fn insert_disjoint(&mut self, rect: Aabb) {
        if rect.is_empty() {
            return;
        }
        let mut pieces: Vec<Aabb> = Vec::with_capacity(4);
        pieces.push(rect);
        for existing in &self.rects {
            if pieces.is_empty() {
                break;
            }
            if !existing.overlaps(&rect) {
                continue;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|p| subtract_box(p, *existing))
                .collect();
        }
        self.rects.extend(pieces);
    }

    /// Merge boxes that share a full edge until no pair does.
    fn coalesce(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            let mut i = 0;
            while i < self.rects.len() {
                let mut j = i + 1;
                while j < self.rects.len() {
                    if let Some(m) = merge_adjacent(self.rects[i], self.rects[j]) {
                        self.rects[i] = m;
                        self.rects.swap_remove(j);
                        merged = true;
                    } else {
                        j += 1;
                    }
                }
                i += 1;
            }
        }
    }
}

fn merge_adjacent(a: Aabb, b: Aabb) -> Option<Aabb> {
    let same_rows = a.min_y == b.min_y && a.max_y == b.max_y;
    let same_cols = a.min_x == b.min_x && a.max_x == b.max_x;
    if same_rows && (a.max_x == b.min_x || b.max_x == a.min_x) {
        return Some(a.union(&b));
    }
    if same_cols && (a.max_y == b.min_y || b.max_y == a.min_y) {
        return Some(a.union(&b));
    }
    None
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Scaled coordinates are rounded first; out-of-range values saturate."
)]
fn scale_box(rect: Aabb, factor: f64, round_up: bool) -> Aabb {
    let scaled = kurbo::Rect::new(
        f64::from(rect.min_x),
        f64::from(rect.min_y),
        f64::from(rect.max_x),
        f64::from(rect.max_y),
    )
    .scale_from_origin(factor);
    let r = if round_up {
        scaled.expand()
    } else {
        scaled.round()
    };
    Aabb::new(r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
}

impl Region for RectRegion {
    fn from_rect(rect: Aabb) -> Self {
        let mut region = Self::default();
        if !rect.is_empty() {
            region.rects.push(rect);
        }
        region
    }

    fn rects(&self) -> impl Iterator<Item = Aabb> + '_ {
        self.rects.iter().copied()
    }

    fn rect_count(&self) -> usize {
        self.rects.len()
    }

    fn union(&mut self, other: &Self) {
        if other.rects.is_empty() {
            return;
        }
        if self.rects.is_empty() {
            self.rects.clone_from(&other.rects);
            return;
        }
        for &rect in &other.rects {
            self.insert_disjoint(rect);
        }
        self.coalesce();
    }

    fn union_rect(&mut self, rect: Aabb) {
        self.insert_disjoint(rect);
        self.coalesce();
    }

    fn subtract(&mut self, other: &Self) {
        for &rect in &other.rects {
            if self.rects.is_empty() {
                return;
            }
            self.subtract_rect(rect);
        }
    }

    fn subtract_rect(&mut self, rect: Aabb) {
        if rect.is_empty() || !self.rects.iter().any(|r| r.overlaps(&rect)) {
            return;
        }
        let remaining: Vec<Aabb> = self
            .rects
            .iter()
            .flat_map(|&r| subtract_box(r, rect))
            .collect();
        self.rects = remaining;
        self.coalesce();
    }

    fn intersect(&mut self, other: &Self) {
        let mut out = Vec::new();
        for a in &self.rects {
            for b in &other.rects {
                let i = a.intersect(b);
                if !i.is_empty() {
                    out.push(i);
                }
            }
        }
        self.rects = out;
        self.coalesce();
    }

    fn intersect_rect(&mut self, rect: Aabb) {
        self.rects = self
            .rects
            .iter()
            .map(|r| r.intersect(&rect))
            .filter(|r| !r.is_empty())
            .collect();
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        for r in &mut self.rects {
            *r = r.translate(dx, dy);
        }
    }

    fn scale(&mut self, factor: f64, round_up: bool) {
        debug_assert!(
            factor.is_finite() && factor > 0.0,
            "region scale factor must be finite and positive"
        );
        if factor == 1.0 || self.rects.is_empty() {
            return;
        }
        // Outward rounding can make neighbouring boxes overlap.
        let boxes: Vec<Aabb> = self
            .rects
            .iter()
            .map(|&r| scale_box(r, factor, round_up))
            .collect();
        self.rebuild(boxes);
    }

    fn expand(&mut self, distance: i32) {
        debug_assert!(distance >= 0, "region expansion must be non-negative");
        if distance <= 0 || self.rects.is_empty() {
            return;
        }
        let boxes: Vec<Aabb> = self
            .rects
            .iter()
            .map(|r| {
                Aabb::new(
                    r.min_x - distance,
                    r.min_y - distance,
                    r.max_x + distance,
                    r.max_y + distance,
                )
            })
            .collect();
        self.rebuild(boxes);
    }

    fn extents(&self) -> Aabb {
        let mut it = self.rects.iter().copied();
        let Some(first) = it.next() else {
            return Aabb::ZERO;
        };
        it.fold(first, |acc, r| acc.union(&r))
    }

    fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    fn area(&self) -> u64 {
        self.rects.iter().map(Aabb::area).sum()
    }

    fn clear(&mut self) {
        self.rects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(boxes: &[(i32, i32, i32, i32)]) -> RectRegion {
        boxes
            .iter()
            .map(|&(x, y, w, h)| Aabb::from_xywh(x, y, w, h))
            .collect()
    }

    fn assert_disjoint(r: &RectRegion) {
        let rects = r.as_slice();
        for (i, a) in rects.iter().enumerate() {
            assert!(!a.is_empty(), "stored box {a:?} is empty");
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn union_of_overlapping_boxes_counts_pixels_once() {
        let r = region(&[(0, 0, 100, 100), (50, 50, 100, 100)]);
        assert_eq!(r.area(), 10_000 + 10_000 - 2_500);
        assert_eq!(r.extents(), Aabb::new(0, 0, 150, 150));
        assert_disjoint(&r);
    }

    #[test]
    fn subtract_leaves_l_shape() {
        let mut r = RectRegion::from_rect(Aabb::from_xywh(0, 0, 100, 100));
        r.subtract_rect(Aabb::from_xywh(50, 50, 100, 100));
        assert_eq!(r.area(), 7_500);
        assert!(r.contains_point(10, 90));
        assert!(r.contains_point(90, 10));
        assert!(!r.contains_point(75, 75));
        assert_disjoint(&r);
    }

    #[test]
    fn intersect_regions() {
        let mut a = region(&[(0, 0, 10, 10), (20, 0, 10, 10)]);
        let b = RectRegion::from_rect(Aabb::new(5, 0, 25, 5));
        a.intersect(&b);
        assert_eq!(a.area(), 5 * 5 + 5 * 5);
        assert_eq!(a.extents(), Aabb::new(5, 0, 25, 5));
    }

    #[test]
    fn adjacent_boxes_coalesce() {
        let r = region(&[(0, 0, 10, 10), (10, 0, 10, 10), (0, 10, 20, 10)]);
        assert_eq!(r.rect_count(), 1);
        assert_eq!(r.extents(), Aabb::new(0, 0, 20, 20));
    }

    #[test]
    fn fractional_scale_rounds_outward() {
        let mut r = RectRegion::from_rect(Aabb::new(1, 1, 3, 3));
        r.scale(1.5, true);
        // 1.5 → 1, 4.5 → 5
        assert_eq!(r.extents(), Aabb::new(1, 1, 5, 5));

        let mut n = RectRegion::from_rect(Aabb::new(1, 1, 3, 3));
        n.scale(1.5, false);
        assert_eq!(n.extents(), Aabb::new(2, 2, 5, 5));
    }

    #[test]
    fn scaling_adjacent_boxes_stays_disjoint() {
        let mut r = region(&[(0, 0, 1, 3), (1, 0, 1, 1)]);
        r.scale(1.5, true);
        assert_disjoint(&r);
        assert!(r.contains_point(2, 0));
    }

    #[test]
    fn expand_grows_every_side() {
        let mut r = RectRegion::from_rect(Aabb::new(0, 0, 15, 15));
        r.expand(1);
        assert_eq!(r.extents(), Aabb::new(-1, -1, 16, 16));
    }

    #[test]
    fn equality_ignores_decomposition() {
        let a = region(&[(0, 0, 10, 20)]);
        let b = region(&[(0, 0, 10, 5), (0, 5, 10, 15)]);
        assert_eq!(a, b);
        assert_ne!(a, region(&[(0, 0, 10, 19)]));
    }

    #[test]
    fn empty_region_extents() {
        let mut r = RectRegion::new();
        assert!(r.is_empty());
        assert_eq!(r.extents(), Aabb::ZERO);
        r.union_rect(Aabb::new(3, 3, 3, 10));
        assert!(r.is_empty());
    }
}
