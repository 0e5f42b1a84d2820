// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elvira Region: integer region algebra for visibility and damage tracking.
//!
//! A region is a set of pixels described by disjoint half-open boxes ([`Aabb`]).
//! The scene graph never looks inside a region; it only needs the capability
//! described by the [`Region`] trait:
//!
//! - Union, subtract and intersect with another region or a single box.
//! - Translate, scale (with outward rounding for fractional scales) and expand.
//! - Extents, emptiness and area queries.
//!
//! Backends are pluggable through the trait so a compositor can swap in a banded
//! implementation (or bindings to a native one) without touching scene code.
//! [`RectRegion`], a flat vector of disjoint boxes, is the default.
//!
//! # Example
//!
//! ```rust
//! use elvira_region::{Aabb, RectRegion, Region};
//!
//! let mut visible = RectRegion::from_rect(Aabb::from_xywh(0, 0, 100, 100));
//! visible.subtract_rect(Aabb::from_xywh(50, 50, 100, 100));
//!
//! assert_eq!(visible.area(), 7_500);
//! assert_eq!(visible.extents(), Aabb::new(0, 0, 100, 100));
//! assert!(!visible.contains_point(75, 75));
//! ```
//!
//! Fractional scales round outward so the scaled region never under-covers:
//!
//! ```rust
//! use elvira_region::{Aabb, RectRegion, Region};
//!
//! let mut damage = RectRegion::from_rect(Aabb::from_xywh(0, 0, 10, 10));
//! damage.scale(1.5, true);
//! assert!(damage.extents().contains(&Aabb::new(0, 0, 15, 15)));
//! ```

#![no_std]

extern crate alloc;

pub mod rect_region;
pub mod region;
pub mod types;

pub use rect_region::RectRegion;
pub use region::Region;
pub use types::Aabb;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_code_sees_only_the_trait() {
        fn covered<R: Region>(boxes: &[Aabb]) -> u64 {
            let mut r = R::default();
            for b in boxes {
                r.union_rect(*b);
            }
            r.area()
        }
        let boxes = [Aabb::new(0, 0, 4, 4), Aabb::new(2, 2, 6, 6)];
        assert_eq!(covered::<RectRegion>(&boxes), 16 + 16 - 4);
    }

    #[test]
    fn same_as_compares_coverage() {
        let mut a = RectRegion::from_rect(Aabb::new(0, 0, 10, 10));
        let b = a.clone();
        assert!(a.same_as(&b));
        a.subtract_rect(Aabb::new(0, 0, 1, 1));
        assert!(!a.same_as(&b));
    }
}
