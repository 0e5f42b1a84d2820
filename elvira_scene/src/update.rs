// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visibility pass: recompute cached visible regions after a change and work
//! out what has to be redrawn.

use alloc::vec::Vec;

use elvira_region::{Aabb, Region};

use crate::geometry::Rect;
use crate::signal::SceneEvent;
use crate::tree::SceneGeneric;
use crate::types::{NodeId, NodeKind, OutputId};

/// Transient state threaded through one region-update pass.
#[derive(Debug)]
pub(crate) struct SceneUpdateData<'a, R> {
    /// Part of the update region not yet claimed by an opaque node above.
    pub(crate) visible: R,
    /// Absolute region whose visibility is being recomputed.
    pub(crate) update_region: &'a R,
    /// Extents of `update_region`; bounds the traversal.
    pub(crate) update_box: Rect,
    pub(crate) calculate_visibility: bool,
}

impl<'a, R: Region> SceneUpdateData<'a, R> {
    pub(crate) fn new(update_region: &'a R, calculate_visibility: bool) -> Self {
        Self {
            visible: update_region.clone(),
            update_region,
            update_box: Rect::from(update_region.extents()),
            calculate_visibility,
        }
    }
}

impl<R: Region> SceneGeneric<R> {
    /// Whether occlusion culling is active.
    pub fn calculate_visibility(&self) -> bool {
        self.config.calculate_visibility
    }

    /// Turn occlusion culling on or off and recompute every visible region.
    ///
    /// No damage is reported: the pixels on screen do not change, only how much of
    /// each node is considered visible.
    pub fn set_calculate_visibility(&mut self, enabled: bool) {
        if self.config.calculate_visibility == enabled {
            return;
        }
        self.config.calculate_visibility = enabled;
        let root = self.root();
        let origin = self.coords(root);
        let mut everything = R::default();
        self.bounds(root, origin.x, origin.y, &mut everything);
        self.update_region(&everything);
        self.flush_events();
    }

    /// Recompute visibility after a change to `id` and damage the outputs.
    ///
    /// `damage` defaults to the node's current visible region. While the node is
    /// unreachable only explicit damage has any effect: it is assumed the node was
    /// just hidden, so its subtree's visible regions are cleared. `extra` widens
    /// the recomputed area without adding damage.
    pub(crate) fn update_node(&mut self, id: NodeId, damage: Option<R>, extra: Option<&R>) {
        let coords = self.coords(id);
        if !coords.reachable {
            if let Some(damage) = damage {
                self.clear_subtree_visibility(id);
                self.update_region(&damage);
                self.damage_outputs(&damage);
            }
            return;
        }

        let mut damage = damage.unwrap_or_else(|| self.prior_visible(id));
        let mut update_region = damage.clone();
        self.bounds(id, coords.x, coords.y, &mut update_region);
        if let Some(extra) = extra {
            update_region.union(extra);
        }
        // The pass skips nodes without area, so a node that shrank to nothing is
        // clipped here.
        if let Some(node) = self.node_mut(id) {
            let (width, height) = node.size();
            node.visible
                .intersect_rect(Aabb::from(Rect::new(coords.x, coords.y, width, height)));
        }
        self.update_region(&update_region);
        self.update_node_outputs(id, None, None);

        self.compute_visible_region(id, &mut damage);
        self.damage_outputs(&damage);
    }

    /// Region-update pass over `update_region` (absolute coordinates).
    ///
    /// Nodes are visited front to back; each one's visible region is rebuilt from
    /// what the nodes above it left uncovered, and with culling on its opaque
    /// region is then removed before the next (lower) node is visited.
    pub(crate) fn update_region(&mut self, update_region: &R) {
        if update_region.is_empty() {
            return;
        }
        let mut data = SceneUpdateData::new(update_region, self.config.calculate_visibility);

        let mut visits: Vec<(NodeId, i32, i32)> = Vec::new();
        self.for_each_node_in_box(self.root(), data.update_box, |id, lx, ly| {
            visits.push((id, lx, ly));
        });
        tracing::trace!(
            update_box = ?data.update_box,
            visited = visits.len(),
            culling = data.calculate_visibility,
            "region update"
        );

        for (id, lx, ly) in visits {
            self.update_visit(&mut data, id, lx, ly);
        }
    }

    fn update_visit(&mut self, data: &mut SceneUpdateData<'_, R>, id: NodeId, lx: i32, ly: i32) {
        let opaque = data
            .calculate_visibility
            .then(|| self.opaque_region(id, lx, ly));
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let (width, height) = node.size();
        node.visible.subtract(data.update_region);
        node.visible.union(&data.visible);
        node.visible
            .intersect_rect(Aabb::from(Rect::new(lx, ly, width, height)));
        if let Some(opaque) = opaque {
            data.visible.subtract(&opaque);
        }
        self.update_node_outputs(id, None, None);
    }

    /// Clear the cached visibility of a whole subtree that just became unreachable.
    pub(crate) fn clear_subtree_visibility(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.visible.clear();
        let children = node.children.clone();
        for child in children {
            self.clear_subtree_visibility(child);
        }
        self.update_node_outputs(id, None, None);
    }

    /// Recompute which outputs a buffer node is shown on and its primary output.
    ///
    /// The primary output is the one overlapping the most of the node's visible
    /// region (ties go to the later output). `ignore` is treated as absent, which is
    /// how buffers leave an output that is being destroyed. Enter and leave events
    /// are queued first, then an outputs-update event unless nothing changed and
    /// `force` is already among the active outputs.
    pub(crate) fn update_node_outputs(
        &mut self,
        id: NodeId,
        ignore: Option<OutputId>,
        force: Option<OutputId>,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        let NodeKind::Buffer(buffer) = &node.kind else {
            return;
        };
        let old_active = buffer.active_outputs;
        let old_primary = buffer.primary_output;

        let mut largest_overlap = 0_u64;
        let mut primary = None;
        let mut active = 0_u64;
        for output in &self.outputs {
            if Some(output.id()) == ignore || !output.device().is_enabled() {
                continue;
            }
            let mut overlap = node.visible.clone();
            overlap.intersect_rect(Aabb::from(output.layout_box()));
            if overlap.is_empty() {
                continue;
            }
            let area = overlap.area();
            if area >= largest_overlap {
                largest_overlap = area;
                primary = Some(output.id());
            }
            active |= output.id().bit();
        }

        let mut events = Vec::new();
        let mut now_on = Vec::new();
        for output in &self.outputs {
            let bit = output.id().bit();
            let (is_on, was_on) = (active & bit != 0, old_active & bit != 0);
            if is_on {
                now_on.push(output.id());
            }
            if is_on && !was_on {
                events.push(SceneEvent::OutputEnter {
                    node: id,
                    output: output.id(),
                });
            } else if !is_on && was_on {
                events.push(SceneEvent::OutputLeave {
                    node: id,
                    output: output.id(),
                });
            }
        }
        debug_assert!(
            active == 0 || primary.is_some(),
            "active outputs without a primary output"
        );

        if let Some(NodeKind::Buffer(buffer)) = self.node_mut(id).map(|n| &mut n.kind) {
            buffer.active_outputs = active;
            buffer.primary_output = primary;
        }
        for event in events {
            self.queue_event(event);
        }

        let forced = force.is_some_and(|f| active & f.bit() != 0);
        if old_active == active && old_primary == primary && !forced {
            return;
        }
        self.queue_event(SceneEvent::OutputsUpdate {
            node: id,
            outputs: now_on,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use elvira_region::{Aabb, RectRegion, Region};

    use crate::{Scene, SceneConfig};

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    const GHOST: [f32; 4] = [0.0, 0.0, 0.25, 0.5];

    fn rect_at(scene: &mut Scene, x: i32, y: i32, w: i32, h: i32, color: [f32; 4]) -> crate::NodeId {
        let id = scene.create_rect(scene.root(), w, h, color);
        scene.set_position(id, x, y);
        scene.set_enabled(id, true);
        id
    }

    fn region(x: i32, y: i32, w: i32, h: i32) -> RectRegion {
        RectRegion::from_rect(Aabb::from_xywh(x, y, w, h))
    }

    #[test]
    fn l_shape_under_opaque_sibling() {
        let mut scene = Scene::new();
        let r1 = rect_at(&mut scene, 0, 0, 100, 100, RED);
        let r2 = rect_at(&mut scene, 50, 50, 100, 100, BLUE);

        let v1 = scene.visible_region(r1).cloned().unwrap_or_default();
        let mut expected = region(0, 0, 100, 100);
        expected.subtract_rect(Aabb::from_xywh(50, 50, 50, 50));
        assert_eq!(v1, expected);
        assert_eq!(v1.area(), 7_500);
        assert_eq!(scene.visible_region(r2), Some(&region(50, 50, 100, 100)));
    }

    #[test]
    fn translucent_nodes_do_not_occlude() {
        let mut scene = Scene::new();
        let below = rect_at(&mut scene, 0, 0, 100, 100, RED);
        let _ghost = rect_at(&mut scene, 0, 0, 100, 100, GHOST);
        assert_eq!(scene.visible_region(below), Some(&region(0, 0, 100, 100)));
    }

    #[test]
    fn culling_flag_controls_occlusion() {
        let mut scene = Scene::with_config(SceneConfig::default().with_calculate_visibility(false));
        let b = rect_at(&mut scene, 0, 0, 100, 100, RED);
        let _a = rect_at(&mut scene, 50, 50, 100, 100, BLUE);
        assert_eq!(scene.visible_region(b), Some(&region(0, 0, 100, 100)));

        scene.set_calculate_visibility(true);
        assert_eq!(scene.visible_region(b).map(Region::area), Some(7_500));

        scene.set_calculate_visibility(false);
        assert_eq!(scene.visible_region(b).map(Region::area), Some(10_000));
    }

    #[test]
    fn disabling_an_ancestor_empties_and_restores() {
        let mut scene = Scene::new();
        let root = scene.root();
        let t = scene.create_tree(root);
        scene.set_enabled(t, true);
        let n = scene.create_rect(t, 20, 20, RED);
        scene.set_enabled(n, true);
        let before = scene.visible_region(n).cloned().unwrap_or_default();
        assert_eq!(before.area(), 400);

        scene.set_enabled(t, false);
        assert!(scene.visible_region(n).is_some_and(Region::is_empty));
        assert!(scene.is_enabled(n), "child flag is untouched");

        scene.set_enabled(t, true);
        assert_eq!(scene.visible_region(n), Some(&before));
    }

    #[test]
    fn moving_the_top_node_uncovers_the_one_below() {
        let mut scene = Scene::new();
        let below = rect_at(&mut scene, 0, 0, 100, 100, RED);
        let top = rect_at(&mut scene, 0, 0, 100, 100, BLUE);
        assert!(scene.visible_region(below).is_some_and(Region::is_empty));

        scene.set_position(top, 200, 0);
        assert_eq!(scene.visible_region(below), Some(&region(0, 0, 100, 100)));
        assert_eq!(scene.visible_region(top), Some(&region(200, 0, 100, 100)));
    }

    #[test]
    fn restacking_swaps_occlusion() {
        let mut scene = Scene::new();
        let a = rect_at(&mut scene, 0, 0, 100, 100, RED);
        let b = rect_at(&mut scene, 50, 0, 100, 100, BLUE);
        assert_eq!(scene.visible_region(a).map(Region::area), Some(5_000));

        scene.move_to_top(a);
        assert_eq!(scene.visible_region(a).map(Region::area), Some(10_000));
        assert_eq!(scene.visible_region(b), Some(&region(100, 0, 50, 100)));

        scene.place_below(a, b);
        assert_eq!(scene.visible_region(a).map(Region::area), Some(5_000));
        assert_eq!(scene.visible_region(b).map(Region::area), Some(10_000));
    }

    #[test]
    fn nested_trees_offset_children() {
        let mut scene = Scene::new();
        let outer = scene.create_tree(scene.root());
        scene.set_enabled(outer, true);
        scene.set_position(outer, 10, 20);
        let inner = scene.create_tree(outer);
        scene.set_enabled(inner, true);
        scene.set_position(inner, 5, 5);
        let leaf = scene.create_rect(inner, 10, 10, RED);
        scene.set_enabled(leaf, true);
        assert_eq!(scene.visible_region(leaf), Some(&region(15, 25, 10, 10)));
        let mut all = RectRegion::new();
        scene.compute_visible_region(outer, &mut all);
        assert_eq!(all, region(15, 25, 10, 10));
    }

    #[test]
    fn buffer_opaque_region_occludes_partially() {
        use crate::Buffer;
        struct Argb;
        impl Buffer for Argb {
            fn width(&self) -> i32 {
                100
            }
            fn height(&self) -> i32 {
                100
            }
        }
        let mut scene = Scene::new();
        let below = rect_at(&mut scene, 0, 0, 100, 100, RED);
        let b = scene.create_buffer(scene.root(), Some(Rc::new(Argb)));
        scene.set_enabled(b, true);
        assert_eq!(
            scene.visible_region(below).map(Region::area),
            Some(10_000),
            "alpha buffers hide nothing by default"
        );
        scene.set_opaque_region(b, region(0, 0, 100, 40));
        assert_eq!(scene.visible_region(below), Some(&region(0, 40, 100, 60)));
        assert_eq!(scene.opaque_region(b, 10, 10), region(10, 10, 100, 40));
    }
}
