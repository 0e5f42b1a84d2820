// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: node arena, structure, queries.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;

use elvira_region::{Aabb, RectRegion, Region};

use crate::config::SceneConfig;
use crate::geometry::Rect;
use crate::output::{OutputSlot, SceneOutput};
use crate::signal::{ListenTarget, Listeners, SceneEvent};
use crate::types::{Buffer, Coords, NodeId, NodeKind, SceneBuffer, SceneRect};

/// A scene using the default [`RectRegion`] backend.
pub type Scene = SceneGeneric<RectRegion>;

impl<R: Region> Default for SceneGeneric<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Retained-mode scene graph, generic over the region backend.
///
/// Owns every node (in a generational arena), the outputs, the listener registry
/// and the configuration. Every structural or content change immediately
/// recomputes the visible regions it can affect and queues the resulting damage on
/// each output.
pub struct SceneGeneric<R: Region> {
    nodes: Vec<Option<Node<R>>>, // slots
    generations: Vec<u32>,       // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: NodeId,
    pub(crate) outputs: Vec<SceneOutput<R>>,
    pub(crate) output_slots: Vec<OutputSlot>,
    pub(crate) output_free: Vec<usize>,
    pub(crate) listeners: Listeners<R>,
    pub(crate) pending_events: Vec<SceneEvent>,
    pub(crate) config: SceneConfig,
}

impl<R: Region> core::fmt::Debug for SceneGeneric<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("SceneGeneric")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("root", &self.root)
            .field("outputs", &self.outputs)
            .field("listeners", &self.listeners)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Node<R> {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    /// Stacking order, bottom first.
    pub(crate) children: Vec<NodeId>,
    pub(crate) enabled: bool,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) kind: NodeKind<R>,
    /// Absolute, unoccluded footprint; empty while unreachable.
    pub(crate) visible: R,
    data: Option<Box<dyn Any>>,
}

impl<R: Region> Node<R> {
    fn new(generation: u32, parent: Option<NodeId>, kind: NodeKind<R>) -> Self {
        Self {
            generation,
            parent,
            children: Vec::new(),
            enabled: false,
            x: 0,
            y: 0,
            kind,
            visible: R::default(),
            data: None,
        }
    }

    pub(crate) fn size(&self) -> (i32, i32) {
        match &self.kind {
            NodeKind::Tree => (0, 0),
            NodeKind::Rect(rect) => (rect.width, rect.height),
            NodeKind::Buffer(buffer) => buffer.size(),
        }
    }
}

impl<R: Region> SceneGeneric<R> {
    /// Create a scene with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene holding only an enabled root tree.
    pub fn with_config(config: SceneConfig) -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
            outputs: Vec::new(),
            output_slots: Vec::new(),
            output_free: Vec::new(),
            listeners: Listeners::default(),
            pending_events: Vec::new(),
            config,
        };
        let root = scene.alloc(None, NodeKind::Tree);
        if let Some(node) = scene.node_mut(root) {
            node.enabled = true;
        }
        scene.root = root;
        scene
    }

    /// The scene's configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The root tree. It is enabled at construction and cannot be destroyed.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    // --- creation and teardown ---

    /// Create an empty container as the topmost child of `parent`.
    pub fn create_tree(&mut self, parent: NodeId) -> NodeId {
        self.create(parent, NodeKind::Tree, "create_tree")
    }

    /// Create a solid color rectangle as the topmost child of `parent`.
    ///
    /// `color` is premultiplied RGBA; the rect hides what is below it when alpha is one.
    pub fn create_rect(
        &mut self,
        parent: NodeId,
        width: i32,
        height: i32,
        color: [f32; 4],
    ) -> NodeId {
        let kind = NodeKind::Rect(SceneRect {
            width,
            height,
            color,
        });
        self.create(parent, kind, "create_rect")
    }

    /// Create a buffer node as the topmost child of `parent`.
    pub fn create_buffer(&mut self, parent: NodeId, buffer: Option<Rc<dyn Buffer>>) -> NodeId {
        let kind = NodeKind::Buffer(SceneBuffer {
            buffer,
            dest_size: None,
            opaque_region: R::default(),
            active_outputs: 0,
            primary_output: None,
        });
        self.create(parent, kind, "create_buffer")
    }

    /// New nodes start disabled, so creation never changes what is on screen.
    fn create(&mut self, parent: NodeId, kind: NodeKind<R>, op: &'static str) -> NodeId {
        let parent = if self.live(parent, op) {
            parent
        } else {
            self.root
        };
        let id = self.alloc(Some(parent), kind);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        tracing::debug!(node = ?id, parent = ?parent, "{op}");
        id
    }

    fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind<R>) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, parent, kind));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, parent, kind)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Destroy a node and its whole subtree.
    ///
    /// Listeners first receive [`SceneEvent::NodeDestroy`] while the node is intact
    /// and may still rearrange the graph. The node is then disabled (damaging
    /// whatever it covered), buffer nodes leave their outputs, children are destroyed
    /// recursively, and finally the node is unlinked and its listeners dropped.
    pub fn destroy(&mut self, id: NodeId) {
        if !self.live(id, "destroy") {
            return;
        }
        debug_assert_ne!(id, self.root, "destroy: the root cannot be destroyed");
        if id == self.root {
            tracing::warn!("destroy: refusing to destroy the root");
            return;
        }
        self.destroy_node(id);
        self.flush_events();
    }

    fn destroy_node(&mut self, id: NodeId) {
        self.emit(&SceneEvent::NodeDestroy { node: id });
        if !self.is_alive(id) {
            return;
        }
        self.apply_enabled(id, false);
        // Output-leave events are delivered while the node can still be inspected.
        self.flush_events();
        if !self.is_alive(id) {
            return;
        }

        let children = self.children(id).to_vec();
        for child in children {
            if self.is_alive(child) && self.parent(child) == Some(id) {
                self.destroy_node(child);
            }
        }
        if !self.is_alive(id) {
            return;
        }

        self.unlink(id);
        self.listeners.remove_target(ListenTarget::Node(id));
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
        tracing::debug!(node = ?id, "destroyed node");
    }

    // --- structure ---

    /// Enable or disable a node. Disabling hides the whole subtree without touching
    /// the children's own flags.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if !self.live(id, "set_enabled") {
            return;
        }
        self.apply_enabled(id, enabled);
        self.flush_events();
    }

    fn apply_enabled(&mut self, id: NodeId, enabled: bool) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.enabled == enabled {
            return;
        }
        let prior = self.prior_visible(id);
        if let Some(node) = self.node_mut(id) {
            node.enabled = enabled;
        }
        self.update_node(id, Some(prior), None);
    }

    /// Move a node relative to its parent. Both the old and the new footprint are damaged.
    pub fn set_position(&mut self, id: NodeId, x: i32, y: i32) {
        if !self.live(id, "set_position") {
            return;
        }
        if self.node(id).is_some_and(|n| n.x == x && n.y == y) {
            return;
        }
        let prior = self.prior_visible(id);
        if let Some(node) = self.node_mut(id) {
            node.x = x;
            node.y = y;
        }
        self.update_node(id, Some(prior), None);
        self.flush_events();
    }

    /// Stack `id` directly above `sibling`.
    pub fn place_above(&mut self, id: NodeId, sibling: NodeId) {
        if !self.check_siblings(id, sibling, "place_above") {
            return;
        }
        self.restack(id, "place_above", |children| {
            children.iter().position(|&c| c == sibling).map(|i| i + 1)
        });
    }

    /// Stack `id` directly below `sibling`.
    pub fn place_below(&mut self, id: NodeId, sibling: NodeId) {
        if !self.check_siblings(id, sibling, "place_below") {
            return;
        }
        self.restack(id, "place_below", |children| {
            children.iter().position(|&c| c == sibling)
        });
    }

    /// Stack `id` above all of its siblings.
    pub fn move_to_top(&mut self, id: NodeId) {
        self.restack(id, "move_to_top", |children| Some(children.len()));
    }

    /// Stack `id` below all of its siblings.
    pub fn move_to_bottom(&mut self, id: NodeId) {
        self.restack(id, "move_to_bottom", |_| Some(0));
    }

    fn check_siblings(&self, id: NodeId, sibling: NodeId, op: &'static str) -> bool {
        if !self.live(id, op) || !self.live(sibling, op) {
            return false;
        }
        let ok = id != sibling && self.parent(id).is_some() && self.parent(id) == self.parent(sibling);
        debug_assert!(ok, "{op}: {id:?} and {sibling:?} are not distinct siblings");
        if !ok {
            tracing::warn!(node = ?id, sibling = ?sibling, "{op}: not distinct siblings, ignored");
        }
        ok
    }

    /// Move `id` within its parent's children to the index chosen by `place`, which
    /// sees the children with `id` already removed.
    fn restack(
        &mut self,
        id: NodeId,
        op: &'static str,
        place: impl FnOnce(&[NodeId]) -> Option<usize>,
    ) {
        if !self.live(id, op) {
            return;
        }
        let Some(parent) = self.parent(id) else {
            tracing::warn!(node = ?id, "{op}: the root has no siblings");
            return;
        };
        let prior = self.prior_visible(id);
        let Some(p) = self.node_mut(parent) else {
            return;
        };
        let Some(from) = p.children.iter().position(|&c| c == id) else {
            return;
        };
        p.children.remove(from);
        let Some(to) = place(&p.children) else {
            p.children.insert(from, id);
            return;
        };
        p.children.insert(to, id);
        if to == from {
            return;
        }
        let crossed: Vec<NodeId> = if to > from {
            p.children[from..to].to_vec()
        } else {
            p.children[to + 1..=from].to_vec()
        };

        // Visibility can only change where the node overlaps the siblings it crossed.
        let origin = self.coords(parent);
        let mut extra = R::default();
        for sibling in crossed {
            if let Some(n) = self.node(sibling) {
                let (sx, sy) = (origin.x.saturating_add(n.x), origin.y.saturating_add(n.y));
                self.bounds(sibling, sx, sy, &mut extra);
            }
        }
        self.update_node(id, Some(prior), Some(&extra));
        self.flush_events();
    }

    /// Move `id` under `new_parent` as its topmost child.
    ///
    /// Reparenting the root, or moving a node under itself or one of its
    /// descendants, is rejected.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) {
        if !self.live(id, "reparent") || !self.live(new_parent, "reparent") {
            return;
        }
        if self.parent(id) == Some(new_parent) {
            return;
        }
        let mut cursor = Some(new_parent);
        let mut cycle = id == self.root;
        while let Some(c) = cursor {
            if c == id {
                cycle = true;
                break;
            }
            cursor = self.parent(c);
        }
        debug_assert!(!cycle, "reparent: {id:?} under {new_parent:?} would form a cycle");
        if cycle {
            tracing::warn!(node = ?id, parent = ?new_parent, "reparent: cycle rejected");
            return;
        }

        let prior = self.prior_visible(id);
        self.unlink(id);
        if let Some(p) = self.node_mut(new_parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(new_parent);
        }
        self.update_node(id, Some(prior), None);
        self.flush_events();
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.node_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
    }

    // --- user payload ---

    /// Attach an arbitrary payload to a node, replacing any previous one.
    pub fn set_data<T: Any>(&mut self, id: NodeId, value: T) {
        if !self.live(id, "set_data") {
            return;
        }
        if let Some(n) = self.node_mut(id) {
            n.data = Some(Box::new(value));
        }
    }

    /// Borrow the node's payload if it is a `T`.
    pub fn data<T: Any>(&self, id: NodeId) -> Option<&T> {
        self.node(id)?.data.as_ref()?.downcast_ref()
    }

    /// Mutably borrow the node's payload if it is a `T`.
    pub fn data_mut<T: Any>(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id)?.data.as_mut()?.downcast_mut()
    }

    /// Detach and return the node's payload.
    pub fn take_data(&mut self, id: NodeId) -> Option<Box<dyn Any>> {
        self.node_mut(id)?.data.take()
    }

    // --- queries ---

    /// Parent of a node; `None` for the root and for stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children in stacking order, bottom first.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// The node's variant payload.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind<R>> {
        Some(&self.node(id)?.kind)
    }

    /// Position relative to the parent.
    pub fn position(&self, id: NodeId) -> Option<(i32, i32)> {
        self.node(id).map(|n| (n.x, n.y))
    }

    /// The node's own enabled flag (ancestors are not consulted).
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.enabled)
    }

    /// Cached absolute visible region of a node.
    pub fn visible_region(&self, id: NodeId) -> Option<&R> {
        self.node(id).map(|n| &n.visible)
    }

    /// Intrinsic size: `(0, 0)` for trees, the fixed size for rects, and the
    /// destination size (or else the buffer size) for buffers.
    pub fn size(&self, id: NodeId) -> (i32, i32) {
        self.node(id).map(Node::size).unwrap_or((0, 0))
    }

    /// Absolute position and reachability.
    ///
    /// `x` and `y` sum the positions of the node and all of its ancestors,
    /// saturating at the `i32` range; `reachable` holds iff all of them are enabled.
    pub fn coords(&self, id: NodeId) -> Coords {
        if !self.is_alive(id) {
            return Coords::default();
        }
        let mut coords = Coords {
            x: 0,
            y: 0,
            reachable: true,
        };
        let mut cursor = Some(id);
        while let Some(node) = cursor.and_then(|c| self.node(c)) {
            coords.x = coords.x.saturating_add(node.x);
            coords.y = coords.y.saturating_add(node.y);
            coords.reachable &= node.enabled;
            cursor = node.parent;
        }
        coords
    }

    /// Union into `acc` the box of the node placed at `(x, y)` and the boxes of
    /// every enabled descendant. Disabled subtrees contribute nothing.
    pub fn bounds(&self, id: NodeId, x: i32, y: i32, acc: &mut R) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        for &child in &node.children {
            if let Some(c) = self.node(child) {
                self.bounds(child, x.saturating_add(c.x), y.saturating_add(c.y), acc);
            }
        }
        let (width, height) = node.size();
        acc.union_rect(Aabb::from(Rect::new(x, y, width, height)));
    }

    /// Union into `acc` the cached visible regions of the node and every enabled
    /// descendant. Disabled subtrees contribute nothing.
    pub fn compute_visible_region(&self, id: NodeId, acc: &mut R) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        for &child in &node.children {
            self.compute_visible_region(child, acc);
        }
        acc.union(&node.visible);
    }

    /// Absolute region the node paints fully opaque when placed at `(x, y)`.
    pub fn opaque_region(&self, id: NodeId, x: i32, y: i32) -> R {
        let Some(node) = self.node(id) else {
            return R::default();
        };
        let (width, height) = node.size();
        let whole = Aabb::from(Rect::new(x, y, width, height));
        match &node.kind {
            NodeKind::Tree => R::default(),
            NodeKind::Rect(rect) if rect.is_opaque() => R::from_rect(whole),
            NodeKind::Rect(_) => R::default(),
            NodeKind::Buffer(buffer) => match &buffer.buffer {
                None => R::default(),
                Some(b) if b.is_opaque() => R::from_rect(whole),
                Some(_) => {
                    let mut opaque = buffer.opaque_region.clone();
                    opaque.intersect_rect(Aabb::from(Rect::new(0, 0, width, height)));
                    opaque.translate(x, y);
                    opaque
                }
            },
        }
    }

    /// Visit the nodes under `id` whose absolute box intersects `bbox`, front to back.
    ///
    /// Children are visited topmost first and before their parent. The visitor
    /// receives each node with its absolute position. Disabled subtrees are
    /// skipped, and containers are never visited since they have no area.
    pub fn for_each_node_in_box<F>(&self, id: NodeId, bbox: Rect, mut visitor: F)
    where
        F: FnMut(NodeId, i32, i32),
    {
        if !self.is_alive(id) {
            return;
        }
        let Coords { x, y, .. } = self.coords(id);
        self.nodes_in_box(id, bbox, x, y, &mut visitor);
    }

    fn nodes_in_box<F>(&self, id: NodeId, bbox: Rect, lx: i32, ly: i32, visitor: &mut F)
    where
        F: FnMut(NodeId, i32, i32),
    {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        for &child in node.children.iter().rev() {
            if let Some(c) = self.node(child) {
                let (cx, cy) = (lx.saturating_add(c.x), ly.saturating_add(c.y));
                self.nodes_in_box(child, bbox, cx, cy, visitor);
            }
        }
        let (width, height) = node.size();
        if !Rect::new(lx, ly, width, height).intersect(&bbox).is_empty() {
            visitor(id, lx, ly);
        }
    }

    /// Visit every reachable buffer node with its absolute position, back to front.
    pub fn for_each_buffer<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeId, &SceneBuffer<R>, i32, i32),
    {
        let Some(root) = self.node(self.root) else {
            return;
        };
        self.buffers_rec(self.root, root.x, root.y, &mut visitor);
    }

    fn buffers_rec<F>(&self, id: NodeId, lx: i32, ly: i32, visitor: &mut F)
    where
        F: FnMut(NodeId, &SceneBuffer<R>, i32, i32),
    {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        if let NodeKind::Buffer(buffer) = &node.kind {
            visitor(id, buffer, lx, ly);
        }
        for &child in &node.children {
            if let Some(c) = self.node(child) {
                self.buffers_rec(child, lx.saturating_add(c.x), ly.saturating_add(c.y), visitor);
            }
        }
    }

    // --- internals ---

    /// Ids of every live buffer node, in slot order.
    pub(crate) fn buffer_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if matches!(n.kind, NodeKind::Buffer(_)) => {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// The node's current visible footprint, or nothing if it cannot be seen.
    pub(crate) fn prior_visible(&self, id: NodeId) -> R {
        let mut visible = R::default();
        if self.coords(id).reachable {
            self.compute_visible_region(id, &mut visible);
        }
        visible
    }

    /// Liveness check for mutating entry points: asserts in debug builds, warns otherwise.
    pub(crate) fn live(&self, id: NodeId, op: &'static str) -> bool {
        let alive = self.is_alive(id);
        debug_assert!(alive, "{op}: stale NodeId {id:?}");
        if !alive {
            tracing::warn!(node = ?id, "{op}: stale NodeId ignored");
        }
        alive
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node<R>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<R>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const OPAQUE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn root_is_enabled_and_new_nodes_are_not() {
        let mut scene = Scene::new();
        let root = scene.root();
        assert!(scene.is_enabled(root));
        let t = scene.create_tree(root);
        assert!(!scene.is_enabled(t));
        assert_eq!(scene.parent(t), Some(root));
        assert_eq!(scene.children(root), &[t]);
        assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn liveness_create_destroy_reuse() {
        let mut scene = Scene::new();
        let a = scene.create_tree(scene.root());
        assert!(scene.is_alive(a));
        scene.destroy(a);
        assert!(!scene.is_alive(a));
        assert!(scene.children(scene.root()).is_empty());

        let b = scene.create_tree(scene.root());
        assert!(scene.is_alive(b));
        assert!(!scene.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn destroy_takes_the_subtree() {
        let mut scene = Scene::new();
        let t = scene.create_tree(scene.root());
        let r = scene.create_rect(t, 10, 10, OPAQUE);
        let inner = scene.create_tree(t);
        let leaf = scene.create_rect(inner, 5, 5, OPAQUE);
        scene.destroy(t);
        for id in [t, r, inner, leaf] {
            assert!(!scene.is_alive(id), "{id:?} should be gone");
        }
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn coords_sum_x_and_y_independently() {
        let mut scene = Scene::new();
        let t = scene.create_tree(scene.root());
        scene.set_enabled(t, true);
        scene.set_position(t, 3, 40);
        let r = scene.create_rect(t, 1, 1, OPAQUE);
        scene.set_position(r, 7, 2);
        let c = scene.coords(r);
        assert_eq!((c.x, c.y), (10, 42));
        assert!(!c.reachable, "rect itself is still disabled");
        scene.set_enabled(r, true);
        assert!(scene.coords(r).reachable);
    }

    #[test]
    fn coords_saturate_at_extreme_positions() {
        let mut scene = Scene::new();
        let t = scene.create_tree(scene.root());
        scene.set_position(t, i32::MAX - 5, i32::MIN + 5);
        let r = scene.create_rect(t, 1, 1, OPAQUE);
        scene.set_position(r, 10, -10);
        let c = scene.coords(r);
        assert_eq!((c.x, c.y), (i32::MAX, i32::MIN));
    }

    #[test]
    fn size_per_variant() {
        struct Px(i32, i32);
        impl Buffer for Px {
            fn width(&self) -> i32 {
                self.0
            }
            fn height(&self) -> i32 {
                self.1
            }
        }
        let mut scene = Scene::new();
        let root = scene.root();
        let t = scene.create_tree(root);
        let r = scene.create_rect(root, 30, 20, OPAQUE);
        let b = scene.create_buffer(root, Some(Rc::new(Px(64, 48))));
        let empty = scene.create_buffer(root, None);
        assert_eq!(scene.size(t), (0, 0));
        assert_eq!(scene.size(r), (30, 20));
        assert_eq!(scene.size(b), (64, 48));
        assert_eq!(scene.size(empty), (0, 0));
        scene.set_dest_size(b, Some((32, 24)));
        assert_eq!(scene.size(b), (32, 24));
    }

    #[test]
    fn restack_orders() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_tree(root);
        let b = scene.create_tree(root);
        let c = scene.create_tree(root);
        scene.move_to_bottom(c);
        assert_eq!(scene.children(root), &[c, a, b]);
        scene.place_above(c, a);
        assert_eq!(scene.children(root), &[a, c, b]);
        scene.place_below(b, a);
        assert_eq!(scene.children(root), &[b, a, c]);
        scene.move_to_top(b);
        assert_eq!(scene.children(root), &[a, c, b]);
        // Already in place.
        scene.place_above(b, c);
        assert_eq!(scene.children(root), &[a, c, b]);
    }

    #[test]
    fn reparent_moves_to_top_of_new_parent() {
        let mut scene = Scene::new();
        let root = scene.root();
        let left = scene.create_tree(root);
        let right = scene.create_tree(root);
        let x = scene.create_tree(right);
        let n = scene.create_rect(left, 1, 1, OPAQUE);
        scene.reparent(n, right);
        assert_eq!(scene.parent(n), Some(right));
        assert!(scene.children(left).is_empty());
        assert_eq!(scene.children(right), &[x, n]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "would form a cycle")]
    fn reparent_under_descendant_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.create_tree(scene.root());
        let b = scene.create_tree(a);
        scene.reparent(a, b);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn stale_id_asserts_in_debug() {
        let mut scene = Scene::new();
        let a = scene.create_tree(scene.root());
        scene.destroy(a);
        scene.set_enabled(a, true);
    }

    #[test]
    fn queries_on_stale_ids_are_lenient() {
        let mut scene = Scene::new();
        let a = scene.create_rect(scene.root(), 4, 4, OPAQUE);
        scene.destroy(a);
        assert_eq!(scene.parent(a), None);
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.size(a), (0, 0));
        assert_eq!(scene.coords(a), Coords::default());
        assert!(scene.kind(a).is_none());
    }

    #[test]
    fn user_data_round_trip() {
        let mut scene = Scene::new();
        let a = scene.create_tree(scene.root());
        scene.set_data(a, vec![1_u8, 2, 3]);
        assert_eq!(scene.data::<Vec<u8>>(a).map(Vec::len), Some(3));
        assert!(scene.data::<u32>(a).is_none(), "wrong type yields None");
        if let Some(v) = scene.data_mut::<Vec<u8>>(a) {
            v.push(4);
        }
        let taken = scene.take_data(a).and_then(|b| b.downcast::<Vec<u8>>().ok());
        assert_eq!(taken.as_deref().map(Vec::as_slice), Some(&[1_u8, 2, 3, 4][..]));
        assert!(scene.data::<Vec<u8>>(a).is_none());
    }

    #[test]
    fn nodes_in_box_front_to_back() {
        let mut scene = Scene::new();
        let root = scene.root();
        let bottom = scene.create_rect(root, 10, 10, OPAQUE);
        let t = scene.create_tree(root);
        let inner = scene.create_rect(t, 10, 10, OPAQUE);
        let far = scene.create_rect(root, 10, 10, OPAQUE);
        for id in [bottom, t, inner, far] {
            scene.set_enabled(id, true);
        }
        scene.set_position(far, 100, 100);
        scene.set_position(t, 5, 0);

        let mut seen = Vec::new();
        scene.for_each_node_in_box(root, Rect::new(0, 0, 20, 20), |id, x, y| {
            seen.push((id, x, y));
        });
        assert_eq!(seen, vec![(inner, 5, 0), (bottom, 0, 0)]);

        scene.set_enabled(t, false);
        seen.clear();
        scene.for_each_node_in_box(root, Rect::new(0, 0, 20, 20), |id, x, y| {
            seen.push((id, x, y));
        });
        assert_eq!(seen, vec![(bottom, 0, 0)]);
    }

    #[test]
    fn bounds_skip_disabled_children() {
        let mut scene = Scene::new();
        let root = scene.root();
        let t = scene.create_tree(root);
        let a = scene.create_rect(t, 10, 10, OPAQUE);
        let b = scene.create_rect(t, 10, 10, OPAQUE);
        scene.set_enabled(t, true);
        scene.set_enabled(a, true);
        scene.set_position(b, 50, 50);

        let mut acc = RectRegion::new();
        scene.bounds(t, 100, 0, &mut acc);
        assert_eq!(acc.extents(), Aabb::from_xywh(100, 0, 10, 10));

        scene.set_enabled(b, true);
        acc.clear();
        scene.bounds(t, 100, 0, &mut acc);
        assert_eq!(acc.area(), 200);
    }

    #[test]
    fn destroy_listener_can_remove_a_sibling() {
        let mut scene = Scene::new();
        let root = scene.root();
        let t = scene.create_tree(root);
        let a = scene.create_rect(t, 1, 1, OPAQUE);
        let b = scene.create_rect(t, 1, 1, OPAQUE);
        scene.listen_node(a, crate::EventMask::DESTROY, move |scene, _| {
            scene.destroy(b);
        });
        scene.destroy(t);
        assert!(!scene.is_alive(a));
        assert!(!scene.is_alive(b));
        assert_eq!(scene.node_count(), 1);
    }
}
