// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content setters for rect and buffer nodes.

use alloc::rc::Rc;

use elvira_region::{Aabb, Region};

use crate::geometry::Rect;
use crate::tree::SceneGeneric;
use crate::types::{Buffer, NodeId, NodeKind, SceneBuffer, SceneRect};

impl<R: Region> SceneGeneric<R> {
    /// The rect payload of a node, if it is a rect.
    pub fn rect(&self, id: NodeId) -> Option<&SceneRect> {
        match self.kind(id)? {
            NodeKind::Rect(rect) => Some(rect),
            _ => None,
        }
    }

    /// The buffer payload of a node, if it is a buffer node.
    pub fn buffer(&self, id: NodeId) -> Option<&SceneBuffer<R>> {
        match self.kind(id)? {
            NodeKind::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Resize a rect node.
    pub fn set_rect_size(&mut self, id: NodeId, width: i32, height: i32) {
        let Some(rect) = self.rect_mut(id, "set_rect_size") else {
            return;
        };
        if (rect.width, rect.height) == (width, height) {
            return;
        }
        rect.width = width;
        rect.height = height;
        self.update_node(id, None, None);
        self.flush_events();
    }

    /// Change a rect's color. Crossing the fully-opaque threshold also changes what
    /// the rect occludes.
    pub fn set_rect_color(&mut self, id: NodeId, color: [f32; 4]) {
        let Some(rect) = self.rect_mut(id, "set_rect_color") else {
            return;
        };
        if rect.color == color {
            return;
        }
        rect.color = color;
        self.update_node(id, None, None);
        self.flush_events();
    }

    /// Display `buffer` (or nothing), damaging the whole node.
    pub fn set_buffer(&mut self, id: NodeId, buffer: Option<Rc<dyn Buffer>>) {
        self.set_buffer_with_damage(id, buffer, None);
    }

    /// Display `buffer`, damaging only `damage` (buffer-local pixels) when the new
    /// buffer has the same size and opacity as the old one.
    ///
    /// Anything that changes the node's footprint or what it occludes (mapping,
    /// unmapping, a new size, a new opacity) recomputes visibility and damages the
    /// whole node instead. Damage without a buffer is meaningless and ignored.
    pub fn set_buffer_with_damage(
        &mut self,
        id: NodeId,
        buffer: Option<Rc<dyn Buffer>>,
        damage: Option<&R>,
    ) {
        if !self.live(id, "set_buffer") {
            return;
        }
        debug_assert!(
            buffer.is_some() || damage.is_none(),
            "set_buffer: damage given without a buffer"
        );
        let Some(NodeKind::Buffer(node)) = self.node_mut(id).map(|n| &mut n.kind) else {
            tracing::warn!(node = ?id, "set_buffer: not a buffer node");
            return;
        };
        let old = node.buffer.take();
        let relayout = match (&old, &buffer) {
            (None, None) => return,
            (Some(_), None) | (None, Some(_)) => true,
            (Some(old), Some(new)) => {
                (node.dest_size.is_none()
                    && (old.width(), old.height()) != (new.width(), new.height()))
                    || old.is_opaque() != new.is_opaque()
            }
        };
        node.buffer = buffer;
        if relayout {
            self.update_node(id, None, None);
            self.flush_events();
            return;
        }

        let coords = self.coords(id);
        if !coords.reachable {
            return;
        }
        let Some(n) = self.node(id) else {
            return;
        };
        let NodeKind::Buffer(node) = &n.kind else {
            return;
        };
        let Some(b) = node.buffer.as_ref() else {
            return;
        };
        let unscaled = node
            .dest_size
            .is_none_or(|dest| dest == (b.width(), b.height()));
        let mut region = match damage {
            Some(d) if unscaled => d.clone(),
            // Without damage, or with stretched content, the whole node is redrawn.
            _ => {
                let (width, height) = node.size();
                R::from_rect(Aabb::from(Rect::new(0, 0, width, height)))
            }
        };
        region.translate(coords.x, coords.y);
        region.intersect(&n.visible);
        self.damage_outputs(&region);
    }

    /// Mark part of a buffer node (node-local coordinates) as opaque even though
    /// the buffer format has alpha.
    pub fn set_opaque_region(&mut self, id: NodeId, region: R) {
        let Some(node) = self.buffer_mut(id, "set_opaque_region") else {
            return;
        };
        if node.opaque_region.same_as(&region) {
            return;
        }
        node.opaque_region = region;
        self.update_node(id, None, None);
        self.flush_events();
    }

    /// Stretch a buffer node to `size` layout units, or back to the buffer size
    /// with `None`.
    pub fn set_dest_size(&mut self, id: NodeId, size: Option<(i32, i32)>) {
        let Some(node) = self.buffer_mut(id, "set_dest_size") else {
            return;
        };
        if node.dest_size == size {
            return;
        }
        node.dest_size = size;
        self.update_node(id, None, None);
        self.flush_events();
    }

    fn rect_mut(&mut self, id: NodeId, op: &'static str) -> Option<&mut SceneRect> {
        if !self.live(id, op) {
            return None;
        }
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Rect(rect)) => Some(rect),
            _ => {
                tracing::warn!(node = ?id, "{op}: not a rect node");
                None
            }
        }
    }

    fn buffer_mut(&mut self, id: NodeId, op: &'static str) -> Option<&mut SceneBuffer<R>> {
        if !self.live(id, op) {
            return None;
        }
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Buffer(buffer)) => Some(buffer),
            _ => {
                tracing::warn!(node = ?id, "{op}: not a buffer node");
                None
            }
        }
    }
}
