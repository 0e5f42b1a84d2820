// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: handles, node variants and external collaborators.

use alloc::rc::Rc;

/// Identifier for a node in the scene.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the node is destroyed. It consists of a slot index and a generation
/// counter.
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On destroy, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`SceneGeneric::is_alive`](crate::SceneGeneric::is_alive) to check whether a `NodeId`
/// still refers to a live node. Stale ids never alias a different live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for an output attached to the scene.
///
/// Generational like [`NodeId`]. The slot index is stable for the output's whole
/// lifetime, so buffer nodes key their active-output sets by it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OutputId(pub(crate) u32, pub(crate) u32);

impl OutputId {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }

    /// Bit of this output in a buffer node's active-output mask; zero past 64 slots.
    pub(crate) const fn bit(self) -> u64 {
        match 1_u64.checked_shl(self.0) {
            Some(b) => b,
            None => 0,
        }
    }
}

/// Absolute position of a node and whether it can be seen at all.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Coords {
    /// Absolute x: the node's and every ancestor's x offsets summed.
    pub x: i32,
    /// Absolute y: the node's and every ancestor's y offsets summed.
    pub y: i32,
    /// True iff the node and all of its ancestors are enabled.
    pub reachable: bool,
}

/// Pixel content of a buffer node, owned by the client or renderer.
pub trait Buffer {
    /// Width in pixels.
    fn width(&self) -> i32;
    /// Height in pixels.
    fn height(&self) -> i32;
    /// True if every pixel is fully opaque (for example an XRGB format).
    fn is_opaque(&self) -> bool {
        false
    }
}

/// A solid color rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneRect {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) color: [f32; 4],
}

impl SceneRect {
    /// Width in layout units.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in layout units.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Premultiplied RGBA color.
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// A rect occludes what is below it only when its alpha is one.
    pub fn is_opaque(&self) -> bool {
        self.color[3] >= 1.0
    }
}

/// A node displaying a client buffer.
pub struct SceneBuffer<R> {
    pub(crate) buffer: Option<Rc<dyn Buffer>>,
    pub(crate) dest_size: Option<(i32, i32)>,
    /// Node-local region known to be opaque even if the buffer format has alpha.
    pub(crate) opaque_region: R,
    pub(crate) active_outputs: u64,
    pub(crate) primary_output: Option<OutputId>,
}

impl<R: core::fmt::Debug> core::fmt::Debug for SceneBuffer<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneBuffer")
            .field(
                "buffer",
                &self.buffer.as_ref().map(|b| (b.width(), b.height())),
            )
            .field("dest_size", &self.dest_size)
            .field("opaque_region", &self.opaque_region)
            .field("active_outputs", &format_args!("{:#x}", self.active_outputs))
            .field("primary_output", &self.primary_output)
            .finish()
    }
}

impl<R> SceneBuffer<R> {
    /// The displayed buffer, if any.
    pub fn buffer(&self) -> Option<&Rc<dyn Buffer>> {
        self.buffer.as_ref()
    }

    /// Destination size override, if set.
    pub fn dest_size(&self) -> Option<(i32, i32)> {
        self.dest_size
    }

    /// Node-local opaque region.
    pub fn opaque_region(&self) -> &R {
        &self.opaque_region
    }

    /// The output showing the largest part of this buffer.
    pub fn primary_output(&self) -> Option<OutputId> {
        self.primary_output
    }

    /// Whether any part of the buffer is visible on `output`.
    pub fn is_on_output(&self, output: OutputId) -> bool {
        self.active_outputs & output.bit() != 0
    }

    /// Size in layout units: the destination size if set, else the buffer size.
    pub fn size(&self) -> (i32, i32) {
        if let Some(size) = self.dest_size {
            return size;
        }
        self.buffer
            .as_ref()
            .map(|b| (b.width(), b.height()))
            .unwrap_or((0, 0))
    }
}

/// The closed set of node variants.
#[derive(Debug)]
pub enum NodeKind<R> {
    /// A container with no content of its own.
    Tree,
    /// A solid color rectangle.
    Rect(SceneRect),
    /// A client buffer.
    Buffer(SceneBuffer<R>),
}

impl<R> NodeKind<R> {
    /// True for container nodes.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }
}
