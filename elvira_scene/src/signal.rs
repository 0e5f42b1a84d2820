// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications: events, subscription masks and the listener registry.
//!
//! Listeners are plain closures that receive the scene mutably, so they may
//! restructure the tree while handling an event. Emission snapshots the ids of the
//! matching listeners first; a listener removed by an earlier one in the same
//! emission is skipped, and one registered during emission only sees later events.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use elvira_region::Region;

use crate::tree::SceneGeneric;
use crate::types::{NodeId, OutputId};

bitflags::bitflags! {
    /// Which node events a listener wants to receive.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventMask: u8 {
        /// The node (or output) is being destroyed.
        const DESTROY        = 0b0000_0001;
        /// A buffer node became visible on an output.
        const OUTPUT_ENTER   = 0b0000_0010;
        /// A buffer node stopped being visible on an output.
        const OUTPUT_LEAVE   = 0b0000_0100;
        /// An output committed a frame showing the buffer node.
        const OUTPUT_SAMPLE  = 0b0000_1000;
        /// The buffer node's primary output finished presenting a frame.
        const FRAME_DONE     = 0b0001_0000;
        /// The set of outputs (or the primary output) of a buffer node changed.
        const OUTPUTS_UPDATE = 0b0010_0000;
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::all()
    }
}

/// A notification emitted by the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// First phase of node teardown; the node is still fully usable.
    NodeDestroy {
        /// Node being destroyed.
        node: NodeId,
    },
    /// A buffer node became visible on `output`.
    OutputEnter {
        /// Buffer node.
        node: NodeId,
        /// Output entered.
        output: OutputId,
    },
    /// A buffer node is no longer visible on `output`.
    OutputLeave {
        /// Buffer node.
        node: NodeId,
        /// Output left.
        output: OutputId,
    },
    /// `output` committed a frame while the buffer node was visible on it.
    OutputSample {
        /// Buffer node.
        node: NodeId,
        /// Committing output.
        output: OutputId,
    },
    /// The buffer node's primary output presented a frame.
    FrameDone {
        /// Buffer node.
        node: NodeId,
        /// Presenting output.
        output: OutputId,
        /// Presentation time in milliseconds.
        time_ms: u32,
    },
    /// The buffer node's active outputs or primary output changed.
    OutputsUpdate {
        /// Buffer node.
        node: NodeId,
        /// Outputs the buffer is now visible on, in output order.
        outputs: Vec<OutputId>,
    },
    /// An output is being removed from the scene.
    OutputDestroy {
        /// Output being destroyed.
        output: OutputId,
    },
}

impl SceneEvent {
    /// The mask bit a listener needs to receive this event.
    pub fn mask(&self) -> EventMask {
        match self {
            Self::NodeDestroy { .. } | Self::OutputDestroy { .. } => EventMask::DESTROY,
            Self::OutputEnter { .. } => EventMask::OUTPUT_ENTER,
            Self::OutputLeave { .. } => EventMask::OUTPUT_LEAVE,
            Self::OutputSample { .. } => EventMask::OUTPUT_SAMPLE,
            Self::FrameDone { .. } => EventMask::FRAME_DONE,
            Self::OutputsUpdate { .. } => EventMask::OUTPUTS_UPDATE,
        }
    }

    /// The node or output this event is about.
    pub fn target(&self) -> ListenTarget {
        match self {
            Self::NodeDestroy { node }
            | Self::OutputEnter { node, .. }
            | Self::OutputLeave { node, .. }
            | Self::OutputSample { node, .. }
            | Self::FrameDone { node, .. }
            | Self::OutputsUpdate { node, .. } => ListenTarget::Node(*node),
            Self::OutputDestroy { output } => ListenTarget::Output(*output),
        }
    }
}

/// What a listener is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    /// A scene node.
    Node(NodeId),
    /// A scene output.
    Output(OutputId),
}

/// Handle returned by the `listen_*` methods; pass it to
/// [`SceneGeneric::unlisten`] to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub(crate) type Callback<R> = Box<dyn FnMut(&mut SceneGeneric<R>, &SceneEvent)>;

struct Entry<R: Region> {
    id: ListenerId,
    target: ListenTarget,
    mask: EventMask,
    /// `None` while the callback is running.
    callback: Option<Callback<R>>,
}

/// Registry of every listener in a scene, in registration order.
pub(crate) struct Listeners<R: Region> {
    entries: Vec<Entry<R>>,
    next_id: u64,
}

impl<R: Region> Default for Listeners<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<R: Region> Debug for Listeners<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<R: Region> Listeners<R> {
    pub(crate) fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn add(
        &mut self,
        target: ListenTarget,
        mask: EventMask,
        callback: Callback<R>,
    ) -> ListenerId {
        let id = self.next_id();
        self.entries.push(Entry {
            id,
            target,
            mask,
            callback: Some(callback),
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub(crate) fn remove_target(&mut self, target: ListenTarget) {
        self.entries.retain(|e| e.target != target);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn matching(&self, event: &SceneEvent) -> Vec<ListenerId> {
        let target = event.target();
        let mask = event.mask();
        self.entries
            .iter()
            .filter(|e| e.target == target && e.mask.intersects(mask))
            .map(|e| e.id)
            .collect()
    }

    fn take(&mut self, id: ListenerId) -> Option<Callback<R>> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| e.callback.take())
    }

    fn restore(&mut self, id: ListenerId, callback: Callback<R>) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.id == id) {
            e.callback = Some(callback);
        }
    }
}

impl<R: Region> SceneGeneric<R> {
    /// Subscribe to events on `node` selected by `mask`.
    ///
    /// The listener is dropped automatically when the node is destroyed, after it
    /// has seen [`SceneEvent::NodeDestroy`].
    pub fn listen_node<F>(&mut self, node: NodeId, mask: EventMask, callback: F) -> ListenerId
    where
        F: FnMut(&mut Self, &SceneEvent) + 'static,
    {
        if !self.live(node, "listen_node") {
            return self.listeners.next_id();
        }
        self.listeners
            .add(ListenTarget::Node(node), mask, Box::new(callback))
    }

    /// Subscribe to the destruction of `output`.
    pub fn listen_output<F>(&mut self, output: OutputId, callback: F) -> ListenerId
    where
        F: FnMut(&mut Self, &SceneEvent) + 'static,
    {
        if self.live_output(output, "listen_output").is_none() {
            return self.listeners.next_id();
        }
        self.listeners.add(
            ListenTarget::Output(output),
            EventMask::DESTROY,
            Box::new(callback),
        )
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Deliver `event` to its listeners right away.
    pub(crate) fn emit(&mut self, event: &SceneEvent) {
        for id in self.listeners.matching(event) {
            // Absent when removed by an earlier listener, or when this listener is
            // already running further up the stack.
            let Some(mut callback) = self.listeners.take(id) else {
                continue;
            };
            callback(self, event);
            self.listeners.restore(id, callback);
        }
    }

    /// Queue `event` for delivery once the current operation has finished.
    pub(crate) fn queue_event(&mut self, event: SceneEvent) {
        self.pending_events.push(event);
    }

    /// Deliver every queued event, including ones queued by listeners meanwhile.
    pub(crate) fn flush_events(&mut self) {
        loop {
            let batch = core::mem::take(&mut self.pending_events);
            if batch.is_empty() {
                break;
            }
            for event in &batch {
                self.emit(event);
            }
        }
    }
}
