// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outputs: placement in layout space, per-output damage history, and the
//! translation of layout damage into each output's buffer space.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::Debug;

use elvira_region::{Aabb, Region};

use crate::geometry::{Rect, Transform};
use crate::signal::{ListenTarget, SceneEvent};
use crate::tree::SceneGeneric;
use crate::types::{NodeId, NodeKind, OutputId};

/// A physical display as seen by the scene. Owned by the backend.
pub trait OutputDevice {
    /// Scale factor from layout units to pixels.
    fn scale(&self) -> f32 {
        1.0
    }
    /// Orientation of the output's buffer relative to layout space.
    fn transform(&self) -> Transform {
        Transform::Normal
    }
    /// Current mode in pixels, before the transform is applied.
    fn resolution(&self) -> (i32, i32);
    /// Disabled outputs keep their damage history but show no buffers.
    fn is_enabled(&self) -> bool {
        true
    }
    /// Number of buffers the output cycles through; the depth of its damage history.
    fn buffer_count(&self) -> usize {
        2
    }
    /// Human-readable name, for logs.
    fn name(&self) -> &str {
        ""
    }
}

/// Damage accumulated for one output.
///
/// Layout damage is queued into a pending accumulator as changes happen. Each
/// [`DamageRing::rotate`] (one per committed frame) moves the pending damage into
/// a ring holding the last `depth` frames, so a renderer that reuses a buffer
/// drawn `k` frames ago can repaint just the union of what changed since.
#[derive(Clone, Debug)]
pub struct DamageRing<R> {
    width: i32,
    height: i32,
    pending: R,
    previous: Vec<R>,
    head: usize,
}

impl<R: Region> DamageRing<R> {
    /// A ring for a `width × height` buffer remembering `depth` frames.
    ///
    /// History that was never recorded counts as whole-buffer damage.
    pub fn new(width: i32, height: i32, depth: usize) -> Self {
        let depth = depth.max(1);
        let whole = R::from_rect(Aabb::from_xywh(0, 0, width, height));
        Self {
            width,
            height,
            pending: R::default(),
            previous: alloc::vec![whole; depth],
            head: 0,
        }
    }

    /// Buffer size in pixels.
    pub fn bounds(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Number of frames remembered.
    pub fn depth(&self) -> usize {
        self.previous.len()
    }

    /// Change the buffer size; history is invalidated and everything is damaged.
    pub fn set_bounds(&mut self, width: i32, height: i32) {
        if (self.width, self.height) == (width, height) {
            return;
        }
        self.width = width;
        self.height = height;
        let whole = self.whole();
        for slot in &mut self.previous {
            slot.clone_from(&whole);
        }
        self.add_whole();
    }

    fn whole(&self) -> R {
        R::from_rect(Aabb::from_xywh(0, 0, self.width, self.height))
    }

    /// Queue damage, clipped to the buffer. Returns true if anything was added.
    pub fn add(&mut self, damage: &R) -> bool {
        let mut clipped = damage.clone();
        clipped.intersect_rect(Aabb::from_xywh(0, 0, self.width, self.height));
        if clipped.is_empty() {
            return false;
        }
        self.pending.union(&clipped);
        true
    }

    /// Queue a single damaged box.
    pub fn add_rect(&mut self, rect: Rect) -> bool {
        self.add(&R::from_rect(Aabb::from(rect)))
    }

    /// Damage the whole buffer.
    pub fn add_whole(&mut self) {
        let whole = self.whole();
        self.pending.union(&whole);
    }

    /// Damage queued since the last rotation.
    pub fn pending(&self) -> &R {
        &self.pending
    }

    /// Close the current frame: the pending damage becomes the newest history
    /// entry and is returned.
    pub fn rotate(&mut self) -> R {
        let frame = core::mem::take(&mut self.pending);
        self.head = (self.head + 1) % self.previous.len();
        self.previous[self.head].clone_from(&frame);
        frame
    }

    /// Damage accumulated over the last `age` frames.
    ///
    /// `None` (unknown buffer contents) or an age deeper than the history yields the
    /// whole buffer. Results made of more than `max_rects` boxes are collapsed to
    /// their bounding box.
    pub fn damage_for_age(&self, age: Option<usize>, max_rects: usize) -> R {
        let depth = self.previous.len();
        let Some(age) = age.filter(|&a| a <= depth) else {
            return self.whole();
        };
        let mut damage = R::default();
        for i in 0..age {
            let idx = (self.head + depth - i) % depth;
            damage.union(&self.previous[idx]);
        }
        if damage.rect_count() > max_rects {
            let extents = damage.extents();
            damage = R::from_rect(extents);
        }
        damage
    }
}

/// Maps an [`OutputId`] slot to the output's position in the scene's output vector.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct OutputSlot {
    pub(crate) generation: u32,
    pub(crate) index: Option<usize>,
}

/// One output's participation in the scene.
pub struct SceneOutput<R> {
    device: Rc<dyn OutputDevice>,
    id: OutputId,
    /// Position in the scene's output vector.
    pub(crate) index: usize,
    x: i32,
    y: i32,
    damage: DamageRing<R>,
}

impl<R: Debug> Debug for SceneOutput<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneOutput")
            .field("name", &self.device.name())
            .field("id", &self.id)
            .field("index", &self.index)
            .field("position", &(self.x, self.y))
            .field("damage", &self.damage)
            .finish_non_exhaustive()
    }
}

impl<R: Region> SceneOutput<R> {
    /// The backend device.
    pub fn device(&self) -> &Rc<dyn OutputDevice> {
        &self.device
    }

    /// Stable handle of this output.
    pub fn id(&self) -> OutputId {
        self.id
    }

    /// Position of this output in [`SceneGeneric::outputs`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// Top-left corner in layout space.
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// The output's damage history.
    pub fn damage_ring(&self) -> &DamageRing<R> {
        &self.damage
    }

    /// Resolution after the transform: width and height swap for quarter turns.
    pub fn transformed_resolution(&self) -> (i32, i32) {
        let (w, h) = self.device.resolution();
        if self.device.transform().is_rotated_quarter() {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Area covered in layout space: the transformed resolution divided by the scale.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Effective sizes truncate toward zero."
    )]
    pub fn layout_box(&self) -> Rect {
        let (w, h) = self.transformed_resolution();
        let scale = f64::from(self.device.scale());
        Rect::new(
            self.x,
            self.y,
            (f64::from(w) / scale) as i32,
            (f64::from(h) / scale) as i32,
        )
    }

    /// Convert layout damage to buffer space and queue it.
    fn add_layout_damage(&mut self, damage: &R) {
        let mut local = damage.clone();
        local.translate(-self.x, -self.y);
        let scale = f64::from(self.device.scale());
        local.scale(scale, true);
        if !is_integral(scale) {
            // Filtering at fractional scales bleeds into neighbouring pixels.
            local.expand(1);
        }
        let transform = self.device.transform();
        if transform != Transform::Normal {
            let (tw, th) = self.transformed_resolution();
            let inverse = transform.invert();
            let mut out = R::default();
            for rect in local.rects() {
                out.union_rect(Aabb::from(Rect::from(rect).transform(inverse, tw, th)));
            }
            local = out;
        }
        self.damage.add(&local);
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Only used to compare against the original value."
)]
fn is_integral(value: f64) -> bool {
    (value as i64) as f64 == value
}

impl<R: Region> SceneGeneric<R> {
    /// Attach an output. Attaching the same device twice returns the existing id.
    ///
    /// The new output starts fully damaged, and every buffer node re-evaluates
    /// which outputs it is shown on.
    pub fn create_output(&mut self, device: Rc<dyn OutputDevice>) -> OutputId {
        if let Some(existing) = self
            .outputs
            .iter()
            .find(|o| core::ptr::addr_eq(Rc::as_ptr(&o.device), Rc::as_ptr(&device)))
        {
            return existing.id;
        }

        let index = self.outputs.len();
        let slot = if let Some(slot) = self.output_free.pop() {
            let entry = &mut self.output_slots[slot];
            entry.generation = entry.generation.saturating_add(1);
            entry.index = Some(index);
            slot
        } else {
            self.output_slots.push(OutputSlot {
                generation: 1,
                index: Some(index),
            });
            self.output_slots.len() - 1
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "OutputId uses 32-bit slots by design."
        )]
        let id = OutputId::new(slot as u32, self.output_slots[slot].generation);
        if id.bit() == 0 {
            tracing::warn!(output = ?id, "more than 64 outputs; buffers will not track this one");
        }

        let (width, height) = device.resolution();
        let mut damage = DamageRing::new(width, height, device.buffer_count());
        damage.add_whole();
        tracing::debug!(output = ?id, name = device.name(), width, height, "created output");
        self.outputs.push(SceneOutput {
            device,
            id,
            index,
            x: 0,
            y: 0,
            damage,
        });

        self.update_all_buffer_outputs(None, None);
        self.flush_events();
        id
    }

    /// Detach an output.
    ///
    /// Listeners receive [`SceneEvent::OutputDestroy`] first; then every buffer node
    /// leaves the output, and it is removed in constant time (the last output takes
    /// its place in [`SceneGeneric::outputs`]).
    pub fn destroy_output(&mut self, output: OutputId) {
        if self.live_output(output, "destroy_output").is_none() {
            return;
        }
        self.emit(&SceneEvent::OutputDestroy { output });
        if self.output_index(output).is_none() {
            return;
        }
        self.update_all_buffer_outputs(Some(output), None);
        self.flush_events();

        let Some(index) = self.output_index(output) else {
            return;
        };
        self.outputs.swap_remove(index);
        if let Some(moved) = self.outputs.get_mut(index) {
            moved.index = index;
            self.output_slots[moved.id.slot()].index = Some(index);
        }
        self.output_slots[output.slot()].index = None;
        self.output_free.push(output.slot());
        self.listeners.remove_target(ListenTarget::Output(output));
        tracing::debug!(?output, "destroyed output");
    }

    /// Move an output in layout space. The whole output is damaged.
    pub fn set_output_position(&mut self, output: OutputId, x: i32, y: i32) {
        let Some(index) = self.live_output(output, "set_output_position") else {
            return;
        };
        let o = &mut self.outputs[index];
        if (o.x, o.y) == (x, y) {
            return;
        }
        o.x = x;
        o.y = y;
        o.damage.add_whole();
        self.update_all_buffer_outputs(None, Some(output));
        self.flush_events();
    }

    /// The device's mode, scale, transform or buffer count changed.
    ///
    /// A new buffer count replaces the damage history.
    pub fn output_changed(&mut self, output: OutputId) {
        let Some(index) = self.live_output(output, "output_changed") else {
            return;
        };
        let o = &mut self.outputs[index];
        let (width, height) = o.device.resolution();
        let depth = o.device.buffer_count().max(1);
        if o.damage.depth() == depth {
            o.damage.set_bounds(width, height);
        } else {
            tracing::debug!(?output, depth, "damage history depth changed");
            o.damage = DamageRing::new(width, height, depth);
        }
        o.damage.add_whole();
        self.update_all_buffer_outputs(None, Some(output));
        self.flush_events();
    }

    /// Damage the whole of an output.
    pub fn damage_whole_output(&mut self, output: OutputId) {
        if let Some(index) = self.live_output(output, "damage_whole_output") {
            self.outputs[index].damage.add_whole();
        }
    }

    /// Forward layout-space damage to every output.
    ///
    /// Each output translates it into its own frame, scales it (rounding outward,
    /// plus a one pixel margin at fractional scales), applies the inverse of its
    /// transform and queues the result, clipped to its buffer.
    pub fn damage_outputs(&mut self, damage: &R) {
        if damage.is_empty() {
            return;
        }
        for output in &mut self.outputs {
            output.add_layout_damage(damage);
        }
    }

    /// Close a frame on `output`: its pending damage becomes the newest history
    /// entry and is returned. Buffer nodes shown on the output receive
    /// [`SceneEvent::OutputSample`].
    pub fn commit_output(&mut self, output: OutputId) -> R {
        let Some(index) = self.live_output(output, "commit_output") else {
            return R::default();
        };
        let frame = self.outputs[index].damage.rotate();
        for node in self.buffers_on(output) {
            self.queue_event(SceneEvent::OutputSample { node, output });
        }
        self.flush_events();
        frame
    }

    /// Notify every reachable buffer node whose primary output is `output` that a
    /// frame was presented.
    pub fn send_frame_done(&mut self, output: OutputId, time_ms: u32) {
        if self.live_output(output, "send_frame_done").is_none() {
            return;
        }
        let mut nodes = Vec::new();
        self.for_each_buffer(|id, buffer, _, _| {
            if buffer.primary_output() == Some(output) {
                nodes.push(id);
            }
        });
        for node in nodes {
            self.queue_event(SceneEvent::FrameDone {
                node,
                output,
                time_ms,
            });
        }
        self.flush_events();
    }

    /// Damage to repaint into a buffer last drawn `age` frames ago.
    ///
    /// See [`DamageRing::damage_for_age`]; the collapse threshold comes from
    /// [`SceneConfig::max_damage_rects`](crate::SceneConfig::max_damage_rects).
    pub fn damage_for_age(&self, output: OutputId, age: Option<usize>) -> R {
        let Some(index) = self.output_index(output) else {
            return R::default();
        };
        self.outputs[index]
            .damage
            .damage_for_age(age, self.config.max_damage_rects)
    }

    /// Damage queued on `output` since its last commit.
    pub fn pending_damage(&self, output: OutputId) -> Option<&R> {
        self.output(output).map(|o| o.damage.pending())
    }

    /// Area an output covers in layout space.
    pub fn output_layout_box(&self, output: OutputId) -> Option<Rect> {
        self.output(output).map(SceneOutput::layout_box)
    }

    /// Every attached output.
    pub fn outputs(&self) -> &[SceneOutput<R>] {
        &self.outputs
    }

    /// Look up an output.
    pub fn output(&self, output: OutputId) -> Option<&SceneOutput<R>> {
        self.output_index(output).map(|i| &self.outputs[i])
    }

    /// Primary output of a buffer node.
    pub fn primary_output(&self, buffer: NodeId) -> Option<OutputId> {
        match self.kind(buffer)? {
            NodeKind::Buffer(b) => b.primary_output,
            _ => None,
        }
    }

    /// Outputs a buffer node is currently shown on, in output order.
    pub fn active_outputs(&self, buffer: NodeId) -> Vec<OutputId> {
        let Some(NodeKind::Buffer(b)) = self.kind(buffer) else {
            return Vec::new();
        };
        self.outputs
            .iter()
            .map(SceneOutput::id)
            .filter(|&o| b.is_on_output(o))
            .collect()
    }

    pub(crate) fn output_index(&self, output: OutputId) -> Option<usize> {
        let slot = self.output_slots.get(output.slot())?;
        if slot.generation != output.1 {
            return None;
        }
        slot.index
    }

    /// Liveness check for mutating output entry points.
    pub(crate) fn live_output(&self, output: OutputId, op: &'static str) -> Option<usize> {
        let index = self.output_index(output);
        debug_assert!(index.is_some(), "{op}: stale OutputId {output:?}");
        if index.is_none() {
            tracing::warn!(?output, "{op}: stale OutputId ignored");
        }
        index
    }

    fn buffers_on(&self, output: OutputId) -> Vec<NodeId> {
        self.buffer_ids()
            .into_iter()
            .filter(|&id| {
                matches!(self.kind(id), Some(NodeKind::Buffer(b)) if b.is_on_output(output))
            })
            .collect()
    }

    fn update_all_buffer_outputs(&mut self, ignore: Option<OutputId>, force: Option<OutputId>) {
        for id in self.buffer_ids() {
            self.update_node_outputs(id, ignore, force);
        }
    }
}
