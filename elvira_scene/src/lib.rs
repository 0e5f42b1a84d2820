// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elvira Scene: a retained-mode scene graph for display compositors.
//!
//! The scene is a tree of drawable nodes (containers, solid rects and client
//! buffers). After every change it works out which parts of each node are still
//! visible once everything above has been drawn, and which screen areas have to be
//! repainted. That damage is forwarded to every attached output, translated into
//! the output's own buffer space and kept in a short per-output history so that
//! renderers cycling through several buffers only repaint what changed.
//!
//! - Occlusion-aware visibility: opaque nodes hide what lies below them.
//! - Incremental damage: only the area a change touches is recomputed.
//! - Per-output damage history keyed by buffer age.
//! - Output tracking for buffer nodes (enter/leave, primary output, frame done).
//!
//! ## Not a renderer
//!
//! The scene never draws. A renderer walks the buffer nodes
//! ([`SceneGeneric::for_each_buffer`]), asks an output for the damage matching the
//! age of the buffer it is about to draw into ([`SceneGeneric::damage_for_age`])
//! and repaints that area. Output devices and client buffers are collaborators
//! reached through the [`OutputDevice`] and [`Buffer`] traits.
//!
//! ## Regions
//!
//! Visible regions and damage are [`elvira_region::Region`]s. The scene is
//! generic over the backend ([`SceneGeneric`]); [`Scene`] uses the default
//! [`RectRegion`](elvira_region::RectRegion).
//!
//! ## API overview
//!
//! - [`Scene`] / [`SceneGeneric`]: owns the nodes, outputs, listeners and config.
//! - [`NodeId`] / [`OutputId`]: generational handles.
//! - [`NodeKind`]: the node variants, with [`SceneRect`] and [`SceneBuffer`] payloads.
//! - [`SceneConfig`]: occlusion culling and damage collapse policy.
//! - [`SceneEvent`] / [`EventMask`]: notifications and subscriptions.
//! - [`geometry`]: [`Point`], [`Rect`], [`FRect`], [`Transform`].
//!
//! Mutations never fail. Handing a stale id to a mutating method is a programmer
//! error: it asserts in debug builds and is logged and ignored otherwise.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use elvira_region::{Aabb, Region};
//! use elvira_scene::{OutputDevice, Scene};
//!
//! struct Monitor;
//!
//! impl OutputDevice for Monitor {
//!     fn resolution(&self) -> (i32, i32) {
//!         (1920, 1080)
//!     }
//! }
//!
//! let mut scene = Scene::new();
//! let output = scene.create_output(Rc::new(Monitor));
//! let _ = scene.commit_output(output);
//!
//! // Two opaque windows; the second one is on top.
//! let root = scene.root();
//! let back = scene.create_rect(root, 100, 100, [1.0, 0.0, 0.0, 1.0]);
//! let front = scene.create_rect(root, 100, 100, [0.0, 0.0, 1.0, 1.0]);
//! scene.set_position(front, 50, 50);
//! scene.set_enabled(back, true);
//! scene.set_enabled(front, true);
//!
//! // The back window is left with an L-shape.
//! let visible = scene.visible_region(back).unwrap();
//! assert_eq!(visible.area(), 7_500);
//!
//! // Moving it reports both the old and the new footprint.
//! let _ = scene.commit_output(output);
//! scene.set_position(back, 10, 10);
//! let damage = scene.pending_damage(output).unwrap();
//! assert_eq!(damage.extents(), Aabb::new(0, 0, 110, 110));
//! ```
//!
//! Listeners receive the scene mutably:
//!
//! ```rust
//! use elvira_scene::{EventMask, Scene, SceneEvent};
//!
//! let mut scene = Scene::new();
//! let panel = scene.create_tree(scene.root());
//! let label = scene.create_rect(panel, 10, 10, [1.0; 4]);
//!
//! scene.listen_node(panel, EventMask::DESTROY, move |scene, event| {
//!     assert!(matches!(event, SceneEvent::NodeDestroy { .. }));
//!     // Still intact during the first phase of teardown.
//!     assert_eq!(scene.size(label), (10, 10));
//! });
//! scene.destroy(panel);
//! assert!(!scene.is_alive(label));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod geometry;

mod config;
mod nodes;
mod output;
mod signal;
mod tree;
mod types;
mod update;

pub use config::SceneConfig;
pub use geometry::{FRect, Point, Rect, Transform};
pub use output::{DamageRing, OutputDevice, SceneOutput};
pub use signal::{EventMask, ListenTarget, ListenerId, SceneEvent};
pub use tree::{Scene, SceneGeneric};
pub use types::{Buffer, Coords, NodeId, NodeKind, OutputId, SceneBuffer, SceneRect};
