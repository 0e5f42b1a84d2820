// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffers across outputs.
//!
//! Two side-by-side outputs, one of them HiDPI and rotated. A client buffer is
//! dragged across the seam while listeners print output enter/leave events, then
//! the frame-done pass notifies the buffer's primary output.
//!
//! Run:
//! - `RUST_LOG=elvira_scene=trace cargo run -p elvira_demos --example buffers_and_outputs`

use std::rc::Rc;

use elvira_region::Region;
use elvira_scene::{
    Buffer, EventMask, OutputDevice, OutputId, Scene, SceneConfig, SceneEvent, Transform,
};
use tracing_subscriber::EnvFilter;

struct Output {
    name: &'static str,
    resolution: (i32, i32),
    scale: f32,
    transform: Transform,
}

impl OutputDevice for Output {
    fn scale(&self) -> f32 {
        self.scale
    }
    fn transform(&self) -> Transform {
        self.transform
    }
    fn resolution(&self) -> (i32, i32) {
        self.resolution
    }
    fn buffer_count(&self) -> usize {
        3
    }
    fn name(&self) -> &str {
        self.name
    }
}

/// An XRGB client buffer.
struct Shm {
    width: i32,
    height: i32,
}

impl Buffer for Shm {
    fn width(&self) -> i32 {
        self.width
    }
    fn height(&self) -> i32 {
        self.height
    }
    fn is_opaque(&self) -> bool {
        true
    }
}

fn output_name(scene: &Scene, output: OutputId) -> String {
    scene
        .output(output)
        .map(|o| o.device().name().to_owned())
        .unwrap_or_else(|| "<gone>".to_owned())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut scene = Scene::with_config(SceneConfig::from_env());
    let left = scene.create_output(Rc::new(Output {
        name: "eDP-1",
        resolution: (1920, 1080),
        scale: 1.0,
        transform: Transform::Normal,
    }));
    let right = scene.create_output(Rc::new(Output {
        name: "DP-2",
        resolution: (2160, 3840),
        scale: 1.5,
        transform: Transform::Rotate90,
    }));
    scene.set_output_position(right, 1920, 0);
    for out in scene.outputs() {
        println!(
            "{} covers {:?} in layout space",
            out.device().name(),
            out.layout_box()
        );
    }

    let window = scene.create_tree(scene.root());
    scene.set_enabled(window, true);
    let surface = scene.create_buffer(
        window,
        Some(Rc::new(Shm {
            width: 800,
            height: 600,
        })),
    );
    scene.listen_node(
        surface,
        EventMask::OUTPUT_ENTER | EventMask::OUTPUT_LEAVE | EventMask::FRAME_DONE,
        |scene, event| match event {
            SceneEvent::OutputEnter { output, .. } => {
                println!("  entered {}", output_name(scene, *output));
            }
            SceneEvent::OutputLeave { output, .. } => {
                println!("  left {}", output_name(scene, *output));
            }
            SceneEvent::FrameDone { time_ms, .. } => println!("  frame done at {time_ms} ms"),
            _ => {}
        },
    );
    scene.set_enabled(surface, true);

    for x in [100, 1500, 2200] {
        println!("window at x = {x}");
        scene.set_position(window, x, 100);
        println!("  primary output: {:?}", scene.primary_output(surface));
    }

    for (out, time_ms) in [(left, 16), (right, 16)] {
        let damage = scene.commit_output(out);
        println!("{out:?} frame damage extents: {:?}", damage.extents());
        scene.send_frame_done(out, time_ms);
    }

    scene.destroy_output(left);
    tracing::info!(
        outputs = scene.outputs().len(),
        primary = ?scene.primary_output(surface),
        "unplugged the laptop panel"
    );
}
