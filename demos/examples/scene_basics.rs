// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene basics.
//!
//! Build a small scene with two overlapping windows on one output, move one of
//! them, and print the damage the output has to repaint.
//!
//! Run:
//! - `RUST_LOG=elvira_scene=debug cargo run -p elvira_demos --example scene_basics`

use std::rc::Rc;

use elvira_region::Region;
use elvira_scene::{OutputDevice, Scene};
use tracing_subscriber::EnvFilter;

struct Monitor;

impl OutputDevice for Monitor {
    fn resolution(&self) -> (i32, i32) {
        (1280, 720)
    }
    fn name(&self) -> &str {
        "HDMI-A-1"
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut scene = Scene::new();
    let output = scene.create_output(Rc::new(Monitor));
    // The first frame repaints everything.
    let first = scene.commit_output(output);
    println!("first frame damage: {:?}", first.extents());

    let root = scene.root();
    let terminal = scene.create_rect(root, 400, 300, [0.1, 0.1, 0.1, 1.0]);
    let browser = scene.create_rect(root, 600, 400, [0.9, 0.9, 0.9, 1.0]);
    scene.set_position(terminal, 40, 40);
    scene.set_position(browser, 200, 150);
    scene.set_enabled(terminal, true);
    scene.set_enabled(browser, true);

    let frame = scene.commit_output(output);
    println!("windows mapped, damage: {frame:?}");
    println!(
        "terminal visible area: {} of {}",
        scene.visible_region(terminal).map(Region::area).unwrap_or(0),
        400 * 300
    );

    // Drag the terminal; both its old and new footprint need repainting.
    scene.set_position(terminal, 60, 50);
    let frame = scene.commit_output(output);
    println!("after move, damage: {frame:?}");

    // Raise the terminal above the browser.
    scene.move_to_top(terminal);
    let frame = scene.commit_output(output);
    println!("after raise, damage: {frame:?}");
    assert_eq!(
        scene.visible_region(terminal).map(Region::area),
        Some(400 * 300),
        "a raised opaque window is fully visible"
    );

    // A renderer drawing into a buffer last used two frames ago.
    let age2 = scene.damage_for_age(output, Some(2));
    println!("repaint for buffer age 2: {:?}", age2.extents());
}
