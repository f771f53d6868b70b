use super::*;

use crate::foundation::color::palette;
use crate::foundation::core::FrameIndex;
use crate::foundation::math::RIGHT;
use crate::mobject::builder::Mobject;
use crate::render::display::emit;
use crate::scene::camera::Camera;
use crate::scene::graph::{NodeId, SceneGraph};

fn frame_of(g: &SceneGraph, index: u64, time: f64) -> Frame {
    emit(g, &Camera::new(16.0, 9.0), FrameIndex(index), time, palette::BLACK)
}

fn scene() -> (SceneGraph, NodeId) {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::group([Mobject::square(1.0), Mobject::circle(0.5)]));
    g.attach(NodeId::ROOT, id).unwrap();
    (g, id)
}

#[test]
fn index_and_time_are_not_hashed() {
    let (g, _) = scene();
    assert_eq!(
        fingerprint_frame(&frame_of(&g, 0, 0.0)),
        fingerprint_frame(&frame_of(&g, 41, 1.4))
    );
}

#[test]
fn any_visible_change_changes_the_print() {
    let (mut g, id) = scene();
    let base = fingerprint_frame(&frame_of(&g, 0, 0.0));
    g.node_mut(id).unwrap().shift(RIGHT * 1e-9);
    let moved = fingerprint_frame(&frame_of(&g, 0, 0.0));
    assert_ne!(base, moved);
    g.node_mut(id).unwrap().set_color(palette::GREEN);
    assert_ne!(moved, fingerprint_frame(&frame_of(&g, 0, 0.0)));
}

#[test]
fn background_is_hashed() {
    let (g, _) = scene();
    let cam = Camera::new(16.0, 9.0);
    let a = emit(&g, &cam, FrameIndex(0), 0.0, palette::BLACK);
    let b = emit(&g, &cam, FrameIndex(0), 0.0, palette::WHITE);
    assert_ne!(fingerprint_frame(&a), fingerprint_frame(&b));
}

#[test]
fn negative_zero_matches_zero() {
    let mut a = Lanes::new();
    let mut b = Lanes::new();
    a.f64(0.0);
    b.f64(-0.0);
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn display_is_32_hex_chars() {
    let (g, _) = scene();
    let s = fingerprint_frame(&frame_of(&g, 0, 0.0)).to_string();
    assert_eq!(s.len(), 32);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
}
