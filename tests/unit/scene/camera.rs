use super::*;

use std::f64::consts::FRAC_PI_2;

use crate::foundation::math::{OUT, RIGHT, UP};

#[test]
fn default_view_is_identity() {
    let cam = Camera::new(16.0, 9.0);
    assert!(cam.view().is_identity());
    assert_eq!(cam.depth(), 0);
}

#[test]
fn zoom_and_pan_map_world_into_the_frame() {
    let mut cam = Camera::new(16.0, 9.0);
    cam.scale(0.5).shift(RIGHT * 3.0);
    let v = cam.view();
    assert!(v.apply(RIGHT * 3.0).length() < 1e-12);
    assert!(v.apply(RIGHT * 4.0).distance(RIGHT * 2.0) < 1e-12);
    assert!((cam.width() - 8.0).abs() < 1e-12);
}

#[test]
fn view_inverts_frame_to_world() {
    let mut cam = Camera::new(16.0, 9.0);
    cam.rotate(0.4, OUT).scale(1.7).move_to(Vec3::xy(-2.0, 1.0));
    let s = cam.state();
    let p = Vec3::xy(0.3, -1.2);
    assert!(s.view().apply(s.frame_to_world().apply(p)).distance(p) < 1e-12);
}

#[test]
fn restore_pops_in_lifo_order() {
    let mut cam = Camera::new(16.0, 9.0);
    cam.save_state();
    cam.shift(UP);
    cam.save_state();
    cam.scale(2.0);
    cam.restore().unwrap();
    assert_eq!(cam.state().scale, 1.0);
    assert_eq!(cam.state().center, UP);
    cam.restore().unwrap();
    assert_eq!(cam.state(), CameraState::default());
    assert!(matches!(cam.restore(), Err(ChoreoError::UnbalancedCamera(_))));
}

#[test]
fn set_width_is_relative_to_the_configured_frame() {
    let mut cam = Camera::new(16.0, 9.0);
    cam.apply(&CameraOp::SetWidth(4.0)).unwrap();
    assert!((cam.state().scale - 0.25).abs() < 1e-12);
    cam.apply(&CameraOp::SetHeight(18.0)).unwrap();
    assert!((cam.width() - 32.0).abs() < 1e-12);
}

#[test]
fn lerp_slerps_orientation() {
    let a = CameraState::default();
    let b = CameraState {
        center: RIGHT * 2.0,
        scale: 3.0,
        orientation: Quat::from_axis_angle(OUT, FRAC_PI_2),
    };
    let mid = CameraState::lerp(&a, &b, 0.5);
    assert!(mid.center.distance(RIGHT) < 1e-12);
    assert!((mid.scale - 2.0).abs() < 1e-12);
    let x = mid.orientation.rotate_vector(RIGHT);
    assert!((x.y.atan2(x.x) - FRAC_PI_2 / 2.0).abs() < 1e-9);
    assert_eq!(CameraState::lerp(&a, &b, 1.0), b);
}
