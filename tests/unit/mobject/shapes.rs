use super::*;
use crate::foundation::math::{DOWN, RIGHT};
use crate::mobject::geometry::Geometry;

fn path_of(m: &Mobject) -> &VectorPath {
    match m.geometry.as_ref() {
        Some(Geometry::Path(p)) => p,
        _ => panic!("expected a path"),
    }
}

#[test]
fn arrow_trims_buff_and_ends_at_apex() {
    let a = Mobject::arrow(Vec3::ZERO, RIGHT * 4.0, ArrowStyle::default());
    assert_eq!(a.children.len(), 2);
    let shaft = path_of(&a.children[0]);
    let tip = path_of(&a.children[1]);
    assert!((shaft.start().unwrap().x - 0.25).abs() < 1e-12);
    assert!((tip.end().unwrap().x - 3.75).abs() < 1e-12);
    // Tip length is capped at a quarter of the trimmed length.
    assert!((shaft.end().unwrap().x - (3.75 - 0.35)).abs() < 1e-12);
}

#[test]
fn short_arrows_shrink_their_tip() {
    let a = Mobject::arrow(Vec3::ZERO, RIGHT, ArrowStyle { buff: 0.0, ..ArrowStyle::default() });
    let shaft = path_of(&a.children[0]);
    assert!((shaft.end().unwrap().x - 0.75).abs() < 1e-12);
}

#[test]
fn brace_sits_below_target() {
    let target = Bounds::from_points([Vec3::xy(-1.0, -1.0), Vec3::xy(1.0, 1.0)]).unwrap();
    let brace = Mobject::brace(target, DOWN, 0.2);
    let b = brace.bounds().unwrap();
    assert!(b.max.y <= -1.2 + 1e-9);
    // Spline handles may overshoot the span slightly.
    assert!((b.width() - 2.0).abs() < 0.15);
}

#[test]
fn surrounding_rectangle_adds_buff() {
    let target = Bounds::from_points([Vec3::xy(0.0, 0.0), Vec3::xy(2.0, 1.0)]).unwrap();
    let r = Mobject::surrounding_rectangle(target, Mobject::SURROUND_BUFF);
    let b = r.bounds().unwrap();
    assert!((b.width() - 2.2).abs() < 1e-12);
    assert!((b.center() - Vec3::xy(1.0, 0.5)).length() < 1e-12);
    assert_eq!(r.style.stroke_color, palette::YELLOW);
}

#[test]
fn glow_dot_draws_outer_layers_first() {
    let g = Mobject::glow_dot(Vec3::ZERO, 0.1, palette::BLUE);
    let first = g.children.first().unwrap();
    let last = g.children.last().unwrap();
    assert!(first.width() > last.width());
    assert!(first.style.fill_opacity < last.style.fill_opacity);
}
