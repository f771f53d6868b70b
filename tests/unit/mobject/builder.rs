use super::*;
use crate::foundation::math::RIGHT;

#[test]
fn circle_has_radius_and_default_red_stroke() {
    let c = Mobject::circle(1.0);
    let b = c.bounds().unwrap();
    assert!((b.width() - 2.0).abs() < 1e-9);
    assert!((b.height() - 2.0).abs() < 1e-9);
    assert_eq!(c.style.stroke_color, palette::RED);
    assert_eq!(c.style.fill_opacity, 0.0);
}

#[test]
fn square_is_centered_and_white() {
    let s = Mobject::square(2.0);
    let b = s.bounds().unwrap();
    assert_eq!((b.min, b.max), (Vec3::xy(-1.0, -1.0), Vec3::xy(1.0, 1.0)));
    assert_eq!(s.style.stroke_color, palette::WHITE);
    assert_eq!(s.kind, ObjectKind::Polygon);
}

#[test]
fn placement_helpers_compose_transforms() {
    let s = Mobject::square(1.0).shifted(RIGHT * 2.0).scaled(2.0);
    let b = s.bounds().unwrap();
    assert!((b.center().x - 2.0).abs() < 1e-12);
    assert!((b.width() - 2.0).abs() < 1e-12);

    let moved = s.moved_to(Vec3::xy(-3.0, 1.0));
    assert!((moved.center() - Vec3::xy(-3.0, 1.0)).length() < 1e-12);
}

#[test]
fn style_setters_reach_children() {
    let g = Mobject::group([Mobject::dot(Vec3::ZERO), Mobject::square(1.0)]).with_color(palette::GREEN);
    assert!(g.children.iter().all(|c| c.style.fill_color == palette::GREEN));
    assert_eq!(g.family_len(), 3);
}

#[test]
fn regular_polygon_even_sides_sit_flat() {
    let hex = Mobject::regular_polygon(6, 1.0);
    let b = hex.bounds().unwrap();
    let pts: Vec<Vec3> = hex.geometry.unwrap().points();
    let bottom = pts.iter().filter(|p| (p.y - b.min.y).abs() < 1e-9).count();
    assert!(bottom >= 2);
}

#[test]
fn rounded_rectangle_stays_inside_its_box() {
    let r = Mobject::rounded_rectangle(4.0, 2.0, 0.5);
    let b = r.bounds().unwrap();
    assert!((b.width() - 4.0).abs() < 1e-6);
    assert!((b.height() - 2.0).abs() < 1e-6);
}

#[test]
fn ellipse_and_triangle_extents() {
    let e = Mobject::ellipse(4.0, 2.0);
    let b = e.bounds().unwrap();
    assert!((b.width() - 4.0).abs() < 1e-6);
    assert!((b.height() - 2.0).abs() < 1e-6);

    let t = Mobject::triangle(1.0);
    let b = t.bounds().unwrap();
    assert!((b.max.y - 1.0).abs() < 1e-12);
    assert!((b.min.y + 0.5).abs() < 1e-12);
}

#[test]
fn builder_chain_sets_children_style_and_size() {
    let g = Mobject::group([Mobject::square(1.0)])
        .with_child(Mobject::square(1.0).shifted(RIGHT * 3.0))
        .with_style(Style::filled(palette::YELLOW, 0.5));
    assert_eq!(g.family_len(), 3);
    assert!(g.children.iter().all(|c| c.style.fill_color == palette::YELLOW));

    let w = g.with_width(8.0);
    assert!((w.width() - 8.0).abs() < 1e-9);

    let r = Mobject::rectangle(2.0, 1.0).rotated(std::f64::consts::FRAC_PI_2);
    assert!((r.width() - 1.0).abs() < 1e-9);
    assert!((r.height() - 2.0).abs() < 1e-9);
}
