use super::*;

fn square(side: f64) -> VectorPath {
    let h = side / 2.0;
    VectorPath::from_subpath(Subpath::from_corners(
        &[
            Vec3::xy(h, h),
            Vec3::xy(-h, h),
            Vec3::xy(-h, -h),
            Vec3::xy(h, -h),
        ],
        true,
    ))
}

#[test]
fn closed_corners_get_a_return_segment() {
    let sq = square(2.0);
    assert_eq!(sq.curve_count(), 4);
    assert_eq!(sq.start(), sq.end());
    let b = sq.bounds().unwrap();
    assert_eq!((b.width(), b.height()), (2.0, 2.0));
}

#[test]
fn line_cubics_are_linearly_parametrized() {
    let c = Cubic::line(Vec3::ZERO, Vec3::xy(9.0, 0.0));
    assert!((c.eval(1.0 / 3.0).x - 3.0).abs() < 1e-12);
    let (a, b) = c.split(0.5);
    assert!((a.end().x - 4.5).abs() < 1e-12);
    assert_eq!(b.end(), Vec3::xy(9.0, 0.0));
}

#[test]
fn arc_length_of_unit_circle_is_two_pi() {
    let circle = VectorPath::from_subpath(Subpath::arc(
        Vec3::ZERO,
        1.0,
        0.0,
        std::f64::consts::TAU,
        8,
    ));
    assert!((circle.arc_length() - std::f64::consts::TAU).abs() < 1e-3);
}

#[test]
fn point_at_proportion_walks_arc_length() {
    let path = VectorPath::from_subpath(Subpath::from_corners(
        &[Vec3::ZERO, Vec3::xy(1.0, 0.0), Vec3::xy(1.0, 3.0)],
        false,
    ));
    let p = path.point_at_proportion(0.5).unwrap();
    assert!((p - Vec3::xy(1.0, 1.0)).length() < 1e-9);
    assert_eq!(path.point_at_proportion(1.0), Some(Vec3::xy(1.0, 3.0)));
}

#[test]
fn partial_preserves_structure_and_collapses_the_rest() {
    let sq = square(2.0);
    let half = sq.partial(0.0, 0.5);
    assert!(half.is_aligned_with(&sq));
    assert!(!half.subpaths[0].closed);
    let tail = half.subpaths[0].curves[3];
    assert_eq!(tail, Cubic::point(Vec3::xy(-1.0, -1.0)));
    assert_eq!(sq.partial(0.0, 1.0), sq);
}

#[test]
fn alignment_matches_counts_and_keeps_shape() {
    let tri = VectorPath::from_subpath(Subpath::from_corners(
        &[Vec3::xy(0.0, 1.0), Vec3::xy(-1.0, -1.0), Vec3::xy(1.0, -1.0)],
        true,
    ));
    let circle = VectorPath::from_subpath(Subpath::arc(Vec3::ZERO, 1.0, 0.0, 6.28, 8));
    let (a, b) = VectorPath::aligned(&tri, &circle, Vec3::ZERO);
    assert!(a.is_aligned_with(&b));
    assert_eq!(a.curve_count(), 8);
    let (ba, bt) = (a.bounds().unwrap(), tri.bounds().unwrap());
    assert!((ba.min - bt.min).length() < 1e-12 && (ba.max - bt.max).length() < 1e-12);
    assert_eq!(VectorPath::lerp(&a, &b, 1.0), b);
    assert_eq!(VectorPath::lerp(&a, &b, 0.0), a);
}

#[test]
fn alignment_pads_missing_subpaths() {
    let one = square(1.0);
    let mut two = square(1.0);
    two.subpaths.push(square(0.5).subpaths.remove(0));
    let (a, b) = VectorPath::aligned(&one, &two, Vec3::ZERO);
    assert_eq!(a.subpaths.len(), 2);
    assert!(a.is_aligned_with(&b));
}

#[test]
fn smooth_through_passes_every_point() {
    let pts = [Vec3::ZERO, Vec3::xy(1.0, 1.0), Vec3::xy(2.0, 0.0), Vec3::xy(3.0, 1.0)];
    let sp = Subpath::smooth_through(&pts, false);
    assert_eq!(sp.curves.len(), 3);
    for (c, p) in sp.curves.iter().zip(pts.iter()) {
        assert_eq!(c.start(), *p);
    }
    // C1: handles on either side of an interior anchor are collinear and equal length.
    let a = sp.curves[0].0[2];
    let b = sp.curves[1].0[1];
    assert!(((pts[1] - a) - (b - pts[1])).length() < 1e-12);
}
