use super::*;

#[test]
fn local_point_round_trips() {
    let cfg = AxesConfig {
        x_range: [0.0, 10.0, 1.0],
        y_range: [-1.0, 1.0, 0.5],
        width: 10.0,
        height: 4.0,
        ..AxesConfig::default()
    };
    let p = cfg.local_point(5.0, 0.0);
    assert!(p.length() < 1e-12);
    let q = cfg.local_point(10.0, 1.0);
    assert!((q - Vec3::xy(5.0, 2.0)).length() < 1e-12);
    let (x, y) = cfg.local_to_data(q);
    assert!((x - 10.0).abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
}

#[test]
fn build_has_axes_and_ticks() {
    let m = AxesConfig::default().build();
    let names: Vec<_> = m.children.iter().filter_map(|c| c.name.as_deref()).collect();
    assert_eq!(names, ["x_axis", "y_axis", "ticks"]);
    let b = m.bounds().unwrap();
    assert!((b.width() - 12.0).abs() < 1e-9);
}

#[test]
fn invalid_ranges_are_rejected() {
    let cfg = AxesConfig {
        x_range: [1.0, 1.0, 1.0],
        ..AxesConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn graph_samples_through_function() {
    let cfg = AxesConfig::default();
    let g = cfg.graph(|x| x * 0.5, Some([0.0, 2.0]), &Affine3::IDENTITY);
    let b = g.bounds().unwrap();
    assert!((b.min.x - cfg.local_point(0.0, 0.0).x).abs() < 1e-9);
    assert!((b.max.y - cfg.local_point(2.0, 1.0).y).abs() < 1e-6);
}
