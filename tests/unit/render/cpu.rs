use super::*;

use crate::assets::image::{ImageLoader, MemoryImageLoader};
use crate::foundation::color::palette;
use crate::foundation::core::FrameIndex;
use crate::mobject::builder::Mobject;
use crate::render::display::emit;
use crate::scene::camera::Camera;
use crate::scene::graph::{NodeId, SceneGraph};

fn settings() -> RenderSettings {
    RenderSettings {
        pixel_width: 160,
        pixel_height: 90,
        frame_width: 16.0,
        frame_height: 9.0,
        clear_rgba: None,
    }
}

fn render(g: &SceneGraph) -> FrameRGBA {
    let frame = emit(g, &Camera::new(16.0, 9.0), FrameIndex(0), 0.0, palette::BLACK);
    CpuBackend::new(settings()).render_frame(&frame).unwrap()
}

fn add(g: &mut SceneGraph, m: Mobject) -> NodeId {
    let id = g.insert(m);
    g.attach(NodeId::ROOT, id).unwrap();
    id
}

#[test]
fn empty_frame_is_background() {
    let out = render(&SceneGraph::default());
    assert_eq!((out.width, out.height), (160, 90));
    assert!(out.premultiplied);
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(80, 45), Some([0, 0, 0, 255]));
}

#[test]
fn filled_square_covers_the_center() {
    let mut g = SceneGraph::default();
    add(&mut g, Mobject::square(2.0).with_fill(palette::WHITE, 1.0));
    let out = render(&g);
    assert_eq!(out.pixel(80, 45), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(5, 5), Some([0, 0, 0, 255]));
}

#[test]
fn fill_opacity_blends_over_the_background() {
    let mut g = SceneGraph::default();
    add(
        &mut g,
        Mobject::square(2.0)
            .with_fill(palette::WHITE, 0.5)
            .with_stroke_width(0.0),
    );
    let [r, _, _, a] = render(&g).pixel(80, 45).unwrap();
    assert!((i32::from(r) - 128).abs() <= 2, "r = {r}");
    assert_eq!(a, 255);
}

#[test]
fn images_fill_their_quad() {
    let loader = MemoryImageLoader::new();
    loader.insert_solid("red", 4, 4, [255, 0, 0, 255]).unwrap();
    let handle = loader.load("red").unwrap();
    let mut g = SceneGraph::default();
    add(
        &mut g,
        Mobject::leaf(
            crate::mobject::style::ObjectKind::Image,
            Geometry::Image(ImageGeom::centered(handle, 2.0)),
            Style::filled(palette::WHITE, 1.0),
        ),
    );
    let out = render(&g);
    let [r, gr, b, a] = out.pixel(80, 45).unwrap();
    assert!(r > 250 && gr < 5 && b < 5 && a == 255);
    assert_eq!(out.pixel(40, 45), Some([0, 0, 0, 255]));
}

#[test]
fn clip_hides_outside_pixels() {
    let mut g = SceneGraph::default();
    let id = add(&mut g, Mobject::square(4.0).with_fill(palette::WHITE, 1.0));
    let clip = Bounds::from_points([Vec3::xy(0.0, -2.0), Vec3::xy(2.0, 2.0)]).unwrap();
    g.node_mut(id).unwrap().set_clip(Some(clip));
    let out = render(&g);
    assert_eq!(out.pixel(90, 45), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(70, 45), Some([0, 0, 0, 255]));
}

#[test]
fn clear_override_wins() {
    let mut s = settings();
    s.clear_rgba = Some([0, 0, 255, 255]);
    let frame = emit(
        &SceneGraph::default(),
        &Camera::new(16.0, 9.0),
        FrameIndex(0),
        0.0,
        palette::BLACK,
    );
    let out = CpuBackend::new(s).render_frame(&frame).unwrap();
    assert_eq!(out.pixel(3, 3), Some([0, 0, 255, 255]));
}

#[test]
fn oversized_surfaces_are_rejected() {
    let mut s = settings();
    s.pixel_width = 70_000;
    let frame = emit(
        &SceneGraph::default(),
        &Camera::new(16.0, 9.0),
        FrameIndex(0),
        0.0,
        palette::BLACK,
    );
    assert!(CpuBackend::new(s).render_frame(&frame).is_err());
}
