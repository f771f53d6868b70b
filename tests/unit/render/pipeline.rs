use super::*;

use crate::foundation::color::palette;
use crate::foundation::core::FrameIndex;
use crate::foundation::math::RIGHT;
use crate::mobject::builder::Mobject;
use crate::render::display::emit;
use crate::scene::camera::Camera;
use crate::scene::graph::{NodeId, SceneGraph};

fn settings() -> RenderSettings {
    RenderSettings {
        pixel_width: 64,
        pixel_height: 36,
        frame_width: 16.0,
        frame_height: 9.0,
        clear_rgba: None,
    }
}

/// Three frames of a still square followed by two frames with it moved.
fn frames() -> Vec<Frame> {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::square(2.0).with_fill(palette::WHITE, 1.0));
    g.attach(NodeId::ROOT, id).unwrap();
    let cam = Camera::new(16.0, 9.0);
    let mut out = Vec::new();
    for i in 0..5u64 {
        if i == 3 {
            g.node_mut(id).unwrap().shift(RIGHT * 3.0);
        }
        out.push(emit(&g, &cam, FrameIndex(i), i as f64 / 30.0, palette::BLACK));
    }
    out
}

#[test]
fn serial_renders_every_frame() {
    let mut backend = CpuBackend::new(settings());
    let mut seen = 0;
    let stats = render_frames_with_stats(&frames(), &mut backend, &RenderThreading::default(), |f| {
        assert_eq!((f.width, f.height), (64, 36));
        seen += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, 5);
    assert_eq!(
        stats,
        RenderStats {
            frames_total: 5,
            frames_rendered: 5,
            frames_elided: 0,
        }
    );
}

#[test]
fn parallel_matches_serial_output() {
    let input = frames();
    let serial = render_frames(
        &input,
        &mut CpuBackend::new(settings()),
        &RenderThreading::default(),
    )
    .unwrap();
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 2,
        threads: Some(2),
        static_frame_elision: false,
    };
    let parallel = render_frames(&input, &mut CpuBackend::new(settings()), &threading).unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn static_frames_are_rendered_once() {
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 64,
        threads: Some(2),
        static_frame_elision: true,
    };
    let mut out = Vec::new();
    let stats = render_frames_with_stats(
        &frames(),
        &mut CpuBackend::new(settings()),
        &threading,
        |f| {
            out.push(f);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(stats.frames_total, 5);
    assert_eq!(stats.frames_rendered, 2);
    assert_eq!(stats.frames_elided, 3);
    assert_eq!(out[0], out[2]);
    assert_eq!(out[3], out[4]);
    assert_ne!(out[0], out[3]);
}

#[test]
fn zero_threads_is_rejected() {
    let threading = RenderThreading {
        parallel: true,
        threads: Some(0),
        ..RenderThreading::default()
    };
    let err = render_frames(&frames(), &mut CpuBackend::new(settings()), &threading).unwrap_err();
    assert!(matches!(err, ChoreoError::Validation(_)));
}
