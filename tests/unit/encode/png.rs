use super::*;

use crate::foundation::color::palette;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "choreo_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: rgba.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn writes_numbered_frames() {
    let dir = temp_dir("png_numbered");
    let mut w = PngSequenceWriter::new(&dir, palette::BLACK).unwrap();
    w.write_frame(&solid(4, 2, [255, 0, 0, 255])).unwrap();
    w.write_frame(&solid(4, 2, [0, 0, 0, 0])).unwrap();
    w.finish().unwrap();
    assert_eq!(w.frames_written(), 2);

    let first = image::open(w.frame_path(0)).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (4, 2));
    assert_eq!(first.get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert!(w.frame_path(1).ends_with("frame_00001.png"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn transparent_pixels_take_the_background() {
    let dir = temp_dir("png_background");
    let mut w = PngSequenceWriter::new(&dir, Color::rgb_u8(0, 0, 255)).unwrap();
    w.write_frame(&solid(2, 2, [0, 0, 0, 0])).unwrap();
    let img = image::open(w.frame_path(0)).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let dir = temp_dir("png_mismatch");
    let mut w = PngSequenceWriter::new(&dir, palette::BLACK).unwrap();
    let mut frame = solid(2, 2, [9, 9, 9, 255]);
    frame.height = 3;
    assert!(w.write_frame(&frame).is_err());
    assert_eq!(w.frames_written(), 0);
    let _ = std::fs::remove_dir_all(&dir);
}
