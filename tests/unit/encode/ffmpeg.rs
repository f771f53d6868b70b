use super::*;

use crate::foundation::color::palette;

fn settings(width: u32, height: u32) -> VideoSettings {
    VideoSettings::from_config(&SceneConfig {
        pixel_width: width,
        pixel_height: height,
        fps: 12,
        ..SceneConfig::default()
    })
}

fn arg_after<'a>(args: &'a [OsString], flag: &str) -> Option<&'a str> {
    let i = args.iter().position(|a| a == flag)?;
    args.get(i + 1)?.to_str()
}

#[test]
fn settings_follow_the_scene_config() {
    let s = settings(320, 180);
    assert_eq!((s.width, s.height, s.fps), (320, 180, 12));
    assert_eq!(s.background, palette::BLACK);
    assert_eq!(s.crf, DEFAULT_CRF);
    assert_eq!(s.with_crf(90).crf, 51);
}

#[test]
fn args_describe_the_raw_input_and_output() {
    let args = settings(320, 180).with_crf(23).ffmpeg_args(Path::new("out/clip.mp4"));
    assert_eq!(arg_after(&args, "-video_size"), Some("320x180"));
    assert_eq!(arg_after(&args, "-framerate"), Some("12"));
    assert_eq!(arg_after(&args, "-crf"), Some("23"));
    assert_eq!(arg_after(&args, "-i"), Some("pipe:0"));
    assert!(!args.iter().any(|a| a == "-vf"));
    assert_eq!(args.last().and_then(|a| a.to_str()), Some("out/clip.mp4"));
}

#[test]
fn odd_sizes_are_padded_not_rejected() {
    let args = settings(321, 180).ffmpeg_args(Path::new("clip.mp4"));
    assert_eq!(arg_after(&args, "-vf"), Some("pad=ceil(iw/2)*2:ceil(ih/2)*2"));
}

#[test]
fn encoder_writes_an_mp4_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let out = std::env::temp_dir().join(format!("choreo_ffmpeg_{}.mp4", std::process::id()));
    let mut enc = FfmpegEncoder::create(&out, settings(16, 16)).unwrap();
    let frame = FrameRGBA {
        width: 16,
        height: 16,
        data: [255, 255, 255, 128].repeat(256),
        premultiplied: false,
    };
    for _ in 0..3 {
        enc.write_frame(&frame).unwrap();
    }
    let mut wrong = frame.clone();
    wrong.width = 8;
    assert!(enc.write_frame(&wrong).is_err());
    assert_eq!(enc.frames_written(), 3);

    enc.finish().unwrap();
    enc.finish().unwrap();
    assert!(enc.write_frame(&frame).is_err());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
    let _ = std::fs::remove_file(&out);
}
