use super::*;

const SAMPLE: &str = r##"{
  "config": { "fps": 15 },
  "scenes": {
    "intro": {
      "objects": [
        { "name": "c", "kind": "circle", "color": "BLUE", "add": true },
        { "name": "t", "kind": "text", "text": "hello" }
      ],
      "trackers": { "x": 0.5 },
      "commands": [
        { "op": "play", "animations": [
            { "type": "write", "target": "t", "run_time": 2.0 },
            { "type": "animate", "target": "c", "edits": [
                { "edit": "shift", "by": [1, 0, 0] },
                { "edit": "set_color", "color": "#FF0000" }
            ], "ease": "linear" }
        ] },
        { "op": "wait" },
        { "op": "camera_save" }
      ]
    }
  }
}"##;

#[test]
fn parses_a_scene_file_with_defaults() {
    let file = SceneFile::from_json(SAMPLE).unwrap();
    assert_eq!(file.config.fps, 15);
    assert_eq!(file.config.pixel_width, 1920);
    assert_eq!(file.scene_names().collect::<Vec<_>>(), vec!["intro"]);

    let scene = file.scene("intro").unwrap();
    assert_eq!(scene.objects.len(), 2);
    assert!(scene.objects[0].add);
    assert!(matches!(scene.objects[0].shape, ShapeSpec::Circle { radius } if radius == 1.0));
    assert!(matches!(
        &scene.objects[1].shape,
        ShapeSpec::Text { font_size, .. } if *font_size == DEFAULT_FONT_SIZE
    ));
    assert_eq!(scene.trackers["x"], 0.5);

    let Command::Play { animations, run_time } = &scene.commands[0] else {
        panic!("expected play");
    };
    assert_eq!(*run_time, None);
    assert_eq!(animations[0].run_time, Some(2.0));
    assert_eq!(animations[1].ease, Some(Ease::Linear));
    assert!(matches!(scene.commands[1], Command::Wait { seconds } if seconds == 1.0));
    assert!(matches!(scene.commands[2], Command::CameraSave));
}

#[test]
fn empty_and_duplicate_declarations_are_rejected() {
    let err = SceneFile::from_json(r#"{ "scenes": {} }"#).unwrap_err();
    assert!(matches!(err, ChoreoError::Validation(_)));

    let dup = r#"{ "scenes": { "a": { "objects": [
        { "name": "x", "kind": "square" },
        { "name": "x", "kind": "circle" }
    ] } } }"#;
    assert!(SceneFile::from_json(dup).is_err());

    let bad_fps = r#"{ "config": { "fps": 0 }, "scenes": { "a": {} } }"#;
    assert!(SceneFile::from_json(bad_fps).is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SceneFile::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ChoreoError::Serde(_)));
    let err = SceneFile::from_json(r#"{ "scenes": { "a": { "commands": [ { "op": "fly" } ] } } }"#)
        .unwrap_err();
    assert!(matches!(err, ChoreoError::Serde(_)));
}

#[test]
fn unknown_scene_names_fail() {
    let file = SceneFile::from_json(SAMPLE).unwrap();
    assert!(file.scene("outro").is_err());
}

#[test]
fn target_refs_parse_slices() {
    assert_eq!(
        TargetRef::parse("eq").unwrap(),
        TargetRef {
            name: "eq",
            range: None
        }
    );
    assert_eq!(
        TargetRef::parse(" eq[1..3] ").unwrap(),
        TargetRef {
            name: "eq",
            range: Some(1..3)
        }
    );
    assert!(TargetRef::parse("eq[1..").is_err());
    assert!(TargetRef::parse("eq[1]").is_err());
    assert!(TargetRef::parse("eq[a..2]").is_err());
}

#[test]
fn serializes_back_to_the_same_shape() {
    let file = SceneFile::from_json(SAMPLE).unwrap();
    let text = serde_json::to_string(&file).unwrap();
    let again = SceneFile::from_json(&text).unwrap();
    assert_eq!(again.scene("intro").unwrap().commands.len(), 3);
}
