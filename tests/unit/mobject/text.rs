use super::*;
use crate::assets::typeset::{BlockTypesetter, TypesetRequest, Typesetter};

#[test]
fn glyph_children_follow_run_order_and_center() {
    let run = BlockTypesetter.typeset(&TypesetRequest::plain("abc", 48.0)).unwrap();
    let m = Mobject::from_glyph_run(&run, "abc", TextMode::Plain);
    assert_eq!(m.children.len(), 3);
    let names: Vec<_> = m.children.iter().filter_map(|c| c.name.as_deref()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert!(m.center().length() < 1e-9);
    assert_eq!(m.name.as_deref(), Some("text:abc"));
    assert!(m.children.iter().all(|c| c.kind == ObjectKind::Glyph));
}
