use super::*;

use crate::animation::tween::{animate, animate_camera, animate_tracker};
use crate::foundation::math::RIGHT;
use crate::scene::tracker::TrackerId;

#[test]
fn default_eases_follow_the_animation_kind() {
    assert_eq!(Animation::fade_in(NodeId(1)).effective_ease(), Ease::Smooth);
    assert_eq!(Animation::indicate(NodeId(1)).effective_ease(), Ease::ThereAndBack);
    assert_eq!(Animation::pause(1.0).effective_ease(), Ease::Linear);
    assert_eq!(
        Animation::from(animate_tracker(TrackerId(0)).set_value(1.0)).effective_ease(),
        Ease::Linear
    );
    assert_eq!(
        Animation::create(NodeId(1)).ease(Ease::InQuad).effective_ease(),
        Ease::InQuad
    );
}

#[test]
fn builders_carry_timing_from_tweens() {
    let a = Animation::from(animate(NodeId(2)).shift(RIGHT).run_time(3.0).ease(Ease::Linear));
    assert_eq!(a.run_time, Some(3.0));
    assert_eq!(a.ease, Some(Ease::Linear));
    let cam = Animation::from(animate_camera().scale(0.5));
    assert_eq!(cam.run_time, None);
}

#[test]
fn compositions_set_lag_ratio() {
    let group = Animation::group([Animation::fade_in(NodeId(1)), Animation::fade_in(NodeId(2))]);
    assert_eq!(group.lag_ratio, Some(0.0));
    assert_eq!(Animation::succession([Animation::pause(1.0)]).lag_ratio, Some(1.0));
    let mapped = Animation::lagged_start_map(Animation::fade_in, [NodeId(4), NodeId(5)], 0.3);
    let AnimKind::Group(children) = &mapped.kind else {
        panic!("expected a group");
    };
    assert_eq!(children.len(), 2);
    assert_eq!(mapped.lag_ratio, Some(0.3));
}

#[test]
fn referenced_nodes_cover_nested_groups() {
    let anim = Animation::group([
        Animation::transform(NodeId(1), NodeId(2)),
        Animation::lagged_start(
            [
                Animation::move_along_path(NodeId(3), NodeId(4)),
                Animation::from(animate(NodeId(5)).next_to(NodeId(6), RIGHT, 0.1)),
            ],
            0.5,
        ),
        Animation::flash(RIGHT, palette::YELLOW),
    ]);
    let mut ids = anim.referenced_nodes();
    ids.sort();
    assert_eq!(ids, (1..=6).map(NodeId).collect::<Vec<_>>());
}

#[test]
fn alpha_func_is_debuggable() {
    let anim = Animation::update_from_alpha_func(NodeId(1), |_, _| {});
    assert!(format!("{anim:?}").contains("UpdateFromAlphaFunc"));
}
