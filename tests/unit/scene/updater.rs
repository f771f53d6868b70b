use super::*;

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::{RIGHT, Vec3};
use crate::mobject::builder::Mobject;

fn graph_with_dot() -> (SceneGraph, NodeId) {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::dot(Vec3::ZERO));
    g.attach(NodeId::ROOT, id).unwrap();
    (g, id)
}

fn ctx(trackers: &TrackerStore, time: f64, dt: f64) -> UpdateContext<'_> {
    UpdateContext { time, dt, trackers }
}

#[test]
fn updaters_run_in_registration_order() {
    let (mut g, id) = graph_with_dot();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut reg = UpdaterRegistry::default();
    for tag in ["first", "second", "third"] {
        let log = Rc::clone(&log);
        reg.add(id, Box::new(move |_, _| log.borrow_mut().push(tag)));
    }
    let trackers = TrackerStore::default();
    reg.run(&mut g, &ctx(&trackers, 0.0, 0.0)).unwrap();
    assert_eq!(*log.borrow(), ["first", "second", "third"]);
}

#[test]
fn updaters_see_dt_and_trackers() {
    let (mut g, id) = graph_with_dot();
    let mut trackers = TrackerStore::default();
    let speed = trackers.create(2.0);
    let mut reg = UpdaterRegistry::default();
    reg.add(
        id,
        Box::new(move |node, ctx| {
            node.shift(RIGHT * (ctx.value(speed) * ctx.dt));
        }),
    );
    reg.run(&mut g, &ctx(&trackers, 0.5, 0.5)).unwrap();
    assert!((g.bounds(id).unwrap().center().x - 1.0).abs() < 1e-12);
}

#[test]
fn detached_targets_are_skipped_then_pruned() {
    let (mut g, id) = graph_with_dot();
    let calls = Rc::new(RefCell::new(0));
    let mut reg = UpdaterRegistry::default();
    let counter = Rc::clone(&calls);
    reg.add(id, Box::new(move |_, _| *counter.borrow_mut() += 1));
    g.detach(id);
    let trackers = TrackerStore::default();
    reg.run(&mut g, &ctx(&trackers, 0.0, 0.0)).unwrap();
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(reg.prune(&g), 1);
    assert!(reg.is_empty());
}

#[test]
fn remove_and_clear() {
    let (_, id) = graph_with_dot();
    let mut reg = UpdaterRegistry::default();
    let a = reg.add(id, Box::new(|_, _| {}));
    reg.add(id, Box::new(|_, _| {}));
    reg.add(NodeId(9), Box::new(|_, _| {}));
    assert!(reg.remove(a));
    assert!(!reg.remove(a));
    assert_eq!(reg.clear_target(id), 1);
    assert_eq!(reg.targets().collect::<Vec<_>>(), vec![NodeId(9)]);
}
