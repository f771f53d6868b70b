//! Per-frame callbacks bound to nodes.
//!
//! Updaters run in registration order after animations apply and before a frame is emitted.
//! They receive a [`NodeMut`] for their target, which exposes no way to add or remove nodes.

use crate::foundation::error::ChoreoResult;
use crate::scene::graph::{NodeId, NodeMut, SceneGraph};
use crate::scene::tracker::{TrackerId, TrackerStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdaterId(pub u64);

/// What an updater may read besides its target.
pub struct UpdateContext<'a> {
    /// Scene clock in seconds.
    pub time: f64,
    /// Seconds since the previous updater pass.
    pub dt: f64,
    pub trackers: &'a TrackerStore,
}

impl UpdateContext<'_> {
    pub fn value(&self, id: TrackerId) -> f64 {
        self.trackers.value(id)
    }
}

pub type UpdaterFn = Box<dyn FnMut(&mut NodeMut<'_>, &UpdateContext<'_>)>;

struct Entry {
    id: UpdaterId,
    target: NodeId,
    f: UpdaterFn,
}

#[derive(Default)]
pub struct UpdaterRegistry {
    entries: Vec<Entry>,
    next: u64,
}

impl std::fmt::Debug for UpdaterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.id, e.target)))
            .finish()
    }
}

impl UpdaterRegistry {
    pub fn add(&mut self, target: NodeId, f: UpdaterFn) -> UpdaterId {
        let id = UpdaterId(self.next);
        self.next += 1;
        self.entries.push(Entry { id, target, f });
        id
    }

    pub fn remove(&mut self, id: UpdaterId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every updater bound to `target`; returns how many were removed.
    pub fn clear_target(&mut self, target: NodeId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.target != target);
        before - self.entries.len()
    }

    /// Drop updaters whose targets have left the scene.
    pub fn prune(&mut self, graph: &SceneGraph) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| graph.is_attached(e.target));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!(dropped, "pruned updaters of removed nodes");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.target)
    }

    pub fn run(&mut self, graph: &mut SceneGraph, ctx: &UpdateContext<'_>) -> ChoreoResult<()> {
        for entry in &mut self.entries {
            if !graph.is_attached(entry.target) {
                continue;
            }
            let mut node = graph.node_mut(entry.target)?;
            (entry.f)(&mut node, ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/updater.rs"]
mod tests;
