//! Arena-backed scene graph.
//!
//! Nodes are never freed: a removed node is merely detached, so [`NodeId`]s held by
//! animations, updaters and selections stay valid for the scene's lifetime. A node is in the
//! scene when its parent chain reaches [`NodeId::ROOT`].

use std::collections::HashSet;

use crate::foundation::color::Color;
use crate::foundation::core::FrameDims;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Bounds, OUT, Vec3};
use crate::mobject::builder::Mobject;
use crate::mobject::geometry::Geometry;
use crate::mobject::style::{ObjectKind, Style, StyleEdit};
use crate::scene::family::NodeState;
use crate::scene::ops::{self, MobjectOp};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered, non-owning set of nodes used as an animation or mutation target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection(pub Vec<NodeId>);

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<NodeId> {
        self.0.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }
}

impl From<NodeId> for Selection {
    fn from(id: NodeId) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<NodeId>> for Selection {
    fn from(ids: Vec<NodeId>) -> Self {
        Self(ids)
    }
}

impl From<&[NodeId]> for Selection {
    fn from(ids: &[NodeId]) -> Self {
        Self(ids.to_vec())
    }
}

impl<const N: usize> From<[NodeId; N]> for Selection {
    fn from(ids: [NodeId; N]) -> Self {
        Self(ids.to_vec())
    }
}

impl From<&Selection> for Selection {
    fn from(s: &Selection) -> Self {
        s.clone()
    }
}

impl FromIterator<NodeId> for Selection {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: ObjectKind,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) transform: Affine3,
    pub(crate) style: Style,
    pub(crate) z_index: i32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) name: Option<String>,
    /// World-space clip rectangle, inherited by descendants.
    pub(crate) clip: Option<Bounds>,
    pub(crate) saved: Option<Vec<(NodeId, NodeState)>>,
    /// Slot is on the free list.
    released: bool,
}

impl Node {
    fn group() -> Self {
        Self {
            kind: ObjectKind::Group,
            geometry: None,
            transform: Affine3::IDENTITY,
            style: Style::default(),
            z_index: 0,
            parent: None,
            children: Vec::new(),
            name: None,
            clip: None,
            saved: None,
            released: false,
        }
    }

    fn released() -> Self {
        Self {
            released: true,
            ..Self::group()
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn transform(&self) -> &Affine3 {
        &self.transform
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn clip(&self) -> Option<Bounds> {
        self.clip
    }

    pub fn has_saved_state(&self) -> bool {
        self.saved.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    dims: FrameDims,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(FrameDims::default())
    }
}

impl SceneGraph {
    pub fn new(dims: FrameDims) -> Self {
        let mut root = Node::group();
        root.name = Some("root".to_string());
        Self {
            nodes: vec![root],
            free: Vec::new(),
            dims,
        }
    }

    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    /// Live nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| !n.released)
    }

    pub fn node(&self, id: NodeId) -> ChoreoResult<&Node> {
        self.nodes
            .get(id.index())
            .filter(|n| !n.released)
            .ok_or_else(|| ChoreoError::unknown_target(format!("node {id} does not exist")))
    }

    pub(crate) fn node_data_mut(&mut self, id: NodeId) -> ChoreoResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .filter(|n| !n.released)
            .ok_or_else(|| ChoreoError::unknown_target(format!("node {id} does not exist")))
    }

    /// Store `node` in a released slot when one is free.
    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() as u32 - 1)
            }
        }
    }

    /// Detach `id` and return its whole family to the free list. Its ids become unknown.
    pub(crate) fn release(&mut self, id: NodeId) {
        if id == NodeId::ROOT || !self.contains(id) {
            return;
        }
        self.detach(id);
        for n in self.family(id) {
            self.nodes[n.index()] = Node::released();
            self.free.push(n);
        }
    }

    pub(crate) fn ensure(&self, ids: &[NodeId]) -> ChoreoResult<()> {
        match ids.iter().find(|id| !self.contains(**id)) {
            Some(id) => Err(ChoreoError::unknown_target(format!("node {id} does not exist"))),
            None => Ok(()),
        }
    }

    /// Insert a detached copy of `m` (and its children); returns the new root id.
    pub fn insert(&mut self, m: Mobject) -> NodeId {
        self.insert_under(m, None)
    }

    fn insert_under(&mut self, m: Mobject, parent: Option<NodeId>) -> NodeId {
        let Mobject {
            kind,
            geometry,
            style,
            transform,
            z_index,
            name,
            children,
        } = m;
        let id = self.alloc(Node {
            kind,
            geometry,
            transform,
            style,
            z_index,
            parent,
            children: Vec::new(),
            name,
            clip: None,
            saved: None,
            released: false,
        });
        let kids = children
            .into_iter()
            .map(|c| self.insert_under(c, Some(id)))
            .collect();
        self.nodes[id.index()].children = kids;
        id
    }

    /// Value snapshot of a node and its subtree in its local frame.
    pub fn to_mobject(&self, id: NodeId) -> Mobject {
        let n = &self.nodes[id.index()];
        Mobject {
            kind: n.kind,
            geometry: n.geometry.clone(),
            style: n.style,
            transform: n.transform,
            z_index: n.z_index,
            name: n.name.clone(),
            children: n.children.iter().map(|c| self.to_mobject(*c)).collect(),
        }
    }

    /// Detached clone of `id`'s subtree under fresh ids. Saved states are not carried over.
    pub fn deep_copy(&mut self, id: NodeId) -> ChoreoResult<NodeId> {
        self.node(id)?;
        Ok(self.copy_under(id, None))
    }

    fn copy_under(&mut self, src: NodeId, parent: Option<NodeId>) -> NodeId {
        let mut copy = self.nodes[src.index()].clone();
        let kids = std::mem::take(&mut copy.children);
        copy.parent = parent;
        copy.saved = None;
        let id = self.alloc(copy);
        let new_kids = kids.into_iter().map(|c| self.copy_under(c, Some(id))).collect();
        self.nodes[id.index()].children = new_kids;
        id
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        let mut steps = 0;
        while let Some(n) = cur {
            if n == NodeId::ROOT {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cur = self.nodes.get(n.index()).and_then(|node| node.parent);
        }
        false
    }

    /// Highest ancestor of `id` that is not the root (`id` itself when it has no parent).
    pub fn top_ancestor(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.nodes[cur.index()].parent {
            if p == NodeId::ROOT {
                break;
            }
            cur = p;
        }
        cur
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.nodes.get(id.index()).and_then(|n| n.parent);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n.index()].parent;
        }
        false
    }

    /// Append `child` to `parent`'s children, detaching it from any previous parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> ChoreoResult<()> {
        self.ensure(&[parent, child])?;
        if child == NodeId::ROOT {
            return Err(ChoreoError::validation("the root cannot be re-parented"));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(ChoreoError::validation(format!(
                "attaching {child} under {parent} would create a cycle"
            )));
        }
        if self.nodes[child.index()].parent == Some(parent) {
            return Ok(());
        }
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Insert `child` at position `index` of `parent`'s children (clamped to the end).
    pub fn attach_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> ChoreoResult<()> {
        self.attach(parent, child)?;
        let kids = &mut self.nodes[parent.index()].children;
        if let Some(pos) = kids.iter().position(|c| *c == child) {
            kids.remove(pos);
            kids.insert(index.min(kids.len()), child);
        }
        Ok(())
    }

    /// Remove `id` from its parent's child list. The subtree stays intact but leaves the scene.
    pub fn detach(&mut self, id: NodeId) {
        if id == NodeId::ROOT || !self.contains(id) {
            return;
        }
        if let Some(p) = self.nodes[id.index()].parent.take() {
            self.nodes[p.index()].children.retain(|c| *c != id);
        }
    }

    /// `new` takes `old`'s slot in its parent's child list; `old` is detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> ChoreoResult<()> {
        self.ensure(&[old, new])?;
        if old == new {
            return Ok(());
        }
        let parent = self.nodes[old.index()].parent.ok_or_else(|| {
            ChoreoError::unknown_target(format!("cannot replace {old}: it has no parent"))
        })?;
        if new == NodeId::ROOT || new == parent || self.is_ancestor(new, parent) {
            return Err(ChoreoError::validation(format!(
                "replacing {old} with {new} would create a cycle"
            )));
        }
        self.detach(new);
        let slot = self.nodes[parent.index()]
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or_else(|| ChoreoError::validation(format!("{old} missing from its parent")))?;
        self.nodes[parent.index()].children[slot] = new;
        self.nodes[new.index()].parent = Some(parent);
        self.nodes[old.index()].parent = None;
        Ok(())
    }

    /// Pre-order family of `id` (the node itself first).
    pub fn family(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.index()].children.iter().rev().copied());
        }
        out
    }

    /// Concatenated families of a selection, without duplicates.
    pub fn family_of(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        roots
            .iter()
            .flat_map(|r| self.family(*r))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Family members that carry geometry, in pre-order.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.family(id)
            .into_iter()
            .filter(|n| self.nodes[n.index()].geometry.is_some())
            .collect()
    }

    pub fn world_transform(&self, id: NodeId) -> Affine3 {
        let node = &self.nodes[id.index()];
        match node.parent {
            Some(_) => self.parent_world(id) * node.transform,
            None => node.transform,
        }
    }

    pub fn parent_world(&self, id: NodeId) -> Affine3 {
        let mut m = Affine3::IDENTITY;
        let mut cur = self.nodes[id.index()].parent;
        while let Some(p) = cur {
            m = self.nodes[p.index()].transform * m;
            cur = self.nodes[p.index()].parent;
        }
        m
    }

    pub fn world_geometry(&self, id: NodeId) -> Option<Geometry> {
        let g = self.nodes[id.index()].geometry.as_ref()?;
        Some(g.transformed(&self.world_transform(id)))
    }

    /// World bounds of the family of `id`.
    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.bounds_with(id, &self.world_transform(id))
    }

    /// Bounds of the family in `id`'s own frame (its transform not applied).
    pub fn local_family_bounds(&self, id: NodeId) -> Option<Bounds> {
        self.bounds_with(id, &Affine3::IDENTITY)
    }

    fn bounds_with(&self, id: NodeId, m: &Affine3) -> Option<Bounds> {
        let node = &self.nodes[id.index()];
        let own = node
            .geometry
            .as_ref()
            .and_then(|g| Bounds::from_points(g.points().into_iter().map(|p| m.apply(p))));
        node.children
            .iter()
            .filter_map(|c| self.bounds_with(*c, &(*m * self.nodes[c.index()].transform)))
            .fold(own, |acc, b| Some(acc.map_or(b, |a| a.union(b))))
    }

    pub fn selection_bounds(&self, roots: &[NodeId]) -> Option<Bounds> {
        roots
            .iter()
            .filter_map(|r| self.bounds(*r))
            .reduce(Bounds::union)
    }

    /// Effective world clip of `id`: the intersection of its own and its ancestors' clips.
    pub fn effective_clip(&self, id: NodeId) -> Option<Bounds> {
        let mut clip: Option<Bounds> = None;
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = &self.nodes[n.index()];
            if let Some(c) = node.clip {
                clip = Some(match clip {
                    Some(acc) => Bounds {
                        min: acc.min.max(c.min),
                        max: acc.max.min(c.max).max(acc.min.max(c.min)),
                    },
                    None => c,
                });
            }
            cur = node.parent;
        }
        clip
    }

    /// Children of `id` in draw order: world depth of their bounds' center, then z-index,
    /// then insertion order.
    pub fn draw_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut keyed: Vec<(f64, i32, NodeId)> = self.nodes[id.index()]
            .children
            .iter()
            .map(|c| {
                let z = self.bounds(*c).map(|b| b.center().z).unwrap_or(0.0);
                (z, self.nodes[c.index()].z_index, *c)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        keyed.into_iter().map(|(_, _, c)| c).collect()
    }

    /// Fold world transforms into geometry for the whole family of `id`.
    ///
    /// Afterwards every family member has an identity transform and its geometry is expressed
    /// in `id`'s parent frame; the rendered result is unchanged.
    pub fn bake_family(&mut self, id: NodeId) {
        let mut stack = vec![(id, self.nodes[id.index()].transform)];
        while let Some((n, rel)) = stack.pop() {
            let node = &mut self.nodes[n.index()];
            if !rel.is_identity()
                && let Some(g) = node.geometry.as_ref()
            {
                node.geometry = Some(g.transformed(&rel));
            }
            node.transform = Affine3::IDENTITY;
            let kids = node.children.clone();
            for c in kids {
                stack.push((c, rel * self.nodes[c.index()].transform));
            }
        }
    }

    /// Apply a world-space affine to `id`: `local' = inv(P)·M·P·local` with `P` the parent's
    /// world transform.
    pub fn apply_world_affine(&mut self, id: NodeId, m: &Affine3) {
        let p = self.parent_world(id);
        let local = self.nodes[id.index()].transform;
        self.nodes[id.index()].transform = match p.inverse() {
            Ok(inv) => inv * *m * p * local,
            Err(e) => {
                tracing::warn!(node = %id, error = %e, "applying transform in the local frame");
                *m * local
            }
        };
    }

    pub(crate) fn state(&self, id: NodeId) -> NodeState {
        let n = &self.nodes[id.index()];
        NodeState {
            transform: n.transform,
            style: n.style,
            geometry: n.geometry.clone(),
            kind: n.kind,
        }
    }

    pub(crate) fn set_state(&mut self, id: NodeId, state: &NodeState) {
        let n = &mut self.nodes[id.index()];
        n.transform = state.transform;
        n.style = state.style;
        n.geometry.clone_from(&state.geometry);
        n.kind = state.kind;
    }

    pub(crate) fn states(&self, ids: &[NodeId]) -> Vec<(NodeId, NodeState)> {
        ids.iter().map(|id| (*id, self.state(*id))).collect()
    }

    pub(crate) fn restore_states(&mut self, states: &[(NodeId, NodeState)]) {
        for (id, s) in states {
            self.set_state(*id, s);
        }
    }

    /// Append a new node under `parent`; used by morph padding.
    pub(crate) fn push_child(&mut self, parent: NodeId, kind: ObjectKind, state: &NodeState) -> NodeId {
        let mut node = Node::group();
        node.kind = kind;
        node.parent = Some(parent);
        let id = self.alloc(node);
        self.set_state(id, state);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Verify parent/child links agree and that no node is its own ancestor.
    pub fn check_integrity(&self) -> ChoreoResult<()> {
        if self.nodes[0].parent.is_some() {
            return Err(ChoreoError::validation("root has a parent"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.released {
                continue;
            }
            let id = NodeId(i as u32);
            let mut seen = HashSet::new();
            for c in &node.children {
                let child = self.node(*c).map_err(|_| {
                    ChoreoError::validation(format!("{id} lists missing child {c}"))
                })?;
                if child.parent != Some(id) {
                    return Err(ChoreoError::validation(format!(
                        "{c} is listed under {id} but points at {:?}",
                        child.parent
                    )));
                }
                if !seen.insert(*c) {
                    return Err(ChoreoError::validation(format!("{c} listed twice under {id}")));
                }
            }
            if let Some(p) = node.parent {
                let listed = self
                    .nodes
                    .get(p.index())
                    .is_some_and(|pn| pn.children.contains(&id));
                if !listed {
                    return Err(ChoreoError::validation(format!(
                        "{id} points at parent {p} which does not list it"
                    )));
                }
            }
            if self.is_ancestor(id, id) {
                return Err(ChoreoError::validation(format!("{id} is its own ancestor")));
            }
        }
        Ok(())
    }

    pub fn node_ref(&self, sel: impl Into<Selection>) -> ChoreoResult<NodeRef<'_>> {
        let sel = sel.into();
        self.ensure(sel.ids())?;
        Ok(NodeRef { graph: self, sel })
    }

    pub fn node_mut(&mut self, sel: impl Into<Selection>) -> ChoreoResult<NodeMut<'_>> {
        let sel = sel.into();
        self.ensure(sel.ids())?;
        Ok(NodeMut { graph: self, sel })
    }
}


/// Read-only view of a node or selection. Positions are computed from current world state.
#[derive(Clone)]
pub struct NodeRef<'a> {
    graph: &'a SceneGraph,
    sel: Selection,
}

impl<'a> NodeRef<'a> {
    pub fn selection(&self) -> &Selection {
        &self.sel
    }

    pub fn id(&self) -> Option<NodeId> {
        self.sel.get(0)
    }

    /// First node of the selection.
    pub fn node(&self) -> Option<&'a Node> {
        self.id().map(|id| &self.graph.nodes[id.index()])
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.graph.selection_bounds(self.sel.ids())
    }

    fn bounds_or_origin(&self) -> Bounds {
        self.bounds().unwrap_or(Bounds::point(Vec3::ZERO))
    }

    pub fn center(&self) -> Vec3 {
        self.bounds_or_origin().center()
    }

    pub fn corner(&self, dir: Vec3) -> Vec3 {
        self.bounds_or_origin().critical_point(dir)
    }

    pub fn top(&self) -> Vec3 {
        self.corner(crate::foundation::math::UP)
    }

    pub fn bottom(&self) -> Vec3 {
        self.corner(crate::foundation::math::DOWN)
    }

    pub fn left(&self) -> Vec3 {
        self.corner(crate::foundation::math::LEFT)
    }

    pub fn right(&self) -> Vec3 {
        self.corner(crate::foundation::math::RIGHT)
    }

    pub fn width(&self) -> f64 {
        self.bounds_or_origin().width()
    }

    pub fn height(&self) -> f64 {
        self.bounds_or_origin().height()
    }

    fn world_leaves(&self) -> Vec<Geometry> {
        self.graph
            .family_of(self.sel.ids())
            .into_iter()
            .filter_map(|id| self.graph.world_geometry(id))
            .collect()
    }

    /// First point of the first leaf; the center for selections without geometry.
    pub fn start(&self) -> Vec3 {
        self.world_leaves()
            .first()
            .and_then(|g| match g {
                Geometry::Path(p) => p.start(),
                Geometry::Image(img) => Some(img.corners[0]),
            })
            .unwrap_or_else(|| self.center())
    }

    /// Last point of the last leaf.
    pub fn end(&self) -> Vec3 {
        self.world_leaves()
            .last()
            .and_then(|g| match g {
                Geometry::Path(p) => p.end(),
                Geometry::Image(img) => Some(img.points()[3]),
            })
            .unwrap_or_else(|| self.center())
    }

    /// Concatenated world-space outline of every vector leaf.
    pub fn world_path(&self) -> Option<crate::mobject::geometry::VectorPath> {
        let subpaths: Vec<_> = self
            .world_leaves()
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Path(p) => Some(p.subpaths),
                Geometry::Image(_) => None,
            })
            .flatten()
            .collect();
        (!subpaths.is_empty()).then(|| crate::mobject::geometry::VectorPath::new(subpaths))
    }

    pub fn point_from_proportion(&self, alpha: f64) -> Option<Vec3> {
        self.world_path()?.point_at_proportion(alpha)
    }

    pub fn world_transform(&self) -> Affine3 {
        self.id()
            .map(|id| self.graph.world_transform(id))
            .unwrap_or_default()
    }

    /// Style of the first leaf in the selection.
    pub fn style(&self) -> Option<Style> {
        self.graph
            .family_of(self.sel.ids())
            .into_iter()
            .find(|id| self.graph.nodes[id.index()].geometry.is_some())
            .map(|id| self.graph.nodes[id.index()].style)
    }

    pub fn children(&self) -> &'a [NodeId] {
        self.node().map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn family(&self) -> Vec<NodeId> {
        self.graph.family_of(self.sel.ids())
    }

    pub fn is_attached(&self) -> bool {
        self.sel.iter().all(|id| self.graph.is_attached(id))
    }
}

/// Chainable mutator over a node or selection.
///
/// Methods that reference other nodes return `ChoreoResult<&mut Self>`; the rest cannot fail
/// and log recoverable problems instead.
pub struct NodeMut<'a> {
    graph: &'a mut SceneGraph,
    sel: Selection,
}

impl<'a> NodeMut<'a> {
    pub fn selection(&self) -> &Selection {
        &self.sel
    }

    pub fn view(&self) -> NodeRef<'_> {
        NodeRef {
            graph: &*self.graph,
            sel: self.sel.clone(),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.view().center()
    }

    pub fn apply(&mut self, op: &MobjectOp) -> ChoreoResult<&mut Self> {
        ops::apply(self.graph, self.sel.ids(), op)?;
        Ok(self)
    }

    fn apply_logged(&mut self, op: MobjectOp) -> &mut Self {
        if let Err(e) = ops::apply(self.graph, self.sel.ids(), &op) {
            tracing::warn!(error = %e, "mobject op skipped");
        }
        self
    }

    pub fn shift(&mut self, by: Vec3) -> &mut Self {
        self.apply_logged(MobjectOp::Shift(by))
    }

    pub fn move_to(&mut self, point: Vec3) -> &mut Self {
        self.apply_logged(MobjectOp::MoveTo(point))
    }

    pub fn scale(&mut self, factor: f64) -> &mut Self {
        self.apply_logged(MobjectOp::Scale { factor, about: None })
    }

    pub fn scale_about(&mut self, factor: f64, about: Vec3) -> &mut Self {
        self.apply_logged(MobjectOp::Scale {
            factor,
            about: Some(about),
        })
    }

    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.apply_logged(MobjectOp::Rotate {
            angle,
            axis: OUT,
            about: None,
        })
    }

    pub fn rotate_about(&mut self, angle: f64, axis: Vec3, about: Vec3) -> &mut Self {
        self.apply_logged(MobjectOp::Rotate {
            angle,
            axis,
            about: Some(about),
        })
    }

    pub fn set_width(&mut self, width: f64) -> &mut Self {
        self.apply_logged(MobjectOp::SetWidth(width))
    }

    pub fn set_height(&mut self, height: f64) -> &mut Self {
        self.apply_logged(MobjectOp::SetHeight(height))
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.apply_logged(MobjectOp::Style(StyleEdit::color(color)))
    }

    pub fn set_fill(&mut self, color: Color, opacity: f64) -> &mut Self {
        self.apply_logged(MobjectOp::Style(StyleEdit::fill(Some(color), Some(opacity))))
    }

    pub fn set_stroke(&mut self, color: Color, width: f64, opacity: f64) -> &mut Self {
        self.apply_logged(MobjectOp::Style(StyleEdit::stroke(
            Some(color),
            Some(width),
            Some(opacity),
        )))
    }

    pub fn set_style(&mut self, edit: StyleEdit) -> &mut Self {
        self.apply_logged(MobjectOp::Style(edit))
    }

    pub fn set_opacity(&mut self, opacity: f64) -> &mut Self {
        self.apply_logged(MobjectOp::Style(StyleEdit::opacity(opacity)))
    }

    pub fn to_edge(&mut self, edge: Vec3, buff: f64) -> &mut Self {
        self.apply_logged(MobjectOp::ToEdge { edge, buff })
    }

    pub fn to_corner(&mut self, corner: Vec3, buff: f64) -> &mut Self {
        self.apply_logged(MobjectOp::ToEdge { edge: corner, buff })
    }

    pub fn next_to(
        &mut self,
        other: impl Into<Selection>,
        direction: Vec3,
        buff: f64,
    ) -> ChoreoResult<&mut Self> {
        self.apply(&MobjectOp::NextTo {
            target: other.into(),
            direction,
            buff,
        })
    }

    pub fn align_to(
        &mut self,
        other: impl Into<Selection>,
        direction: Vec3,
    ) -> ChoreoResult<&mut Self> {
        self.apply(&MobjectOp::AlignTo {
            target: other.into(),
            direction,
        })
    }

    /// Instantly take `other`'s world-space geometry and style, keeping this node's identity
    /// and parent.
    pub fn become_(&mut self, other: NodeId) -> ChoreoResult<&mut Self> {
        self.apply(&MobjectOp::Become(other))
    }

    pub fn set_points_as_corners(&mut self, points: &[Vec3]) -> ChoreoResult<&mut Self> {
        self.apply(&MobjectOp::SetPoints {
            points: points.to_vec(),
            smooth: false,
        })
    }

    pub fn set_points_smoothly(&mut self, points: &[Vec3]) -> ChoreoResult<&mut Self> {
        self.apply(&MobjectOp::SetPoints {
            points: points.to_vec(),
            smooth: true,
        })
    }

    /// Only the selection roots are re-ordered; descendants keep their own z-index.
    pub fn set_z_index(&mut self, z: i32) -> &mut Self {
        for id in self.sel.iter() {
            self.graph.nodes[id.index()].z_index = z;
        }
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        for id in self.sel.iter() {
            self.graph.nodes[id.index()].name = Some(name.clone());
        }
        self
    }

    /// World-space clip rectangle applied to the family; `None` clears it.
    pub fn set_clip(&mut self, clip: Option<Bounds>) -> &mut Self {
        for id in self.sel.iter() {
            self.graph.nodes[id.index()].clip = clip;
        }
        self
    }

    /// Remember the current family state for a later [`NodeMut::restore`] or `.animate.restore()`.
    pub fn save_state(&mut self) -> &mut Self {
        for id in self.sel.iter() {
            let family = self.graph.family(id);
            let states = self.graph.states(&family);
            self.graph.nodes[id.index()].saved = Some(states);
        }
        self
    }

    pub fn restore(&mut self) -> ChoreoResult<&mut Self> {
        self.apply(&MobjectOp::Restore)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
