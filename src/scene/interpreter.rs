//! The `Scene`: owner of the graph, camera, trackers and updaters, and the interpreter of
//! `play`/`wait` commands into a frame stream.
//!
//! `play` runs in two phases. Phase 1 validates every animation against the current scene
//! without mutating anything, so a failing batch leaves the scene untouched. Phase 2 begins
//! the animations, ticks the segment and hands one display list per tick to the sink.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use crate::animation::anim::Animation;
use crate::animation::compose::merge_tweens;
use crate::animation::run::{self, Stage};
use crate::assets::decode::{parse_svg, svg_shapes};
use crate::assets::image::{FsImageLoader, ImageLoader};
use crate::assets::typeset::{
    BlockTypesetter, GlyphCache, SvgTypesetter, TextMode, TypesetRequest, Typesetter,
};
use crate::foundation::color::palette;
use crate::foundation::core::{
    DEFAULT_FONT_SIZE, FrameIndex, MED_SMALL_BUFF, SMALL_BUFF, SceneConfig,
};
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Bounds, DR, RIGHT, UP, UR, Vec3};
use crate::mobject::axes::AxesConfig;
use crate::mobject::builder::Mobject;
use crate::mobject::geometry::{Geometry, ImageGeom};
use crate::mobject::matrix::matrix_layout;
use crate::mobject::style::{ObjectKind, Style};
use crate::render::display::emit;
use crate::render::sink::{FrameSink, NullSink};
use crate::scene::camera::Camera;
use crate::scene::graph::{NodeId, NodeMut, NodeRef, SceneGraph, Selection};
use crate::scene::tracker::{TrackerId, TrackerStore};
use crate::scene::updater::{UpdateContext, UpdaterId, UpdaterRegistry};

/// SVG objects are scaled to this height when spawned.
const SVG_DEFAULT_HEIGHT: f64 = 2.0;

/// What one `play` call produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentReport {
    pub first_frame: FrameIndex,
    pub frames: u64,
    pub duration: f64,
}

/// Handle to an axes object and its parts.
#[derive(Clone, Debug, PartialEq)]
pub struct AxesHandle {
    pub id: NodeId,
    pub x_axis: NodeId,
    pub y_axis: NodeId,
    pub ticks: NodeId,
    pub config: AxesConfig,
}

impl AxesHandle {
    /// Data coordinates to a world point, following the axes' current placement.
    pub fn c2p(&self, graph: &SceneGraph, x: f64, y: f64) -> Vec3 {
        graph
            .world_transform(self.id)
            .apply(self.config.local_point(x, y))
    }

    /// World point to data coordinates.
    pub fn p2c(&self, graph: &SceneGraph, p: Vec3) -> ChoreoResult<(f64, f64)> {
        let inv = graph.world_transform(self.id).inverse()?;
        Ok(self.config.local_to_data(inv.apply(p)))
    }
}

/// Handle to a matrix object: `[entries, left_bracket, right_bracket]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixHandle {
    pub id: NodeId,
    pub entries_group: NodeId,
    pub entries: Vec<NodeId>,
    pub brackets: [NodeId; 2],
    pub rows: usize,
    pub cols: usize,
}

impl MatrixHandle {
    pub fn get_entries(&self) -> Selection {
        Selection(self.entries.clone())
    }

    pub fn get_brackets(&self) -> Selection {
        Selection(self.brackets.to_vec())
    }

    pub fn get_rows(&self) -> Vec<Selection> {
        self.entries
            .chunks(self.cols.max(1))
            .map(|row| Selection(row.to_vec()))
            .collect()
    }

    pub fn get_columns(&self) -> Vec<Selection> {
        (0..self.cols)
            .map(|c| {
                Selection(
                    self.entries
                        .iter()
                        .skip(c)
                        .step_by(self.cols.max(1))
                        .copied()
                        .collect(),
                )
            })
            .collect()
    }
}

pub struct Scene {
    config: SceneConfig,
    graph: SceneGraph,
    camera: Camera,
    trackers: TrackerStore,
    updaters: UpdaterRegistry,
    sink: Box<dyn FrameSink>,
    typesetter: Arc<dyn Typesetter>,
    images: Arc<dyn ImageLoader>,
    time: f64,
    last_update: f64,
    frames: u64,
    finished: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("time", &self.time)
            .field("frames", &self.frames)
            .field("nodes", &self.graph.len())
            .field("updaters", &self.updaters.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    pub fn new(config: SceneConfig) -> ChoreoResult<Self> {
        config.validate()?;
        let typesetter: Arc<dyn Typesetter> = match SvgTypesetter::from_env() {
            Some(t) => Arc::new(t),
            None => Arc::new(BlockTypesetter),
        };
        Ok(Self {
            graph: SceneGraph::new(config.frame_dims()),
            camera: Camera::new(config.frame_width, config.frame_height),
            trackers: TrackerStore::default(),
            updaters: UpdaterRegistry::default(),
            sink: Box::new(NullSink),
            typesetter,
            images: Arc::new(FsImageLoader::new(".")),
            time: 0.0,
            last_update: 0.0,
            frames: 0,
            finished: false,
            config,
        })
    }

    pub fn with_sink(mut self, sink: impl FrameSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_typesetter(mut self, typesetter: Arc<dyn Typesetter>) -> Self {
        self.typesetter = typesetter;
        self
    }

    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.images = loader;
        self
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Scene clock in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Frames emitted so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Number of top-level objects in the scene.
    pub fn mobject_count(&self) -> usize {
        self.graph
            .node(NodeId::ROOT)
            .map(|r| r.children().len())
            .unwrap_or(0)
    }

    // ---- graph membership ----

    /// Insert `m` without adding it to the scene.
    pub fn spawn(&mut self, m: Mobject) -> NodeId {
        self.graph.insert(m)
    }

    /// Add objects to the scene, on top of everything already there.
    ///
    /// An object already at the top level moves to the end of the draw order; one nested in a
    /// detached group is lifted out keeping its world placement.
    pub fn add(&mut self, objects: impl Into<Selection>) -> ChoreoResult<()> {
        let sel = objects.into();
        self.graph.ensure(sel.ids())?;
        for id in sel.iter() {
            if id == NodeId::ROOT {
                return Err(ChoreoError::validation("the scene root cannot be added"));
            }
            let parent = self.graph.node(id)?.parent();
            match parent {
                Some(p) if p != NodeId::ROOT => {
                    let world = self.graph.world_transform(id);
                    self.graph.attach(NodeId::ROOT, id)?;
                    self.graph.node_data_mut(id)?.transform = world;
                }
                _ => {
                    self.graph.detach(id);
                    self.graph.attach(NodeId::ROOT, id)?;
                }
            }
        }
        Ok(())
    }

    /// Spawn and add in one step.
    pub fn add_new(&mut self, m: Mobject) -> ChoreoResult<NodeId> {
        let id = self.spawn(m);
        self.add(id)?;
        Ok(id)
    }

    /// Detach objects from the scene; updaters bound to anything that left are dropped.
    pub fn remove(&mut self, objects: impl Into<Selection>) -> ChoreoResult<()> {
        let sel = objects.into();
        self.graph.ensure(sel.ids())?;
        for id in sel.iter() {
            self.graph.detach(id);
        }
        self.updaters.prune(&self.graph);
        Ok(())
    }

    /// `new` takes `old`'s slot in its parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> ChoreoResult<()> {
        self.graph.replace(old, new)?;
        self.updaters.prune(&self.graph);
        Ok(())
    }

    /// Detached deep copy of `id`.
    pub fn copy(&mut self, id: NodeId) -> ChoreoResult<NodeId> {
        self.graph.deep_copy(id)
    }

    /// Gather `members` under a new group node, keeping their world placement.
    ///
    /// The group takes the draw slot of the first member that is in the scene.
    pub fn group(&mut self, members: impl Into<Selection>) -> ChoreoResult<NodeId> {
        let sel = members.into();
        self.graph.ensure(sel.ids())?;
        let group = self.graph.insert(Mobject::group([]));
        let slot = sel.iter().find(|m| self.graph.is_attached(*m)).and_then(|m| {
            let parent = self.graph.node(m).ok()?.parent()?;
            let index = self
                .graph
                .node(parent)
                .ok()?
                .children()
                .iter()
                .position(|c| *c == m)?;
            Some((parent, index))
        });
        if let Some((parent, index)) = slot {
            self.graph.attach_at(parent, group, index)?;
        }
        let inv = self.graph.world_transform(group).inverse()?;
        for m in sel.iter() {
            let world = self.graph.world_transform(m);
            self.graph.attach(group, m)?;
            self.graph.node_data_mut(m)?.transform = inv * world;
        }
        Ok(group)
    }

    /// Children `range` of `id`, e.g. a glyph range of a text object.
    ///
    /// A range past the end yields an empty selection and a warning.
    pub fn slice(&self, id: NodeId, range: Range<usize>) -> Selection {
        let children = match self.graph.node(id) {
            Ok(n) => n.children(),
            Err(e) => {
                tracing::warn!(error = %e, "slice of unknown node");
                return Selection::empty();
            }
        };
        if range.start > range.end || range.end > children.len() {
            let e = ChoreoError::out_of_range(format!(
                "slice {}..{} of {id} with {} parts",
                range.start,
                range.end,
                children.len()
            ));
            tracing::warn!(error = %e, "returning empty selection");
            return Selection::empty();
        }
        Selection(children[range].to_vec())
    }

    pub fn node(&self, sel: impl Into<Selection>) -> ChoreoResult<NodeRef<'_>> {
        self.graph.node_ref(sel)
    }

    /// Instant mutation outside of any animation.
    pub fn node_mut(&mut self, sel: impl Into<Selection>) -> ChoreoResult<NodeMut<'_>> {
        self.graph.node_mut(sel)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    // ---- factories ----

    fn typeset(&mut self, request: TypesetRequest) -> ChoreoResult<NodeId> {
        let run = GlyphCache::global().get_or_typeset(self.typesetter.as_ref(), &request)?;
        Ok(self.spawn(Mobject::from_glyph_run(&run, &request.source, request.mode)))
    }

    /// Plain text at the given font size; one glyph child per character outline.
    pub fn text(&mut self, source: &str, font_size: f64) -> ChoreoResult<NodeId> {
        self.typeset(TypesetRequest::plain(source, font_size))
    }

    pub fn tex(&mut self, source: &str, font_size: f64) -> ChoreoResult<NodeId> {
        self.typeset(TypesetRequest::latex(source, font_size))
    }

    /// Raster image `height` world units tall, centered on the origin.
    pub fn image(&mut self, path: &str, height: f64) -> ChoreoResult<NodeId> {
        let handle = self.images.load(path)?;
        Ok(self.spawn(
            Mobject::leaf(
                ObjectKind::Image,
                Geometry::Image(ImageGeom::centered(handle, height)),
                Style::filled(palette::WHITE, 1.0),
            )
            .named(path),
        ))
    }

    /// One filled path per SVG path element, scaled to a standard height and centered.
    pub fn svg(&mut self, path: impl AsRef<Path>) -> ChoreoResult<NodeId> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ChoreoError::asset_missing(format!("read svg '{}': {e}", path.display()))
        })?;
        let tree = parse_svg(&bytes)?;
        let leaves = svg_shapes(&tree).into_iter().map(|shape| {
            let mut style = Style::filled(palette::WHITE, 0.0);
            if let Some((color, opacity)) = shape.fill {
                style.fill_color = color;
                style.fill_opacity = opacity;
            }
            if let Some((color, width)) = shape.stroke {
                style.stroke_color = color;
                style.stroke_width = width;
            }
            Mobject::path(ObjectKind::FilledPath, shape.path, style)
        });
        let m = Mobject::group(leaves)
            .with_height(SVG_DEFAULT_HEIGHT)
            .moved_to(Vec3::ZERO)
            .named(path.display().to_string());
        Ok(self.spawn(m))
    }

    pub fn axes(&mut self, config: AxesConfig) -> ChoreoResult<AxesHandle> {
        config.validate()?;
        let id = self.spawn(config.build());
        let parts = self.graph.node(id)?.children().to_vec();
        let [x_axis, y_axis, ticks] = parts[..] else {
            return Err(ChoreoError::validation("axes built without three parts"));
        };
        Ok(AxesHandle {
            id,
            x_axis,
            y_axis,
            ticks,
            config,
        })
    }

    /// Curve of `f` over `x_range` (or the full axis) in the axes' current placement.
    pub fn get_graph(
        &mut self,
        axes: &AxesHandle,
        f: impl Fn(f64) -> f64,
        x_range: Option<[f64; 2]>,
    ) -> NodeId {
        let world = self.graph.world_transform(axes.id);
        self.spawn(axes.config.graph(f, x_range, &world))
    }

    fn axis_label(
        &mut self,
        axis: NodeId,
        label: &str,
        edge: Vec3,
        direction: Vec3,
    ) -> ChoreoResult<NodeId> {
        let id = self.tex(label, DEFAULT_FONT_SIZE)?;
        let anchor = self
            .graph
            .bounds(axis)
            .map(|b| b.critical_point(edge))
            .unwrap_or(Vec3::ZERO);
        if let Some(b) = self.graph.bounds(id) {
            let shift = anchor + direction * MED_SMALL_BUFF - b.critical_point(-direction);
            self.graph.node_mut(id)?.shift(shift);
        }
        Ok(id)
    }

    pub fn get_x_axis_label(&mut self, axes: &AxesHandle, label: &str) -> ChoreoResult<NodeId> {
        self.axis_label(axes.x_axis, label, RIGHT, DR)
    }

    pub fn get_y_axis_label(&mut self, axes: &AxesHandle, label: &str) -> ChoreoResult<NodeId> {
        self.axis_label(axes.y_axis, label, UP, UR)
    }

    /// Matrix of typeset entries; every row must have the same length.
    pub fn matrix(&mut self, rows: &[Vec<String>]) -> ChoreoResult<MatrixHandle> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(ChoreoError::validation("matrix rows must have equal length"));
        }
        let mut entries = Vec::with_capacity(rows.len() * cols);
        for cell in rows.iter().flatten() {
            let request = TypesetRequest::latex(cell.as_str(), DEFAULT_FONT_SIZE);
            let run = GlyphCache::global().get_or_typeset(self.typesetter.as_ref(), &request)?;
            entries.push(Mobject::from_glyph_run(&run, cell, TextMode::Latex));
        }
        let id = self.spawn(matrix_layout(entries, rows.len(), cols));
        let parts = self.graph.node(id)?.children().to_vec();
        let [entries_group, left, right] = parts[..] else {
            return Err(ChoreoError::validation("matrix built without three parts"));
        };
        Ok(MatrixHandle {
            id,
            entries_group,
            entries: self.graph.node(entries_group)?.children().to_vec(),
            brackets: [left, right],
            rows: rows.len(),
            cols,
        })
    }

    fn target_bounds(&self, target: &Selection) -> ChoreoResult<Bounds> {
        self.graph.ensure(target.ids())?;
        self.graph
            .selection_bounds(target.ids())
            .ok_or_else(|| ChoreoError::validation("target has no geometry to measure"))
    }

    pub fn surrounding_rectangle(
        &mut self,
        target: impl Into<Selection>,
        buff: f64,
    ) -> ChoreoResult<NodeId> {
        let b = self.target_bounds(&target.into())?;
        Ok(self.spawn(Mobject::surrounding_rectangle(b, buff)))
    }

    pub fn brace(&mut self, target: impl Into<Selection>, direction: Vec3) -> ChoreoResult<NodeId> {
        let b = self.target_bounds(&target.into())?;
        Ok(self.spawn(Mobject::brace(b, direction, SMALL_BUFF)))
    }

    pub fn cross(&mut self, target: impl Into<Selection>) -> ChoreoResult<NodeId> {
        let b = self.target_bounds(&target.into())?;
        Ok(self.spawn(Mobject::cross(b)))
    }

    // ---- trackers & updaters ----

    pub fn value_tracker(&mut self, value: f64) -> TrackerId {
        self.trackers.create(value)
    }

    pub fn tracker(&self, id: TrackerId) -> ChoreoResult<f64> {
        self.trackers.get(id)
    }

    pub fn set_tracker(&mut self, id: TrackerId, value: f64) -> ChoreoResult<()> {
        self.trackers.set(id, value)
    }

    pub fn trackers(&self) -> &TrackerStore {
        &self.trackers
    }

    /// Register a per-frame callback on `target`. It runs once right away with `dt = 0`.
    pub fn add_updater(
        &mut self,
        target: NodeId,
        mut f: impl FnMut(&mut NodeMut<'_>, &UpdateContext<'_>) + 'static,
    ) -> ChoreoResult<UpdaterId> {
        self.graph.ensure(&[target])?;
        let ctx = UpdateContext {
            time: self.time,
            dt: 0.0,
            trackers: &self.trackers,
        };
        f(&mut self.graph.node_mut(target)?, &ctx);
        Ok(self.updaters.add(target, Box::new(f)))
    }

    pub fn remove_updater(&mut self, id: UpdaterId) -> bool {
        self.updaters.remove(id)
    }

    pub fn clear_updaters(&mut self, target: NodeId) -> usize {
        self.updaters.clear_target(target)
    }

    pub fn updater_count(&self) -> usize {
        self.updaters.len()
    }

    // ---- time ----

    fn stage(&mut self) -> Stage<'_> {
        Stage {
            graph: &mut self.graph,
            camera: &mut self.camera,
            trackers: &mut self.trackers,
        }
    }

    fn run_updaters(&mut self) -> ChoreoResult<()> {
        let ctx = UpdateContext {
            time: self.time,
            dt: self.time - self.last_update,
            trackers: &self.trackers,
        };
        self.updaters.run(&mut self.graph, &ctx)?;
        self.last_update = self.time;
        Ok(())
    }

    fn emit_frame(&mut self) -> ChoreoResult<()> {
        let frame = emit(
            &self.graph,
            &self.camera,
            FrameIndex(self.frames),
            self.time,
            self.config.background,
        );
        self.sink.accept(frame)?;
        self.frames += 1;
        Ok(())
    }

    fn check_open(&self) -> ChoreoResult<()> {
        if self.finished {
            return Err(ChoreoError::validation("scene already finished"));
        }
        Ok(())
    }

    /// Play a batch of animations as one segment.
    pub fn play<I>(&mut self, anims: I) -> ChoreoResult<SegmentReport>
    where
        I: IntoIterator,
        I::Item: Into<Animation>,
    {
        self.play_inner(anims.into_iter().map(Into::into).collect(), None)
    }

    /// `play` with `run_time` overriding each animation's duration.
    pub fn play_with<I>(&mut self, anims: I, run_time: f64) -> ChoreoResult<SegmentReport>
    where
        I: IntoIterator,
        I::Item: Into<Animation>,
    {
        self.play_inner(anims.into_iter().map(Into::into).collect(), Some(run_time))
    }

    #[tracing::instrument(skip_all, fields(time = self.time, anims = anims.len()))]
    fn play_inner(
        &mut self,
        anims: Vec<Animation>,
        run_time: Option<f64>,
    ) -> ChoreoResult<SegmentReport> {
        self.check_open()?;
        if anims.is_empty() {
            return Err(ChoreoError::validation("play needs at least one animation"));
        }
        if let Some(rt) = run_time
            && !(rt.is_finite() && rt > 0.0)
        {
            return Err(ChoreoError::validation(format!(
                "run_time must be positive, got {rt}"
            )));
        }
        let mut restores = 0;
        for anim in &anims {
            run::validate(anim, &self.graph, &self.trackers, &mut restores)?;
        }
        if restores > self.camera.depth() {
            return Err(ChoreoError::unbalanced_camera(format!(
                "segment restores the camera {restores} times but only {} states are saved",
                self.camera.depth()
            )));
        }

        let mut segment = run::build_segment(merge_tweens(anims), run_time, &mut self.stage())?;
        let duration = segment.duration;
        let ticks = ((duration * f64::from(self.config.fps)).round() as u64).max(1);
        tracing::debug!(duration, ticks, effects = segment.effects.len(), "segment scheduled");

        let t0 = self.time;
        let first_frame = FrameIndex(self.frames);
        for k in 0..ticks {
            let t = k as f64 * duration / ticks as f64;
            self.time = t0 + t;
            segment.apply_at(&mut self.stage(), t);
            self.run_updaters()?;
            self.emit_frame()?;
        }

        self.time = t0 + duration;
        segment.apply_at(&mut self.stage(), duration);
        segment.finish(&mut self.stage())?;
        self.updaters.prune(&self.graph);
        self.run_updaters()?;

        Ok(SegmentReport {
            first_frame,
            frames: ticks,
            duration,
        })
    }

    /// Hold for `seconds`; only updaters change anything.
    #[tracing::instrument(skip_all, fields(time = self.time, seconds))]
    pub fn wait(&mut self, seconds: f64) -> ChoreoResult<SegmentReport> {
        self.check_open()?;
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(ChoreoError::validation(format!(
                "wait duration must be non-negative, got {seconds}"
            )));
        }
        let ticks = (seconds * f64::from(self.config.fps)).round() as u64;
        let t0 = self.time;
        let first_frame = FrameIndex(self.frames);
        for k in 0..ticks {
            self.time = t0 + k as f64 * seconds / ticks as f64;
            self.run_updaters()?;
            self.emit_frame()?;
        }
        self.time = t0 + seconds;
        self.run_updaters()?;
        Ok(SegmentReport {
            first_frame,
            frames: ticks,
            duration: seconds,
        })
    }

    /// Interactive hook; batch rendering ignores it.
    pub fn embed(&mut self) {
        tracing::info!(time = self.time, "embed() ignored in batch mode");
    }

    /// Emit the final resting frame and flush the sink. Further `play`/`wait` calls fail.
    #[tracing::instrument(skip_all, fields(frames = self.frames))]
    pub fn finish(&mut self) -> ChoreoResult<()> {
        if self.finished {
            return Ok(());
        }
        self.emit_frame()?;
        if self.camera.depth() > 0 {
            tracing::warn!(
                saved = self.camera.depth(),
                "scene finished with unrestored camera states"
            );
        }
        self.finished = true;
        self.sink.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/interpreter.rs"]
mod tests;
