//! Interprets a [`SceneScript`] against a [`Scene`].

use std::collections::BTreeMap;

use crate::animation::anim::{Animation, DEFAULT_LAGGED_START_LAG_RATIO};
use crate::animation::tween::{animate, animate_camera, animate_tracker};
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::OUT;
use crate::mobject::builder::Mobject;
use crate::mobject::shapes::ArrowStyle;
use crate::mobject::style::StyleEdit;
use crate::scene::camera::CameraOp;
use crate::scene::graph::{NodeId, Selection};
use crate::scene::interpreter::{Scene, SegmentReport};
use crate::scene::ops::MobjectOp;
use crate::scene::tracker::TrackerId;
use crate::script::model::{
    AnimDecl, AnimSpec, CameraEditSpec, Command, EditSpec, ObjectDecl, SceneScript, ShapeSpec,
    TargetRef, UpdaterSpec,
};

/// Names bound while running a script, plus one report per `play`/`wait`.
#[derive(Clone, Debug, Default)]
pub struct ScriptRun {
    pub objects: BTreeMap<String, NodeId>,
    pub trackers: BTreeMap<String, TrackerId>,
    pub segments: Vec<SegmentReport>,
}

impl ScriptRun {
    pub fn object(&self, name: &str) -> ChoreoResult<NodeId> {
        self.objects
            .get(name)
            .copied()
            .ok_or_else(|| ChoreoError::unknown_target(format!("no object named '{name}'")))
    }

    pub fn tracker(&self, name: &str) -> ChoreoResult<TrackerId> {
        self.trackers
            .get(name)
            .copied()
            .ok_or_else(|| ChoreoError::unknown_target(format!("no tracker named '{name}'")))
    }

    pub fn frames(&self) -> u64 {
        self.segments.iter().map(|s| s.frames).sum()
    }

    fn resolve(&self, scene: &Scene, target: &str) -> ChoreoResult<Selection> {
        let t = TargetRef::parse(target)?;
        let id = self.object(t.name)?;
        Ok(match t.range {
            Some(range) => scene.slice(id, range),
            None => Selection::from(id),
        })
    }

    fn resolve_one(&self, scene: &Scene, target: &str) -> ChoreoResult<NodeId> {
        let sel = self.resolve(scene, target)?;
        match sel.ids() {
            [id] => Ok(*id),
            _ => Err(ChoreoError::validation(format!(
                "'{target}' must name exactly one object, got {}",
                sel.len()
            ))),
        }
    }
}

/// Declare the script's objects and trackers, then run its commands in order.
///
/// The scene is left open; call [`Scene::finish`] to emit the resting frame.
#[tracing::instrument(skip_all, fields(objects = script.objects.len(), commands = script.commands.len()))]
pub fn run_script(scene: &mut Scene, script: &SceneScript) -> ChoreoResult<ScriptRun> {
    script.validate()?;
    let mut run = ScriptRun::default();
    for (name, value) in &script.trackers {
        run.trackers.insert(name.clone(), scene.value_tracker(*value));
    }
    for decl in &script.objects {
        let id = declare(scene, &run, decl).inspect_err(|e| {
            tracing::warn!(object = %decl.name, error = %e, "declaration failed");
        })?;
        run.objects.insert(decl.name.clone(), id);
    }
    for (i, cmd) in script.commands.iter().enumerate() {
        tracing::debug!(index = i, time = scene.time(), "command");
        execute(scene, &mut run, cmd)?;
    }
    Ok(run)
}

fn declare(scene: &mut Scene, run: &ScriptRun, decl: &ObjectDecl) -> ChoreoResult<NodeId> {
    let id = match &decl.shape {
        ShapeSpec::Circle { radius } => scene.spawn(Mobject::circle(*radius)),
        ShapeSpec::Square { side } => scene.spawn(Mobject::square(*side)),
        ShapeSpec::Rectangle { width, height } => scene.spawn(Mobject::rectangle(*width, *height)),
        ShapeSpec::Ellipse { width, height } => scene.spawn(Mobject::ellipse(*width, *height)),
        ShapeSpec::Triangle { radius } => scene.spawn(Mobject::triangle(*radius)),
        ShapeSpec::RegularPolygon { sides, radius } => {
            if *sides < 3 {
                return Err(ChoreoError::validation("regular polygon needs at least 3 sides"));
            }
            scene.spawn(Mobject::regular_polygon(*sides, *radius))
        }
        ShapeSpec::Dot { point } => scene.spawn(Mobject::dot(*point)),
        ShapeSpec::Line { start, end } => scene.spawn(Mobject::line(*start, *end)),
        ShapeSpec::Arrow { start, end } => {
            scene.spawn(Mobject::arrow(*start, *end, ArrowStyle::default()))
        }
        ShapeSpec::Polygon { points } => {
            if points.len() < 3 {
                return Err(ChoreoError::validation("polygon needs at least 3 points"));
            }
            scene.spawn(Mobject::polygon(points))
        }
        ShapeSpec::Text { text, font_size } => scene.text(text, *font_size)?,
        ShapeSpec::Tex { source, font_size } => scene.tex(source, *font_size)?,
        ShapeSpec::Image { path, height } => scene.image(path, *height)?,
        ShapeSpec::Svg { path } => scene.svg(path)?,
        ShapeSpec::SurroundingRectangle { target, buff } => {
            let sel = run.resolve(scene, target)?;
            scene.surrounding_rectangle(sel, *buff)?
        }
        ShapeSpec::Brace { target, direction } => {
            let sel = run.resolve(scene, target)?;
            scene.brace(sel, *direction)?
        }
        ShapeSpec::Group { members } => {
            let sel = members
                .iter()
                .map(|m| run.resolve_one(scene, m))
                .collect::<ChoreoResult<Selection>>()?;
            scene.group(sel)?
        }
        ShapeSpec::Copy { of } => {
            let src = run.resolve_one(scene, of)?;
            scene.copy(src)?
        }
    };

    let mut node = scene.node_mut(id)?;
    if let Some(color) = decl.color {
        node.set_color(color);
    }
    if let Some(opacity) = decl.fill_opacity {
        node.set_style(StyleEdit::fill(None, Some(opacity)));
    }
    if let Some(p) = decl.position {
        node.move_to(p);
    }
    if let Some(z) = decl.z_index {
        node.set_z_index(z);
    }
    node.set_name(decl.name.clone());
    if decl.add {
        scene.add(id)?;
    }
    Ok(id)
}

fn execute(scene: &mut Scene, run: &mut ScriptRun, cmd: &Command) -> ChoreoResult<()> {
    match cmd {
        Command::Add { targets } => {
            let sel = resolve_all(scene, run, targets)?;
            scene.add(sel)?;
        }
        Command::Remove { targets } => {
            let sel = resolve_all(scene, run, targets)?;
            scene.remove(sel)?;
        }
        Command::Play {
            animations,
            run_time,
        } => {
            let anims = animations
                .iter()
                .map(|d| animation(scene, run, d))
                .collect::<ChoreoResult<Vec<_>>>()?;
            let report = match run_time {
                Some(rt) => scene.play_with(anims, *rt)?,
                None => scene.play(anims)?,
            };
            run.segments.push(report);
        }
        Command::Wait { seconds } => {
            let report = scene.wait(*seconds)?;
            run.segments.push(report);
        }
        Command::Set { target, edits } => {
            let sel = run.resolve(scene, target)?;
            let ops = edits
                .iter()
                .map(|e| mobject_op(scene, run, e))
                .collect::<ChoreoResult<Vec<_>>>()?;
            let mut node = scene.node_mut(sel)?;
            for op in &ops {
                node.apply(op)?;
            }
        }
        Command::SaveState { target } => {
            let sel = run.resolve(scene, target)?;
            scene.node_mut(sel)?.save_state();
        }
        Command::CameraSave => {
            scene.camera_mut().save_state();
        }
        Command::CameraRestore => {
            scene.camera_mut().restore()?;
        }
        Command::AddUpdater { target, updater } => {
            let id = run.resolve_one(scene, target)?;
            add_updater(scene, run, id, updater)?;
        }
        Command::ClearUpdaters { target } => {
            let id = run.resolve_one(scene, target)?;
            scene.clear_updaters(id);
        }
        Command::SetTracker { tracker, value } => {
            let id = run.tracker(tracker)?;
            scene.set_tracker(id, *value)?;
        }
        Command::Embed => scene.embed(),
    }
    Ok(())
}

fn resolve_all(scene: &Scene, run: &ScriptRun, targets: &[String]) -> ChoreoResult<Selection> {
    let mut ids = Vec::new();
    for t in targets {
        ids.extend(run.resolve(scene, t)?.iter());
    }
    Ok(Selection(ids))
}

fn mobject_op(scene: &Scene, run: &ScriptRun, edit: &EditSpec) -> ChoreoResult<MobjectOp> {
    Ok(match edit {
        EditSpec::Shift { by } => MobjectOp::Shift(*by),
        EditSpec::MoveTo { point } => MobjectOp::MoveTo(*point),
        EditSpec::Scale { factor } => MobjectOp::Scale {
            factor: *factor,
            about: None,
        },
        EditSpec::Rotate { angle } => MobjectOp::Rotate {
            angle: *angle,
            axis: OUT,
            about: None,
        },
        EditSpec::SetWidth { width } => MobjectOp::SetWidth(*width),
        EditSpec::SetHeight { height } => MobjectOp::SetHeight(*height),
        EditSpec::SetColor { color } => MobjectOp::Style(StyleEdit::color(*color)),
        EditSpec::SetOpacity { opacity } => MobjectOp::Style(StyleEdit::opacity(*opacity)),
        EditSpec::SetFill { color, opacity } => {
            MobjectOp::Style(StyleEdit::fill(Some(*color), Some(*opacity)))
        }
        EditSpec::NextTo {
            other,
            direction,
            buff,
        } => MobjectOp::NextTo {
            target: run.resolve(scene, other)?,
            direction: *direction,
            buff: *buff,
        },
        EditSpec::AlignTo { other, direction } => MobjectOp::AlignTo {
            target: run.resolve(scene, other)?,
            direction: *direction,
        },
        EditSpec::ToEdge { edge, buff } => MobjectOp::ToEdge {
            edge: *edge,
            buff: *buff,
        },
        EditSpec::ToCorner { corner, buff } => MobjectOp::ToEdge {
            edge: *corner,
            buff: *buff,
        },
        EditSpec::Become { other } => MobjectOp::Become(run.resolve_one(scene, other)?),
        EditSpec::Restore => MobjectOp::Restore,
    })
}

fn camera_op(edit: &CameraEditSpec) -> CameraOp {
    match edit {
        CameraEditSpec::Scale { factor } => CameraOp::Scale(*factor),
        CameraEditSpec::Shift { by } => CameraOp::Shift(*by),
        CameraEditSpec::MoveTo { point } => CameraOp::MoveTo(*point),
        CameraEditSpec::Rotate { angle, axis } => CameraOp::Rotate {
            angle: *angle,
            axis: *axis,
        },
        CameraEditSpec::SetWidth { width } => CameraOp::SetWidth(*width),
        CameraEditSpec::SetHeight { height } => CameraOp::SetHeight(*height),
        CameraEditSpec::Restore => CameraOp::Restore,
    }
}

fn animation(scene: &Scene, run: &ScriptRun, decl: &AnimDecl) -> ChoreoResult<Animation> {
    let sel = |t: &str| run.resolve(scene, t);
    let one = |t: &str| run.resolve_one(scene, t);
    let children = |list: &[AnimDecl]| {
        list.iter()
            .map(|d| animation(scene, run, d))
            .collect::<ChoreoResult<Vec<_>>>()
    };

    let mut anim = match &decl.anim {
        AnimSpec::FadeIn { target, shift } => match shift {
            Some(s) => Animation::fade_in_shift(sel(target)?, *s),
            None => Animation::fade_in(sel(target)?),
        },
        AnimSpec::FadeOut { target, shift } => match shift {
            Some(s) => Animation::fade_out_shift(sel(target)?, *s),
            None => Animation::fade_out(sel(target)?),
        },
        AnimSpec::Create { target } => Animation::create(sel(target)?),
        AnimSpec::Uncreate { target } => Animation::uncreate(sel(target)?),
        AnimSpec::Write { target } => Animation::write(sel(target)?),
        AnimSpec::GrowFromCenter { target } => Animation::grow_from_center(sel(target)?),
        AnimSpec::GrowFromPoint { target, point } => {
            Animation::grow_from_point(sel(target)?, *point)
        }
        AnimSpec::GrowArrow { target } => Animation::grow_arrow(one(target)?),
        AnimSpec::Indicate { target } => Animation::indicate(sel(target)?),
        AnimSpec::MoveAlongPath { target, path } => {
            Animation::move_along_path(sel(target)?, one(path)?)
        }
        AnimSpec::Flash { point, color } => Animation::flash(*point, *color),
        AnimSpec::FlashAround { target } => Animation::flash_around(sel(target)?),
        AnimSpec::Transform { source, target } => Animation::transform(sel(source)?, sel(target)?),
        AnimSpec::ReplacementTransform { source, target } => {
            Animation::replacement_transform(sel(source)?, sel(target)?)
        }
        AnimSpec::TransformFromCopy { source, target } => {
            Animation::transform_from_copy(sel(source)?, sel(target)?)
        }
        AnimSpec::Animate { target, edits } => {
            let mut tween = animate(sel(target)?);
            for e in edits {
                tween = tween.op(mobject_op(scene, run, e)?);
            }
            tween.into()
        }
        AnimSpec::Camera { edits } => edits
            .iter()
            .fold(animate_camera(), |t, e| t.op(camera_op(e)))
            .into(),
        AnimSpec::Tracker {
            tracker,
            value,
            relative,
        } => {
            let t = animate_tracker(run.tracker(tracker)?);
            if *relative {
                t.increment_value(*value).into()
            } else {
                t.set_value(*value).into()
            }
        }
        AnimSpec::Pause { seconds } => Animation::pause(*seconds),
        AnimSpec::Group { animations } => Animation::group(children(animations)?),
        AnimSpec::LaggedStart { animations } => Animation::lagged_start(
            children(animations)?,
            decl.lag_ratio.unwrap_or(DEFAULT_LAGGED_START_LAG_RATIO),
        ),
        AnimSpec::Succession { animations } => Animation::succession(children(animations)?),
    };

    if let Some(rt) = decl.run_time {
        anim = anim.run_time(rt);
    }
    if let Some(ease) = decl.ease {
        anim = anim.ease(ease);
    }
    if let Some(lag) = decl.lag_ratio {
        anim = anim.lag_ratio(lag);
    }
    Ok(anim)
}

fn add_updater(
    scene: &mut Scene,
    run: &ScriptRun,
    target: NodeId,
    spec: &UpdaterSpec,
) -> ChoreoResult<()> {
    match spec {
        UpdaterSpec::FollowTracker {
            tracker,
            axis,
            origin,
        } => {
            let (tracker, axis, origin) = (run.tracker(tracker)?, *axis, *origin);
            scene.add_updater(target, move |node, ctx| {
                node.move_to(origin + axis * ctx.value(tracker));
            })?;
        }
        UpdaterSpec::NextTo {
            other,
            direction,
            buff,
        } => {
            let (other, direction, buff) = (run.resolve(scene, other)?, *direction, *buff);
            scene.add_updater(target, move |node, _| {
                if let Err(e) = node.next_to(&other, direction, buff) {
                    tracing::warn!(error = %e, "next_to updater skipped");
                }
            })?;
        }
        UpdaterSpec::RotateRate { rate } => {
            let rate = *rate;
            scene.add_updater(target, move |node, ctx| {
                node.rotate(rate * ctx.dt);
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/script/run.rs"]
mod tests;
