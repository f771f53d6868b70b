//! Serde model of JSON scene descriptions.
//!
//! A file holds an optional `config` block and named `scenes`. Each scene declares objects
//! and trackers up front and then lists the commands to interpret, in order. Objects are
//! referred to by name; `name[a..b]` selects a slice of a text object's glyphs.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::animation::ease::Ease;
use crate::foundation::color::{Color, palette};
use crate::foundation::core::{DEFAULT_FONT_SIZE, MED_LARGE_BUFF, MED_SMALL_BUFF, SceneConfig};
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{OUT, RIGHT, Vec3};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub config: SceneConfig,
    pub scenes: BTreeMap<String, SceneScript>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneScript {
    #[serde(default)]
    pub objects: Vec<ObjectDecl>,
    /// Tracker name to initial value.
    #[serde(default)]
    pub trackers: BTreeMap<String, f64>,
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ObjectDecl {
    pub name: String,
    #[serde(flatten)]
    pub shape: ShapeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// Attach to the scene right away instead of waiting for an `add` or an introducer.
    #[serde(default)]
    pub add: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Circle {
        #[serde(default = "one")]
        radius: f64,
    },
    Square {
        #[serde(default = "two")]
        side: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
    },
    Ellipse {
        width: f64,
        height: f64,
    },
    Triangle {
        #[serde(default = "one")]
        radius: f64,
    },
    RegularPolygon {
        sides: usize,
        #[serde(default = "one")]
        radius: f64,
    },
    Dot {
        #[serde(default)]
        point: Vec3,
    },
    Line {
        start: Vec3,
        end: Vec3,
    },
    Arrow {
        start: Vec3,
        end: Vec3,
    },
    Polygon {
        points: Vec<Vec3>,
    },
    Text {
        text: String,
        #[serde(default = "default_font_size")]
        font_size: f64,
    },
    Tex {
        source: String,
        #[serde(default = "default_font_size")]
        font_size: f64,
    },
    Image {
        path: String,
        #[serde(default = "two")]
        height: f64,
    },
    Svg {
        path: String,
    },
    SurroundingRectangle {
        target: String,
        #[serde(default = "small_buff")]
        buff: f64,
    },
    Brace {
        target: String,
        direction: Vec3,
    },
    /// Reparents existing objects under a new group.
    Group {
        members: Vec<String>,
    },
    Copy {
        of: String,
    },
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Add {
        targets: Vec<String>,
    },
    Remove {
        targets: Vec<String>,
    },
    Play {
        animations: Vec<AnimDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_time: Option<f64>,
    },
    Wait {
        #[serde(default = "one")]
        seconds: f64,
    },
    /// Instant edits, applied in order.
    Set {
        target: String,
        edits: Vec<EditSpec>,
    },
    SaveState {
        target: String,
    },
    CameraSave,
    CameraRestore,
    AddUpdater {
        target: String,
        updater: UpdaterSpec,
    },
    ClearUpdaters {
        target: String,
    },
    SetTracker {
        tracker: String,
        value: f64,
    },
    Embed,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimDecl {
    #[serde(flatten)]
    pub anim: AnimSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<Ease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag_ratio: Option<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimSpec {
    FadeIn {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shift: Option<Vec3>,
    },
    FadeOut {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shift: Option<Vec3>,
    },
    Create {
        target: String,
    },
    Uncreate {
        target: String,
    },
    Write {
        target: String,
    },
    GrowFromCenter {
        target: String,
    },
    GrowFromPoint {
        target: String,
        point: Vec3,
    },
    GrowArrow {
        target: String,
    },
    Indicate {
        target: String,
    },
    MoveAlongPath {
        target: String,
        path: String,
    },
    Flash {
        #[serde(default)]
        point: Vec3,
        #[serde(default = "yellow")]
        color: Color,
    },
    FlashAround {
        target: String,
    },
    Transform {
        source: String,
        target: String,
    },
    ReplacementTransform {
        source: String,
        target: String,
    },
    TransformFromCopy {
        source: String,
        target: String,
    },
    /// `.animate` chain on an object.
    Animate {
        target: String,
        edits: Vec<EditSpec>,
    },
    Camera {
        edits: Vec<CameraEditSpec>,
    },
    Tracker {
        tracker: String,
        value: f64,
        /// Treat `value` as an increment.
        #[serde(default)]
        relative: bool,
    },
    Pause {
        seconds: f64,
    },
    Group {
        animations: Vec<AnimDecl>,
    },
    LaggedStart {
        animations: Vec<AnimDecl>,
    },
    Succession {
        animations: Vec<AnimDecl>,
    },
}

/// One mobject edit, usable instantly (`set`) or as a tween step (`animate`).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum EditSpec {
    Shift {
        by: Vec3,
    },
    MoveTo {
        point: Vec3,
    },
    Scale {
        factor: f64,
    },
    Rotate {
        angle: f64,
    },
    SetWidth {
        width: f64,
    },
    SetHeight {
        height: f64,
    },
    SetColor {
        color: Color,
    },
    SetOpacity {
        opacity: f64,
    },
    SetFill {
        color: Color,
        #[serde(default = "one")]
        opacity: f64,
    },
    NextTo {
        other: String,
        #[serde(default = "right")]
        direction: Vec3,
        #[serde(default = "med_small_buff")]
        buff: f64,
    },
    AlignTo {
        other: String,
        direction: Vec3,
    },
    ToEdge {
        edge: Vec3,
        #[serde(default = "med_large_buff")]
        buff: f64,
    },
    ToCorner {
        corner: Vec3,
        #[serde(default = "med_large_buff")]
        buff: f64,
    },
    Become {
        other: String,
    },
    Restore,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum CameraEditSpec {
    Scale {
        factor: f64,
    },
    Shift {
        by: Vec3,
    },
    MoveTo {
        point: Vec3,
    },
    Rotate {
        angle: f64,
        #[serde(default = "out")]
        axis: Vec3,
    },
    SetWidth {
        width: f64,
    },
    SetHeight {
        height: f64,
    },
    Restore,
}

/// Declarative per-frame behaviours.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdaterSpec {
    /// Places the target at `origin + axis * value` every frame.
    FollowTracker {
        tracker: String,
        #[serde(default = "right")]
        axis: Vec3,
        #[serde(default)]
        origin: Vec3,
    },
    NextTo {
        other: String,
        #[serde(default = "right")]
        direction: Vec3,
        #[serde(default = "med_small_buff")]
        buff: f64,
    },
    /// Radians per second about the target's center.
    RotateRate {
        rate: f64,
    },
}

/// A parsed object reference: a name plus an optional glyph range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetRef<'a> {
    pub name: &'a str,
    pub range: Option<Range<usize>>,
}

impl<'a> TargetRef<'a> {
    pub fn parse(s: &'a str) -> ChoreoResult<Self> {
        let s = s.trim();
        let Some(open) = s.find('[') else {
            return Ok(Self {
                name: s,
                range: None,
            });
        };
        let inner = s[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| ChoreoError::validation(format!("unterminated slice in '{s}'")))?;
        let (a, b) = inner
            .split_once("..")
            .ok_or_else(|| ChoreoError::validation(format!("slice '{s}' must look like name[a..b]")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| ChoreoError::validation(format!("bad slice bound in '{s}': {e}")))
        };
        Ok(Self {
            name: s[..open].trim(),
            range: Some(parse(a)?..parse(b)?),
        })
    }
}

impl SceneFile {
    pub fn from_json(text: &str) -> ChoreoResult<Self> {
        let file: Self = serde_json::from_str(text)
            .map_err(|e| ChoreoError::serde(format!("scene description: {e}")))?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> ChoreoResult<()> {
        self.config.validate()?;
        if self.scenes.is_empty() {
            return Err(ChoreoError::validation("scene file declares no scenes"));
        }
        for (name, scene) in &self.scenes {
            scene
                .validate()
                .map_err(|e| ChoreoError::validation(format!("scene '{name}': {e}")))?;
        }
        Ok(())
    }

    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    pub fn scene(&self, name: &str) -> ChoreoResult<&SceneScript> {
        self.scenes
            .get(name)
            .ok_or_else(|| ChoreoError::validation(format!("no scene named '{name}'")))
    }
}

impl SceneScript {
    /// Name checks only; everything else is checked when the commands run.
    pub fn validate(&self) -> ChoreoResult<()> {
        let mut seen = std::collections::BTreeSet::new();
        for obj in &self.objects {
            if obj.name.is_empty() || obj.name.contains('[') {
                return Err(ChoreoError::validation(format!(
                    "invalid object name '{}'",
                    obj.name
                )));
            }
            if !seen.insert(obj.name.as_str()) {
                return Err(ChoreoError::validation(format!(
                    "object '{}' declared twice",
                    obj.name
                )));
            }
        }
        for (name, value) in &self.trackers {
            if !value.is_finite() {
                return Err(ChoreoError::validation(format!(
                    "tracker '{name}' must start at a finite value"
                )));
            }
        }
        Ok(())
    }
}

fn one() -> f64 {
    1.0
}

fn two() -> f64 {
    2.0
}

fn small_buff() -> f64 {
    crate::foundation::core::SMALL_BUFF
}

fn med_small_buff() -> f64 {
    MED_SMALL_BUFF
}

fn med_large_buff() -> f64 {
    MED_LARGE_BUFF
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn right() -> Vec3 {
    RIGHT
}

fn out() -> Vec3 {
    OUT
}

fn yellow() -> Color {
    palette::YELLOW
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
