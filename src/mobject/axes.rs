use crate::foundation::color::{Color, palette};
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Vec3};
use crate::mobject::builder::Mobject;
use crate::mobject::geometry::{Subpath, VectorPath};
use crate::mobject::shapes::ArrowStyle;
use crate::mobject::style::{ObjectKind, Style};

/// Axis ranges are `[min, max, step]` in data units; `width`/`height` are world units.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub x_range: [f64; 3],
    pub y_range: [f64; 3],
    pub width: f64,
    pub height: f64,
    pub include_ticks: bool,
    pub tick_size: f64,
    pub include_tips: bool,
    pub color: Color,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            x_range: [-8.0, 8.0, 1.0],
            y_range: [-4.0, 4.0, 1.0],
            width: 12.0,
            height: 6.0,
            include_ticks: true,
            tick_size: 0.1,
            include_tips: false,
            color: palette::GREY_B,
        }
    }
}

impl AxesConfig {
    pub fn validate(&self) -> ChoreoResult<()> {
        for (name, r) in [("x_range", self.x_range), ("y_range", self.y_range)] {
            if !(r[1] > r[0]) {
                return Err(ChoreoError::validation(format!(
                    "axes {name} must have max > min"
                )));
            }
            if !(r[2] > 0.0) {
                return Err(ChoreoError::validation(format!(
                    "axes {name} step must be positive"
                )));
            }
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ChoreoError::validation("axes width/height must be positive"));
        }
        Ok(())
    }

    /// Data coordinates to the axes' local frame (centered on the origin).
    pub fn local_point(&self, x: f64, y: f64) -> Vec3 {
        let [x0, x1, _] = self.x_range;
        let [y0, y1, _] = self.y_range;
        Vec3::xy(
            (x - (x0 + x1) / 2.0) * self.width / (x1 - x0),
            (y - (y0 + y1) / 2.0) * self.height / (y1 - y0),
        )
    }

    pub fn local_to_data(&self, p: Vec3) -> (f64, f64) {
        let [x0, x1, _] = self.x_range;
        let [y0, y1, _] = self.y_range;
        (
            p.x * (x1 - x0) / self.width + (x0 + x1) / 2.0,
            p.y * (y1 - y0) / self.height + (y0 + y1) / 2.0,
        )
    }

    /// Data value where the other axis crosses: zero when in range, else the nearest bound.
    fn crossing(range: [f64; 3]) -> f64 {
        0.0_f64.clamp(range[0], range[1])
    }

    fn ticks(range: [f64; 3]) -> Vec<f64> {
        let [lo, hi, step] = range;
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|k| k as f64 * step).collect()
    }

    /// Group `[x_axis, y_axis, ticks]`.
    pub fn build(&self) -> Mobject {
        let y0 = Self::crossing(self.y_range);
        let x0 = Self::crossing(self.x_range);
        let axis = |a: Vec3, b: Vec3| {
            if self.include_tips {
                Mobject::arrow(
                    a,
                    b,
                    ArrowStyle {
                        buff: 0.0,
                        tip_length: 0.25,
                        color: self.color,
                        stroke_width: 2.0,
                        ..ArrowStyle::default()
                    },
                )
            } else {
                Mobject::line(a, b).with_stroke(self.color, 2.0)
            }
        };
        let x_axis = axis(
            self.local_point(self.x_range[0], y0),
            self.local_point(self.x_range[1], y0),
        )
        .named("x_axis");
        let y_axis = axis(
            self.local_point(x0, self.y_range[0]),
            self.local_point(x0, self.y_range[1]),
        )
        .named("y_axis");

        let mut tick_paths = Vec::new();
        if self.include_ticks {
            let t = self.tick_size;
            for x in Self::ticks(self.x_range).into_iter().filter(|&x| x != x0) {
                let p = self.local_point(x, y0);
                tick_paths.push(Subpath::from_corners(&[p - Vec3::xy(0.0, t), p + Vec3::xy(0.0, t)], false));
            }
            for y in Self::ticks(self.y_range).into_iter().filter(|&y| y != y0) {
                let p = self.local_point(x0, y);
                tick_paths.push(Subpath::from_corners(&[p - Vec3::xy(t, 0.0), p + Vec3::xy(t, 0.0)], false));
            }
        }
        let ticks = if tick_paths.is_empty() {
            Mobject::group([])
        } else {
            Mobject::path(
                ObjectKind::Polyline,
                VectorPath::new(tick_paths),
                Style::stroked(self.color, 2.0),
            )
        }
        .named("ticks");

        Mobject::group([x_axis, y_axis, ticks]).named("axes")
    }

    /// Sampled smooth curve of `f` over `x_range` (defaults to the axes' range), in local
    /// coordinates mapped through `to_world`.
    pub fn graph(
        &self,
        f: impl Fn(f64) -> f64,
        x_range: Option<[f64; 2]>,
        to_world: &Affine3,
    ) -> Mobject {
        const SAMPLES: usize = 64;
        let [lo, hi] = x_range.unwrap_or([self.x_range[0], self.x_range[1]]);
        let points: Vec<Vec3> = (0..=SAMPLES)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / SAMPLES as f64;
                to_world.apply(self.local_point(x, f(x)))
            })
            .collect();
        Mobject::smooth_polyline(&points)
            .with_stroke(palette::YELLOW, 3.0)
            .named("graph")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mobject/axes.rs"]
mod tests;
