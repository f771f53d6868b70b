use crate::foundation::color::{Color, palette};
use crate::foundation::core::{DEFAULT_STROKE_WIDTH, MED_SMALL_BUFF, SMALL_BUFF};
use crate::foundation::math::{Affine3, Bounds, OUT, Vec3};
use crate::mobject::builder::Mobject;
use crate::mobject::geometry::{Subpath, VectorPath};
use crate::mobject::style::{ObjectKind, Style};

/// Arrow tip and shaft parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArrowStyle {
    /// Distance trimmed from both endpoints.
    pub buff: f64,
    pub stroke_width: f64,
    pub tip_length: f64,
    /// Upper bound of tip length relative to the arrow length.
    pub max_tip_length_to_length_ratio: f64,
    pub color: Color,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            buff: MED_SMALL_BUFF,
            stroke_width: DEFAULT_STROKE_WIDTH,
            tip_length: 0.35,
            max_tip_length_to_length_ratio: 0.25,
            color: palette::WHITE,
        }
    }
}

impl Mobject {
    /// Group of `[shaft, tip]`; the tip outline ends at the apex so the family's end point is
    /// the arrow's head.
    pub fn arrow(start: Vec3, end: Vec3, style: ArrowStyle) -> Self {
        let dir = (end - start).normalize();
        let total = start.distance(end);
        let buff = style.buff.min(total / 2.0).max(0.0);
        let a = start + dir * buff;
        let b = end - dir * buff;
        let length = a.distance(b);
        let tip = style
            .tip_length
            .min(style.max_tip_length_to_length_ratio * length)
            .max(0.0);

        let base = b - dir * tip;
        let normal = OUT.cross(dir) * (tip / 2.0);
        let shaft = Mobject::path(
            ObjectKind::Polyline,
            VectorPath::from_subpath(Subpath::from_corners(&[a, base], false)),
            Style::stroked(style.color, style.stroke_width),
        );
        let head = Mobject::path(
            ObjectKind::Polygon,
            VectorPath::from_subpath(Subpath::from_corners(&[b, base - normal, base + normal], true)),
            Style::filled(style.color, 1.0),
        );
        Mobject::group([shaft, head]).named("arrow")
    }

    /// Arrow from the origin with no buff.
    pub fn vector(direction: Vec3) -> Self {
        Self::arrow(
            Vec3::ZERO,
            direction,
            ArrowStyle {
                buff: 0.0,
                ..ArrowStyle::default()
            },
        )
    }

    /// Curly bracket along the side of `target` facing `direction`.
    pub fn brace(target: Bounds, direction: Vec3, buff: f64) -> Self {
        let d = Vec3::xy(direction.x, direction.y).normalize();
        let d = if d == Vec3::ZERO { Vec3::xy(0.0, -1.0) } else { d };
        // Width is the target's extent across `d`; the shape is built facing down.
        let span = d.y.abs() * target.width() + d.x.abs() * target.height();
        let w = span / 2.0;
        let h = 0.2_f64.min(span / 4.0).max(0.05);
        let spine = [
            Vec3::xy(-w, 0.0),
            Vec3::xy(-w + h / 2.0, -h / 2.0),
            Vec3::xy(-h / 2.0, -h / 2.0),
            Vec3::xy(0.0, -h),
            Vec3::xy(h / 2.0, -h / 2.0),
            Vec3::xy(w - h / 2.0, -h / 2.0),
            Vec3::xy(w, 0.0),
        ];
        let path = VectorPath::from_subpath(Subpath::smooth_through(&spine, false));

        let half_extent = (d.x.abs() * target.width() + d.y.abs() * target.height()) / 2.0;
        let anchor = target.center() + d * (half_extent + buff);
        let angle = d.y.atan2(d.x) + std::f64::consts::FRAC_PI_2;
        let placed = Affine3::translate(anchor) * Affine3::rotate(angle, OUT);
        Mobject::path(
            ObjectKind::Polyline,
            path.transformed(&placed),
            Style::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH),
        )
        .named("brace")
    }

    pub fn surrounding_rectangle(target: Bounds, buff: f64) -> Self {
        let b = target.expand(buff);
        Mobject::rectangle(b.width(), b.height())
            .with_color(palette::YELLOW)
            .shifted(b.center())
            .named("surrounding_rectangle")
    }

    /// Two red diagonals across `target`.
    pub fn cross(target: Bounds) -> Self {
        let (lo, hi) = (target.min, target.max);
        let stroke = Style::stroked(palette::RED, 6.0);
        Mobject::group([
            Mobject::path(
                ObjectKind::Polyline,
                VectorPath::from_subpath(Subpath::from_corners(
                    &[Vec3::xy(lo.x, hi.y), Vec3::xy(hi.x, lo.y)],
                    false,
                )),
                stroke,
            ),
            Mobject::path(
                ObjectKind::Polyline,
                VectorPath::from_subpath(Subpath::from_corners(&[lo, Vec3::xy(hi.x, hi.y)], false)),
                stroke,
            ),
        ])
        .named("cross")
    }

    pub fn checkmark() -> Self {
        Mobject::polyline(&[Vec3::xy(-0.3, 0.0), Vec3::xy(-0.1, -0.2), Vec3::xy(0.3, 0.3)])
            .with_stroke(palette::GREEN, 6.0)
            .named("checkmark")
    }

    /// Concentric disks with opacity falling off towards the rim.
    pub fn glow_dot(center: Vec3, radius: f64, color: Color) -> Self {
        const LAYERS: usize = 8;
        const GLOW_FACTOR: f64 = 2.0;
        let layers = (0..LAYERS).map(|i| {
            // Outer layers first so inner, denser disks draw on top.
            let k = (LAYERS - 1 - i) as f64 / (LAYERS - 1) as f64;
            let r = radius * (1.0 + GLOW_FACTOR * k);
            let opacity = 0.6 * (1.0 - k).powi(2) + 0.05;
            Mobject::disk(center, r, color, opacity)
        });
        Mobject::group(layers).named("glow_dot")
    }

    /// Default padding used by [`Mobject::surrounding_rectangle`] callers.
    pub const SURROUND_BUFF: f64 = SMALL_BUFF;
}

#[cfg(test)]
#[path = "../../tests/unit/mobject/shapes.rs"]
mod tests;
