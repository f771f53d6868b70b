use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::foundation::color::{Color, palette};
use crate::foundation::core::DEFAULT_STROKE_WIDTH;
use crate::foundation::math::{Affine3, Bounds, Vec3};
use crate::mobject::geometry::{Cubic, Geometry, Subpath, VectorPath};
use crate::mobject::style::{ObjectKind, Style};

pub const DEFAULT_DOT_RADIUS: f64 = 0.08;

/// Detached graphic object description, built by value and inserted into a scene graph.
///
/// Geometry lives in the object's local frame; `transform` maps it into the parent's frame.
/// Style setters recurse into children the way group styling does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mobject {
    pub kind: ObjectKind,
    pub geometry: Option<Geometry>,
    pub style: Style,
    pub transform: Affine3,
    pub z_index: i32,
    pub name: Option<String>,
    pub children: Vec<Mobject>,
}

impl Mobject {
    pub fn leaf(kind: ObjectKind, geometry: Geometry, style: Style) -> Self {
        Self {
            kind,
            geometry: Some(geometry),
            style,
            ..Self::default()
        }
    }

    pub fn path(kind: ObjectKind, path: VectorPath, style: Style) -> Self {
        Self::leaf(kind, Geometry::Path(path), style)
    }

    pub fn group(children: impl IntoIterator<Item = Mobject>) -> Self {
        Self {
            kind: ObjectKind::Group,
            children: children.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: Mobject) -> Self {
        self.children.push(child);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.for_each_mut(&mut |m| m.style = style);
        self
    }

    /// Fill and stroke color for the whole family.
    pub fn with_color(mut self, color: Color) -> Self {
        self.for_each_mut(&mut |m| {
            m.style.fill_color = color;
            m.style.stroke_color = color;
        });
        self
    }

    pub fn with_fill(mut self, color: Color, opacity: f64) -> Self {
        self.for_each_mut(&mut |m| {
            m.style.fill_color = color;
            m.style.fill_opacity = opacity;
        });
        self
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.for_each_mut(&mut |m| {
            m.style.stroke_color = color;
            m.style.stroke_width = width;
        });
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.for_each_mut(&mut |m| m.style.stroke_width = width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.for_each_mut(&mut |m| {
            m.style.fill_opacity = m.style.fill_opacity.min(opacity);
            m.style.stroke_opacity = opacity;
        });
        self
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Mobject)) {
        f(self);
        for c in &mut self.children {
            c.for_each_mut(f);
        }
    }

    /// Bounds in the parent's frame (this object's transform applied).
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds_under(&Affine3::IDENTITY)
    }

    fn bounds_under(&self, parent: &Affine3) -> Option<Bounds> {
        let m = *parent * self.transform;
        let own = self
            .geometry
            .as_ref()
            .and_then(|g| Bounds::from_points(g.points().into_iter().map(|p| m.apply(p))));
        self.children
            .iter()
            .filter_map(|c| c.bounds_under(&m))
            .fold(own, |acc, b| Some(acc.map_or(b, |a| a.union(b))))
    }

    pub fn center(&self) -> Vec3 {
        self.bounds().map(|b| b.center()).unwrap_or(Vec3::ZERO)
    }

    pub fn width(&self) -> f64 {
        self.bounds().map(|b| b.width()).unwrap_or(0.0)
    }

    pub fn height(&self) -> f64 {
        self.bounds().map(|b| b.height()).unwrap_or(0.0)
    }

    pub fn transformed(mut self, m: Affine3) -> Self {
        self.transform = m * self.transform;
        self
    }

    pub fn shifted(self, v: Vec3) -> Self {
        self.transformed(Affine3::translate(v))
    }

    pub fn moved_to(self, p: Vec3) -> Self {
        let c = self.center();
        self.shifted(p - c)
    }

    /// Scale about the current center.
    pub fn scaled(self, s: f64) -> Self {
        let c = self.center();
        self.transformed(Affine3::scale_about(s, c))
    }

    /// Rotate about the current center around the z axis.
    pub fn rotated(self, angle: f64) -> Self {
        let c = self.center();
        self.transformed(Affine3::rotate_about(angle, Vec3::new(0.0, 0.0, 1.0), c))
    }

    pub fn with_width(self, w: f64) -> Self {
        let cur = self.width();
        if cur <= 0.0 {
            return self;
        }
        self.scaled(w / cur)
    }

    pub fn with_height(self, h: f64) -> Self {
        let cur = self.height();
        if cur <= 0.0 {
            return self;
        }
        self.scaled(h / cur)
    }

    /// Number of objects in this family, the object itself included.
    pub fn family_len(&self) -> usize {
        1 + self.children.iter().map(Mobject::family_len).sum::<usize>()
    }

    pub fn circle(radius: f64) -> Self {
        Self::path(
            ObjectKind::FilledPath,
            circle_path(Vec3::ZERO, radius),
            Style::stroked(palette::RED, DEFAULT_STROKE_WIDTH),
        )
    }

    pub fn ellipse(width: f64, height: f64) -> Self {
        let path = circle_path(Vec3::ZERO, 1.0).transformed(&Affine3::stretch_about(
            Vec3::new(width / 2.0, height / 2.0, 1.0),
            Vec3::ZERO,
        ));
        Self::path(
            ObjectKind::FilledPath,
            path,
            Style::stroked(palette::RED, DEFAULT_STROKE_WIDTH),
        )
    }

    /// Open circular arc starting at `start_angle`, counter-clockwise by `angle`.
    pub fn arc(radius: f64, start_angle: f64, angle: f64) -> Self {
        let segments = (angle.abs() / FRAC_PI_2).ceil().max(1.0) as usize * 2;
        Self::path(
            ObjectKind::Polyline,
            VectorPath::from_subpath(Subpath::arc(Vec3::ZERO, radius, start_angle, angle, segments)),
            Style::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH),
        )
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        Self::polygon(&[
            Vec3::xy(w, h),
            Vec3::xy(-w, h),
            Vec3::xy(-w, -h),
            Vec3::xy(w, -h),
        ])
        .with_color(palette::WHITE)
    }

    pub fn square(side: f64) -> Self {
        Self::rectangle(side, side)
    }

    pub fn rounded_rectangle(width: f64, height: f64, corner_radius: f64) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        let r = corner_radius.clamp(0.0, w.min(h));
        if r <= 0.0 {
            return Self::rectangle(width, height);
        }
        let corners = [
            (Vec3::xy(w - r, h - r), 0.0),
            (Vec3::xy(-w + r, h - r), FRAC_PI_2),
            (Vec3::xy(-w + r, -h + r), PI),
            (Vec3::xy(w - r, -h + r), 3.0 * FRAC_PI_2),
        ];
        let mut curves = Vec::with_capacity(12);
        for (i, (c, a0)) in corners.iter().enumerate() {
            let arc = Subpath::arc(*c, r, *a0, FRAC_PI_2, 2);
            curves.extend(arc.curves.iter().copied());
            let next = corners[(i + 1) % corners.len()];
            let from = arc.end().unwrap_or(*c);
            let to = next.0 + Vec3::xy(next.1.cos() * r, next.1.sin() * r);
            curves.push(Cubic::line(from, to));
        }
        Self::path(
            ObjectKind::FilledPath,
            VectorPath::from_subpath(Subpath {
                curves,
                closed: true,
            }),
            Style::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH),
        )
    }

    pub fn polygon(vertices: &[Vec3]) -> Self {
        Self::path(
            ObjectKind::Polygon,
            VectorPath::from_subpath(Subpath::from_corners(vertices, true)),
            Style::stroked(palette::BLUE, DEFAULT_STROKE_WIDTH),
        )
    }

    /// Regular `n`-gon inscribed in a circle of `radius`, with a flat bottom edge for even `n`.
    pub fn regular_polygon(n: usize, radius: f64) -> Self {
        let n = n.max(3);
        let start = if n % 2 == 1 {
            FRAC_PI_2
        } else {
            FRAC_PI_2 - PI / n as f64
        };
        let vertices: Vec<Vec3> = (0..n)
            .map(|i| {
                let a = start + TAU * i as f64 / n as f64;
                Vec3::xy(radius * a.cos(), radius * a.sin())
            })
            .collect();
        Self::path(
            ObjectKind::Polygon,
            VectorPath::from_subpath(Subpath::from_corners(&vertices, true)),
            Style::stroked(palette::BLUE, DEFAULT_STROKE_WIDTH),
        )
    }

    pub fn triangle(radius: f64) -> Self {
        Self::regular_polygon(3, radius)
    }

    pub fn line(start: Vec3, end: Vec3) -> Self {
        Self::path(
            ObjectKind::Polyline,
            VectorPath::from_subpath(Subpath::from_corners(&[start, end], false)),
            Style::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH),
        )
    }

    /// Open polyline with straight segments through `points`.
    pub fn polyline(points: &[Vec3]) -> Self {
        Self::path(
            ObjectKind::Polyline,
            VectorPath::from_subpath(Subpath::from_corners(points, false)),
            Style::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH),
        )
    }

    /// Open C¹ curve through `points`.
    pub fn smooth_polyline(points: &[Vec3]) -> Self {
        Self::path(
            ObjectKind::Polyline,
            VectorPath::from_subpath(Subpath::smooth_through(points, false)),
            Style::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH),
        )
    }

    pub fn dot(center: Vec3) -> Self {
        Self::disk(center, DEFAULT_DOT_RADIUS, palette::WHITE, 1.0)
    }

    pub(crate) fn disk(center: Vec3, radius: f64, color: Color, opacity: f64) -> Self {
        Self::path(
            ObjectKind::FilledPath,
            circle_path(center, radius),
            Style::filled(color, opacity),
        )
    }
}

/// Closed circle from eight eighth-turn cubics, starting on the +x axis.
pub(crate) fn circle_path(center: Vec3, radius: f64) -> VectorPath {
    let mut sp = Subpath::arc(center, radius, 0.0, TAU, 8);
    sp.closed = true;
    VectorPath::from_subpath(sp)
}

#[cfg(test)]
#[path = "../../tests/unit/mobject/builder.rs"]
mod tests;
