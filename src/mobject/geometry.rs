use crate::assets::image::ImageHandle;
use crate::foundation::math::{Affine3, Bounds, Vec3};

/// Samples per cubic when measuring arc length.
const ARC_SAMPLES: usize = 24;

/// Cubic Bezier segment `[anchor, handle, handle, anchor]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Cubic(pub [Vec3; 4]);

impl Cubic {
    /// Straight segment with handles at the thirds, so the curve is linearly parametrized.
    pub fn line(a: Vec3, b: Vec3) -> Self {
        Self([a, Vec3::lerp(a, b, 1.0 / 3.0), Vec3::lerp(a, b, 2.0 / 3.0), b])
    }

    pub fn point(p: Vec3) -> Self {
        Self([p; 4])
    }

    pub fn start(&self) -> Vec3 {
        self.0[0]
    }

    pub fn end(&self) -> Vec3 {
        self.0[3]
    }

    pub fn eval(&self, t: f64) -> Vec3 {
        if t <= 0.0 {
            return self.0[0];
        }
        if t >= 1.0 {
            return self.0[3];
        }
        let [p0, p1, p2, p3] = self.0;
        let u = 1.0 - t;
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    /// de Casteljau split at `t`.
    pub fn split(&self, t: f64) -> (Self, Self) {
        let [p0, p1, p2, p3] = self.0;
        let a = Vec3::lerp(p0, p1, t);
        let b = Vec3::lerp(p1, p2, t);
        let c = Vec3::lerp(p2, p3, t);
        let d = Vec3::lerp(a, b, t);
        let e = Vec3::lerp(b, c, t);
        let m = Vec3::lerp(d, e, t);
        (Self([p0, a, d, m]), Self([m, e, c, p3]))
    }

    /// The sub-curve over parameter range `[t0, t1]`.
    pub fn segment(&self, t0: f64, t1: f64) -> Self {
        if t0 <= 0.0 && t1 >= 1.0 {
            return *self;
        }
        if t1 <= t0 {
            return Self::point(self.eval(t0));
        }
        let (head, _) = self.split(t1);
        if t0 <= 0.0 {
            return head;
        }
        let (_, tail) = head.split(t0 / t1);
        tail
    }

    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self(std::array::from_fn(|i| Vec3::lerp(a.0[i], b.0[i], t)))
    }

    pub fn transformed(&self, m: &Affine3) -> Self {
        Self(self.0.map(|p| m.apply(p)))
    }

    fn samples(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..=ARC_SAMPLES).map(|i| self.eval(i as f64 / ARC_SAMPLES as f64))
    }
}

/// A connected run of cubics. `closed` asks the rasterizer to join the last point to the first.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Subpath {
    pub curves: Vec<Cubic>,
    pub closed: bool,
}

impl Subpath {
    /// Straight segments through `points`; a closed run gets a final segment back to the start.
    pub fn from_corners(points: &[Vec3], closed: bool) -> Self {
        let mut curves: Vec<Cubic> = points
            .windows(2)
            .map(|w| Cubic::line(w[0], w[1]))
            .collect();
        if let (true, Some(first), Some(last)) = (closed, points.first(), points.last())
            && points.len() > 2
            && first != last
        {
            curves.push(Cubic::line(*last, *first));
        }
        if curves.is_empty() {
            curves.push(Cubic::point(points.first().copied().unwrap_or(Vec3::ZERO)));
        }
        Self { curves, closed }
    }

    /// C¹ Catmull-Rom spline through `points`.
    pub fn smooth_through(points: &[Vec3], closed: bool) -> Self {
        let n = points.len();
        if n < 3 {
            return Self::from_corners(points, closed);
        }
        let at = |i: isize| -> Vec3 {
            if closed {
                points[i.rem_euclid(n as isize) as usize]
            } else {
                points[i.clamp(0, n as isize - 1) as usize]
            }
        };
        let segments = if closed { n } else { n - 1 };
        let curves = (0..segments as isize)
            .map(|i| {
                let p0 = at(i);
                let p1 = at(i + 1);
                let h1 = p0 + (p1 - at(i - 1)) / 6.0;
                let h2 = p1 - (at(i + 2) - p0) / 6.0;
                Cubic([p0, h1, h2, p1])
            })
            .collect();
        Self { curves, closed }
    }

    /// Polygonal arc of `angle` radians around `center`, built from quarter-or-less cubics.
    pub fn arc(center: Vec3, radius: f64, start_angle: f64, angle: f64, segments: usize) -> Self {
        let segments = segments.max(1);
        let step = angle / segments as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;
        let curves = (0..segments)
            .map(|i| {
                let a0 = start_angle + step * i as f64;
                let a1 = a0 + step;
                let (s0, c0) = a0.sin_cos();
                let (s1, c1) = a1.sin_cos();
                let p0 = center + Vec3::xy(c0 * radius, s0 * radius);
                let p3 = center + Vec3::xy(c1 * radius, s1 * radius);
                let p1 = p0 + Vec3::xy(-s0 * k, c0 * k);
                let p2 = p3 - Vec3::xy(-s1 * k, c1 * k);
                Cubic([p0, p1, p2, p3])
            })
            .collect();
        Self {
            curves,
            closed: false,
        }
    }

    pub fn start(&self) -> Option<Vec3> {
        self.curves.first().map(Cubic::start)
    }

    pub fn end(&self) -> Option<Vec3> {
        self.curves.last().map(Cubic::end)
    }

    pub fn collapsed_at(p: Vec3, curves: usize) -> Self {
        Self {
            curves: vec![Cubic::point(p); curves.max(1)],
            closed: false,
        }
    }

    /// Subdivide until the run has exactly `target` curves, spreading splits evenly.
    pub fn with_curve_count(&self, target: usize) -> Self {
        let m = self.curves.len();
        if m == 0 || target <= m {
            return self.clone();
        }
        let mut factors = vec![0usize; m];
        for i in 0..target {
            factors[i * m / target] += 1;
        }
        let mut curves = Vec::with_capacity(target);
        for (curve, pieces) in self.curves.iter().zip(factors) {
            for j in 0..pieces {
                let t0 = j as f64 / pieces as f64;
                let t1 = (j + 1) as f64 / pieces as f64;
                curves.push(curve.segment(t0, t1));
            }
        }
        Self {
            curves,
            closed: self.closed,
        }
    }
}

/// Vector geometry: an ordered set of cubic subpaths in a node's local frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct VectorPath {
    pub subpaths: Vec<Subpath>,
}

impl VectorPath {
    pub fn new(subpaths: Vec<Subpath>) -> Self {
        Self { subpaths }
    }

    pub fn from_subpath(subpath: Subpath) -> Self {
        Self {
            subpaths: vec![subpath],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.curves.is_empty())
    }

    pub fn curve_count(&self) -> usize {
        self.subpaths.iter().map(|s| s.curves.len()).sum()
    }

    pub fn curves(&self) -> impl Iterator<Item = &Cubic> {
        self.subpaths.iter().flat_map(|s| s.curves.iter())
    }

    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.curves().flat_map(|c| c.0)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points())
    }

    pub fn start(&self) -> Option<Vec3> {
        self.subpaths.first().and_then(Subpath::start)
    }

    pub fn end(&self) -> Option<Vec3> {
        self.subpaths.last().and_then(Subpath::end)
    }

    pub fn transformed(&self, m: &Affine3) -> Self {
        if m.is_identity() {
            return self.clone();
        }
        Self {
            subpaths: self
                .subpaths
                .iter()
                .map(|s| Subpath {
                    curves: s.curves.iter().map(|c| c.transformed(m)).collect(),
                    closed: s.closed,
                })
                .collect(),
        }
    }

    /// Same structure, every point moved to `p`.
    pub fn collapsed_at(&self, p: Vec3) -> Self {
        if self.subpaths.is_empty() {
            return Self::from_subpath(Subpath::collapsed_at(p, 1));
        }
        Self {
            subpaths: self
                .subpaths
                .iter()
                .map(|s| Subpath::collapsed_at(p, s.curves.len()))
                .collect(),
        }
    }

    /// Dense polyline used for arc-length queries.
    fn sample_polyline(&self) -> Vec<Vec3> {
        let mut out = Vec::new();
        for curve in self.curves() {
            let skip = usize::from(!out.is_empty());
            out.extend(curve.samples().skip(skip));
        }
        out
    }

    pub fn arc_length(&self) -> f64 {
        self.sample_polyline()
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    /// Point at fraction `alpha` of the total arc length.
    pub fn point_at_proportion(&self, alpha: f64) -> Option<Vec3> {
        let pts = self.sample_polyline();
        let first = *pts.first()?;
        let total: f64 = pts.windows(2).map(|w| w[0].distance(w[1])).sum();
        if total <= 0.0 || alpha <= 0.0 {
            return Some(first);
        }
        if alpha >= 1.0 {
            return pts.last().copied();
        }
        let goal = alpha * total;
        let mut walked = 0.0;
        for w in pts.windows(2) {
            let seg = w[0].distance(w[1]);
            if seg > 0.0 && walked + seg >= goal {
                return Some(Vec3::lerp(w[0], w[1], (goal - walked) / seg));
            }
            walked += seg;
        }
        pts.last().copied()
    }

    /// Keep the portion between curve-count proportions `a` and `b`.
    ///
    /// The structure (subpath and curve counts) is preserved; curves outside the window
    /// collapse onto the window's end points.
    pub fn partial(&self, a: f64, b: f64) -> Self {
        let total = self.curve_count();
        if total == 0 || (a <= 0.0 && b >= 1.0) {
            return self.clone();
        }
        let lo = a.clamp(0.0, 1.0) * total as f64;
        let hi = b.clamp(0.0, 1.0).max(a.clamp(0.0, 1.0)) * total as f64;
        let p_lo = self.point_at_curve_param(lo);
        let p_hi = self.point_at_curve_param(hi);

        let mut g = 0usize;
        let subpaths = self
            .subpaths
            .iter()
            .map(|sp| {
                let mut fully = true;
                let curves = sp
                    .curves
                    .iter()
                    .map(|c| {
                        let c0 = g as f64;
                        let c1 = c0 + 1.0;
                        g += 1;
                        if hi <= c0 {
                            fully = false;
                            Cubic::point(p_hi)
                        } else if lo >= c1 {
                            fully = false;
                            Cubic::point(p_lo)
                        } else {
                            let t0 = (lo - c0).clamp(0.0, 1.0);
                            let t1 = (hi - c0).clamp(0.0, 1.0);
                            fully &= t0 <= 0.0 && t1 >= 1.0;
                            c.segment(t0, t1)
                        }
                    })
                    .collect();
                Subpath {
                    curves,
                    closed: sp.closed && fully,
                }
            })
            .collect();
        Self { subpaths }
    }

    fn point_at_curve_param(&self, x: f64) -> Vec3 {
        let total = self.curve_count();
        let idx = (x.floor() as usize).min(total.saturating_sub(1));
        let t = x - idx as f64;
        self.curves()
            .nth(idx)
            .map(|c| c.eval(t))
            .unwrap_or(Vec3::ZERO)
    }

    /// Bring two paths to identical structure so they can be paired point by point.
    ///
    /// Missing subpaths are padded with collapsed runs at the shorter path's last point
    /// (or `fallback` when it has none) and curve counts are matched by subdivision.
    pub fn aligned(a: &Self, b: &Self, fallback: Vec3) -> (Self, Self) {
        let n = a.subpaths.len().max(b.subpaths.len()).max(1);
        let anchor_a = a.end().unwrap_or(fallback);
        let anchor_b = b.end().unwrap_or(fallback);
        let mut out_a = Vec::with_capacity(n);
        let mut out_b = Vec::with_capacity(n);
        for i in 0..n {
            let sa = a
                .subpaths
                .get(i)
                .filter(|s| !s.curves.is_empty())
                .cloned()
                .unwrap_or_else(|| Subpath::collapsed_at(anchor_a, 1));
            let sb = b
                .subpaths
                .get(i)
                .filter(|s| !s.curves.is_empty())
                .cloned()
                .unwrap_or_else(|| Subpath::collapsed_at(anchor_b, 1));
            let target = sa.curves.len().max(sb.curves.len());
            out_a.push(sa.with_curve_count(target));
            out_b.push(sb.with_curve_count(target));
        }
        (Self::new(out_a), Self::new(out_b))
    }

    pub fn is_aligned_with(&self, other: &Self) -> bool {
        self.subpaths.len() == other.subpaths.len()
            && self
                .subpaths
                .iter()
                .zip(&other.subpaths)
                .all(|(x, y)| x.curves.len() == y.curves.len())
    }

    /// Pointwise interpolation of aligned paths, exact at both endpoints.
    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return a.clone();
        }
        if t >= 1.0 || !a.is_aligned_with(b) {
            return b.clone();
        }
        Self {
            subpaths: a
                .subpaths
                .iter()
                .zip(&b.subpaths)
                .map(|(x, y)| Subpath {
                    curves: x
                        .curves
                        .iter()
                        .zip(&y.curves)
                        .map(|(cx, cy)| Cubic::lerp(cx, cy, t))
                        .collect(),
                    closed: x.closed,
                })
                .collect(),
        }
    }

    /// 2D kurbo path after applying `m`; z is dropped.
    pub fn to_bezpath(&self, m: &Affine3) -> kurbo::BezPath {
        let pt = |p: Vec3| {
            let q = m.apply(p);
            kurbo::Point::new(q.x, q.y)
        };
        let mut out = kurbo::BezPath::new();
        for sp in &self.subpaths {
            let Some(first) = sp.curves.first() else {
                continue;
            };
            out.move_to(pt(first.start()));
            for c in &sp.curves {
                out.curve_to(pt(c.0[1]), pt(c.0[2]), pt(c.0[3]));
            }
            if sp.closed {
                out.close_path();
            }
        }
        out
    }
}

/// Raster quad: the image's top-left, top-right and bottom-left corners in local space.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageGeom {
    pub image: ImageHandle,
    pub corners: [Vec3; 3],
}

impl ImageGeom {
    /// Centered at the origin with the given world height, keeping the aspect ratio.
    pub fn centered(image: ImageHandle, height: f64) -> Self {
        let aspect = if image.height == 0 {
            1.0
        } else {
            f64::from(image.width) / f64::from(image.height)
        };
        let hw = height * aspect / 2.0;
        let hh = height / 2.0;
        Self {
            image,
            corners: [
                Vec3::xy(-hw, hh),
                Vec3::xy(hw, hh),
                Vec3::xy(-hw, -hh),
            ],
        }
    }

    pub fn points(&self) -> [Vec3; 4] {
        let [tl, tr, bl] = self.corners;
        [tl, tr, bl, tr + bl - tl]
    }
}

/// Leaf geometry: the vector/raster split of a graphic node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Path(VectorPath),
    Image(ImageGeom),
}

impl Geometry {
    pub fn points(&self) -> Vec<Vec3> {
        match self {
            Self::Path(p) => p.points().collect(),
            Self::Image(img) => img.points().to_vec(),
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points())
    }

    pub fn transformed(&self, m: &Affine3) -> Self {
        match self {
            Self::Path(p) => Self::Path(p.transformed(m)),
            Self::Image(img) => Self::Image(ImageGeom {
                image: img.image.clone(),
                corners: img.corners.map(|p| m.apply(p)),
            }),
        }
    }

    pub fn collapsed_at(&self, p: Vec3) -> Self {
        match self {
            Self::Path(path) => Self::Path(path.collapsed_at(p)),
            Self::Image(img) => Self::Image(ImageGeom {
                image: img.image.clone(),
                corners: [p; 3],
            }),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    /// Whether the two geometries can be point-paired.
    pub fn morphable(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Path(_), Self::Path(_)) => true,
            (Self::Image(x), Self::Image(y)) => x.image.key == y.image.key,
            _ => false,
        }
    }

    /// Structure-matched copies ready for [`Geometry::lerp`].
    pub fn aligned(a: &Self, b: &Self, fallback: Vec3) -> (Self, Self) {
        match (a, b) {
            (Self::Path(x), Self::Path(y)) => {
                let (x, y) = VectorPath::aligned(x, y, fallback);
                (Self::Path(x), Self::Path(y))
            }
            _ => (a.clone(), b.clone()),
        }
    }

    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return a.clone();
        }
        if t >= 1.0 {
            return b.clone();
        }
        match (a, b) {
            (Self::Path(x), Self::Path(y)) => Self::Path(VectorPath::lerp(x, y, t)),
            (Self::Image(x), Self::Image(y)) => Self::Image(ImageGeom {
                image: x.image.clone(),
                corners: std::array::from_fn(|i| Vec3::lerp(x.corners[i], y.corners[i], t)),
            }),
            _ => {
                if t < 0.5 {
                    a.clone()
                } else {
                    b.clone()
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mobject/geometry.rs"]
mod tests;
