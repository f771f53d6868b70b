use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Point or direction in world units. +y is up, +z points out of the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub const ORIGIN: Vec3 = Vec3::ZERO;
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const DOWN: Vec3 = Vec3::new(0.0, -1.0, 0.0);
pub const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const LEFT: Vec3 = Vec3::new(-1.0, 0.0, 0.0);
pub const OUT: Vec3 = Vec3::new(0.0, 0.0, 1.0);
pub const IN: Vec3 = Vec3::new(0.0, 0.0, -1.0);
pub const UL: Vec3 = Vec3::new(-1.0, 1.0, 0.0);
pub const UR: Vec3 = Vec3::new(1.0, 1.0, 0.0);
pub const DL: Vec3 = Vec3::new(-1.0, -1.0, 0.0);
pub const DR: Vec3 = Vec3::new(1.0, -1.0, 0.0);

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn dot(self, o: Self) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Self) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, o: Self) -> f64 {
        (self - o).length()
    }

    /// Unit vector in the same direction; zero stays zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= f64::EPSILON {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// `a·(1-t) + b·t`, exact at both endpoints.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self::new(
            lerp_f64(a.x, b.x, t),
            lerp_f64(a.y, b.y, t),
            lerp_f64(a.z, b.z, t),
        )
    }

    pub fn component(self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(self, o: Self) -> Self {
        Self::new(self.x.min(o.x), self.y.min(o.y), self.z.min(o.z))
    }

    pub fn max(self, o: Self) -> Self {
        Self::new(self.x.max(o.x), self.y.max(o.y), self.z.max(o.z))
    }

    /// Component-wise sign with zero mapped to zero.
    pub fn signum(self) -> Self {
        fn s(v: f64) -> f64 {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        Self::new(s(self.x), s(self.y), s(self.z))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, o: Self) {
        *self = *self + o;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, o: Self) {
        *self = *self - o;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// `a·(1-t) + b·t`; returns `a` and `b` bit-exactly at `t = 0` and `t = 1`.
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a * (1.0 - t) + b * t
    }
}

/// Row-major 3x3 matrix.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    pub fn scale(s: f64) -> Self {
        Self([[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]])
    }

    pub fn scale3(s: Vec3) -> Self {
        Self([[s.x, 0.0, 0.0], [0.0, s.y, 0.0], [0.0, 0.0, s.z]])
    }

    /// Rodrigues rotation about a (not necessarily unit) axis.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let k = axis.normalize();
        if k == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Self([
            [
                t * k.x * k.x + c,
                t * k.x * k.y - s * k.z,
                t * k.x * k.z + s * k.y,
            ],
            [
                t * k.x * k.y + s * k.z,
                t * k.y * k.y + c,
                t * k.y * k.z - s * k.x,
            ],
            [
                t * k.x * k.z - s * k.y,
                t * k.y * k.z + s * k.x,
                t * k.z * k.z + c,
            ],
        ])
    }

    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse via the adjugate; `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let m = &self.0;
        let inv = 1.0 / det;
        Some(Self([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
            ],
        ]))
    }

    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Self(std::array::from_fn(|r| std::array::from_fn(|c| m[c][r])))
    }

    /// Entry-wise interpolation, exact at both endpoints.
    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self(std::array::from_fn(|r| {
            std::array::from_fn(|c| lerp_f64(a.0[r][c], b.0[r][c], t))
        }))
    }

    /// Split into `scale · rotation` when the matrix is a rotation times a non-negative scalar.
    ///
    /// The zero matrix reports scale 0 with an identity rotation.
    pub fn as_similarity(&self) -> Option<(f64, Quat)> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            let zero = self.0.iter().flatten().all(|v| v.abs() < 1e-12);
            return zero.then_some((0.0, Quat::IDENTITY));
        }
        if det < 0.0 {
            return None;
        }
        let s = det.cbrt();
        let r = Self(self.0.map(|row| row.map(|v| v / s)));
        let rrt = r * r.transpose();
        let orthonormal = (0..3).all(|i| {
            (0..3).all(|j| {
                let want = if i == j { 1.0 } else { 0.0 };
                (rrt.0[i][j] - want).abs() < 1e-9
            })
        });
        orthonormal.then(|| (s, Quat::from_mat3(&r)))
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, o: Self) -> Self {
        let a = &self.0;
        let b = &o.0;
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = a[r][0] * b[0][c] + a[r][1] * b[1][c] + a[r][2] * b[2][c];
            }
        }
        Self(out)
    }
}

/// 3D affine transform `p -> linear·p + translation`.
///
/// Composition follows function order: `(a * b).apply(p) == a.apply(b.apply(p))`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Affine3 {
    pub linear: Mat3,
    pub translation: Vec3,
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine3 {
    pub const IDENTITY: Self = Self {
        linear: Mat3::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn translate(v: Vec3) -> Self {
        Self {
            linear: Mat3::IDENTITY,
            translation: v,
        }
    }

    pub fn scale(s: f64) -> Self {
        Self {
            linear: Mat3::scale(s),
            translation: Vec3::ZERO,
        }
    }

    pub fn scale_about(s: f64, about: Vec3) -> Self {
        Self::linear_about(Mat3::scale(s), about)
    }

    pub fn stretch_about(s: Vec3, about: Vec3) -> Self {
        Self::linear_about(Mat3::scale3(s), about)
    }

    pub fn rotate(angle: f64, axis: Vec3) -> Self {
        Self {
            linear: Mat3::from_axis_angle(axis, angle),
            translation: Vec3::ZERO,
        }
    }

    pub fn rotate_about(angle: f64, axis: Vec3, about: Vec3) -> Self {
        Self::linear_about(Mat3::from_axis_angle(axis, angle), about)
    }

    fn linear_about(linear: Mat3, about: Vec3) -> Self {
        // T(about) · L · T(-about)
        Self {
            linear,
            translation: about - linear.mul_vec(about),
        }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.linear.mul_vec(p) + self.translation
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn determinant(&self) -> f64 {
        self.linear.determinant()
    }

    pub fn inverse(&self) -> ChoreoResult<Self> {
        if self.is_identity() {
            return Ok(Self::IDENTITY);
        }
        let linear = self.linear.inverse().ok_or_else(|| {
            ChoreoError::degenerate_transform(format!(
                "transform with determinant {} has no inverse",
                self.determinant()
            ))
        })?;
        Ok(Self {
            linear,
            translation: -linear.mul_vec(self.translation),
        })
    }

    /// Mean scale factor (cube root of |det|), used for stroke widths.
    pub fn uniform_scale(&self) -> f64 {
        self.determinant().abs().cbrt()
    }

    /// The xy part as a 2D kurbo affine (z is dropped by orthographic projection).
    pub fn to_kurbo(&self) -> kurbo::Affine {
        let m = &self.linear.0;
        kurbo::Affine::new([
            m[0][0],
            m[1][0],
            m[0][1],
            m[1][1],
            self.translation.x,
            self.translation.y,
        ])
    }
}

impl Mul for Affine3 {
    type Output = Self;
    fn mul(self, o: Self) -> Self {
        if o.is_identity() {
            return self;
        }
        if self.is_identity() {
            return o;
        }
        Self {
            linear: self.linear * o.linear,
            translation: self.linear.mul_vec(o.translation) + self.translation,
        }
    }
}

/// Unit quaternion for camera orientation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let k = axis.normalize();
        if k == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            w: c,
            x: k.x * s,
            y: k.y * s,
            z: k.z * s,
        }
    }

    pub fn dot(self, o: Self) -> f64 {
        self.w * o.w + self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn normalize(self) -> Self {
        let len = self.dot(self).sqrt();
        if len <= f64::EPSILON {
            return Self::IDENTITY;
        }
        Self {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    fn scaled(self, s: f64) -> Self {
        Self {
            w: self.w * s,
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    fn plus(self, o: Self) -> Self {
        Self {
            w: self.w + o.w,
            x: self.x + o.x,
            y: self.y + o.y,
            z: self.z + o.z,
        }
    }

    /// Shortest-arc spherical interpolation, exact at both endpoints.
    pub fn slerp(a: Self, b: Self, t: f64) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }
        let mut b2 = b;
        let mut cos = a.dot(b);
        if cos < 0.0 {
            b2 = b.scaled(-1.0);
            cos = -cos;
        }
        if cos > 0.9995 {
            return a.scaled(1.0 - t).plus(b2.scaled(t)).normalize();
        }
        let theta = cos.acos();
        let sin = theta.sin();
        let wa = ((1.0 - t) * theta).sin() / sin;
        let wb = (t * theta).sin() / sin;
        a.scaled(wa).plus(b2.scaled(wb))
    }

    pub fn to_mat3(self) -> Mat3 {
        let Self { w, x, y, z } = self.normalize();
        Mat3([
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ])
    }

    pub fn rotate_vector(self, v: Vec3) -> Vec3 {
        self.to_mat3().mul_vec(v)
    }

    pub fn conjugate(self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Quaternion of a pure rotation matrix (Shepperd's method).
    pub fn from_mat3(m: &Mat3) -> Self {
        let m = &m.0;
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self {
                w: 0.25 * s,
                x: (m[2][1] - m[1][2]) / s,
                y: (m[0][2] - m[2][0]) / s,
                z: (m[1][0] - m[0][1]) / s,
            }
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Self {
                w: (m[2][1] - m[1][2]) / s,
                x: 0.25 * s,
                y: (m[0][1] + m[1][0]) / s,
                z: (m[0][2] + m[2][0]) / s,
            }
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Self {
                w: (m[0][2] - m[2][0]) / s,
                x: (m[0][1] + m[1][0]) / s,
                y: 0.25 * s,
                z: (m[1][2] + m[2][1]) / s,
            }
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Self {
                w: (m[1][0] - m[0][1]) / s,
                x: (m[0][2] + m[2][0]) / s,
                y: (m[1][2] + m[2][1]) / s,
                z: 0.25 * s,
            }
        };
        q.normalize()
    }
}

impl Mul for Quat {
    type Output = Self;
    fn mul(self, o: Self) -> Self {
        Self {
            w: self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            x: self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            y: self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            z: self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        }
    }
}

/// Axis-aligned world-space box.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Self::point(first), |b, p| b.include(p)))
    }

    pub fn include(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, o: Self) -> Self {
        Self {
            min: self.min.min(o.min),
            max: self.max.max(o.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f64 {
        self.max.z - self.min.z
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max.component(axis) - self.min.component(axis)
    }

    /// Point on the box selected per axis by the sign of `dir`: min, center or max.
    pub fn critical_point(&self, dir: Vec3) -> Vec3 {
        let c = self.center();
        let pick = |axis: usize| {
            let d = dir.component(axis);
            if d > 0.0 {
                self.max.component(axis)
            } else if d < 0.0 {
                self.min.component(axis)
            } else {
                c.component(axis)
            }
        };
        Vec3::new(pick(0), pick(1), pick(2))
    }

    pub fn expand(&self, buff: f64) -> Self {
        let d = Vec3::new(buff, buff, 0.0);
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
