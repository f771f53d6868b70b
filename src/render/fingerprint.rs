use crate::foundation::color::Color;
use crate::foundation::math::{Affine3, Bounds, Fnv1a64, Vec3};
use crate::mobject::geometry::Geometry;
use crate::mobject::style::Style;
use crate::render::display::Frame;

/// Two independent FNV-1a lanes over a frame's display list.
///
/// Equal fingerprints mean the rasterized output is identical; the frame index and clock are
/// not hashed, so static stretches of a scene share one fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for FrameFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

struct Lanes {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl Lanes {
    fn new() -> Self {
        Self {
            a: Fnv1a64::new(0xcbf29ce484222325),
            b: Fnv1a64::new(0x9ae16a3b2f90404f),
        }
    }

    fn u8(&mut self, v: u8) {
        self.a.write_u8(v);
        self.b.write_u8(v);
    }

    fn u64(&mut self, v: u64) {
        self.a.write_u64(v);
        self.b.write_u64(v);
    }

    fn i64(&mut self, v: i64) {
        self.u64(v as u64);
    }

    fn f64(&mut self, v: f64) {
        // -0.0 and 0.0 render alike
        self.u64(if v == 0.0 { 0 } else { v.to_bits() });
    }

    fn str(&mut self, s: &str) {
        self.a.write_str(s);
        self.b.write_str(s);
    }

    fn vec3(&mut self, v: Vec3) {
        self.f64(v.x);
        self.f64(v.y);
        self.f64(v.z);
    }

    fn color(&mut self, c: Color) {
        for x in [c.r, c.g, c.b, c.a] {
            self.f64(x);
        }
    }

    fn affine(&mut self, m: &Affine3) {
        for row in m.linear.0 {
            for x in row {
                self.f64(x);
            }
        }
        self.vec3(m.translation);
    }

    fn style(&mut self, s: &Style) {
        self.color(s.fill_color);
        self.f64(s.fill_opacity);
        self.color(s.stroke_color);
        self.f64(s.stroke_width);
        self.f64(s.stroke_opacity);
    }

    fn bounds(&mut self, b: Option<Bounds>) {
        match b {
            Some(b) => {
                self.u8(1);
                self.vec3(b.min);
                self.vec3(b.max);
            }
            None => self.u8(0),
        }
    }

    fn geometry(&mut self, g: &Geometry) {
        match g {
            Geometry::Path(p) => {
                self.u8(0);
                self.u64(p.subpaths.len() as u64);
                for sp in &p.subpaths {
                    self.u8(u8::from(sp.closed));
                    self.u64(sp.curves.len() as u64);
                    for c in &sp.curves {
                        for pt in c.0 {
                            self.vec3(pt);
                        }
                    }
                }
            }
            Geometry::Image(img) => {
                self.u8(1);
                self.str(&img.image.key);
                self.u64(img.image.content_hash());
                for pt in img.corners {
                    self.vec3(pt);
                }
            }
        }
    }

    fn finish(self) -> FrameFingerprint {
        FrameFingerprint {
            hi: self.a.finish(),
            lo: self.b.finish(),
        }
    }
}

pub fn fingerprint_frame(frame: &Frame) -> FrameFingerprint {
    let mut h = Lanes::new();
    h.color(frame.background);
    h.u64(frame.items.len() as u64);
    for item in &frame.items {
        h.u8(item.kind.tag());
        h.i64(i64::from(item.z_index));
        h.affine(&item.transform);
        h.style(&item.style);
        h.bounds(item.clip);
        h.geometry(&item.geometry);
    }
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
