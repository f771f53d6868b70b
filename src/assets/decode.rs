use std::sync::Arc;

use anyhow::Context;

use crate::assets::image::PreparedImage;
use crate::foundation::color::Color;
use crate::foundation::error::ChoreoResult;
use crate::foundation::math::Vec3;
use crate::mobject::geometry::{Cubic, Subpath, VectorPath};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ChoreoResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> ChoreoResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// One SVG path element converted to world-space cubics.
#[derive(Clone, Debug)]
pub struct SvgShape {
    pub path: VectorPath,
    pub fill: Option<(Color, f64)>,
    pub stroke: Option<(Color, f64)>,
}

/// Flatten every path of `tree` into cubics, flipping y so +y is up.
///
/// Coordinates stay in SVG user units; callers rescale to world units.
pub fn svg_shapes(tree: &usvg::Tree) -> Vec<SvgShape> {
    let mut out = Vec::new();
    collect_shapes(tree.root(), &mut out);
    out
}

fn collect_shapes(group: &usvg::Group, out: &mut Vec<SvgShape>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_shapes(g, out),
            usvg::Node::Path(p) => {
                if !p.is_visible() {
                    continue;
                }
                let path = path_to_cubics(p.data(), p.abs_transform());
                if path.is_empty() {
                    continue;
                }
                let fill = p.fill().and_then(|f| match f.paint() {
                    usvg::Paint::Color(c) => Some((
                        Color::rgb_u8(c.red, c.green, c.blue),
                        f64::from(f.opacity().get()),
                    )),
                    _ => None,
                });
                let stroke = p.stroke().and_then(|s| match s.paint() {
                    usvg::Paint::Color(c) => Some((
                        Color::rgb_u8(c.red, c.green, c.blue),
                        f64::from(s.width().get()),
                    )),
                    _ => None,
                });
                out.push(SvgShape { path, fill, stroke });
            }
            _ => {}
        }
    }
}

fn path_to_cubics(data: &usvg::tiny_skia_path::Path, ts: usvg::Transform) -> VectorPath {
    use usvg::tiny_skia_path::PathSegment;

    let map = |p: usvg::tiny_skia_path::Point| {
        let x = f64::from(ts.sx) * f64::from(p.x) + f64::from(ts.kx) * f64::from(p.y) + f64::from(ts.tx);
        let y = f64::from(ts.ky) * f64::from(p.x) + f64::from(ts.sy) * f64::from(p.y) + f64::from(ts.ty);
        Vec3::xy(x, -y)
    };

    let mut subpaths = Vec::new();
    let mut current: Vec<Cubic> = Vec::new();
    let mut start = Vec3::ZERO;
    let mut pen = Vec3::ZERO;
    fn flush(curves: &mut Vec<Cubic>, closed: bool, subpaths: &mut Vec<Subpath>) {
        if !curves.is_empty() {
            subpaths.push(Subpath {
                curves: std::mem::take(curves),
                closed,
            });
        }
    }

    for seg in data.segments() {
        match seg {
            PathSegment::MoveTo(p) => {
                flush(&mut current, false, &mut subpaths);
                start = map(p);
                pen = start;
            }
            PathSegment::LineTo(p) => {
                let q = map(p);
                current.push(Cubic::line(pen, q));
                pen = q;
            }
            PathSegment::QuadTo(c, p) => {
                let c = map(c);
                let q = map(p);
                // Degree elevation.
                let h1 = pen + (c - pen) * (2.0 / 3.0);
                let h2 = q + (c - q) * (2.0 / 3.0);
                current.push(Cubic([pen, h1, h2, q]));
                pen = q;
            }
            PathSegment::CubicTo(c1, c2, p) => {
                let q = map(p);
                current.push(Cubic([pen, map(c1), map(c2), q]));
                pen = q;
            }
            PathSegment::Close => {
                if pen != start {
                    current.push(Cubic::line(pen, start));
                }
                pen = start;
                flush(&mut current, true, &mut subpaths);
            }
        }
    }
    flush(&mut current, false, &mut subpaths);
    VectorPath::new(subpaths)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
