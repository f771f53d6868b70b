use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::color::Color;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Bounds, Vec3};
use crate::mobject::geometry::{Geometry, ImageGeom, VectorPath};
use crate::mobject::style::Style;
use crate::render::backend::{FrameRGBA, RasterBackend, RenderSettings};
use crate::render::display::{DisplayItem, Frame};

/// Reference width at which stroke widths are given in pixels.
const STROKE_REFERENCE_WIDTH: f64 = 1920.0;

/// `vello_cpu` rasterizer for display lists.
pub struct CpuBackend {
    settings: RenderSettings,
    image_cache: HashMap<String, vello_cpu::Image>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            image_cache: HashMap::new(),
            pixmap: None,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn surface_size(&self) -> ChoreoResult<(u16, u16)> {
        let w: u16 = self
            .settings
            .pixel_width
            .try_into()
            .map_err(|_| ChoreoError::render("surface width exceeds u16"))?;
        let h: u16 = self
            .settings
            .pixel_height
            .try_into()
            .map_err(|_| ChoreoError::render("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(ChoreoError::render("surface size must be non-zero"));
        }
        Ok((w, h))
    }

    fn stroke_scale(&self) -> f64 {
        f64::from(self.settings.pixel_width) / STROKE_REFERENCE_WIDTH
    }

    fn image_paint_for(&mut self, geom: &ImageGeom) -> ChoreoResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&geom.image.key) {
            return Ok(paint.clone());
        }
        let img = &geom.image.pixels;
        let pixmap = image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(geom.image.key.clone(), paint.clone());
        Ok(paint)
    }
}

impl RasterBackend for CpuBackend {
    fn render_frame(&mut self, frame: &Frame) -> ChoreoResult<FrameRGBA> {
        let (w, h) = self.surface_size()?;
        let mut pixmap = match self.pixmap.take() {
            Some(p) if p.width() == w && p.height() == h => p,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        let clear = self
            .settings
            .clear_rgba
            .unwrap_or_else(|| color_rgba8(frame.background, 1.0));
        clear_pixmap(&mut pixmap, premul_rgba8(clear));

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let to_px = self.settings.to_pixels();
        for item in &frame.items {
            draw_item(self, &mut ctx, item, to_px)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let data = pixmap.data_as_u8_slice().to_vec();
        self.pixmap = Some(pixmap);
        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data,
            premultiplied: true,
        })
    }

    fn worker_render_settings(&self) -> Option<RenderSettings> {
        Some(self.settings.clone())
    }
}

fn color_rgba8(c: Color, opacity: f64) -> [u8; 4] {
    let q = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(c.r), q(c.g), q(c.b), q(c.a * opacity)]
}

fn premul_rgba8([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn paint_color(c: Color, opacity: f64) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = color_rgba8(c, opacity);
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn draw_item(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    item: &DisplayItem,
    to_px: kurbo::Affine,
) -> ChoreoResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    let clipped = match item.clip {
        Some(clip) => {
            ctx.push_clip_layer(&clip_path(&clip, to_px));
            true
        }
        None => false,
    };
    match &item.geometry {
        Geometry::Path(path) => draw_path(backend, ctx, path, &item.transform, &item.style, to_px),
        Geometry::Image(img) => {
            let paint = backend.image_paint_for(img)?;
            let (w, h) = (f64::from(img.image.width.max(1)), f64::from(img.image.height.max(1)));
            ctx.set_transform(image_transform(img, &item.transform, to_px, w, h));
            ctx.set_paint(paint);
            let opacity = item.style.fill_opacity as f32;
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }
    }
    if clipped {
        ctx.pop_layer();
    }
    Ok(())
}

fn draw_path(
    backend: &CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    path: &VectorPath,
    transform: &Affine3,
    style: &Style,
    to_px: kurbo::Affine,
) {
    if path.is_empty() {
        return;
    }
    let bez = bezpath_to_cpu(&(to_px * path.to_bezpath(transform)));
    if style.fill_opacity > 0.0 {
        ctx.set_paint(paint_color(style.fill_color, style.fill_opacity));
        ctx.fill_path(&bez);
    }
    if style.stroke_width > 0.0 && style.stroke_opacity > 0.0 {
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(
            style.stroke_width * backend.stroke_scale(),
        ));
        ctx.set_paint(paint_color(style.stroke_color, style.stroke_opacity));
        ctx.stroke_path(&bez);
    }
}

fn project(to_px: kurbo::Affine, m: &Affine3, p: Vec3) -> kurbo::Point {
    let q = m.apply(p);
    to_px * kurbo::Point::new(q.x, q.y)
}

/// Maps the image's pixel rectangle onto its quad in surface pixels.
fn image_transform(
    img: &ImageGeom,
    m: &Affine3,
    to_px: kurbo::Affine,
    w: f64,
    h: f64,
) -> vello_cpu::kurbo::Affine {
    let [tl, tr, bl] = img.corners;
    let o = project(to_px, m, tl);
    let x = project(to_px, m, tr) - o;
    let y = project(to_px, m, bl) - o;
    vello_cpu::kurbo::Affine::new([x.x / w, x.y / w, y.x / h, y.y / h, o.x, o.y])
}

fn clip_path(clip: &Bounds, to_px: kurbo::Affine) -> vello_cpu::kurbo::BezPath {
    let corners = [
        (clip.min.x, clip.min.y),
        (clip.max.x, clip.min.y),
        (clip.max.x, clip.max.y),
        (clip.min.x, clip.max.y),
    ];
    let mut out = vello_cpu::kurbo::BezPath::new();
    for (i, (x, y)) in corners.into_iter().enumerate() {
        let p = point_to_cpu(to_px * kurbo::Point::new(x, y));
        if i == 0 {
            out.move_to(p);
        } else {
            out.line_to(p);
        }
    }
    out.close_path();
    out
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ChoreoResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ChoreoError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ChoreoError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ChoreoError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
