use crate::assets::typeset::{GlyphRun, TextMode};
use crate::foundation::color::palette;
use crate::foundation::math::Affine3;
use crate::mobject::builder::Mobject;
use crate::mobject::geometry::Geometry;
use crate::mobject::style::{ObjectKind, Style};

impl Mobject {
    /// Group with one filled glyph child per outline, centered on the origin.
    ///
    /// Children keep the typesetter's order so `[i..j]` slicing maps onto glyph indices.
    pub fn from_glyph_run(run: &GlyphRun, source: &str, mode: TextMode) -> Self {
        let offset = run.bounds().map(|b| b.center()).unwrap_or_default();
        let glyphs = run.glyphs.iter().map(|g| {
            let outline = g.outline.transformed(&Affine3::translate(-offset));
            Mobject::leaf(
                ObjectKind::Glyph,
                Geometry::Path(outline),
                Style::filled(palette::WHITE, 1.0),
            )
            .named(g.label.clone())
        });
        let tag = match mode {
            TextMode::Plain => "text",
            TextMode::Latex => "tex",
        };
        Mobject::group(glyphs).named(format!("{tag}:{source}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mobject/text.rs"]
mod tests;
