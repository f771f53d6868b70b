use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

use crate::assets::decode::{parse_svg, svg_shapes};
use crate::foundation::core::DEFAULT_FONT_SIZE;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Bounds, Fnv1a64, Vec3};
use crate::mobject::geometry::{Subpath, VectorPath};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    #[default]
    Plain,
    Latex,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypesetRequest {
    pub source: String,
    pub mode: TextMode,
    pub font_size: f64,
    pub weight: FontWeight,
}

impl TypesetRequest {
    pub fn plain(source: impl Into<String>, font_size: f64) -> Self {
        Self {
            source: source.into(),
            mode: TextMode::Plain,
            font_size,
            weight: FontWeight::Normal,
        }
    }

    pub fn latex(source: impl Into<String>, font_size: f64) -> Self {
        Self {
            source: source.into(),
            mode: TextMode::Latex,
            font_size,
            weight: FontWeight::Normal,
        }
    }

    fn cache_key(&self, typesetter: &str) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_str(typesetter);
        h.write_str(&self.source);
        h.write_u8(match self.mode {
            TextMode::Plain => 0,
            TextMode::Latex => 1,
        });
        h.write_u8(match self.weight {
            FontWeight::Normal => 0,
            FontWeight::Bold => 1,
        });
        h.write_f64(self.font_size);
        h.finish()
    }
}

/// One glyph outline in world units, positioned relative to the run's baseline origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub label: String,
    pub outline: VectorPath,
}

/// Ordered glyph outlines; the order is stable so index slicing is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphRun {
    pub glyphs: Vec<Glyph>,
}

impl GlyphRun {
    pub fn bounds(&self) -> Option<Bounds> {
        self.glyphs
            .iter()
            .filter_map(|g| g.outline.bounds())
            .reduce(Bounds::union)
    }
}

/// External typesetting contract: plain strings and LaTeX to glyph outlines.
pub trait Typesetter: Send + Sync {
    fn name(&self) -> &str;
    fn typeset(&self, request: &TypesetRequest) -> ChoreoResult<GlyphRun>;
}

/// Process-wide cache of glyph runs keyed by typesetter and request.
#[derive(Clone, Default)]
pub struct GlyphCache {
    runs: Arc<RwLock<HashMap<u64, Arc<GlyphRun>>>>,
}

impl GlyphCache {
    pub fn global() -> &'static GlyphCache {
        static GLOBAL: OnceLock<GlyphCache> = OnceLock::new();
        GLOBAL.get_or_init(GlyphCache::default)
    }

    pub fn len(&self) -> usize {
        self.runs.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_or_typeset(
        &self,
        typesetter: &dyn Typesetter,
        request: &TypesetRequest,
    ) -> ChoreoResult<Arc<GlyphRun>> {
        let key = request.cache_key(typesetter.name());
        if let Ok(runs) = self.runs.read()
            && let Some(hit) = runs.get(&key)
        {
            return Ok(Arc::clone(hit));
        }
        let run = Arc::new(typesetter.typeset(request)?);
        let mut runs = self
            .runs
            .write()
            .map_err(|_| ChoreoError::render("glyph cache lock poisoned"))?;
        Ok(Arc::clone(runs.entry(key).or_insert(run)))
    }
}

/// World units per em at the default font size.
const EM_AT_DEFAULT: f64 = 0.6;

/// Built-in typesetter drawing every glyph as a box with a character-dependent counter.
///
/// Metrics follow character classes (caps, ascenders, descenders, punctuation). LaTeX input
/// is tokenized into commands and symbols; `^`/`_` shrink and shift the next token, braces
/// and `$` produce no glyph.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockTypesetter;

struct Token {
    label: String,
    script: i8,
}

impl BlockTypesetter {
    fn tokens(request: &TypesetRequest) -> Vec<Token> {
        match request.mode {
            TextMode::Plain => request
                .source
                .chars()
                .map(|c| Token {
                    label: c.to_string(),
                    script: 0,
                })
                .collect(),
            TextMode::Latex => latex_tokens(&request.source),
        }
    }

    fn glyph_box(label: &str, weight: FontWeight) -> (f64, f64, f64) {
        let c = label.chars().next().unwrap_or(' ');
        let width = match weight {
            FontWeight::Normal => 0.55,
            FontWeight::Bold => 0.62,
        };
        if label.len() > 1 && label.starts_with('\\') {
            return (width, 0.0, 0.62);
        }
        match c {
            'A'..='Z' | '0'..='9' => (width, 0.0, 0.7),
            'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' => (width * 0.9, 0.0, 0.72),
            'g' | 'j' | 'p' | 'q' | 'y' => (width * 0.9, -0.2, 0.5),
            'a'..='z' => (width * 0.9, 0.0, 0.5),
            '.' | ',' | ':' | ';' | '\'' => (0.15, 0.0, 0.15),
            '-' | '=' | '+' => (width, 0.2, 0.4),
            '(' | ')' | '[' | ']' | '|' => (0.25, -0.2, 0.75),
            _ => (width, 0.0, 0.6),
        }
    }
}

impl Typesetter for BlockTypesetter {
    fn name(&self) -> &str {
        "block"
    }

    fn typeset(&self, request: &TypesetRequest) -> ChoreoResult<GlyphRun> {
        if !(request.font_size > 0.0) {
            return Err(ChoreoError::validation("font size must be positive"));
        }
        let em = EM_AT_DEFAULT * request.font_size / DEFAULT_FONT_SIZE;
        let tracking = 0.08;
        let mut pen = Vec3::ZERO;
        let mut glyphs = Vec::new();

        for token in Self::tokens(request) {
            match token.label.as_str() {
                "\n" => {
                    pen = Vec3::xy(0.0, pen.y - 1.2 * em);
                    continue;
                }
                " " | "\t" => {
                    pen.x += 0.3 * em;
                    continue;
                }
                _ => {}
            }
            let (scale, rise) = match token.script {
                1 => (0.7, 0.45),
                -1 => (0.7, -0.2),
                _ => (1.0, 0.0),
            };
            let (w, y0, y1) = Self::glyph_box(&token.label, request.weight);
            let e = em * scale;
            let origin = pen + Vec3::xy(0.0, rise * em);
            let outline = glyph_outline(&token.label, w * e, y0 * e, y1 * e)
                .transformed(&Affine3::translate(origin));
            glyphs.push(Glyph {
                label: token.label,
                outline,
            });
            pen.x += (w + tracking) * e;
        }
        Ok(GlyphRun { glyphs })
    }
}

fn latex_tokens(src: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut chars = src.chars().peekable();
    let mut pending_script = 0i8;
    while let Some(c) = chars.next() {
        let label = match c {
            '{' | '}' | '$' | ' ' | '\t' | '\n' => continue,
            '^' => {
                pending_script = 1;
                continue;
            }
            '_' => {
                pending_script = -1;
                continue;
            }
            '\\' => {
                let mut name = String::from('\\');
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphabetic() {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.len() == 1 {
                    // `\,`, `\;`, `\\`: spacing and line breaks.
                    chars.next();
                    continue;
                }
                if matches!(name.as_str(), "\\left" | "\\right" | "\\mathrm" | "\\text" | "\\mathbf") {
                    continue;
                }
                name
            }
            other => other.to_string(),
        };
        out.push(Token {
            label,
            script: std::mem::take(&mut pending_script),
        });
    }
    out
}

/// Box outline with an inner counter whose height depends on the label.
fn glyph_outline(label: &str, w: f64, y0: f64, y1: f64) -> VectorPath {
    let outer = Subpath::from_corners(
        &[
            Vec3::xy(0.0, y0),
            Vec3::xy(w, y0),
            Vec3::xy(w, y1),
            Vec3::xy(0.0, y1),
        ],
        true,
    );
    let h = y1 - y0;
    if h < 0.3 * w.max(1e-9) || w <= 0.0 {
        return VectorPath::from_subpath(outer);
    }
    let mut hash = Fnv1a64::new_default();
    hash.write_str(label);
    let slot = (hash.finish() % 4) as f64;
    let cy0 = y0 + h * (0.15 + 0.15 * slot);
    let cy1 = cy0 + h * 0.2;
    let (cx0, cx1) = (w * 0.3, w * 0.7);
    // Reverse winding so nonzero filling leaves a hole.
    let counter = Subpath::from_corners(
        &[
            Vec3::xy(cx0, cy0),
            Vec3::xy(cx0, cy1),
            Vec3::xy(cx1, cy1),
            Vec3::xy(cx1, cy0),
        ],
        true,
    );
    VectorPath::new(vec![outer, counter])
}

/// Reads pre-rendered outlines from `<dir>/<key>.svg`, one glyph per SVG path element.
///
/// `key` is the lowercase hex FNV-1a hash of `"<mode>:<source>"`, so an external tool
/// (for example a LaTeX-to-SVG batch job) can populate the directory ahead of time.
pub struct SvgTypesetter {
    dir: PathBuf,
    units_per_em: f64,
}

impl SvgTypesetter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            units_per_em: 10.0,
        }
    }

    /// Uses `CHOREO_TEX_DIR` when set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os("CHOREO_TEX_DIR").map(Self::new)
    }

    pub fn with_units_per_em(mut self, units: f64) -> Self {
        self.units_per_em = units;
        self
    }

    pub fn file_key(request: &TypesetRequest) -> String {
        let mut h = Fnv1a64::new_default();
        let mode = match request.mode {
            TextMode::Plain => "plain",
            TextMode::Latex => "latex",
        };
        h.write_bytes(format!("{mode}:{}", request.source).as_bytes());
        format!("{:016x}", h.finish())
    }
}

impl Typesetter for SvgTypesetter {
    fn name(&self) -> &str {
        "svg"
    }

    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn typeset(&self, request: &TypesetRequest) -> ChoreoResult<GlyphRun> {
        let path = self.dir.join(format!("{}.svg", Self::file_key(request)));
        let bytes = std::fs::read(&path).map_err(|e| {
            ChoreoError::asset_missing(format!(
                "glyph outlines for '{}' at '{}': {e}",
                request.source,
                path.display()
            ))
        })?;
        let tree = parse_svg(&bytes)?;
        let scale = EM_AT_DEFAULT * request.font_size / DEFAULT_FONT_SIZE / self.units_per_em;
        let m = Affine3::scale(scale);
        let labels: Vec<char> = request.source.chars().filter(|c| !c.is_whitespace()).collect();
        let shapes = svg_shapes(&tree);
        let same_count = labels.len() == shapes.len();
        let glyphs = shapes
            .into_iter()
            .enumerate()
            .map(|(i, s)| Glyph {
                label: if same_count {
                    labels[i].to_string()
                } else {
                    format!("#{i}")
                },
                outline: s.path.transformed(&m),
            })
            .collect();
        Ok(GlyphRun { glyphs })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/typeset.rs"]
mod tests;
