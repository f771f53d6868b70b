use crate::foundation::color::{Color, palette};
use crate::foundation::core::DEFAULT_STROKE_WIDTH;
use crate::foundation::math::lerp_f64;

/// Paint attributes of a leaf. Images use `fill_opacity` as their opacity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    pub fill_color: Color,
    pub fill_opacity: f64,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self::stroked(palette::WHITE, DEFAULT_STROKE_WIDTH)
    }
}

impl Style {
    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            fill_color: color,
            fill_opacity: 0.0,
            stroke_color: color,
            stroke_width: width,
            stroke_opacity: 1.0,
        }
    }

    pub fn filled(color: Color, opacity: f64) -> Self {
        Self {
            fill_color: color,
            fill_opacity: opacity,
            stroke_color: color,
            stroke_width: 0.0,
            stroke_opacity: 1.0,
        }
    }

    /// Same paint with both opacities scaled by `factor`.
    pub fn faded(mut self, factor: f64) -> Self {
        self.fill_opacity *= factor;
        self.stroke_opacity *= factor;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.fill_opacity > 0.0 || (self.stroke_opacity > 0.0 && self.stroke_width > 0.0)
    }

    /// Opacities clamped to `[0, 1]` and widths to `>= 0`, as handed to rasterizers.
    pub fn resolved(mut self) -> Self {
        self.fill_opacity = self.fill_opacity.clamp(0.0, 1.0);
        self.stroke_opacity = self.stroke_opacity.clamp(0.0, 1.0);
        self.stroke_width = self.stroke_width.max(0.0);
        self
    }

    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return *a;
        }
        if t >= 1.0 {
            return *b;
        }
        Self {
            fill_color: Color::lerp(a.fill_color, b.fill_color, t),
            fill_opacity: lerp_f64(a.fill_opacity, b.fill_opacity, t),
            stroke_color: Color::lerp(a.stroke_color, b.stroke_color, t),
            stroke_width: lerp_f64(a.stroke_width, b.stroke_width, t),
            stroke_opacity: lerp_f64(a.stroke_opacity, b.stroke_opacity, t),
        }
    }
}

/// Partial style update; `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StyleEdit {
    pub fill_color: Option<Color>,
    pub fill_opacity: Option<f64>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub stroke_opacity: Option<f64>,
}

impl StyleEdit {
    pub fn color(c: Color) -> Self {
        Self {
            fill_color: Some(c),
            stroke_color: Some(c),
            ..Self::default()
        }
    }

    pub fn opacity(o: f64) -> Self {
        Self {
            fill_opacity: Some(o),
            stroke_opacity: Some(o),
            ..Self::default()
        }
    }

    pub fn fill(color: Option<Color>, opacity: Option<f64>) -> Self {
        Self {
            fill_color: color,
            fill_opacity: opacity,
            ..Self::default()
        }
    }

    pub fn stroke(color: Option<Color>, width: Option<f64>, opacity: Option<f64>) -> Self {
        Self {
            stroke_color: color,
            stroke_width: width,
            stroke_opacity: opacity,
            ..Self::default()
        }
    }

    pub fn apply(&self, style: &mut Style) {
        if let Some(c) = self.fill_color {
            style.fill_color = c;
        }
        if let Some(o) = self.fill_opacity {
            style.fill_opacity = o;
        }
        if let Some(c) = self.stroke_color {
            style.stroke_color = c;
        }
        if let Some(w) = self.stroke_width {
            style.stroke_width = w;
        }
        if let Some(o) = self.stroke_opacity {
            style.stroke_opacity = o;
        }
    }
}

/// Descriptive kind tag carried to the display list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Polyline,
    Polygon,
    FilledPath,
    Glyph,
    Image,
    #[default]
    Group,
}

impl ObjectKind {
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Polyline => 0,
            Self::Polygon => 1,
            Self::FilledPath => 2,
            Self::Glyph => 3,
            Self::Image => 4,
            Self::Group => 5,
        }
    }
}
