use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::lerp_f64;

/// Straight-alpha sRGB color with components in `[0, 1]`.
///
/// Interpolation converts to linear light, mixes, and converts back, so the
/// stored values stay in the familiar hex space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr", into = "[f64; 4]")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        palette::WHITE
    }
}

impl Color {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(mut self, a: f64) -> Self {
        self.a = a.clamp(0.0, 1.0);
        self
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(s: &str) -> ChoreoResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let nib = |i: usize| -> ChoreoResult<u8> {
            let c = hex
                .as_bytes()
                .get(i)
                .copied()
                .ok_or_else(|| ChoreoError::validation(format!("bad hex color '{s}'")))?;
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| ChoreoError::validation(format!("bad hex color '{s}'")))
        };
        let byte = |i: usize| -> ChoreoResult<u8> { Ok(nib(i)? * 16 + nib(i + 1)?) };
        match hex.len() {
            3 => Ok(Self::rgb_u8(nib(0)? * 17, nib(1)? * 17, nib(2)? * 17)),
            6 => Ok(Self::rgb_u8(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::rgb_u8(byte(0)?, byte(2)?, byte(4)?).with_alpha(f64::from(byte(6)?) / 255.0)),
            _ => Err(ChoreoError::validation(format!("bad hex color '{s}'"))),
        }
    }

    /// Look up a palette name (case-insensitive, `GRAY` and `GREY` both accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_uppercase().replace("GRAY", "GREY");
        palette::NAMED
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, c)| *c)
    }

    /// Hex string or palette name.
    pub fn parse(s: &str) -> ChoreoResult<Self> {
        if s.trim_start().starts_with('#') {
            return Self::from_hex(s);
        }
        Self::from_name(s).map_or_else(|| Self::from_hex(s), Ok)
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// Straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Component-wise interpolation in linear light; exact at both endpoints.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }
        let mix = |x: f64, y: f64| linear_to_srgb(lerp_f64(srgb_to_linear(x), srgb_to_linear(y), t));
        Self {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            a: lerp_f64(a.a, b.a, t),
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Text(String),
    Rgba([f64; 4]),
    Rgb([f64; 3]),
}

impl TryFrom<ColorRepr> for Color {
    type Error = ChoreoError;

    fn try_from(v: ColorRepr) -> Result<Self, Self::Error> {
        match v {
            ColorRepr::Text(s) => Color::parse(&s),
            ColorRepr::Rgba([r, g, b, a]) => Ok(Color::rgba(r, g, b, a)),
            ColorRepr::Rgb([r, g, b]) => Ok(Color::rgba(r, g, b, 1.0)),
        }
    }
}

impl From<Color> for [f64; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// The lecture palette.
pub mod palette {
    use super::Color;

    pub const WHITE: Color = Color::rgb_u8(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb_u8(0x00, 0x00, 0x00);
    pub const GREY_A: Color = Color::rgb_u8(0xDD, 0xDD, 0xDD);
    pub const GREY_B: Color = Color::rgb_u8(0xBB, 0xBB, 0xBB);
    pub const GREY: Color = Color::rgb_u8(0x88, 0x88, 0x88);
    pub const GREY_D: Color = Color::rgb_u8(0x44, 0x44, 0x44);
    pub const GREY_E: Color = Color::rgb_u8(0x22, 0x22, 0x22);
    pub const BLUE: Color = Color::rgb_u8(0x58, 0xC4, 0xDD);
    pub const BLUE_B: Color = Color::rgb_u8(0x9C, 0xDC, 0xEB);
    pub const BLUE_D: Color = Color::rgb_u8(0x29, 0xAB, 0xCA);
    pub const BLUE_E: Color = Color::rgb_u8(0x1C, 0x75, 0x8A);
    pub const TEAL: Color = Color::rgb_u8(0x5C, 0xD0, 0xB3);
    pub const GREEN: Color = Color::rgb_u8(0x83, 0xC1, 0x67);
    pub const YELLOW: Color = Color::rgb_u8(0xFF, 0xFF, 0x00);
    pub const GOLD: Color = Color::rgb_u8(0xF0, 0xAC, 0x5F);
    pub const RED: Color = Color::rgb_u8(0xFC, 0x62, 0x55);
    pub const MAROON: Color = Color::rgb_u8(0xC5, 0x5F, 0x73);
    pub const PURPLE: Color = Color::rgb_u8(0x9A, 0x72, 0xAC);
    pub const PINK: Color = Color::rgb_u8(0xD1, 0x47, 0xBD);
    pub const ORANGE: Color = Color::rgb_u8(0xFF, 0x86, 0x2F);
    pub const LIGHT_BROWN: Color = Color::rgb_u8(0xCD, 0x85, 0x3F);
    pub const DARK_BROWN: Color = Color::rgb_u8(0x8B, 0x45, 0x13);

    pub(crate) const NAMED: &[(&str, Color)] = &[
        ("WHITE", WHITE),
        ("BLACK", BLACK),
        ("GREY_A", GREY_A),
        ("GREY_B", GREY_B),
        ("LIGHT_GREY", GREY_B),
        ("GREY", GREY),
        ("GREY_C", GREY),
        ("GREY_D", GREY_D),
        ("DARK_GREY", GREY_D),
        ("GREY_E", GREY_E),
        ("BLUE", BLUE),
        ("BLUE_C", BLUE),
        ("BLUE_B", BLUE_B),
        ("BLUE_D", BLUE_D),
        ("BLUE_E", BLUE_E),
        ("TEAL", TEAL),
        ("GREEN", GREEN),
        ("YELLOW", YELLOW),
        ("GOLD", GOLD),
        ("RED", RED),
        ("MAROON", MAROON),
        ("PURPLE", PURPLE),
        ("PINK", PINK),
        ("ORANGE", ORANGE),
        ("LIGHT_BROWN", LIGHT_BROWN),
        ("DARK_BROWN", DARK_BROWN),
    ];
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
