/// Named easing curves mapping `[0, 1] -> [0, 1]`.
///
/// Every variant satisfies `f(0) = 0` and `f(1) = 1` except [`Ease::ThereAndBack`],
/// which peaks at `t = 0.5` and returns to `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    Smooth,
    ThereAndBack,
    RushInto,
    RushFrom,
    DoubleSmooth,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub const ALL: [Ease; 12] = [
        Ease::Linear,
        Ease::Smooth,
        Ease::ThereAndBack,
        Ease::RushInto,
        Ease::RushFrom,
        Ease::DoubleSmooth,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => smooth(t),
            Self::ThereAndBack => smooth(2.0 * t.min(1.0 - t)),
            Self::RushInto => 2.0 * smooth(t / 2.0),
            Self::RushFrom => 2.0 * smooth(t / 2.0 + 0.5) - 1.0,
            Self::DoubleSmooth => {
                if t < 0.5 {
                    0.5 * smooth(2.0 * t)
                } else {
                    0.5 * (1.0 + smooth(2.0 * t - 1.0))
                }
            }
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    /// Curves that end where they started.
    pub fn returns_to_start(self) -> bool {
        matches!(self, Self::ThereAndBack)
    }
}

/// Smoothstep `3t² - 2t³`.
pub fn smooth(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
