/// Convenience result type used across choreo.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Top-level error taxonomy used by scene, animation and render APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChoreoError {
    /// Invalid user-provided configuration or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation referenced a node that does not exist or is not in the scene graph.
    #[error("unknown target: {0}")]
    UnknownTarget(String),

    /// A geometry morph was requested between kinds that cannot be point-paired.
    #[error("incompatible morph: {0}")]
    IncompatibleMorph(String),

    /// `restore()` without a matching `save_state()`.
    #[error("unbalanced camera restore: {0}")]
    UnbalancedCamera(String),

    /// Zero-scale or otherwise non-invertible transform.
    #[error("degenerate transform: {0}")]
    DegenerateTransform(String),

    /// Image path, SVG file or glyph outline not found.
    #[error("asset missing: {0}")]
    AssetMissing(String),

    /// Glyph or entry index beyond the available range.
    #[error("index out of range: {0}")]
    OutOfRangeIndex(String),

    /// Errors while materializing or scheduling animations.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors raised by rasterizers, sinks and encoders.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChoreoError {
    /// Build a [`ChoreoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChoreoError::UnknownTarget`] value.
    pub fn unknown_target(msg: impl Into<String>) -> Self {
        Self::UnknownTarget(msg.into())
    }

    /// Build a [`ChoreoError::IncompatibleMorph`] value.
    pub fn incompatible_morph(msg: impl Into<String>) -> Self {
        Self::IncompatibleMorph(msg.into())
    }

    /// Build a [`ChoreoError::UnbalancedCamera`] value.
    pub fn unbalanced_camera(msg: impl Into<String>) -> Self {
        Self::UnbalancedCamera(msg.into())
    }

    /// Build a [`ChoreoError::DegenerateTransform`] value.
    pub fn degenerate_transform(msg: impl Into<String>) -> Self {
        Self::DegenerateTransform(msg.into())
    }

    /// Build a [`ChoreoError::AssetMissing`] value.
    pub fn asset_missing(msg: impl Into<String>) -> Self {
        Self::AssetMissing(msg.into())
    }

    /// Build a [`ChoreoError::OutOfRangeIndex`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRangeIndex(msg.into())
    }

    /// Build a [`ChoreoError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ChoreoError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ChoreoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the segment may proceed with a fallback after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateTransform(_) | Self::OutOfRangeIndex(_) | Self::IncompatibleMorph(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
