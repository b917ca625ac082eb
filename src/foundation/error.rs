/// Convenience result type used across Stardrift.
pub type SplashResult<T> = Result<T, SplashError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The per-frame path of the engine never produces these; they come from configuration loading,
/// asset decoding, surface allocation and frame sinks.
#[derive(thiserror::Error, Debug)]
pub enum SplashError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while reading or decoding image/SVG/font assets.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while allocating or rasterizing a drawing surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors raised by frame sinks (PNG sequences, `ffmpeg`).
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SplashError {
    /// Build a [`SplashError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SplashError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`SplashError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SplashError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SplashError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
