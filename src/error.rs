//! Error type for the I/O boundary of the renderer.
//!
//! The numeric core never fails: degenerate geometry is clamped to a safe
//! default. Errors only come from malformed inputs (array shape, settings).

/// Errors returned by the public rendering entry points.
#[derive(thiserror::Error, Debug)]
pub enum TornPaperError {
    #[error("invalid image shape: {0}")]
    InvalidShape(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, TornPaperError>;

impl TornPaperError {
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
