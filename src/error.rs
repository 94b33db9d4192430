//! Conversion pipeline errors.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// ConvertError
// ============================================================================

/// Errors raised by the load → resize → rasterize → export pipeline.
///
/// Every variant is recoverable: the session reports it and stays usable.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input text has no `<svg>` root element (includes empty input).
    #[error("no valid SVG element found")]
    MalformedInput,

    /// Root element found, but the markup could not be rasterized.
    #[error("failed to decode SVG: {0}")]
    DecodeFailure(String),

    /// Rasterization succeeded, but the output format could not be written.
    #[error("failed to encode image: {0}")]
    EncodeFailure(String),

    /// A resize or export would produce non-positive or non-finite dimensions.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("scale factor {scale} is outside 1..={max}")]
    ScaleOutOfRange { scale: i64, max: u32 },

    #[error("no SVG to convert")]
    NothingToExport,

    #[error("IO error on `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl ConvertError {
    pub fn invalid_dimensions(width: impl Into<f64>, height: impl Into<f64>) -> Self {
        Self::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        }
    }
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
