//! Errors and warnings

use crate::pnr::Float;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the evaluation or rendering of a single group.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The group has no measurable meshes.
    #[error("group contains no meshes")]
    EmptyGroup,

    /// An extent of the composite box lies outside the accepted size envelope.
    #[error("degenerate geometry: {dimension} of {size_mm} mm is outside [{min_mm}, {max_mm}] mm")]
    DegenerateGeometry {
        /// Name of the offending extent (width, depth or height).
        dimension: &'static str,
        /// Measured extent.
        size_mm: Float,
        /// Smallest accepted extent.
        min_mm: Float,
        /// Largest accepted extent.
        max_mm: Float,
    },

    /// A computed image dimension is below one pixel.
    #[error("resolution {width}x{height} px is too small")]
    ResolutionTooSmall { width: u64, height: u64 },

    /// A computed image dimension exceeds the hard ceiling.
    #[error("resolution {width}x{height} px exceeds the {max} px limit")]
    ResolutionTooLarge { width: u64, height: u64, max: u32 },

    /// The framing solver ran out of iterations.
    #[error("camera framing did not converge after {iterations} iterations")]
    FramingDiverged { iterations: usize },

    /// No usable output location.
    #[error("output path {} is unavailable: {reason}", path.display())]
    PathUnavailable { path: PathBuf, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The host failed to produce an image.
    #[error("render failed: {0}")]
    RenderFailed(String),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    /// Create a path unavailable error.
    ///
    /// * `path`   - The path.
    /// * `reason` - Why it cannot be used.
    pub fn path_unavailable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::PathUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Non-fatal conditions surfaced during evaluation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Warning {
    /// A dimension exceeds the soft resolution ceiling.
    LargeResolution { width: u32, height: u32, soft_max: u32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LargeResolution {
                width,
                height,
                soft_max,
            } => write!(
                f,
                "large resolution {width}x{height} px exceeds {soft_max} px, rendering may be slow"
            ),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::DegenerateGeometry {
            dimension: "height",
            size_mm: 0.5,
            min_mm: 1.0,
            max_mm: 10000.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("height"));
        assert!(msg.contains("0.5"));

        let err = Error::path_unavailable("/nope/out.png", "parent folder does not exist");
        assert!(format!("{err}").contains("/nope/out.png"));

        let err = Error::FramingDiverged { iterations: 50 };
        assert!(format!("{err}").contains("50"));
    }

    #[test]
    fn warning_display() {
        let w = Warning::LargeResolution {
            width: 8220,
            height: 100,
            soft_max: 8192,
        };
        assert!(format!("{w}").contains("8220x100"));
    }
}
