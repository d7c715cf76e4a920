//! Image resolution from physical size.

use crate::config::ResolutionLimits;
use crate::error::{Error, Result, Warning};
use crate::pnr::Float;
use std::fmt;

/// Output image dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Width in pixels.
    pub width_px: u32,

    /// Height in pixels.
    pub height_px: u32,
}

impl Resolution {
    /// Create a new resolution.
    ///
    /// * `width_px`  - Width in pixels.
    /// * `height_px` - Height in pixels.
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Returns width divided by height.
    pub fn aspect(&self) -> Float {
        self.width_px as Float / self.height_px as Float
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width_px, self.height_px)
    }
}

/// A computed resolution and the non-fatal condition raised computing it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolutionReport {
    pub resolution: Resolution,
    pub warning: Option<Warning>,
}

/// Maps a physical size to pixels: `round(mm * scale) + 2 * padding` per
/// dimension. Padding is a fixed border in device pixels and is never scaled.
///
/// * `width_mm`  - Object width in millimeters.
/// * `height_mm` - Object height in millimeters.
/// * `scale`     - Pixels per millimeter.
/// * `padding`   - Border on each side in pixels.
/// * `limits`    - Soft and hard ceilings.
pub fn compute_resolution(
    width_mm: Float,
    height_mm: Float,
    scale: Float,
    padding: u32,
    limits: &ResolutionLimits,
) -> Result<ResolutionReport> {
    let border = 2.0 * padding as Float;
    let w = (width_mm * scale).round() + border;
    let h = (height_mm * scale).round() + border;

    // NaN fails the lower bound.
    if !(w >= 1.0 && h >= 1.0) {
        return Err(Error::ResolutionTooSmall {
            width: w as u64,
            height: h as u64,
        });
    }

    let hard_max = limits.hard_max_px as Float;
    if w > hard_max || h > hard_max {
        return Err(Error::ResolutionTooLarge {
            width: w as u64,
            height: h as u64,
            max: limits.hard_max_px,
        });
    }

    let resolution = Resolution::new(w as u32, h as u32);
    let soft_max = limits.soft_max_px;
    let warning = (resolution.width_px > soft_max || resolution.height_px > soft_max).then(|| {
        Warning::LargeResolution {
            width: resolution.width_px,
            height: resolution.height_px,
            soft_max,
        }
    });

    Ok(ResolutionReport {
        resolution,
        warning,
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
