//! Render configuration

use crate::error::{Error, Result};
use crate::output::ConflictPolicy;
use crate::pnr::Float;
use std::path::PathBuf;

/// Default image scale in pixels per millimeter.
pub const DEFAULT_SCALE_FACTOR: Float = 10.0;

/// Default border added on every side of the image, in pixels.
pub const DEFAULT_PADDING_PX: u32 = 10;

/// Default camera elevation in degrees.
pub const DEFAULT_ELEVATION_DEG: Float = 12.0;

/// Fixed lens focal length.
pub const FOCAL_LENGTH_MM: Float = 85.0;

/// Fixed sensor width (full frame).
pub const SENSOR_WIDTH_MM: Float = 36.0;

/// Default prefix used to discover renderable groups.
pub const DEFAULT_PREFIX: &str = "RENDER_";

/// Accepted range for the scale factor.
pub const SCALE_FACTOR_RANGE: (Float, Float) = (0.1, 100.0);

/// Largest accepted padding.
pub const MAX_PADDING_PX: u32 = 500;

/// Recommended elevation range. Values outside it are accepted with a warning.
pub const RECOMMENDED_ELEVATION_DEG: (Float, Float) = (10.0, 15.0);

/// Image size ceilings in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolutionLimits {
    /// Dimensions above this are rendered with a warning.
    pub soft_max_px: u32,

    /// Dimensions above this are rejected.
    pub hard_max_px: u32,
}

impl Default for ResolutionLimits {
    fn default() -> Self {
        Self {
            soft_max_px: 8192,
            hard_max_px: 16384,
        }
    }
}

/// Accepted physical size range of a composite bounding box. Both ends are
/// inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SizeEnvelope {
    /// Smallest accepted extent in millimeters.
    pub min_mm: Float,

    /// Largest accepted extent in millimeters.
    pub max_mm: Float,
}

impl Default for SizeEnvelope {
    fn default() -> Self {
        Self {
            min_mm: 1.0,
            max_mm: 10000.0,
        }
    }
}

impl SizeEnvelope {
    /// Returns true if `size_mm` is a finite value inside the envelope.
    ///
    /// * `size_mm` - Extent in millimeters.
    pub fn accepts(&self, size_mm: Float) -> bool {
        size_mm.is_finite() && size_mm >= self.min_mm && size_mm <= self.max_mm
    }
}

/// Convergence tuning for the camera framing solver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverSettings {
    /// Distance multiplier applied while any corner is outside the frame.
    pub growth_factor: Float,

    /// Growth iterations before giving up.
    pub max_iterations: usize,

    /// Bisection steps between the last failing and first fitting distance.
    /// Zero, the default, keeps the first fitting growth step.
    pub refine_steps: usize,

    /// Extra fraction of distance added after convergence.
    pub safety_margin: Float,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            growth_factor: 1.10,
            max_iterations: 50,
            refine_steps: 0,
            safety_margin: 0.05,
        }
    }
}

/// Lighting rig calibration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightRigSettings {
    /// Object height at which the rig is used unscaled.
    pub reference_height_mm: Float,

    /// Smallest rig scale.
    pub min_scale: Float,

    /// Largest rig scale.
    pub max_scale: Float,
}

impl Default for LightRigSettings {
    fn default() -> Self {
        Self {
            reference_height_mm: 200.0,
            min_scale: 0.1,
            max_scale: 20.0,
        }
    }
}

/// Everything needed to evaluate and render a batch of groups. Immutable once
/// a batch starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Pixels per millimeter.
    pub scale_factor: Float,

    /// Fixed border in pixels on every side.
    pub padding_px: u32,

    /// Camera elevation above the horizontal in degrees.
    pub elevation_deg: Float,

    /// Lens focal length in millimeters.
    pub focal_length_mm: Float,

    /// Sensor width in millimeters.
    pub sensor_width_mm: Float,

    /// Groups whose name starts with this prefix are rendered. Empty matches
    /// every group.
    pub prefix: String,

    /// What to do when the output file already exists.
    pub conflict_policy: ConflictPolicy,

    /// Folder receiving the rendered images.
    pub output_dir: PathBuf,

    pub limits: ResolutionLimits,
    pub envelope: SizeEnvelope,
    pub solver: SolverSettings,
    pub rig: LightRigSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            padding_px: DEFAULT_PADDING_PX,
            elevation_deg: DEFAULT_ELEVATION_DEG,
            focal_length_mm: FOCAL_LENGTH_MM,
            sensor_width_mm: SENSOR_WIDTH_MM,
            prefix: String::from(DEFAULT_PREFIX),
            conflict_policy: ConflictPolicy::default(),
            output_dir: PathBuf::from("renders"),
            limits: ResolutionLimits::default(),
            envelope: SizeEnvelope::default(),
            solver: SolverSettings::default(),
            rig: LightRigSettings::default(),
        }
    }
}

impl RenderConfig {
    /// Returns the padding converted to millimeters at the configured scale.
    pub fn padding_mm(&self) -> Float {
        self.padding_px as Float / self.scale_factor
    }

    /// Checks every value is usable. Elevations outside the recommended range
    /// are only logged.
    pub fn validate(&self) -> Result<()> {
        let (min_scale, max_scale) = SCALE_FACTOR_RANGE;
        if !(self.scale_factor >= min_scale && self.scale_factor <= max_scale) {
            return Err(Error::invalid_config(format!(
                "scale factor {} must be between {min_scale} and {max_scale} px/mm",
                self.scale_factor
            )));
        }

        if self.padding_px > MAX_PADDING_PX {
            return Err(Error::invalid_config(format!(
                "padding {} px must be at most {MAX_PADDING_PX} px",
                self.padding_px
            )));
        }

        if !(self.elevation_deg > 0.0 && self.elevation_deg < 90.0) {
            return Err(Error::invalid_config(format!(
                "elevation {} deg must be between 0 and 90 deg",
                self.elevation_deg
            )));
        }
        let (lo, hi) = RECOMMENDED_ELEVATION_DEG;
        if self.elevation_deg < lo || self.elevation_deg > hi {
            warn!(
                "Elevation {} deg is outside the recommended {lo}-{hi} deg range",
                self.elevation_deg
            );
        }

        if !(self.focal_length_mm > 0.0 && self.focal_length_mm.is_finite())
            || !(self.sensor_width_mm > 0.0 && self.sensor_width_mm.is_finite())
        {
            return Err(Error::invalid_config(
                "focal length and sensor width must be positive",
            ));
        }

        if self.limits.soft_max_px == 0 || self.limits.soft_max_px > self.limits.hard_max_px {
            return Err(Error::invalid_config(format!(
                "soft resolution limit {} must be between 1 and the hard limit {}",
                self.limits.soft_max_px, self.limits.hard_max_px
            )));
        }

        if !(self.envelope.min_mm > 0.0 && self.envelope.min_mm <= self.envelope.max_mm) {
            return Err(Error::invalid_config(format!(
                "size envelope [{}, {}] mm is invalid",
                self.envelope.min_mm, self.envelope.max_mm
            )));
        }

        if !(self.solver.growth_factor > 1.0) {
            return Err(Error::invalid_config("solver growth factor must exceed 1"));
        }
        if self.solver.max_iterations == 0 {
            return Err(Error::invalid_config("solver iteration cap must be positive"));
        }
        if !(self.solver.safety_margin >= 0.0) {
            return Err(Error::invalid_config(
                "solver safety margin must not be negative",
            ));
        }

        let rig = &self.rig;
        if !(rig.reference_height_mm > 0.0
            && rig.min_scale > 0.0
            && rig.min_scale <= rig.max_scale)
        {
            return Err(Error::invalid_config(
                "light rig reference height and scale range must be positive",
            ));
        }

        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
