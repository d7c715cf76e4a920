//! The API

#[macro_use]
extern crate log;
#[macro_use]
extern crate pest_derive;

mod batch;
pub mod parser;

use cameras::*;
use scale_core::config::*;
use scale_core::error::*;
use scale_core::geometry::*;
use scale_core::group::*;
use scale_core::pnr::*;
use scale_core::resolution::*;
use lights::*;
use std::path::Path;

// Re-export.
pub use batch::*;

/// Everything the host needs to place the camera and lights for one group and
/// size its image.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Group name.
    pub group: String,

    /// Composite bounding box in world millimeters.
    pub bounds: Bounds3f,

    /// Image resolution.
    pub resolution: Resolution,

    /// Raised when the resolution is above the soft ceiling.
    pub warning: Option<Warning>,

    /// Camera placement.
    pub pose: CameraPose,

    /// Lighting.
    pub lighting: LightingPlan,
}

impl Evaluation {
    /// Returns the object width in millimeters.
    pub fn width_mm(&self) -> Float {
        self.bounds.extent(Axis::X)
    }

    /// Returns the object depth in millimeters.
    pub fn depth_mm(&self) -> Float {
        self.bounds.extent(Axis::Y)
    }

    /// Returns the object height in millimeters.
    pub fn height_mm(&self) -> Float {
        self.bounds.extent(Axis::Z)
    }
}

/// Computes camera pose, resolution and lighting for a group. Nothing in the
/// scene is changed; applying the result is up to the host. Every call starts
/// from scratch so the result only depends on the group and the
/// configuration.
///
/// * `group`  - The group to evaluate.
/// * `config` - Render configuration.
pub fn evaluate(group: &ObjectGroup, config: &RenderConfig) -> Result<Evaluation> {
    let bounds = group.measure(&config.envelope)?;
    let size = bounds.diagonal();

    let report = compute_resolution(
        size.x,
        size.z,
        config.scale_factor,
        config.padding_px,
        &config.limits,
    )?;
    if let Some(warning) = report.warning {
        warn!("{}: {warning}", group.name);
    }

    let pose = FramingSolver::new(config).solve(&bounds, &report.resolution)?;

    let lighting = plan_lighting(
        size.z,
        group.light_count(),
        bounds.center(),
        &ThreePointRig::new(config.rig),
    );

    info!(
        "{}: {:.1} x {:.1} x {:.1} mm -> {} px, camera at {:.1} mm, {}",
        group.name, size.x, size.y, size.z, report.resolution, pose.distance_mm, lighting
    );

    Ok(Evaluation {
        group: group.name.clone(),
        bounds,
        resolution: report.resolution,
        warning: report.warning,
        pose,
        lighting,
    })
}

/// The application that owns the scene and produces images. The batch driver
/// only tells it what to do; all scene changes happen here.
pub trait RenderHost {
    /// Shows `group` and hides every other renderable group. The previous
    /// visibility must be remembered for `restore`.
    ///
    /// * `group` - The group to render next.
    fn isolate(&mut self, group: &ObjectGroup) -> Result<()>;

    /// Applies camera, resolution and lighting and renders an image to
    /// `path`.
    ///
    /// * `group`      - The isolated group.
    /// * `evaluation` - Placement computed for the group.
    /// * `path`       - Output image path.
    fn render(&mut self, group: &ObjectGroup, evaluation: &Evaluation, path: &Path) -> Result<()>;

    /// Restores the visibility changed by `isolate`. Called once when a batch
    /// ends, including when it is cancelled.
    fn restore(&mut self);
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
