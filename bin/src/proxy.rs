//! Proxy Renderer

use api::{Evaluation, RenderHost};
use cameras::{FramingSolver, Frustum};
use image::{ImageBuffer, ImageFormat, Rgba};
use lights::LightingPlan;
use scale_core::config::RenderConfig;
use scale_core::error::{Error, Result};
use scale_core::group::ObjectGroup;
use scale_core::pnr::*;
use std::path::Path;

/// 16-bit RGBA silhouette color under the default rig.
const RIG_COLOR: [u16; 4] = [0xc8c8, 0xb4b4, 0x9696, 0xffff];

/// 16-bit RGBA silhouette color when the group brings its own lights.
const CUSTOM_LIGHT_COLOR: [u16; 4] = [0x9696, 0x9696, 0x9696, 0xffff];

/// Fully transparent background.
const BACKGROUND: [u16; 4] = [0, 0, 0, 0];

/// A host without a scene graph. It writes a transparent PNG at the computed
/// resolution with the projected bounding box filled in, which is enough to
/// check framing, sizing and file handling.
pub struct ProxyHost {
    /// Render configuration used for the batch.
    config: RenderConfig,

    /// Group currently shown.
    isolated: Option<String>,
}

impl ProxyHost {
    /// Create a new proxy host.
    ///
    /// * `config` - Render configuration used for the batch.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            isolated: None,
        }
    }
}

/// Returns the half-open pixel rectangle `(x0, y0, x1, y1)` covered by the
/// projected bounding box, limited to the image.
///
/// * `evaluation` - Evaluated group.
/// * `frustum`    - Camera viewing volume.
pub fn silhouette(evaluation: &Evaluation, frustum: &Frustum) -> (u32, u32, u32, u32) {
    let w = evaluation.resolution.width_px as Float;
    let h = evaluation.resolution.height_px as Float;

    let (mut x0, mut y0, mut x1, mut y1) = (w, h, 0.0, 0.0);
    for c in evaluation.bounds.corners() {
        let p = evaluation.pose.to_camera(&c);
        let sx = 0.5 * (1.0 + p.x / (p.z * frustum.tan_half_h)) * w;
        let sy = 0.5 * (1.0 - p.y / (p.z * frustum.tan_half_v)) * h;
        x0 = min(x0, sx);
        y0 = min(y0, sy);
        x1 = max(x1, sx);
        y1 = max(y1, sy);
    }

    (
        clamp(x0.floor(), 0.0, w) as u32,
        clamp(y0.floor(), 0.0, h) as u32,
        clamp(x1.ceil(), 0.0, w) as u32,
        clamp(y1.ceil(), 0.0, h) as u32,
    )
}

impl RenderHost for ProxyHost {
    fn isolate(&mut self, group: &ObjectGroup) -> Result<()> {
        debug!("Showing '{}' only", group.name);
        self.isolated = Some(group.name.clone());
        Ok(())
    }

    fn render(&mut self, group: &ObjectGroup, evaluation: &Evaluation, path: &Path) -> Result<()> {
        let res = evaluation.resolution;
        info!(
            "Writing image {} with resolution {res}",
            path.display()
        );

        let frustum = FramingSolver::new(&self.config).frustum(&res);
        let (x0, y0, x1, y1) = silhouette(evaluation, &frustum);
        let color = match evaluation.lighting {
            LightingPlan::DefaultRig { .. } => RIG_COLOR,
            LightingPlan::Override { .. } => CUSTOM_LIGHT_COLOR,
        };

        let imgbuf: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_fn(res.width_px, res.height_px, |x, y| {
                if x >= x0 && x < x1 && y >= y0 && y < y1 {
                    Rgba(color)
                } else {
                    Rgba(BACKGROUND)
                }
            });

        imgbuf
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| {
                Error::RenderFailed(format!(
                    "error saving image for '{}' to {}: {err}",
                    group.name,
                    path.display()
                ))
            })
    }

    fn restore(&mut self) {
        if let Some(name) = self.isolated.take() {
            debug!("Restoring visibility after '{name}'");
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
