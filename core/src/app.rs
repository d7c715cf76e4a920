//! Application related stuff

use crate::config::*;
use crate::output::ConflictPolicy;
use crate::pnr::Float;
use clap::Parser;
use std::path::PathBuf;

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Options {
    /// Image scale.
    #[clap(
        long = "scale",
        short = 's',
        value_name = "PX_PER_MM",
        default_value_t = DEFAULT_SCALE_FACTOR,
        help = "Pixels per millimeter (0.1 to 100)."
    )]
    pub scale_factor: Float,

    /// Border.
    #[clap(
        long = "padding",
        short = 'p',
        value_name = "PX",
        default_value_t = DEFAULT_PADDING_PX,
        help = "Pixels added on each edge of the image (0 to 500)."
    )]
    pub padding_px: u32,

    /// Camera elevation.
    #[clap(
        long = "elevation",
        short = 'e',
        value_name = "DEGREES",
        default_value_t = DEFAULT_ELEVATION_DEG,
        help = "Camera elevation above the horizontal. 10 to 15 degrees is recommended."
    )]
    pub elevation_deg: Float,

    #[clap(
        long,
        value_name = "PREFIX",
        default_value = DEFAULT_PREFIX,
        help = "Only render groups whose name starts with this prefix. Empty matches all."
    )]
    pub prefix: String,

    #[clap(
        long = "if-exists",
        value_enum,
        value_name = "POLICY",
        default_value_t = ConflictPolicy::Overwrite,
        help = "What to do when an output file already exists."
    )]
    pub conflict_policy: ConflictPolicy,

    /// Output folder.
    #[clap(
        long = "outdir",
        short = 'o',
        value_name = "DIR",
        default_value = "renders",
        help = "Write images to the given folder. Its parent folder must exist."
    )]
    pub output_dir: PathBuf,

    /// Render a single group.
    #[clap(
        long,
        short = 'g',
        value_name = "NAME",
        help = "Evaluate and render only the named group, ignoring the prefix."
    )]
    pub group: Option<String>,

    /// Report without rendering.
    #[clap(
        long,
        help = "Evaluate camera, resolution and lighting without rendering."
    )]
    pub eval: bool,

    /// Suppress all text output other than error messages.
    #[clap(long, short = 'q', help = "Suppress all text output other than error messages.")]
    pub quiet: bool,

    /// Scene file paths.
    #[clap(required = true, value_name = "SCENE", help = "Scene description files")]
    pub paths: Vec<PathBuf>,
}

impl Options {
    /// Returns the render configuration described by the options. Settings
    /// without a command line flag keep their defaults.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            scale_factor: self.scale_factor,
            padding_px: self.padding_px,
            elevation_deg: self.elevation_deg,
            prefix: self.prefix.clone(),
            conflict_policy: self.conflict_policy,
            output_dir: self.output_dir.clone(),
            ..Default::default()
        }
    }
}
