//! Batch Rendering

use super::parser::ParseError;
use super::{evaluate, Evaluation, RenderHost};
use cameras::{verify_framing, FramingSolver};
use indicatif::{ProgressBar, ProgressStyle};
use scale_core::config::RenderConfig;
use scale_core::error::Error;
use scale_core::group::ObjectGroup;
use scale_core::output::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that stop a batch before any group is processed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(Error),

    /// Discovery found nothing to render.
    #[error("no non-empty groups match prefix '{0}'")]
    NoMatchingGroups(String),

    /// The requested group does not exist or is empty.
    #[error("group '{0}' not found")]
    GroupNotFound(String),

    /// The output folder cannot be used.
    #[error("output folder unavailable. {0}")]
    OutputDirUnavailable(Error),

    /// A scene file could not be loaded.
    #[error(transparent)]
    Scene(#[from] ParseError),
}

/// Why a group did not produce an image.
#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    /// The output exists and the conflict policy keeps it.
    Skipped(PathBuf),

    /// Evaluation, path resolution or rendering failed.
    Failed(Error),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(path) => write!(f, "skipped, {} already exists", path.display()),
            Self::Failed(err) => write!(f, "failed, {err}"),
        }
    }
}

/// Tally of a batch run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    /// Images rendered.
    pub succeeded: usize,

    /// Groups left alone because their output already exists.
    pub skipped: usize,

    /// Groups that failed.
    pub failed: usize,

    /// True if the batch stopped early on request.
    pub cancelled: bool,

    /// Every group that did not render, with the reason, in processing order.
    pub issues: Vec<(String, Issue)>,
}

impl BatchSummary {
    /// Returns the number of groups processed.
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rendered, {} skipped, {} failed",
            self.succeeded, self.skipped, self.failed
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        for (group, issue) in self.issues.iter() {
            write!(f, "\n  {group}: {issue}")?;
        }
        Ok(())
    }
}

/// Returns the groups to render: non-empty groups whose name starts with
/// `prefix`, in discovery order. An empty prefix matches every group.
///
/// * `groups` - Candidate groups in scene order.
/// * `prefix` - Name prefix.
pub fn discover(groups: Vec<ObjectGroup>, prefix: &str) -> Vec<ObjectGroup> {
    groups
        .into_iter()
        .filter(|g| g.name.starts_with(prefix) && !g.is_empty())
        .collect()
}

/// Creates a progress bar, hidden when `visible` is false.
///
/// * `len`     - Number of steps.
/// * `visible` - Whether to draw it.
pub fn create_progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    match ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}") {
        Ok(style) => progress.set_style(style.progress_chars("=> ")),
        Err(err) => debug!("Using default progress style. {err}"),
    }
    progress
}

/// Renders groups one at a time in discovery order.
pub struct Batch {
    /// Immutable for the whole run.
    config: RenderConfig,

    /// Groups to render.
    groups: Vec<ObjectGroup>,

    /// Draw a progress bar.
    show_progress: bool,
}

impl Batch {
    /// Create a batch over the groups matching the configured prefix.
    ///
    /// * `config` - Render configuration.
    /// * `groups` - Every group in the scene.
    pub fn new(config: RenderConfig, groups: Vec<ObjectGroup>) -> Result<Self, BatchError> {
        config.validate().map_err(BatchError::Config)?;

        let groups = discover(groups, &config.prefix);
        if groups.is_empty() {
            return Err(BatchError::NoMatchingGroups(config.prefix.clone()));
        }
        info!(
            "Found {} group(s) matching '{}'",
            groups.len(),
            config.prefix
        );

        Ok(Self {
            config,
            groups,
            show_progress: false,
        })
    }

    /// Create a batch for one group picked by its full name regardless of the
    /// prefix.
    ///
    /// * `config` - Render configuration.
    /// * `groups` - Every group in the scene.
    /// * `name`   - Group name.
    pub fn single(
        config: RenderConfig,
        groups: Vec<ObjectGroup>,
        name: &str,
    ) -> Result<Self, BatchError> {
        config.validate().map_err(BatchError::Config)?;

        let group = groups
            .into_iter()
            .find(|g| g.name == name && !g.is_empty())
            .ok_or_else(|| BatchError::GroupNotFound(String::from(name)))?;

        Ok(Self {
            config,
            groups: vec![group],
            show_progress: false,
        })
    }

    /// Enables or disables the progress bar.
    ///
    /// * `show` - Draw the progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Returns the groups in processing order.
    pub fn groups(&self) -> &[ObjectGroup] {
        &self.groups
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Evaluates every group without rendering.
    pub fn evaluate_all(&self) -> Vec<(String, Result<Evaluation, Error>)> {
        self.groups
            .iter()
            .map(|g| (g.name.clone(), evaluate(g, &self.config)))
            .collect()
    }

    /// Renders every group. Per-group failures are recorded and the batch
    /// moves on. `cancel` is checked before each group; the group in flight
    /// always completes. The host's visibility is restored at the end whether
    /// or not the batch was cancelled.
    ///
    /// * `host`   - Host that renders images.
    /// * `cancel` - Set to stop after the current group.
    pub fn run<H: RenderHost>(
        &self,
        host: &mut H,
        cancel: &AtomicBool,
    ) -> Result<BatchSummary, BatchError> {
        prepare_output_dir(&self.config.output_dir).map_err(BatchError::OutputDirUnavailable)?;

        let progress = create_progress_bar(self.groups.len() as u64, self.show_progress);
        progress.set_message("Rendering groups");

        let mut summary = BatchSummary::default();
        for group in self.groups.iter() {
            if cancel.load(Ordering::SeqCst) {
                info!(
                    "Batch cancelled after {} of {} group(s)",
                    summary.processed(),
                    self.groups.len()
                );
                summary.cancelled = true;
                break;
            }

            progress.set_message(group.name.clone());
            match self.render_group(host, group) {
                Ok(target) if target.should_render => {
                    info!("{}: wrote {}", group.name, target.path.display());
                    summary.succeeded += 1;
                }
                Ok(target) => {
                    info!("{}: skipped, {} exists", group.name, target.path.display());
                    summary.skipped += 1;
                    summary
                        .issues
                        .push((group.name.clone(), Issue::Skipped(target.path)));
                }
                Err(err) => {
                    error!("{}: {err}", group.name);
                    summary.failed += 1;
                    summary.issues.push((group.name.clone(), Issue::Failed(err)));
                }
            }
            progress.inc(1);
        }

        host.restore();

        if summary.cancelled {
            progress.abandon_with_message("Cancelled");
        } else {
            progress.finish_with_message("Batch complete");
        }
        info!("{summary}");
        Ok(summary)
    }

    /// Evaluates, resolves the output path and renders one group.
    fn render_group<H: RenderHost>(
        &self,
        host: &mut H,
        group: &ObjectGroup,
    ) -> Result<OutputTarget, Error> {
        let evaluation = evaluate(group, &self.config)?;

        if log_enabled!(log::Level::Debug) {
            let solver = FramingSolver::new(&self.config);
            let framed = verify_framing(
                &evaluation.pose,
                &evaluation.bounds.expand(self.config.padding_mm()),
                &solver.frustum(&evaluation.resolution),
            );
            debug!("{}: corners inside frame: {framed}", group.name);
        }

        let filename = output_filename(&group.name, &self.config.prefix)?;
        let target = resolve_output(
            &self.config.output_dir.join(filename),
            self.config.conflict_policy,
        )?;
        if !target.should_render {
            return Ok(target);
        }

        host.isolate(group)?;
        host.render(group, &evaluation, &target.path)?;
        Ok(target)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
