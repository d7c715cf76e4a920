#[macro_use]
extern crate log;

mod proxy;

use api::*;
use clap::Parser;
use proxy::ProxyHost;
use scale_core::app::*;
use scale_core::fileutil::*;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

fn main() -> ExitCode {
    let options = Options::parse();

    // Initialize `env_logger`. RUST_LOG still wins over the default level.
    let default_level = if options.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the scenes and evaluates or renders the selected groups. Returns
/// false if any group failed.
fn run(options: &Options) -> Result<bool, BatchError> {
    for path in options.paths.iter() {
        match absolute_path(path) {
            Ok(abs_path) => info!("Loading scene {}", abs_path.display()),
            Err(e) => warn!("{e}"),
        }
    }

    let groups = parser::parse_files(&options.paths)?;
    let config = options.render_config();

    let batch = match &options.group {
        Some(name) => Batch::single(config, groups, name)?,
        None => Batch::new(config, groups)?,
    }
    .with_progress(!options.quiet);

    if options.eval {
        let mut ok = true;
        for (name, result) in batch.evaluate_all() {
            match result {
                Ok(e) => println!(
                    "{name}: {:.1} x {:.1} x {:.1} mm, {} px, camera {:.1} mm at ({:.1}, {:.1}, {:.1}), {}",
                    e.width_mm(),
                    e.depth_mm(),
                    e.height_mm(),
                    e.resolution,
                    e.pose.distance_mm,
                    e.pose.location.x,
                    e.pose.location.y,
                    e.pose.location.z,
                    e.lighting,
                ),
                Err(err) => {
                    ok = false;
                    println!("{name}: {err}");
                }
            }
        }
        return Ok(ok);
    }

    let cancel = AtomicBool::new(false);
    let mut host = ProxyHost::new(batch.config().clone());
    let summary = batch.run(&mut host, &cancel)?;
    for (name, issue) in summary.issues.iter() {
        warn!("{name}: {issue}");
    }
    Ok(summary.failed == 0)
}
