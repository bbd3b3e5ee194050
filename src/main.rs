//! raypoint - pointer interaction demo
//!
//! Opens a window (or runs headless) with a clickable cube that reacts to
//! pointer enter, exit and click events.

mod config;
mod demo;
mod headless;
mod scripted_input;
mod windowed;

use anyhow::Result;
use config::AppConfig;
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting raypoint v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut app = match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    if let Some((width, height)) = cli.resolution {
        app.window_width = width;
        app.window_height = height;
    }
    if cli.simulate_controller {
        app.pointer.mouse_simulates_controller = true;
    }
    if cli.camera_follow_mouse {
        app.pointer.camera_follow_mouse = true;
    }

    if let Some(path) = &cli.write_config {
        app.save_to_path(path)?;
        info!(path = %path.display(), "Wrote configuration");
    }

    if cli.headless {
        let summary = headless::run(headless::HeadlessConfig {
            app,
            scripted_input: cli.scripted_input,
            event_log: cli.event_log,
            max_ticks: cli.max_ticks,
        })?;
        println!(
            "ticks={} enter={} exit={} click={} failures={}",
            summary.ticks, summary.enters, summary.exits, summary.clicks, summary.handler_failures
        );
        return Ok(());
    }

    if cli.scripted_input.is_some() || cli.event_log.is_some() || cli.max_ticks.is_some() {
        tracing::warn!("--scripted-input/--event-log/--max-ticks have no effect without --headless");
    }

    windowed::run(app)?;
    info!("raypoint shutting down");
    Ok(())
}

#[derive(Clone, Default)]
struct CliOptions {
    headless: bool,
    max_ticks: Option<u64>,
    scripted_input: Option<PathBuf>,
    event_log: Option<PathBuf>,
    config: Option<PathBuf>,
    write_config: Option<PathBuf>,
    resolution: Option<(u32, u32)>,
    simulate_controller: bool,
    camera_follow_mouse: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => opts.headless = true,
                "--simulate-controller" => opts.simulate_controller = true,
                "--camera-follow-mouse" => opts.camera_follow_mouse = true,
                "--max-ticks" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.max_ticks = Some(value),
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--max-ticks must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--max-ticks requires an integer");
                    }
                }
                "--resolution" => {
                    if let Some(raw) = args.next() {
                        match raw.split_once('x') {
                            Some((w, h)) => match (w.parse::<u32>(), h.parse::<u32>()) {
                                (Ok(width), Ok(height)) if width > 0 && height > 0 => {
                                    opts.resolution = Some((width, height));
                                }
                                _ => {
                                    tracing::error!(value = %raw, "--resolution must be like 1280x720");
                                }
                            },
                            None => {
                                tracing::error!(value = %raw, "--resolution must be like 1280x720");
                            }
                        }
                    } else {
                        tracing::error!("--resolution requires a value like 1280x720");
                    }
                }
                "--scripted-input" => {
                    if let Some(path) = args.next() {
                        opts.scripted_input = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--scripted-input requires a file path");
                    }
                }
                "--event-log" => {
                    if let Some(path) = args.next() {
                        opts.event_log = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--event-log requires a file path");
                    }
                }
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--write-config" => {
                    if let Some(path) = args.next() {
                        opts.write_config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--write-config requires a file path");
                    }
                }
                other => tracing::warn!(arg = other, "Ignoring unknown argument"),
            }
        }

        opts
    }
}
