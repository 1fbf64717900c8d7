//! Scroll Grid demo: streams a synthetic world through a scrolling window.

mod config;
mod world;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use scroll_grid::{GridPos, GridPos3, WindowCoord};

use crate::config::DemoConfig;
use crate::world::{Chunk, WalkStats};

/// Walks a scrolling window over a synthetic world and reports streaming stats.
#[derive(Parser, Debug)]
#[command(name = "scroll_grid_demo", version)]
struct Args {
  /// Path to the demo config
  #[arg(short, long, default_value = "assets/config/demo.config.toml")]
  config: PathBuf,
  /// Log filter used when RUST_LOG is not set
  #[arg(long, default_value = "info")]
  log_level: String,
  /// Walk a 3D window (needs `window.height`)
  #[arg(long)]
  three_d: bool,
  /// Override the configured number of steps
  #[arg(long)]
  steps: Option<usize>,
}

fn init_logging(default_filter: &str) {
  #[cfg(feature = "tracy")]
  {
    let _ = default_filter;
    scroll_grid::init_tracy();
  }

  #[cfg(not(feature = "tracy"))]
  {
    use tracing_subscriber::EnvFilter;

    let filter =
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_target(false)
      .init();
  }
}

fn report<C: WindowCoord>(stats: &WalkStats) {
  log::info!(
    "{}D walk done: {} steps, {} full reloads",
    C::AXES,
    stats.steps,
    stats.full_reloads
  );
  log::info!(
    "cells: {} evicted, {} loaded, {} reused in place",
    stats.evicted,
    stats.loaded,
    stats.reused
  );
  log::info!(
    "loader: {} chunks generated, {} arrived after their cell left",
    stats.chunks_generated,
    stats.stale_loads
  );
  log::info!(
    "unloader: {} chunks released, {} pending cells dropped",
    stats.chunks_released,
    stats.pending_dropped
  );
  if stats.populated != stats.cells {
    log::warn!("{}/{} cells populated at exit", stats.populated, stats.cells);
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  let args = Args::parse();
  init_logging(&args.log_level);

  let mut config = DemoConfig::load(&args.config)?;
  if let Some(steps) = args.steps {
    config.walk.steps = steps;
  }
  log::debug!("Loaded {}: {:?}", args.config.display(), config);

  if args.three_d {
    let window = config.window.build_3d::<Chunk<GridPos3>>()?;
    log::info!(
      "Walking a {}x{}x{} window",
      window.width(),
      window.width(),
      window.height()
    );
    let stats = world::run(window, &config)?;
    report::<GridPos3>(&stats);
  } else {
    let window = config.window.build_2d::<Chunk<GridPos>>()?;
    log::info!("Walking a {}x{} window", window.size(), window.size());
    let stats = world::run(window, &config)?;
    report::<GridPos>(&stats);
  }

  Ok(())
}
