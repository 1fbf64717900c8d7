//! Synthetic world the demo window walks over.
//!
//! Each cell's payload is a [`Chunk`] of pseudo-random samples derived from
//! its coordinate. A loader worker generates chunks for load events, an
//! unloader worker accounts for evicted ones, and the main thread scrolls the
//! window along a seeded random walk.

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use scroll_grid::{ChangeEvent, ScrollGrid, TaskQueue, WindowCoord};

use crate::config::DemoConfig;

/// Generated payload for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<C> {
  pub pos: C,
  pub samples: Vec<u32>,
}

impl<C: WindowCoord> Chunk<C> {
  /// Deterministically generates `samples` values for `pos`.
  pub fn generate(pos: C, samples: usize) -> Self {
    let seed = (0..C::AXES).fold(0x9e37_79b9_7f4a_7c15, |acc, axis| {
      mix(acc ^ pos.axis(axis) as u32 as u64)
    });
    let samples = (0..samples as u64)
      .into_par_iter()
      .map(|i| mix(seed.wrapping_add(i)) as u32)
      .collect();
    Self { pos, samples }
  }
}

// splitmix64 finalizer
fn mix(mut z: u64) -> u64 {
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
  z ^ (z >> 31)
}

/// Totals collected over one walk.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkStats {
  pub steps: usize,
  pub evicted: usize,
  pub loaded: usize,
  pub reused: usize,
  pub full_reloads: usize,
  pub chunks_generated: usize,
  pub stale_loads: usize,
  pub chunks_released: usize,
  pub pending_dropped: usize,
  pub populated: usize,
  pub cells: usize,
}

type DemoWindow<C> = ScrollGrid<C, Chunk<C>>;

/// Walks `window` according to `config` and reports what happened.
pub fn run<C: WindowCoord>(
  window: DemoWindow<C>,
  config: &DemoConfig,
) -> Result<WalkStats, Box<dyn Error>> {
  let window = Arc::new(window);
  let stale = Arc::new(AtomicUsize::new(0));
  let released = Arc::new(AtomicUsize::new(0));
  let dropped = Arc::new(AtomicUsize::new(0));

  let loader = {
    let target = Arc::clone(&window);
    let stale = Arc::clone(&stale);
    let samples = config.loader.samples;
    TaskQueue::attach(
      Arc::clone(window.load_queue()),
      "chunk-loader",
      move |event: ChangeEvent<C, Chunk<C>>| {
        let pos = event.pos();
        if !target.set(pos, Chunk::generate(pos, samples)) {
          // The window moved on before the chunk was ready.
          stale.fetch_add(1, Ordering::Relaxed);
        }
      },
    )?
  };

  let unloader = {
    let released = Arc::clone(&released);
    let dropped = Arc::clone(&dropped);
    TaskQueue::attach(
      Arc::clone(window.unload_queue()),
      "chunk-unloader",
      move |event: ChangeEvent<C, Chunk<C>>| {
        let pos = event.pos();
        match event.into_payload() {
          Some(chunk) => {
            debug_assert_eq!(chunk.pos, pos);
            released.fetch_add(1, Ordering::Relaxed);
          }
          None => {
            dropped.fetch_add(1, Ordering::Relaxed);
          }
        }
      },
    )?
  };

  let walk = &config.walk;
  let mut rng = StdRng::seed_from_u64(walk.seed);
  let mut stats = WalkStats::default();
  let mut center = C::default();
  window.initialize_at(center)?;

  for step in 0..walk.steps {
    center = center.map(|_, v| v + rng.gen_range(-walk.max_step..=walk.max_step));
    let outcome = window.scroll_to(center)?;

    stats.steps += 1;
    stats.evicted += outcome.evicted;
    stats.loaded += outcome.loaded;
    stats.reused += outcome.reused;
    stats.full_reloads += usize::from(outcome.full_reload);

    if step % 100 == 0 {
      log::info!(
        "step {}: center {:?}, {} pending loads, {}/{} cells populated",
        step,
        center,
        window.load_queue().len(),
        window.populated(),
        window.len()
      );
    }
    if walk.pause_ms > 0 {
      thread::sleep(Duration::from_millis(walk.pause_ms));
    }
  }

  // Let the loader catch up; the item in flight finishes during shutdown.
  while !window.load_queue().is_empty() {
    thread::sleep(Duration::from_millis(1));
  }
  stats.chunks_generated = loader.shutdown();
  while !window.unload_queue().is_empty() {
    thread::sleep(Duration::from_millis(1));
  }
  unloader.shutdown();

  stats.stale_loads = stale.load(Ordering::Relaxed);
  stats.chunks_released = released.load(Ordering::Relaxed);
  stats.pending_dropped = dropped.load(Ordering::Relaxed);
  stats.populated = window.populated();
  stats.cells = window.len();
  Ok(stats)
}

#[cfg(test)]
mod tests {
  use scroll_grid::{GridConfig, GridPos, GridPos3};

  use super::*;
  use crate::config::{LoaderConfig, WalkConfig};

  fn config(size: u32, height: Option<u32>, steps: usize, max_step: i32) -> DemoConfig {
    DemoConfig {
      window: GridConfig { size, height },
      walk: WalkConfig {
        steps,
        max_step,
        seed: 5,
        pause_ms: 0,
      },
      loader: LoaderConfig { samples: 8 },
    }
  }

  #[test]
  fn generation_is_deterministic() {
    let a = Chunk::generate(GridPos::new(3, -4), 32);
    let b = Chunk::generate(GridPos::new(3, -4), 32);
    let c = Chunk::generate(GridPos::new(-4, 3), 32);
    assert_eq!(a, b);
    assert_ne!(a.samples, c.samples);
    assert_eq!(a.samples.len(), 32);
  }

  #[test]
  fn walk_ends_fully_loaded() {
    let config = config(7, None, 60, 4);
    let stats = run(config.window.build_2d::<Chunk<GridPos>>().unwrap(), &config).unwrap();

    assert_eq!(stats.steps, 60);
    assert_eq!(stats.cells, 49);
    assert_eq!(stats.populated, 49);
    // Every load request was handled once, initial fill included.
    assert_eq!(stats.chunks_generated, stats.loaded + 49);
    assert_eq!(stats.chunks_released + stats.pending_dropped, stats.evicted);
  }

  #[test]
  fn walk_in_3d_with_jumps() {
    let config = config(5, Some(3), 40, 6);
    let stats = run(config.window.build_3d::<Chunk<GridPos3>>().unwrap(), &config).unwrap();

    assert!(stats.full_reloads > 0);
    assert_eq!(stats.populated, 75);
    assert_eq!(stats.chunks_released + stats.pending_dropped, stats.evicted);
  }
}
