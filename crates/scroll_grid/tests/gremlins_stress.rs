//! Concurrent writers, readers and scrollers hammering one window.
//!
//! Payloads are always the coordinate they were written for. Whatever the
//! interleaving, a payload must never show up under another coordinate, and
//! every accepted write must end up either in the window or in exactly one
//! unload event.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use scroll_grid::{ChangeEvent, GridPos, ScrollingWindow, TaskQueue};

type Window = ScrollingWindow<GridPos>;

const WRITERS: usize = 4;

fn random_walk(window: &Window, seed: u64, steps: usize, reach: i32) {
  let mut rng = StdRng::seed_from_u64(seed);
  for _ in 0..steps {
    let target = GridPos::new(rng.gen_range(-reach..=reach), rng.gen_range(-reach..=reach));
    window.scroll_to(target).unwrap();
    if rng.gen_bool(0.1) {
      thread::yield_now();
    }
  }
}

#[test]
fn writes_survive_concurrent_scrolling() {
  let window = Window::new(7).unwrap();
  window.initialize_at(GridPos::new(0, 0)).unwrap();
  window.load_queue().drain_ready();

  // Every coordinate the window can reach, dealt round-robin to the writers.
  let mut targets: Vec<GridPos> = (-6..=6)
    .flat_map(|x| (-6..=6).map(move |y| GridPos::new(x, y)))
    .collect();
  targets.shuffle(&mut StdRng::seed_from_u64(7));
  let shares: Vec<Vec<GridPos>> = (0..WRITERS)
    .map(|w| targets.iter().copied().skip(w).step_by(WRITERS).collect())
    .collect();

  let (_, accepted) = rayon::join(
    || random_walk(&window, 11, 500, 3),
    || {
      shares
        .par_iter()
        .flat_map_iter(|share| {
          share
            .iter()
            .copied()
            .filter(|&pos| window.set(pos, pos))
            .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
    },
  );

  window.view(|state| {
    let center = state.center().unwrap();
    for (local, payload) in state.cells().iter() {
      assert_eq!(*payload, local + center);
    }
  });

  let mut seen: HashMap<GridPos, usize> = HashMap::new();
  for pos in window.bounds().unwrap().cells() {
    if let Some(payload) = window.get(pos) {
      *seen.entry(payload).or_default() += 1;
    }
  }
  for event in window.unload_queue().drain_ready() {
    let ChangeEvent::Unload { pos, payload } = event else {
      panic!("load event on unload queue");
    };
    if let Some(payload) = payload {
      assert_eq!(payload, pos);
      *seen.entry(payload).or_default() += 1;
    }
  }

  assert_eq!(seen.len(), accepted.len());
  for pos in accepted {
    assert_eq!(seen.get(&pos), Some(&1), "payload {:?}", pos);
  }
}

#[test]
fn readers_never_see_a_half_applied_scroll() {
  let window = Arc::new(Window::new(9).unwrap());
  let loader = {
    let target = Arc::clone(&window);
    TaskQueue::attach(
      Arc::clone(window.load_queue()),
      "loader",
      move |event: ChangeEvent<GridPos, GridPos>| {
        let pos = event.pos();
        target.set(pos, pos);
      },
    )
    .unwrap()
  };
  window.initialize_at(GridPos::new(0, 0)).unwrap();

  let done = AtomicBool::new(false);
  let views = AtomicUsize::new(0);
  thread::scope(|scope| {
    for _ in 0..3 {
      scope.spawn(|| {
        loop {
          let finished = done.load(Ordering::Acquire);
          window.view(|state| {
            let center = state.center().unwrap();
            let bounds = state.bounds().unwrap();
            for (local, payload) in state.cells().iter() {
              let pos = local + center;
              assert!(bounds.contains(pos));
              assert_eq!(*payload, pos);
            }
          });
          views.fetch_add(1, Ordering::Relaxed);
          if finished {
            break;
          }
        }
      });
    }

    scope.spawn(|| {
      random_walk(&window, 99, 300, 20);
      done.store(true, Ordering::Release);
    });
  });
  assert!(views.load(Ordering::Relaxed) > 0);

  loader.shutdown();
  for event in window.load_queue().drain_ready() {
    window.set(event.pos(), event.pos());
  }
  for pos in window.bounds().unwrap().cells() {
    assert_eq!(window.get(pos), Some(pos));
  }
}
