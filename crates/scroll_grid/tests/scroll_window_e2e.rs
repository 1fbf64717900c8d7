//! End-to-end tests for 2D scrolling windows.
//!
//! Payloads are the world coordinate they were loaded for, so a misplaced or
//! duplicated payload is visible as a mismatch against its cell.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scroll_grid::{
  CancelToken, ChangeEvent, GridBounds, GridPos, ScrollingWindow, WindowError,
};

type Window = ScrollingWindow<GridPos>;

/// Satisfies every pending load request with the requested coordinate.
fn satisfy_loads(window: &Window) -> Vec<GridPos> {
  let mut loaded = Vec::new();
  for event in window.load_queue().drain_ready() {
    let ChangeEvent::Load { pos } = event else {
      panic!("unload event on load queue: {:?}", event);
    };
    assert!(window.set(pos, pos));
    loaded.push(pos);
  }
  loaded
}

fn unloads(window: &Window) -> Vec<(GridPos, Option<GridPos>)> {
  window
    .unload_queue()
    .drain_ready()
    .into_iter()
    .map(|event| match event {
      ChangeEvent::Unload { pos, payload } => (pos, payload),
      ChangeEvent::Load { pos } => panic!("load event on unload queue: {:?}", pos),
    })
    .collect()
}

fn ready_window(size: u32, center: GridPos) -> Window {
  let window = Window::new(size).unwrap();
  window.initialize_at(center).unwrap();
  satisfy_loads(&window);
  window
}

fn assert_window_consistent(window: &Window) {
  let bounds = window.bounds().unwrap();
  for pos in bounds.cells() {
    assert_eq!(window.get(pos), Some(pos), "cell {:?}", pos);
  }
}

#[test]
fn initialize_requests_every_cell_once() {
  for size in [1u32, 3, 5, 9] {
    let window = Window::new(size).unwrap();
    let center = GridPos::new(-7, 12);
    window.initialize_at(center).unwrap();

    assert!(window.is_initialized());
    assert_eq!(window.center(), Some(center));
    let r = window.radius();
    assert_eq!(r, ((size - 1) / 2) as i32);
    assert_eq!(
      window.bounds(),
      Some(GridBounds::new(
        GridPos::new(center.x - r, center.y - r),
        GridPos::new(center.x + r, center.y + r)
      ))
    );

    let loads = satisfy_loads(&window);
    assert_eq!(loads.len(), (size * size) as usize);
    let unique: HashSet<_> = loads.iter().copied().collect();
    assert_eq!(unique.len(), loads.len());
    assert!(loads.iter().all(|pos| window.bounds().unwrap().contains(*pos)));
    assert!(window.unload_queue().is_empty());
  }
}

#[test]
fn even_size_is_rejected() {
  assert_eq!(
    Window::new(6).err(),
    Some(WindowError::InvalidDimension { name: "size", value: 6 })
  );
}

#[test]
fn fresh_window_reads_empty_everywhere() {
  let window = Window::new(5).unwrap();
  window.initialize_at(GridPos::new(3, 3)).unwrap();

  for x in -5..=11 {
    for y in -5..=11 {
      assert_eq!(window.get(GridPos::new(x, y)), None);
    }
  }
}

#[test]
fn set_get_round_trip_inside_window_only() {
  let window = Window::new(5).unwrap();
  window.initialize_at(GridPos::new(0, 0)).unwrap();

  let inside = GridPos::new(-2, 1);
  assert!(window.set(inside, GridPos::new(99, 99)));
  assert_eq!(window.get(inside), Some(GridPos::new(99, 99)));

  let outside = GridPos::new(3, 0);
  assert!(!window.set(outside, GridPos::new(1, 1)));
  assert_eq!(window.get(outside), None);
}

#[test]
fn single_step_scroll_evicts_trailing_column() {
  let window = ready_window(5, GridPos::new(0, 0));

  let outcome = window.scroll_to(GridPos::new(1, 0)).unwrap();
  assert_eq!(outcome.evicted, 5);
  assert_eq!(outcome.loaded, 5);
  assert_eq!(outcome.reused, 20);
  assert!(!outcome.full_reload);

  let evicted = unloads(&window);
  assert_eq!(evicted.len(), 5);
  for (pos, payload) in &evicted {
    assert_eq!(pos.x, -2);
    assert_eq!(*payload, Some(*pos));
  }
  let evicted_rows: HashSet<_> = evicted.iter().map(|(pos, _)| pos.y).collect();
  assert_eq!(evicted_rows, (-2..=2).collect());

  // The 20 shared cells kept their payloads before any load is satisfied.
  for x in -1..=2 {
    for y in -2..=2 {
      let pos = GridPos::new(x, y);
      assert_eq!(window.get(pos), Some(pos));
    }
  }

  let loads = satisfy_loads(&window);
  assert_eq!(loads.len(), 5);
  assert!(loads.iter().all(|pos| pos.x == 3));
  assert_window_consistent(&window);
}

#[test]
fn scroll_to_current_center_emits_nothing() {
  let window = ready_window(5, GridPos::new(4, -4));
  let outcome = window.scroll_to(GridPos::new(4, -4)).unwrap();
  assert_eq!(outcome.evicted + outcome.loaded + outcome.reused, 0);
  assert!(window.unload_queue().is_empty());
  assert!(window.load_queue().is_empty());
  assert_window_consistent(&window);
}

#[test]
fn jump_of_one_diameter_reloads_everything() {
  let window = ready_window(5, GridPos::new(0, 0));

  let outcome = window.scroll_to(GridPos::new(5, 0)).unwrap();
  assert!(outcome.full_reload);
  assert_eq!(outcome.reused, 0);
  assert_eq!(outcome.evicted, 25);
  assert_eq!(outcome.loaded, 25);

  let evicted = unloads(&window);
  let old_cells: HashSet<_> = GridBounds::around(GridPos::new(0, 0), GridPos::new(2, 2))
    .cells()
    .collect();
  assert_eq!(evicted.len(), 25);
  for (pos, payload) in &evicted {
    assert!(old_cells.contains(pos));
    assert_eq!(*payload, Some(*pos));
  }
  assert_eq!(window.populated(), 0);

  let loads: HashSet<_> = satisfy_loads(&window).into_iter().collect();
  let new_cells: HashSet<_> = window.bounds().unwrap().cells().collect();
  assert_eq!(loads, new_cells);
  assert_window_consistent(&window);
}

#[test]
fn far_jump_on_one_axis_reloads_everything() {
  let window = ready_window(3, GridPos::new(0, 0));
  let outcome = window.scroll_to(GridPos::new(1, -1000)).unwrap();
  assert!(outcome.full_reload);
  assert_eq!(unloads(&window).len(), 9);
  assert_eq!(satisfy_loads(&window).len(), 9);
  assert_window_consistent(&window);
}

#[test]
fn jump_across_the_coordinate_range_reloads_everything() {
  let window = ready_window(3, GridPos::new(-10, 0));

  let outcome = window.scroll_to(GridPos::new(i32::MAX - 5, 0)).unwrap();
  assert!(outcome.full_reload);
  let evicted = unloads(&window);
  assert_eq!(evicted.len(), 9);
  assert!(evicted.iter().all(|(pos, payload)| pos.x <= -9 && *payload == Some(*pos)));
  assert_eq!(satisfy_loads(&window).len(), 9);
  assert_window_consistent(&window);

  // And back to the far negative edge.
  let outcome = window.scroll_to(GridPos::new(i32::MIN + 1, 7)).unwrap();
  assert!(outcome.full_reload);
  assert_eq!(unloads(&window).len(), 9);
  assert_eq!(window.bounds().unwrap().min, GridPos::new(i32::MIN, 6));
  assert_eq!(satisfy_loads(&window).len(), 9);
  assert_window_consistent(&window);
}

#[test]
fn center_whose_window_leaves_i32_is_rejected() {
  let window = Window::new(3).unwrap();
  assert_eq!(
    window.initialize_at(GridPos::new(i32::MAX, 0)),
    Err(WindowError::CenterOutOfRange)
  );
  assert!(!window.is_initialized());

  window.initialize_at(GridPos::new(i32::MAX - 1, 0)).unwrap();
  assert_eq!(satisfy_loads(&window).len(), 9);
  assert_eq!(
    window.scroll_to(GridPos::new(i32::MAX, 0)),
    Err(WindowError::CenterOutOfRange)
  );
  assert_eq!(window.center(), Some(GridPos::new(i32::MAX - 1, 0)));
  assert!(window.unload_queue().is_empty());
  assert_window_consistent(&window);
}

#[test]
fn jump_just_inside_diameter_reuses_one_column() {
  let window = ready_window(5, GridPos::new(0, 0));
  let outcome = window.scroll_to(GridPos::new(4, 0)).unwrap();
  assert!(!outcome.full_reload);
  assert_eq!(outcome.reused, 5);
  assert_eq!(outcome.evicted, 20);
  for y in -2..=2 {
    assert_eq!(window.get(GridPos::new(2, y)), Some(GridPos::new(2, y)));
  }
}

#[test]
fn pending_cells_are_evicted_without_payload() {
  let window = Window::new(3).unwrap();
  window.initialize_at(GridPos::new(0, 0)).unwrap();
  window.load_queue().drain_ready();

  window.scroll_to(GridPos::new(-1, 0)).unwrap();
  let evicted = unloads(&window);
  assert_eq!(evicted.len(), 3);
  assert!(evicted.iter().all(|(pos, payload)| pos.x == 1 && payload.is_none()));
}

#[test]
fn random_walk_emits_exact_set_differences() {
  let mut rng = StdRng::seed_from_u64(0x5eed);
  let window = ready_window(7, GridPos::new(0, 0));

  for _ in 0..200 {
    let old: HashSet<_> = window.bounds().unwrap().cells().collect();
    let step = rng.gen_range(-9..=9);
    let center = window.center().unwrap();
    let target = if rng.gen_bool(0.5) {
      GridPos::new(center.x + step, center.y + rng.gen_range(-2..=2))
    } else {
      GridPos::new(center.x + rng.gen_range(-2..=2), center.y + step)
    };

    window.scroll_to(target).unwrap();
    let new: HashSet<_> = window.bounds().unwrap().cells().collect();

    let evicted = unloads(&window);
    let evicted_set: HashSet<_> = evicted.iter().map(|(pos, _)| *pos).collect();
    assert_eq!(evicted.len(), evicted_set.len(), "duplicate unload");
    assert_eq!(evicted_set, old.difference(&new).copied().collect());
    assert!(evicted.iter().all(|(pos, payload)| *payload == Some(*pos)));

    let loads = satisfy_loads(&window);
    let load_set: HashSet<_> = loads.iter().copied().collect();
    assert_eq!(loads.len(), load_set.len(), "duplicate load");
    assert_eq!(load_set, new.difference(&old).copied().collect());

    assert_window_consistent(&window);
  }
}

#[test]
fn consumer_session_drains_loads_from_another_thread() {
  let window = Arc::new(Window::new(3).unwrap());
  let cancel = CancelToken::new();

  let consumer = {
    let window = Arc::clone(&window);
    let cancel = cancel.clone();
    thread::spawn(move || {
      let mut seen = 0;
      for event in window.drain_loads(&cancel) {
        let pos = event.pos();
        window.set(pos, pos);
        seen += 1;
        if seen == 9 + 3 {
          break;
        }
      }
      seen
    })
  };

  window.initialize_at(GridPos::new(0, 0)).unwrap();
  // Wait for the initial fill before scrolling.
  while window.populated() < 9 {
    thread::yield_now();
  }
  window.scroll_to(GridPos::new(0, 1)).unwrap();

  assert_eq!(consumer.join().unwrap(), 12);
  assert_window_consistent(&window);
  cancel.cancel();
}
