//! Scrolling windows over unbounded grids.
//!
//! A [`ScrollGrid`] is a [`FixedGrid`] that tracks which world coordinate it
//! is centered on. Recentering moves surviving payloads in place and records
//! the cells that left or entered the window on two [`EventQueue`]s:
//!
//! ```text
//!   scroll_to(+1, 0) on a 5×5 window
//!
//!   old  x: -2 -1  0  1  2            new  x: -1  0  1  2  3
//!           U  .  .  .  .    ──►               .  .  .  .  L
//!
//!   U = unload event (payload handed out), L = load request, . = moved in place
//! ```
//!
//! One lock guards storage, center, bounds and the initialized flag together.
//! Mutations take it exclusively; reads take it shared and never observe a
//! scroll half-applied.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::coords::{GridBounds, GridPos, GridPos3, Sweep, WindowCoord};
use crate::error::WindowError;
use crate::event::ChangeEvent;
use crate::fixed::FixedGrid;
use crate::queue::{CancelToken, Drain, EventQueue};

/// Queue of [`ChangeEvent`]s shared between a window and its consumers.
pub type ChangeQueue<C, T> = EventQueue<ChangeEvent<C, T>>;

/// Scrolling 2D window.
pub type ScrollingWindow<T> = ScrollGrid<GridPos, T>;

/// Scrolling 3D window; x/y share one radius, z has its own.
pub type ScrollingWindow3D<T> = ScrollGrid<GridPos3, T>;

/// Summary of one [`ScrollGrid::scroll_to`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollOutcome {
  /// Unload events pushed.
  pub evicted: usize,
  /// Load events pushed.
  pub loaded: usize,
  /// Cells whose content was carried over in place.
  pub reused: usize,
  /// True if old and new windows did not overlap.
  pub full_reload: bool,
}

/// State guarded by the window lock.
///
/// Exposed read-only through [`ScrollGrid::view`].
pub struct WindowState<C, T> {
  cells: FixedGrid<C, T>,
  center: C,
  bounds: GridBounds<C>,
  initialized: bool,
}

impl<C: WindowCoord, T> WindowState<C, T> {
  /// Center, or `None` before initialization.
  pub fn center(&self) -> Option<C> {
    self.initialized.then_some(self.center)
  }

  /// World-space bounds, or `None` before initialization.
  pub fn bounds(&self) -> Option<GridBounds<C>> {
    self.initialized.then_some(self.bounds)
  }

  /// Local storage, addressed relative to the center.
  pub fn cells(&self) -> &FixedGrid<C, T> {
    &self.cells
  }

  /// Payload at a world coordinate.
  pub fn get(&self, pos: C) -> Option<&T> {
    self.local_of(pos).and_then(|local| self.cells.get(local))
  }

  /// Translates a world coordinate to a local offset inside the window.
  fn local_of(&self, pos: C) -> Option<C> {
    if !self.initialized || !self.bounds.contains(pos) {
      return None;
    }
    Some(pos - self.center)
  }
}

/// Origin-centered window that scrolls over an unbounded grid.
///
/// All methods take `&self`; share the window between threads with an `Arc`.
pub struct ScrollGrid<C: WindowCoord, T> {
  radii: C,
  state: RwLock<WindowState<C, T>>,
  unloads: Arc<ChangeQueue<C, T>>,
  loads: Arc<ChangeQueue<C, T>>,
}

impl<C: WindowCoord, T> ScrollGrid<C, T> {
  fn from_cells(cells: FixedGrid<C, T>) -> Self {
    let radii = cells.radii();
    Self {
      radii,
      state: RwLock::new(WindowState {
        cells,
        center: C::default(),
        bounds: GridBounds::around(C::default(), radii),
        initialized: false,
      }),
      unloads: Arc::new(EventQueue::new()),
      loads: Arc::new(EventQueue::new()),
    }
  }

  /// Centers the window on `center` and requests a load for every cell.
  ///
  /// Can only succeed once per window. Fails with
  /// [`WindowError::CenterOutOfRange`] if the window would extend past the
  /// `i32` range.
  pub fn initialize_at(&self, center: C) -> Result<(), WindowError> {
    let mut state = self.state.write();
    if state.initialized {
      log::warn!("Ignoring initialize_at({:?}): window already initialized", center);
      return Err(WindowError::AlreadyInitialized);
    }
    let bounds = self.bounds_around(center)?;

    state.initialized = true;
    state.center = center;
    state.bounds = bounds;

    let mut requested = 0;
    for pos in state.bounds.cells() {
      self.loads.push(ChangeEvent::Load { pos });
      requested += 1;
    }

    log::debug!("Window initialized at {:?}, {} load requests", center, requested);
    Ok(())
  }

  /// Recenters the window on `center`.
  ///
  /// Payloads still inside the window stay; cells that leave are pushed to
  /// the unload queue with their payload and cells that enter are pushed to
  /// the load queue. Scrolling to the current center does nothing.
  ///
  /// Fails without side effects if the window is not initialized or would
  /// extend past the `i32` range around `center`.
  pub fn scroll_to(&self, center: C) -> Result<ScrollOutcome, WindowError> {
    let mut state = self.state.write();
    if !state.initialized {
      log::warn!("Ignoring scroll_to({:?}): window not initialized", center);
      return Err(WindowError::NotInitialized);
    }
    let new_bounds = self.bounds_around(center)?;

    let from = state.center;
    let outcome = self.shift(&mut *state, center, new_bounds);
    log::debug!(
      "Scrolled {:?} -> {:?}: {} evicted, {} loaded, {} reused",
      from,
      center,
      outcome.evicted,
      outcome.loaded,
      outcome.reused
    );
    Ok(outcome)
  }

  /// World bounds of a window centered on `center`, if representable.
  fn bounds_around(&self, center: C) -> Result<GridBounds<C>, WindowError> {
    GridBounds::checked_around(center, self.radii).ok_or_else(|| {
      log::warn!("Rejecting center {:?}: window leaves the i32 range", center);
      WindowError::CenterOutOfRange
    })
  }

  #[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
  fn shift(
    &self,
    state: &mut WindowState<C, T>,
    new_center: C,
    new_bounds: GridBounds<C>,
  ) -> ScrollOutcome {
    let old_center = state.center;
    if new_center == old_center {
      return ScrollOutcome::default();
    }

    let old_bounds = state.bounds;
    state.center = new_center;
    state.bounds = new_bounds;

    // Distances in i64; the centers may sit at opposite ends of the i32 range.
    // Local offsets og = ng + shift only stay in range while the windows overlap.
    let radii = self.radii;
    let disjoint = (0..C::AXES).any(|axis| {
      let distance = new_center.axis(axis) as i64 - old_center.axis(axis) as i64;
      distance.unsigned_abs() > 2 * radii.axis(axis) as u64
    });
    if disjoint {
      return self.reload_all(&mut state.cells, old_center, new_center);
    }

    // At most 2 * radius per axis from here on.
    let shift = new_center - old_center;

    let cells = &mut state.cells;
    let mut outcome = ScrollOutcome::default();

    // Walking each axis in the direction of travel reads every source slot
    // before it is overwritten as a destination.
    for ng in Sweep::new(cells.local_bounds(), shift) {
      let nw = ng + new_center;
      let ow = nw - shift;
      let og = ng + shift;

      if !new_bounds.contains(ow) {
        let payload = cells.take(ng);
        self.unloads.push(ChangeEvent::Unload { pos: ow, payload });
        outcome.evicted += 1;
      }

      if old_bounds.contains(nw) {
        let moved = cells.take(og);
        cells[ng] = moved;
        outcome.reused += 1;
      } else {
        cells[ng] = None;
        self.loads.push(ChangeEvent::Load { pos: nw });
        outcome.loaded += 1;
      }
    }

    outcome
  }

  /// Evicts the whole old window and requests the whole new one.
  fn reload_all(
    &self,
    cells: &mut FixedGrid<C, T>,
    old_center: C,
    new_center: C,
  ) -> ScrollOutcome {
    let locals = cells.local_bounds();
    for local in locals.cells() {
      let payload = cells.take(local);
      self.unloads.push(ChangeEvent::Unload {
        pos: local + old_center,
        payload,
      });
    }
    for local in locals.cells() {
      self.loads.push(ChangeEvent::Load {
        pos: local + new_center,
      });
    }

    log::info!(
      "Window jumped {:?} -> {:?} without overlap, reloading {} cells",
      old_center,
      new_center,
      cells.len()
    );
    ScrollOutcome {
      evicted: cells.len(),
      loaded: cells.len(),
      reused: 0,
      full_reload: true,
    }
  }

  /// Returns a clone of the payload at world coordinate `pos`.
  ///
  /// `None` if the cell is outside the window or not loaded yet. Takes the
  /// shared lock, so a reader may wait behind a scroll in progress.
  pub fn get(&self, pos: C) -> Option<T>
  where
    T: Clone,
  {
    self.read(pos, |cell| cell.cloned())
  }

  /// Calls `f` with the payload at `pos` while holding the read lock.
  ///
  /// `f` must not call mutating methods on this window.
  pub fn read<R>(&self, pos: C, f: impl FnOnce(Option<&T>) -> R) -> R {
    let state = self.state.read();
    f(state.get(pos))
  }

  /// Calls `f` with a consistent view of the whole window.
  ///
  /// `f` must not call mutating methods on this window.
  pub fn view<R>(&self, f: impl FnOnce(&WindowState<C, T>) -> R) -> R {
    let state = self.state.read();
    f(&state)
  }

  /// Stores `value` at world coordinate `pos`.
  ///
  /// Returns false, discarding `value`, if `pos` is outside the window or the
  /// window is not initialized.
  pub fn set(&self, pos: C, value: T) -> bool {
    let mut state = self.state.write();
    match state.local_of(pos) {
      Some(local) => {
        state.cells.set(local, value);
        true
      }
      None => false,
    }
  }

  /// Takes the payload out of world coordinate `pos`.
  pub fn remove(&self, pos: C) -> Option<T> {
    let mut state = self.state.write();
    let local = state.local_of(pos)?;
    state.cells.take(local)
  }

  /// Opens a blocking session on the load queue.
  pub fn drain_loads<'a>(&'a self, cancel: &'a CancelToken) -> Drain<'a, ChangeEvent<C, T>> {
    self.loads.drain(cancel)
  }

  /// Opens a blocking session on the unload queue.
  pub fn drain_unloads<'a>(&'a self, cancel: &'a CancelToken) -> Drain<'a, ChangeEvent<C, T>> {
    self.unloads.drain(cancel)
  }

  /// Shared handle to the load queue.
  pub fn load_queue(&self) -> &Arc<ChangeQueue<C, T>> {
    &self.loads
  }

  /// Shared handle to the unload queue.
  pub fn unload_queue(&self) -> &Arc<ChangeQueue<C, T>> {
    &self.unloads
  }

  /// Returns true once [`initialize_at`](Self::initialize_at) has succeeded.
  pub fn is_initialized(&self) -> bool {
    self.state.read().initialized
  }

  /// Current center, or `None` before initialization.
  pub fn center(&self) -> Option<C> {
    self.state.read().center()
  }

  /// Current world-space bounds, or `None` before initialization.
  pub fn bounds(&self) -> Option<GridBounds<C>> {
    self.state.read().bounds()
  }

  /// Per-axis radius.
  pub fn radii(&self) -> C {
    self.radii
  }

  /// Total number of cells.
  pub fn len(&self) -> usize {
    GridBounds::around(C::default(), self.radii).volume()
  }

  /// Always false; a window holds at least one cell.
  pub fn is_empty(&self) -> bool {
    false
  }

  /// Number of cells currently holding a payload.
  pub fn populated(&self) -> usize {
    self.state.read().cells.populated()
  }
}

impl<T> ScrollGrid<GridPos, T> {
  /// Creates an uninitialized `size × size` window.
  ///
  /// Fails with [`WindowError::InvalidDimension`] unless `size` is odd.
  pub fn new(size: u32) -> Result<Self, WindowError> {
    FixedGrid::<GridPos, T>::new(size).map(Self::from_cells)
  }

  /// Cells per side.
  pub fn size(&self) -> u32 {
    self.radii.x as u32 * 2 + 1
  }

  /// Cells on each side of the center.
  pub fn radius(&self) -> i32 {
    self.radii.x
  }
}

impl<T> ScrollGrid<GridPos3, T> {
  /// Creates an uninitialized window `width` cells across x/y and `height`
  /// cells along z.
  pub fn new(width: u32, height: u32) -> Result<Self, WindowError> {
    FixedGrid::<GridPos3, T>::new(width, height).map(Self::from_cells)
  }

  /// Cells across x and y.
  pub fn width(&self) -> u32 {
    self.radii.x as u32 * 2 + 1
  }

  /// Cells along z.
  pub fn height(&self) -> u32 {
    self.radii.z as u32 * 2 + 1
  }

  /// Cells on each side of the center across x and y.
  pub fn radius(&self) -> i32 {
    self.radii.x
  }

  /// Cells above and below the center along z.
  pub fn height_radius(&self) -> i32 {
    self.radii.z
  }
}
