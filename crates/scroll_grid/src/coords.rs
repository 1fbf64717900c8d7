//! Coordinate types for scrolling windows.
//!
//! Defines the coordinate system shared by the 2D and 3D windows:
//! - [`GridPos`]: Cell position in an unbounded 2D world (x, y)
//! - [`GridPos3`]: Cell position in an unbounded 3D world (x, y, z)
//! - [`WindowCoord`]: Per-axis access so the window algorithms are written once
//! - [`GridBounds`]: Inclusive axis-aligned box of cells
//!
//! The same types describe world coordinates and window-local offsets. A local
//! offset is relative to the window center and lies in `[-radius, radius]` on
//! each axis.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Integer coordinate with a fixed number of axes.
///
/// Implemented by [`GridPos`] and [`GridPos3`]. Axis 0 is the outermost axis of
/// every traversal and the last axis is the innermost (fastest varying).
pub trait WindowCoord:
  Copy
  + Eq
  + Hash
  + Debug
  + Default
  + Send
  + Sync
  + Add<Output = Self>
  + Sub<Output = Self>
  + Neg<Output = Self>
  + 'static
{
  /// Number of axes.
  const AXES: usize;

  /// Returns the component on `axis`.
  ///
  /// # Panics
  /// Panics if `axis >= Self::AXES`.
  fn axis(self, axis: usize) -> i32;

  /// Returns a copy with the component on `axis` replaced.
  ///
  /// # Panics
  /// Panics if `axis >= Self::AXES`.
  fn with_axis(self, axis: usize, value: i32) -> Self;

  /// Builds a coordinate from a per-axis function.
  fn from_fn(f: impl FnMut(usize) -> i32) -> Self;

  /// Returns a coordinate with every component set to `value`.
  fn splat(value: i32) -> Self {
    Self::from_fn(|_| value)
  }

  /// Applies `f` to every component.
  fn map(self, mut f: impl FnMut(usize, i32) -> i32) -> Self {
    Self::from_fn(|axis| f(axis, self.axis(axis)))
  }
}

/// Cell position in an unbounded 2D world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
  pub x: i32,
  pub y: i32,
}

impl GridPos {
  /// Creates a new grid position.
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

impl From<(i32, i32)> for GridPos {
  fn from((x, y): (i32, i32)) -> Self {
    Self::new(x, y)
  }
}

impl WindowCoord for GridPos {
  const AXES: usize = 2;

  #[inline]
  fn axis(self, axis: usize) -> i32 {
    match axis {
      0 => self.x,
      1 => self.y,
      _ => panic!("axis {axis} out of range for GridPos"),
    }
  }

  #[inline]
  fn with_axis(mut self, axis: usize, value: i32) -> Self {
    match axis {
      0 => self.x = value,
      1 => self.y = value,
      _ => panic!("axis {axis} out of range for GridPos"),
    }
    self
  }

  #[inline]
  fn from_fn(mut f: impl FnMut(usize) -> i32) -> Self {
    Self::new(f(0), f(1))
  }
}

impl Add for GridPos {
  type Output = Self;

  #[inline]
  fn add(self, rhs: Self) -> Self {
    Self::new(self.x + rhs.x, self.y + rhs.y)
  }
}

impl Sub for GridPos {
  type Output = Self;

  #[inline]
  fn sub(self, rhs: Self) -> Self {
    Self::new(self.x - rhs.x, self.y - rhs.y)
  }
}

impl Neg for GridPos {
  type Output = Self;

  #[inline]
  fn neg(self) -> Self {
    Self::new(-self.x, -self.y)
  }
}

/// Cell position in an unbounded 3D world.
///
/// `x` and `y` span the window's width/depth, `z` spans its height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos3 {
  pub x: i32,
  pub y: i32,
  pub z: i32,
}

impl GridPos3 {
  /// Creates a new 3D grid position.
  pub const fn new(x: i32, y: i32, z: i32) -> Self {
    Self { x, y, z }
  }
}

impl From<(i32, i32, i32)> for GridPos3 {
  fn from((x, y, z): (i32, i32, i32)) -> Self {
    Self::new(x, y, z)
  }
}

impl WindowCoord for GridPos3 {
  const AXES: usize = 3;

  #[inline]
  fn axis(self, axis: usize) -> i32 {
    match axis {
      0 => self.x,
      1 => self.y,
      2 => self.z,
      _ => panic!("axis {axis} out of range for GridPos3"),
    }
  }

  #[inline]
  fn with_axis(mut self, axis: usize, value: i32) -> Self {
    match axis {
      0 => self.x = value,
      1 => self.y = value,
      2 => self.z = value,
      _ => panic!("axis {axis} out of range for GridPos3"),
    }
    self
  }

  #[inline]
  fn from_fn(mut f: impl FnMut(usize) -> i32) -> Self {
    Self::new(f(0), f(1), f(2))
  }
}

impl Add for GridPos3 {
  type Output = Self;

  #[inline]
  fn add(self, rhs: Self) -> Self {
    Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
  }
}

impl Sub for GridPos3 {
  type Output = Self;

  #[inline]
  fn sub(self, rhs: Self) -> Self {
    Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
  }
}

impl Neg for GridPos3 {
  type Output = Self;

  #[inline]
  fn neg(self) -> Self {
    Self::new(-self.x, -self.y, -self.z)
  }
}

/// Inclusive axis-aligned box of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds<C> {
  /// Smallest contained cell on every axis.
  pub min: C,
  /// Largest contained cell on every axis.
  pub max: C,
}

impl<C: WindowCoord> GridBounds<C> {
  /// Creates bounds from inclusive corners.
  pub fn new(min: C, max: C) -> Self {
    Self { min, max }
  }

  /// Creates the box `center ± radii`.
  pub fn around(center: C, radii: C) -> Self {
    Self {
      min: center - radii,
      max: center + radii,
    }
  }

  /// Like [`around`](Self::around), but `None` if a corner would leave the
  /// `i32` range.
  pub fn checked_around(center: C, radii: C) -> Option<Self> {
    let fits = (0..C::AXES).all(|axis| {
      let (c, r) = (center.axis(axis), radii.axis(axis));
      c.checked_sub(r).is_some() && c.checked_add(r).is_some()
    });
    fits.then(|| Self::around(center, radii))
  }

  /// Returns true if `pos` lies inside the box on every axis.
  #[inline]
  pub fn contains(&self, pos: C) -> bool {
    (0..C::AXES).all(|axis| {
      let v = pos.axis(axis);
      v >= self.min.axis(axis) && v <= self.max.axis(axis)
    })
  }

  /// Number of cells spanned on `axis`.
  pub fn extent(&self, axis: usize) -> u32 {
    (self.max.axis(axis) as i64 - self.min.axis(axis) as i64 + 1) as u32
  }

  /// Total number of cells in the box.
  pub fn volume(&self) -> usize {
    (0..C::AXES).map(|axis| self.extent(axis) as usize).product()
  }

  /// Iterates every cell, axis 0 outermost, all axes ascending.
  pub fn cells(&self) -> Sweep<C> {
    Sweep::forward(*self)
  }
}

/// Traversal of a [`GridBounds`] with a chosen direction per axis.
///
/// A direction of `+1` walks an axis from `min` to `max`, `-1` from `max` to
/// `min`. Axis 0 is the outermost loop.
#[derive(Clone, Debug)]
pub struct Sweep<C> {
  bounds: GridBounds<C>,
  dirs: C,
  next: Option<C>,
}

impl<C: WindowCoord> Sweep<C> {
  /// Creates a sweep walking each axis in the sign of `dirs` on that axis.
  ///
  /// A zero component walks forward.
  pub fn new(bounds: GridBounds<C>, dirs: C) -> Self {
    let dirs = dirs.map(|_, d| if d < 0 { -1 } else { 1 });
    let start = C::from_fn(|axis| Self::start_of(&bounds, dirs, axis));
    Self {
      bounds,
      dirs,
      next: Some(start),
    }
  }

  /// Creates a sweep walking every axis forward.
  pub fn forward(bounds: GridBounds<C>) -> Self {
    Self::new(bounds, C::splat(1))
  }

  fn start_of(bounds: &GridBounds<C>, dirs: C, axis: usize) -> i32 {
    if dirs.axis(axis) < 0 {
      bounds.max.axis(axis)
    } else {
      bounds.min.axis(axis)
    }
  }
}

impl<C: WindowCoord> Iterator for Sweep<C> {
  type Item = C;

  fn next(&mut self) -> Option<C> {
    let current = self.next?;

    // Odometer step: bump the innermost axis, carrying outward.
    let mut cursor = current;
    let mut advanced = false;
    for axis in (0..C::AXES).rev() {
      let stepped = cursor.axis(axis).checked_add(self.dirs.axis(axis));
      if let Some(v) = stepped
        && v >= self.bounds.min.axis(axis)
        && v <= self.bounds.max.axis(axis)
      {
        cursor = cursor.with_axis(axis, v);
        advanced = true;
        break;
      }
      cursor = cursor.with_axis(axis, Self::start_of(&self.bounds, self.dirs, axis));
    }

    self.next = advanced.then_some(cursor);
    Some(current)
  }
}
