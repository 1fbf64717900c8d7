//! Dense, origin-centered cell storage.
//!
//! A [`FixedGrid`] holds one `Option<T>` per cell of a box centered on the
//! local origin. Cells are addressed by signed offsets in `[-radius, radius]`
//! per axis and stored row-major with the last axis fastest:
//!
//! ```text
//! index = ((x + rx) * (2ry + 1) + (y + ry)) * (2rz + 1) + (z + rz)
//! ```
//!
//! There is no locking here. The owning [`ScrollGrid`](crate::ScrollGrid)
//! serializes access.

use std::ops::{Index, IndexMut};

use crate::coords::{GridBounds, GridPos, GridPos3, WindowCoord};
use crate::error::WindowError;

/// Fixed-size box of optional cells centered on the local origin.
pub struct FixedGrid<C, T> {
  cells: Box<[Option<T>]>,
  radii: C,
}

/// Square 2D window storage, `size × size` cells.
pub type FixedWindow<T> = FixedGrid<GridPos, T>;

/// 3D window storage, `width × width × height` cells.
pub type FixedWindow3D<T> = FixedGrid<GridPos3, T>;

/// Returns the radius of an odd dimension.
pub(crate) fn odd_radius(name: &'static str, value: u32) -> Result<i32, WindowError> {
  if value % 2 != 1 {
    return Err(WindowError::InvalidDimension { name, value });
  }
  Ok((value / 2) as i32)
}

impl<C: WindowCoord, T> FixedGrid<C, T> {
  /// Creates empty storage spanning `[-radii, radii]` on each axis.
  pub(crate) fn with_radii(radii: C) -> Self {
    let len = GridBounds::around(C::default(), radii).volume();
    Self {
      cells: (0..len).map(|_| None).collect(),
      radii,
    }
  }

  /// Per-axis radius.
  #[inline]
  pub fn radii(&self) -> C {
    self.radii
  }

  /// Box of valid local offsets.
  #[inline]
  pub fn local_bounds(&self) -> GridBounds<C> {
    GridBounds::around(C::default(), self.radii)
  }

  /// Total number of cells.
  #[inline]
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  /// Always false; a grid holds at least one cell.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// Converts a local offset to a linear index, or `None` if out of range.
  #[inline]
  fn index_of(&self, local: C) -> Option<usize> {
    let mut index = 0usize;
    for axis in 0..C::AXES {
      let r = self.radii.axis(axis);
      let v = local.axis(axis);
      if v < -r || v > r {
        return None;
      }
      let extent = 2 * r as usize + 1;
      index = index * extent + (v as i64 + r as i64) as usize;
    }
    Some(index)
  }

  /// Returns true if `local` is a valid offset.
  #[inline]
  pub fn contains(&self, local: C) -> bool {
    self.index_of(local).is_some()
  }

  /// Returns the payload at `local`, or `None` if the cell is empty or the
  /// offset is out of range.
  #[inline]
  pub fn get(&self, local: C) -> Option<&T> {
    self.index_of(local).and_then(|i| self.cells[i].as_ref())
  }

  /// Stores `value` at `local`, returning the previous payload.
  ///
  /// # Panics
  /// Panics if `local` is out of range.
  #[inline]
  pub fn set(&mut self, local: C, value: T) -> Option<T> {
    self[local].replace(value)
  }

  /// Empties the cell at `local`, returning its payload.
  ///
  /// # Panics
  /// Panics if `local` is out of range.
  #[inline]
  pub fn take(&mut self, local: C) -> Option<T> {
    self[local].take()
  }

  /// Number of cells holding a payload.
  pub fn populated(&self) -> usize {
    self.cells.iter().filter(|cell| cell.is_some()).count()
  }

  /// Iterates populated cells as `(local, payload)` in storage order.
  pub fn iter(&self) -> impl Iterator<Item = (C, &T)> + '_ {
    self
      .local_bounds()
      .cells()
      .zip(self.cells.iter())
      .filter_map(|(local, cell)| cell.as_ref().map(|value| (local, value)))
  }
}

impl<C: WindowCoord, T> Index<C> for FixedGrid<C, T> {
  type Output = Option<T>;

  #[inline]
  fn index(&self, local: C) -> &Self::Output {
    match self.index_of(local) {
      Some(i) => &self.cells[i],
      None => panic!("local offset {:?} outside radii {:?}", local, self.radii),
    }
  }
}

impl<C: WindowCoord, T> IndexMut<C> for FixedGrid<C, T> {
  #[inline]
  fn index_mut(&mut self, local: C) -> &mut Self::Output {
    match self.index_of(local) {
      Some(i) => &mut self.cells[i],
      None => panic!("local offset {:?} outside radii {:?}", local, self.radii),
    }
  }
}

impl<T> FixedGrid<GridPos, T> {
  /// Creates a `size × size` grid.
  ///
  /// Fails with [`WindowError::InvalidDimension`] unless `size` is odd.
  pub fn new(size: u32) -> Result<Self, WindowError> {
    let radius = odd_radius("size", size)?;
    Ok(Self::with_radii(GridPos::splat(radius)))
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

impl<T> FixedGrid<GridPos3, T> {
  /// Creates a grid `width` cells across x and y, `height` cells along z.
  ///
  /// Both dimensions must be odd.
  pub fn new(width: u32, height: u32) -> Result<Self, WindowError> {
    let radius = odd_radius("width", width)?;
    let height_radius = odd_radius("height", height)?;
    Ok(Self::with_radii(GridPos3::new(radius, radius, height_radius)))
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
