//! Cell transition records emitted by scrolling windows.

use crate::coords::WindowCoord;

/// One cell transition, consumed by an external loader/unloader.
///
/// Unload events are pushed to a window's unload queue, load events to its
/// load queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent<C, T> {
  /// `pos` left the window. `payload` is what the cell held, or `None` if it
  /// was still waiting for its load.
  Unload { pos: C, payload: Option<T> },
  /// `pos` entered the window and needs its payload fetched.
  Load { pos: C },
}

impl<C: WindowCoord, T> ChangeEvent<C, T> {
  /// World coordinate of the transition.
  pub fn pos(&self) -> C {
    match self {
      Self::Unload { pos, .. } | Self::Load { pos } => *pos,
    }
  }

  /// Returns true for load requests.
  pub fn is_load(&self) -> bool {
    matches!(self, Self::Load { .. })
  }

  /// Consumes the event, returning the evicted payload of an unload.
  pub fn into_payload(self) -> Option<T> {
    match self {
      Self::Unload { payload, .. } => payload,
      Self::Load { .. } => None,
    }
  }
}
