//! Scroll Grid - origin-centered windows over unbounded 2D and 3D grids.
//!
//! A [`ScrollingWindow`] (or [`ScrollingWindow3D`]) materializes a fixed,
//! odd-sized box of cells around a world coordinate. Scrolling keeps every
//! payload that is still inside the window and reports the rest as events:
//! - unload events hand evicted payloads to the caller
//! - load events request payloads for cells that entered the window
//!
//! Actual loading happens elsewhere. A consumer drains the queues (see
//! [`TaskQueue`]) and writes results back with [`ScrollGrid::set`].

pub mod config;
pub mod coords;
pub mod error;
pub mod event;
pub mod fixed;
pub mod queue;
pub mod scroll;
#[cfg(feature = "tracy")]
mod tracy_init;
pub mod worker;

pub use config::GridConfig;
pub use coords::{GridBounds, GridPos, GridPos3, Sweep, WindowCoord};
pub use error::{ConfigError, WindowError};
pub use event::ChangeEvent;
pub use fixed::{FixedGrid, FixedWindow, FixedWindow3D};
pub use queue::{CancelToken, Drain, EventQueue};
pub use scroll::{
  ChangeQueue, ScrollGrid, ScrollOutcome, ScrollingWindow, ScrollingWindow3D, WindowState,
};
#[cfg(feature = "tracy")]
pub use tracy_init::init_tracy;
pub use worker::{ExecutionQueue, TaskQueue};
