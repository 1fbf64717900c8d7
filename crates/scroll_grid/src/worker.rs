//! Background FIFO execution over event queues.
//!
//! A [`TaskQueue`] owns one named thread that drains an [`EventQueue`] and
//! runs a handler on every item, in arrival order. It is the harness an
//! external loader or unloader uses to satisfy a window's event streams:
//!
//! ```ignore
//! let loader = TaskQueue::attach(Arc::clone(window.load_queue()), "loader", move |event| {
//!   let payload = fetch(event.pos());
//!   window.set(event.pos(), payload);
//! })?;
//! ```

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::queue::{CancelToken, EventQueue};

/// Anything that accepts work items.
pub trait ExecutionQueue<T> {
  /// Queues `item` for processing. Never blocks.
  fn enqueue(&self, item: T);
}

impl<T> ExecutionQueue<T> for EventQueue<T> {
  fn enqueue(&self, item: T) {
    self.push(item);
  }
}

/// Runs a handler on a background thread for every queued item.
///
/// Dropping the queue (or calling [`shutdown`](Self::shutdown)) stops the
/// thread after the item in progress. Unprocessed items stay in the queue.
pub struct TaskQueue<T: Send + 'static> {
  queue: Arc<EventQueue<T>>,
  cancel: CancelToken,
  name: String,
  handle: Option<JoinHandle<usize>>,
}

impl<T: Send + 'static> TaskQueue<T> {
  /// Spawns a worker with its own queue.
  pub fn spawn<F>(name: &str, handler: F) -> io::Result<Self>
  where
    F: FnMut(T) + Send + 'static,
  {
    Self::attach(Arc::new(EventQueue::new()), name, handler)
  }

  /// Spawns a worker draining an existing shared queue.
  ///
  /// Other sessions on the same queue wait until this worker stops.
  pub fn attach<F>(queue: Arc<EventQueue<T>>, name: &str, mut handler: F) -> io::Result<Self>
  where
    F: FnMut(T) + Send + 'static,
  {
    let cancel = CancelToken::new();
    let handle = {
      let queue = Arc::clone(&queue);
      let cancel = cancel.clone();
      let thread_name = name.to_string();
      thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
          log::debug!("Worker '{}' started", thread_name);
          let mut processed = 0;
          for item in queue.drain(&cancel) {
            handler(item);
            processed += 1;
          }
          log::debug!("Worker '{}' stopped after {} items", thread_name, processed);
          processed
        })?
    };

    log::info!("Spawned worker '{}'", name);
    Ok(Self {
      queue,
      cancel,
      name: name.to_string(),
      handle: Some(handle),
    })
  }

  /// Shared handle to the queue being drained.
  pub fn queue(&self) -> &Arc<EventQueue<T>> {
    &self.queue
  }

  /// Number of items waiting.
  pub fn pending(&self) -> usize {
    self.queue.len()
  }

  /// Stops the worker and waits for it, returning how many items it handled.
  pub fn shutdown(mut self) -> usize {
    self.stop()
  }

  fn stop(&mut self) -> usize {
    self.cancel.cancel();
    let Some(handle) = self.handle.take() else {
      return 0;
    };
    match handle.join() {
      Ok(processed) => processed,
      Err(_) => {
        log::warn!("Worker '{}' panicked", self.name);
        0
      }
    }
  }
}

impl<T: Send + 'static> ExecutionQueue<T> for TaskQueue<T> {
  fn enqueue(&self, item: T) {
    self.queue.push(item);
  }
}

impl<T: Send + 'static> Drop for TaskQueue<T> {
  fn drop(&mut self) {
    self.stop();
  }
}
