//! Unbounded event queues with cancellable drain sessions.
//!
//! An [`EventQueue`] is a multi-producer/multi-consumer FIFO backed by an
//! unbounded `async-channel`. Producers never block. Consumers either poll
//! ([`EventQueue::try_pop`], [`EventQueue::drain_ready`]) or open a blocking
//! session with [`EventQueue::drain`].
//!
//! Only one drain session runs per queue at a time, so a session sees a
//! continuous run of events. A second session waits for the first to end.
//! Sessions stop when their [`CancelToken`] is cancelled; an event is either
//! delivered whole or left in the queue for the next session.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_channel::{Receiver, Sender, TryRecvError};
use futures::executor::block_on;
use futures::future::{self, Either};
use parking_lot::{Mutex, MutexGuard};

/// How long a waiting session sleeps between cancellation checks.
const SESSION_POLL: Duration = Duration::from_millis(5);

/// Cooperative stop signal for drain sessions.
///
/// Clones share state. Cancelling is permanent and wakes every waiter.
#[derive(Clone, Debug)]
pub struct CancelToken {
  inner: Arc<CancelInner>,
}

#[derive(Debug)]
struct CancelInner {
  cancelled: AtomicBool,
  // Never carries a message; closing it is the wake-up.
  signal_tx: Sender<()>,
  signal_rx: Receiver<()>,
}

impl CancelToken {
  /// Creates a token that is not cancelled.
  pub fn new() -> Self {
    let (signal_tx, signal_rx) = async_channel::bounded(1);
    Self {
      inner: Arc::new(CancelInner {
        cancelled: AtomicBool::new(false),
        signal_tx,
        signal_rx,
      }),
    }
  }

  /// Requests every session using this token to stop.
  pub fn cancel(&self) {
    self.inner.cancelled.store(true, Ordering::Release);
    self.inner.signal_tx.close();
  }

  /// Returns true once [`cancel`](Self::cancel) has been called.
  pub fn is_cancelled(&self) -> bool {
    self.inner.cancelled.load(Ordering::Acquire)
  }

  /// Resolves when the token is cancelled.
  pub async fn cancelled(&self) {
    let _ = self.inner.signal_rx.recv().await;
  }
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}

/// Unbounded MPMC FIFO of events.
pub struct EventQueue<E> {
  tx: Sender<E>,
  rx: Receiver<E>,
  session: Mutex<()>,
}

impl<E> EventQueue<E> {
  /// Creates an empty queue.
  pub fn new() -> Self {
    let (tx, rx) = async_channel::unbounded();
    Self {
      tx,
      rx,
      session: Mutex::new(()),
    }
  }

  /// Appends an event. Never blocks.
  pub fn push(&self, event: E) {
    // The queue owns its receiver, so the channel only closes on drop.
    if let Err(e) = self.tx.try_send(event) {
      log::warn!("Event queue rejected push: {}", e);
    }
  }

  /// Removes the oldest event without waiting.
  pub fn try_pop(&self) -> Option<E> {
    self.rx.try_recv().ok()
  }

  /// Removes every event currently queued, without waiting.
  ///
  /// Does not take a session, so it competes with an open [`Drain`].
  pub fn drain_ready(&self) -> Vec<E> {
    std::iter::from_fn(|| self.try_pop()).collect()
  }

  /// Number of queued events.
  pub fn len(&self) -> usize {
    self.rx.len()
  }

  /// Returns true if nothing is queued.
  pub fn is_empty(&self) -> bool {
    self.rx.is_empty()
  }

  /// Opens a blocking drain session.
  ///
  /// Waits for any other session to finish first. If `cancel` fires while
  /// waiting, the returned iterator is already finished.
  pub fn drain<'a>(&'a self, cancel: &'a CancelToken) -> Drain<'a, E> {
    let session = loop {
      if cancel.is_cancelled() {
        break None;
      }
      if let Some(guard) = self.session.try_lock_for(SESSION_POLL) {
        break Some(guard);
      }
    };
    Drain {
      queue: self,
      cancel,
      session,
    }
  }
}

impl<E> Default for EventQueue<E> {
  fn default() -> Self {
    Self::new()
  }
}

/// Blocking iterator over an [`EventQueue`] session.
///
/// Each `next` waits for an event and returns `None` once the session's token
/// is cancelled. Dropping the iterator ends the session.
pub struct Drain<'a, E> {
  queue: &'a EventQueue<E>,
  cancel: &'a CancelToken,
  session: Option<MutexGuard<'a, ()>>,
}

impl<E> Drain<'_, E> {
  /// Returns true while the session is open.
  pub fn is_active(&self) -> bool {
    self.session.is_some()
  }

  fn finish(&mut self) -> Option<E> {
    self.session = None;
    None
  }
}

impl<E> Iterator for Drain<'_, E> {
  type Item = E;

  fn next(&mut self) -> Option<E> {
    self.session.as_ref()?;
    if self.cancel.is_cancelled() {
      return self.finish();
    }

    match self.queue.rx.try_recv() {
      Ok(event) => return Some(event),
      Err(TryRecvError::Closed) => return self.finish(),
      Err(TryRecvError::Empty) => {}
    }

    let queue = self.queue;
    let cancel = self.cancel;
    // Cancellation is polled first; a dropped `recv` never consumes an event.
    let cancelled = pin!(cancel.cancelled());
    let recv = pin!(queue.rx.recv());
    match block_on(future::select(cancelled, recv)) {
      Either::Right((Ok(event), _)) => Some(event),
      Either::Right((Err(_), _)) | Either::Left(_) => self.finish(),
    }
  }
}
