//! Tracy profiler wiring for the `tracy` feature.

use tracing_subscriber::layer::SubscriberExt;

/// Installs a global `tracing` subscriber that streams spans to Tracy.
///
/// Call once at startup, before the first scroll.
pub fn init_tracy() {
  let subscriber = tracing_subscriber::registry().with(tracing_tracy::TracyLayer::default());
  if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
    log::warn!("Failed to install Tracy subscriber: {e}");
  }
}
