//! Tick callback that streams frames to the host API.
//!
//! After each tick of the engine's loop, this callback builds a
//! [`FrameBroadcast`] and sends it to every connected `WebSocket` client.

use std::sync::Arc;

use carousel_core::runner::TickCallback;
use carousel_core::session::{CarouselSession, TickSummary};
use carousel_observer::state::{AppState, FrameBroadcast};
use tracing::trace;

/// Callback that bridges the tick loop to the host API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a callback publishing through the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl TickCallback for ObserverCallback {
    fn on_tick(&mut self, summary: &TickSummary, session: &CarouselSession) {
        let frame = FrameBroadcast::from_tick(summary, session);
        let receivers = self.state.broadcast(&frame);
        trace!(tick = summary.tick, receivers, "Frame broadcast sent");
    }
}
