//! Shared application state for the host API server.
//!
//! [`AppState`] holds the shared session every handler operates on, the
//! broadcast channel for per-tick frames, and the operator control state
//! when a self-driven tick loop is attached. It also records which side
//! ticks the session, so host ticks are refused while the engine's loop
//! drives it.

use std::sync::Arc;

use carousel_core::config::TickDriver;
use carousel_core::operator::OperatorState;
use carousel_core::runner::SharedSession;
use carousel_core::session::{CarouselSession, TickSummary};
use carousel_types::{Item, ItemId};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for frames.
///
/// A subscriber that falls behind by more than this many frames receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const BROADCAST_CAPACITY: usize = 256;

/// JSON frame pushed over the `WebSocket` after every tick.
///
/// Carries everything a host needs to redraw the track: positions of every
/// in-flight item plus what changed this tick.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameBroadcast {
    /// The tick number.
    pub tick: u64,
    /// Host time of the tick in milliseconds.
    pub now_ms: f64,
    /// Item spawned this tick, if any.
    pub spawned: Option<ItemId>,
    /// Items culled this tick.
    pub culled: Vec<ItemId>,
    /// In-flight items in spawn order.
    pub items: Vec<Item>,
    /// Occupied storage cells.
    pub stored: usize,
    /// Whether unload has anything to remove.
    pub has_any_occupant: bool,
}

impl FrameBroadcast {
    /// Build a frame from a tick summary and the session it came from.
    pub fn from_tick(summary: &TickSummary, session: &CarouselSession) -> Self {
        Self {
            tick: summary.tick,
            now_ms: summary.now_ms,
            spawned: summary.spawned.clone(),
            culled: summary.culled.clone(),
            items: session.visible_items().to_vec(),
            stored: summary.stored,
            has_any_occupant: session.has_any_occupant(),
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for frames.
    pub tx: broadcast::Sender<FrameBroadcast>,
    /// The session all host operations apply to.
    pub session: SharedSession,
    /// Shared operator control state (present when a tick loop is running).
    pub operator_state: Option<Arc<OperatorState>>,
    /// Who supplies ticks to the session.
    pub driver: TickDriver,
}

impl AppState {
    /// Create state for a host-driven session with no tick loop.
    pub fn new(session: SharedSession) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            session,
            operator_state: None,
            driver: TickDriver::Host,
        }
    }

    /// Create state for an engine-driven session whose tick loop is steered
    /// through `operator`. Host ticks are refused.
    pub fn with_operator(session: SharedSession, operator: Arc<OperatorState>) -> Self {
        Self {
            operator_state: Some(operator),
            driver: TickDriver::Engine,
            ..Self::new(session)
        }
    }

    /// Whether `POST /api/tick` and tick events are accepted.
    pub const fn accepts_host_ticks(&self) -> bool {
        matches!(self.driver, TickDriver::Host)
    }

    /// Subscribe to the frame broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a frame to all connected clients.
    ///
    /// Returns the number of receivers, 0 when nobody is connected.
    pub fn broadcast(&self, frame: &FrameBroadcast) -> usize {
        // send fails only when there are no receivers.
        self.tx.send(frame.clone()).unwrap_or(0)
    }
}
