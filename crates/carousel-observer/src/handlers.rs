//! Host API endpoint handlers.
//!
//! Each handler locks the shared session, applies one host operation, and
//! answers with JSON. Invalid references (unknown item, unknown or occupied
//! cell, empty storage) are not errors: they answer `200` with a result
//! describing the no-op. Host ticks are the exception: they answer `409`
//! while the engine's own tick loop drives the session.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/track` | In-flight items and track settings |
//! | `POST` | `/api/track/width` | Report the measured track width |
//! | `POST` | `/api/track/motion` | Toggle reduced motion |
//! | `POST` | `/api/tick` | Advance one tick at host time `now_ms` |
//! | `POST` | `/api/drag/start` | Pick an item up |
//! | `POST` | `/api/drag/end` | Cancel the drag |
//! | `POST` | `/api/drop` | Drop an item on a cell |
//! | `POST` | `/api/unload` | Unload one item |
//! | `GET` | `/api/grid` | Storage grid snapshot |
//! | `POST` | `/api/events` | Apply any host event |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use carousel_core::session::TickSummary;
use carousel_types::{
    CellId, DropRejection, GridView, HostEvent, HostReply, Item, ItemId, TrackView, Unloaded,
};
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::{AppState, FrameBroadcast};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/track/width`.
#[derive(Debug, serde::Deserialize)]
pub struct SetWidthRequest {
    /// Measured track width.
    pub width: f64,
}

/// Request body for `POST /api/track/motion`.
#[derive(Debug, serde::Deserialize)]
pub struct SetMotionRequest {
    /// Whether movement should be suspended.
    pub reduced_motion: bool,
}

/// Request body for `POST /api/tick`.
#[derive(Debug, serde::Deserialize)]
pub struct TickRequest {
    /// Current host time in milliseconds.
    pub now_ms: f64,
}

/// Request body for `POST /api/drag/start`.
#[derive(Debug, serde::Deserialize)]
pub struct StartDragRequest {
    /// The item picked up.
    pub item_id: ItemId,
}

/// Request body for `POST /api/drop`.
#[derive(Debug, serde::Deserialize)]
pub struct DropRequest {
    /// Target cell.
    pub cell_id: CellId,
    /// The dropped item; the current drag is used when absent.
    #[serde(default)]
    pub item: Option<Item>,
}

/// Response body for `POST /api/drag/start`.
#[derive(Debug, serde::Serialize)]
pub struct DragResponse {
    /// Whether the item was on the carousel and is now being dragged.
    pub accepted: bool,
}

/// Response body for `POST /api/drop`.
#[derive(Debug, serde::Serialize)]
pub struct DropResponse {
    /// Whether the item was stored.
    pub placed: bool,
    /// The target cell.
    pub cell_id: CellId,
    /// Placement stamp when stored.
    pub seq: Option<u64>,
    /// Why the item was not stored.
    pub rejection: Option<DropRejection>,
}

/// Response body for `POST /api/unload`.
#[derive(Debug, serde::Serialize)]
pub struct UnloadResponse {
    /// The removed item, `null` when storage was empty.
    pub unloaded: Option<Unloaded>,
    /// Whether storage still holds anything.
    pub has_any_occupant: bool,
}

/// Response for operations with nothing to report.
#[derive(Debug, serde::Serialize)]
pub struct AckResponse {
    /// Always `true`.
    pub ok: bool,
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Return the in-flight items and track settings.
pub async fn get_track(State(state): State<Arc<AppState>>) -> Json<TrackView> {
    Json(state.session.lock().await.track())
}

/// Record the measured track width.
pub async fn set_track_width(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetWidthRequest>,
) -> Json<TrackView> {
    let mut session = state.session.lock().await;
    session.set_track_width(body.width);
    Json(session.track())
}

/// Enable or disable reduced motion.
pub async fn set_motion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetMotionRequest>,
) -> Json<TrackView> {
    let mut session = state.session.lock().await;
    session.set_reduced_motion(body.reduced_motion);
    Json(session.track())
}

/// Advance one tick at the host's clock and broadcast the frame.
pub async fn tick(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TickRequest>,
) -> Result<Json<TickSummary>, ObserverError> {
    Ok(Json(run_tick(&state, body.now_ms).await?))
}

async fn run_tick(state: &AppState, now_ms: f64) -> Result<TickSummary, ObserverError> {
    if !state.accepts_host_ticks() {
        warn!(now_ms, "Host tick refused while the engine drives the session");
        return Err(ObserverError::TickSourceConflict);
    }
    let mut session = state.session.lock().await;
    let summary = session.on_tick(now_ms);
    let receivers = state.broadcast(&FrameBroadcast::from_tick(&summary, &session));
    debug!(tick = summary.tick, receivers, "Host tick applied");
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

/// Begin dragging an in-flight item.
pub async fn start_drag(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartDragRequest>,
) -> Json<DragResponse> {
    let accepted = state.session.lock().await.start_drag(&body.item_id);
    Json(DragResponse { accepted })
}

/// Cancel the current drag.
pub async fn end_drag(State(state): State<Arc<AppState>>) -> Json<AckResponse> {
    state.session.lock().await.end_drag();
    Json(AckResponse { ok: true })
}

/// Drop an item on a cell.
pub async fn drop_on_cell(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DropRequest>,
) -> Json<DropResponse> {
    let outcome = state
        .session
        .lock()
        .await
        .drop_on_cell(&body.cell_id, body.item);
    Json(DropResponse {
        placed: outcome.is_placed(),
        cell_id: body.cell_id,
        seq: outcome.seq(),
        rejection: outcome.rejection(),
    })
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Unload one item: newest priority first, then newest regular.
pub async fn unload(State(state): State<Arc<AppState>>) -> Json<UnloadResponse> {
    let mut session = state.session.lock().await;
    let unloaded = session.request_unload();
    Json(UnloadResponse {
        unloaded,
        has_any_occupant: session.has_any_occupant(),
    })
}

/// Return the storage grid.
pub async fn get_grid(State(state): State<Arc<AppState>>) -> Json<GridView> {
    Json(state.session.lock().await.grid())
}

// ---------------------------------------------------------------------------
// Event interface
// ---------------------------------------------------------------------------

/// Apply any host event and return the engine's reply.
///
/// Tick events are broadcast to `WebSocket` clients like `POST /api/tick`
/// and refused the same way while the engine drives the session.
pub async fn apply_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<HostEvent>,
) -> Result<Json<HostReply>, ObserverError> {
    let reply = if let HostEvent::Tick { now_ms } = event {
        let summary = run_tick(&state, now_ms).await?;
        HostReply::Ticked {
            tick: summary.tick,
            spawned: summary.spawned,
            culled: summary.culled,
        }
    } else {
        state.session.lock().await.apply(event)
    };
    Ok(Json(reply))
}
