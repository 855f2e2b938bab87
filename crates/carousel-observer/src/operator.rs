//! Operator REST API handlers for tick loop control.
//!
//! These endpoints steer the self-driven tick loop. They never touch the
//! carousel or the grid directly.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the tick loop |
//! | `POST` | `/api/operator/resume` | Resume the tick loop |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/api/operator/status` | Current loop status |
//! | `POST` | `/api/operator/stop` | Stop the loop cleanly |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use carousel_core::operator::{MIN_TICK_INTERVAL_MS, OperatorState, SimulationStatus};

use crate::error::ObserverError;
use crate::state::AppState;

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds.
    pub tick_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    ok: bool,
    message: String,
}

fn operator(state: &AppState) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or(ObserverError::OperatorUnavailable)
}

/// Pause the tick loop. Host operations keep working while paused.
pub async fn pause(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.pause();
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Tick loop paused".to_owned(),
    }))
}

/// Resume the tick loop after a pause.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.resume();
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Tick loop resumed".to_owned(),
    }))
}

/// Change the tick interval at runtime. Takes effect at the next sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let prev = operator(&state)?
        .set_tick_interval_ms(body.tick_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidRequest(format!(
                "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            ))
        })?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Tick interval changed from {prev}ms to {}ms", body.tick_interval_ms),
        "previous_interval_ms": prev,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

/// Report tick count, pacing, bounds, and occupancy.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;

    let (tick, in_flight, stored) = {
        let session = state.session.lock().await;
        (
            session.carousel().tick(),
            session.visible_items().len(),
            session.storage().occupied_count(),
        )
    };

    Ok(Json(SimulationStatus {
        tick,
        paused: operator.is_paused(),
        stop_requested: operator.is_stop_requested(),
        tick_interval_ms: operator.tick_interval_ms(),
        elapsed_seconds: operator.elapsed_seconds(),
        max_ticks: operator.max_ticks(),
        max_real_time_seconds: operator.max_real_time_seconds(),
        in_flight,
        stored,
        end_reason: operator.end_reason().await,
        started_at: operator.started_at().to_rfc3339(),
    }))
}

/// Stop the tick loop. Session state is left as it is and the host API
/// keeps serving.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested".to_owned(),
    }))
}
