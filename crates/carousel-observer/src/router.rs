//! Axum router construction for the host API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled so a browser host on another origin can call it.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete router for the host API server.
///
/// The router includes:
/// - `GET /ws/frames` -- `WebSocket` frame stream
/// - `GET|POST /api/track...` -- track view, width, reduced motion
/// - `POST /api/tick` -- host-driven tick
/// - `POST /api/drag/start`, `POST /api/drag/end`, `POST /api/drop`
/// - `POST /api/unload`, `GET /api/grid`
/// - `POST /api/events` -- generic host event interface
/// - `/api/operator/*` -- tick loop control
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws/frames", get(ws::ws_frames))
        // Track
        .route("/api/track", get(handlers::get_track))
        .route("/api/track/width", post(handlers::set_track_width))
        .route("/api/track/motion", post(handlers::set_motion))
        .route("/api/tick", post(handlers::tick))
        // Drag and drop
        .route("/api/drag/start", post(handlers::start_drag))
        .route("/api/drag/end", post(handlers::end_drag))
        .route("/api/drop", post(handlers::drop_on_cell))
        // Storage
        .route("/api/unload", post(handlers::unload))
        .route("/api/grid", get(handlers::get_grid))
        // Event interface
        .route("/api/events", post(handlers::apply_event))
        // Operator
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
