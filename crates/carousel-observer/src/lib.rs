//! Host API server for the luggage carousel simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** mapping every host operation (track width, tick,
//!   drag, drop, unload, grid) onto the shared session
//! - **Event endpoint** (`/api/events`) accepting any tagged host event
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming per-tick frames via
//!   [`tokio::sync::broadcast`]
//! - **Operator REST endpoints** for tick loop control (pause, resume,
//!   speed, status, stop)
//!
//! # Architecture
//!
//! Handlers and the engine's tick loop share one session behind an async
//! mutex, so every request sees a settled state between ticks. `WebSocket`
//! clients receive frames through a broadcast channel with lag handling.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::{StartupError, spawn_observer};
pub use state::{AppState, FrameBroadcast};
