//! Operator control state for the self-driven tick loop.
//!
//! Shared between the runner task and the host API handlers. The operator
//! can pause and resume the loop, change its pace, and stop it cleanly
//! without touching carousel or storage state.
//!
//! Control flags are atomics so the runner reads them without locking;
//! [`Notify`] wakes a paused or sleeping runner promptly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::SimulationBoundsConfig;

/// Smallest accepted tick interval in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 5;

/// Reason why the tick loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator (or Ctrl-C) issued a stop.
    OperatorStop,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the loop is currently paused.
    paused: AtomicBool,

    /// Wakes the loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the loop out of a pause or an inter-tick sleep on stop.
    stop_notify: Notify,

    /// Current tick interval in milliseconds.
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the loop started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the loop ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create operator state from configuration. Intervals below
    /// [`MIN_TICK_INTERVAL_MS`] are raised to it.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms: AtomicU64::new(tick_interval_ms.max(MIN_TICK_INTERVAL_MS)),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop. It sleeps until resumed or stopped.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the loop and wake it.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            tokio::select! {
                () = self.resume_notify.notified() => {}
                () = self.stop_notify.notified() => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop and wake the loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolve once a stop has been requested.
    pub async fn wait_for_stop(&self) {
        while !self.is_stop_requested() {
            let notified = self.stop_notify.notified();
            // Re-check after registering so a concurrent stop is not missed.
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Record the reason the loop ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the loop ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds.
    ///
    /// Returns the previous interval, or `None` if `ms` is below
    /// [`MIN_TICK_INTERVAL_MS`].
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether `current_tick` has reached a non-zero `max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Whether a non-zero `max_real_time_seconds` has elapsed.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

/// JSON-serializable loop status for the operator API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Current tick number.
    pub tick: u64,
    /// Whether the loop is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// Items currently on the carousel.
    pub in_flight: usize,
    /// Occupied storage cells.
    pub stored: usize,
    /// The reason the loop ended, if it has.
    pub end_reason: Option<SimulationEndReason>,
    /// RFC 3339 timestamp of when the loop started.
    pub started_at: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn unbounded() -> SimulationBoundsConfig {
        SimulationBoundsConfig::default()
    }

    #[test]
    fn initial_state_is_running() {
        let state = OperatorState::new(16, &unbounded());
        assert!(!state.is_paused());
        assert!(!state.is_stop_requested());
        assert_eq!(state.tick_interval_ms(), 16);
    }

    #[test]
    fn pause_and_resume() {
        let state = OperatorState::new(16, &unbounded());
        state.pause();
        assert!(state.is_paused());
        state.resume();
        assert!(!state.is_paused());
    }

    #[test]
    fn set_tick_interval() {
        let state = OperatorState::new(16, &unbounded());
        assert_eq!(state.set_tick_interval_ms(250), Some(16));
        assert_eq!(state.tick_interval_ms(), 250);
    }

    #[test]
    fn reject_interval_below_minimum() {
        let state = OperatorState::new(16, &unbounded());
        assert!(state.set_tick_interval_ms(1).is_none());
        assert_eq!(state.tick_interval_ms(), 16);
        assert_eq!(
            state.set_tick_interval_ms(MIN_TICK_INTERVAL_MS),
            Some(16)
        );
    }

    #[test]
    fn configured_interval_is_clamped() {
        let state = OperatorState::new(0, &unbounded());
        assert_eq!(state.tick_interval_ms(), MIN_TICK_INTERVAL_MS);
    }

    #[test]
    fn zero_limits_mean_unlimited() {
        let state = OperatorState::new(16, &unbounded());
        assert!(!state.tick_limit_reached(u64::MAX));
        assert!(!state.time_limit_reached());
    }

    #[test]
    fn tick_limit_reached() {
        let bounds = SimulationBoundsConfig {
            max_ticks: 100,
            max_real_time_seconds: 0,
        };
        let state = OperatorState::new(16, &bounds);
        assert!(!state.tick_limit_reached(99));
        assert!(state.tick_limit_reached(100));
        assert!(state.tick_limit_reached(101));
    }

    #[tokio::test]
    async fn stop_releases_paused_waiter() {
        let state = Arc::new(OperatorState::new(16, &unbounded()));
        state.pause();

        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.wait_if_paused().await })
        };
        tokio::task::yield_now().await;
        state.request_stop();

        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));
        assert!(state.is_paused());
    }

    #[tokio::test]
    async fn wait_for_stop_returns_after_request() {
        let state = Arc::new(OperatorState::new(16, &unbounded()));
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.wait_for_stop().await })
        };
        tokio::task::yield_now().await;
        state.request_stop();
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));

        // Already stopped: returns immediately.
        state.wait_for_stop().await;
    }

    #[tokio::test]
    async fn end_reason_round_trip() {
        let state = OperatorState::new(16, &unbounded());
        assert!(state.end_reason().await.is_none());
        state.set_end_reason(SimulationEndReason::OperatorStop).await;
        assert_eq!(
            state.end_reason().await,
            Some(SimulationEndReason::OperatorStop)
        );
    }

    #[tokio::test]
    async fn status_reports_end_reason_in_snake_case() {
        let state = OperatorState::new(16, &unbounded());
        state.set_end_reason(SimulationEndReason::MaxTicksReached).await;
        let status = SimulationStatus {
            tick: 12,
            paused: false,
            stop_requested: false,
            tick_interval_ms: state.tick_interval_ms(),
            elapsed_seconds: 0,
            max_ticks: 12,
            max_real_time_seconds: 0,
            in_flight: 2,
            stored: 1,
            end_reason: state.end_reason().await,
            started_at: state.started_at().to_rfc3339(),
        };

        let json = serde_json::to_value(&status).ok();
        assert_eq!(
            json.as_ref().and_then(|v| v.get("end_reason")),
            Some(&serde_json::json!("max_ticks_reached"))
        );
        assert_eq!(
            json.as_ref().and_then(|v| v.get("tick_interval_ms")),
            Some(&serde_json::json!(16))
        );
    }
}
