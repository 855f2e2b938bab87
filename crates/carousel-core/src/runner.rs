//! Self-driven tick loop with operator controls.
//!
//! [`run_simulation`] plays the role of the host's animation frame when the
//! engine runs headless or serves a thin client. It ticks the shared session
//! at the operator's interval, supplying the elapsed loop time as `now`, and
//! supports:
//!
//! - **Bounded runs**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume**: time spent paused is not fed to the session
//! - **Variable pace**: tick interval adjustable at runtime
//! - **Clean shutdown**: a stop wakes the loop mid-sleep and leaves the
//!   session state untouched
//!
//! Host requests and the loop share the session through one async mutex,
//! so each tick and each host operation is applied atomically.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::session::{CarouselSession, TickSummary};

/// Session handle shared by the tick loop and host handlers.
pub type SharedSession = Arc<Mutex<CarouselSession>>;

/// Wrap a session for sharing.
pub fn share(session: CarouselSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Result of the loop run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// The reason the loop ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed by this loop.
    pub total_ticks: u64,
}

/// Callback invoked after each tick, while the session is still locked.
///
/// Used to broadcast frames to connected hosts.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, session: &CarouselSession);
}

/// A tick callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _session: &CarouselSession) {}
}

/// Run the tick loop until a bound is reached or a stop is requested.
pub async fn run_simulation(
    session: &SharedSession,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> SimulationResult {
    let started = Instant::now();
    let mut paused_for = Duration::ZERO;
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Tick loop starting"
    );

    loop {
        // --- Pause ---
        if operator.is_paused() {
            info!("Tick loop paused, waiting for resume...");
            let pause_started = Instant::now();
            operator.wait_if_paused().await;
            paused_for = paused_for.saturating_add(pause_started.elapsed());
            info!("Tick loop resumed");
        }

        // --- Stop ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return finish(operator, SimulationEndReason::OperatorStop, last_summary, total_ticks)
                .await;
        }

        // --- Time limit ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxRealTimeReached,
                last_summary,
                total_ticks,
            )
            .await;
        }

        // --- Tick ---
        let now_ms = started.elapsed().saturating_sub(paused_for).as_secs_f64() * 1000.0;
        let summary = {
            let mut guard = session.lock().await;
            let summary = guard.on_tick(now_ms);
            callback.on_tick(&summary, &guard);
            summary
        };
        total_ticks = total_ticks.saturating_add(1);

        if summary.spawned.is_some() || !summary.culled.is_empty() {
            debug!(
                tick = summary.tick,
                spawned = summary.spawned.as_ref().map(carousel_types::ItemId::as_str),
                culled = summary.culled.len(),
                in_flight = summary.in_flight,
                "Track changed"
            );
        }

        // --- Tick limit ---
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxTicksReached,
                Some(summary),
                total_ticks,
            )
            .await;
        }

        last_summary = Some(summary);

        // --- Sleep, waking early on stop ---
        let interval = Duration::from_millis(operator.tick_interval_ms());
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = operator.wait_for_stop() => {}
        }
    }
}

async fn finish(
    operator: &OperatorState,
    end_reason: SimulationEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> SimulationResult {
    operator.set_end_reason(end_reason).await;
    SimulationResult {
        end_reason,
        final_summary,
        total_ticks,
    }
}

/// Log how the loop ended. The host API keeps serving afterwards.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Tick loop ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            in_flight = summary.in_flight,
            stored = summary.stored,
            "Final tick summary"
        );
    } else {
        warn!("Tick loop ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::carousel::CarouselEngine;
    use crate::config::{SimulationBoundsConfig, SimulationConfig};
    use crate::ids::SequentialIds;
    use crate::spawn::FixedDelay;
    use crate::storage::StorageManager;

    fn shared_session() -> SharedSession {
        let config = SimulationConfig::default();
        share(CarouselSession::new(
            CarouselEngine::new(
                &config.carousel,
                Box::new(SequentialIds::new("luggage")),
                Box::new(FixedDelay(50.0)),
            ),
            StorageManager::new(&config.storage),
        ))
    }

    fn operator(max_ticks: u64) -> Arc<OperatorState> {
        Arc::new(OperatorState::new(
            16,
            &SimulationBoundsConfig {
                max_ticks,
                max_real_time_seconds: 0,
            },
        ))
    }

    #[derive(Default)]
    struct RecordingCallback {
        ticks: Vec<u64>,
        spawned: usize,
    }

    impl TickCallback for RecordingCallback {
        fn on_tick(&mut self, summary: &TickSummary, _session: &CarouselSession) {
            self.ticks.push(summary.tick);
            if summary.spawned.is_some() {
                self.spawned = self.spawned.saturating_add(1);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_tick_limit() {
        let session = shared_session();
        let operator = operator(20);
        let mut callback = RecordingCallback::default();

        let result = run_simulation(&session, &operator, &mut callback).await;

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 20);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(20));
        assert_eq!(callback.ticks, (1..=20).collect::<Vec<u64>>());
        // 16ms pacing passes the 50ms spawn delay within 20 ticks.
        assert!(callback.spawned >= 1);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_runs_no_ticks() {
        let session = shared_session();
        let operator = operator(0);
        operator.request_stop();

        let result = run_simulation(&session, &operator, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        assert_eq!(session.lock().await.carousel().tick(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_running_loop() {
        let session = shared_session();
        let operator = operator(0);

        let handle = {
            let session = Arc::clone(&session);
            let operator = Arc::clone(&operator);
            tokio::spawn(async move { run_simulation(&session, &operator, &mut NoOpCallback).await })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        operator.request_stop();
        let result = handle.await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert!(result.total_ticks > 0);
        let ticks = session.lock().await.carousel().tick();
        assert_eq!(ticks, result.total_ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_loop_does_not_tick() {
        let session = shared_session();
        let operator = operator(0);
        operator.pause();

        let handle = {
            let session = Arc::clone(&session);
            let operator = Arc::clone(&operator);
            tokio::spawn(async move { run_simulation(&session, &operator, &mut NoOpCallback).await })
        };

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(session.lock().await.carousel().tick(), 0);

        operator.resume();
        tokio::time::sleep(Duration::from_millis(200)).await;
        operator.request_stop();
        let result = handle.await.unwrap();

        assert!(result.total_ticks > 0);
        // Time spent paused is not reported as track time.
        let last_now = result.final_summary.map(|s| s.now_ms).unwrap();
        assert!(last_now < 1000.0, "now {last_now} includes paused time");
    }

    #[tokio::test(start_paused = true)]
    async fn host_operations_interleave_with_ticks() {
        let session = shared_session();
        let operator = operator(0);

        let handle = {
            let session = Arc::clone(&session);
            let operator = Arc::clone(&operator);
            tokio::spawn(async move { run_simulation(&session, &operator, &mut NoOpCallback).await })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        {
            let mut guard = session.lock().await;
            let item = guard.visible_items().first().cloned().unwrap();
            let cell = carousel_types::CellId::new("cell-0");
            assert!(guard.drop_on_cell(&cell, Some(item)).is_placed());
        }
        operator.request_stop();
        let result = handle.await.unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert!(session.lock().await.has_any_occupant());
    }
}
