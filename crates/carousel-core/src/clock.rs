//! Tick clock for the carousel simulation.
//!
//! The host (or the runner) supplies the current time on every tick. The
//! clock counts ticks and derives the elapsed time since the previous one.
//! Spawn timing runs on the clock's own simulation time, which only ever
//! moves forward by the elapsed time of each tick, so a host clock that
//! jumps does not shift the spawn schedule.
//!
//! # Design Principles
//!
//! - The tick counter saturates instead of overflowing.
//! - Elapsed time is never negative. A host clock that jumps backwards (or
//!   reports a non-finite value) yields zero elapsed time, and the next tick
//!   measures from the new value.
//! - The first tick has no predecessor and reports no elapsed time; its
//!   host time (clamped at zero) seeds the simulation time.

/// One processed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickStamp {
    /// Tick number (1 for the first tick).
    pub tick: u64,
    /// Host time supplied for this tick, in milliseconds.
    pub now_ms: f64,
    /// Milliseconds since the previous tick, `None` on the first tick.
    pub elapsed_ms: Option<f64>,
    /// Monotonic simulation time in milliseconds.
    pub sim_ms: f64,
}

/// Tick counter with elapsed-time tracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickClock {
    tick: u64,
    last_now_ms: Option<f64>,
    sim_ms: f64,
}

impl TickClock {
    /// Create a clock that has not ticked yet.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            last_now_ms: None,
            sim_ms: 0.0,
        }
    }

    /// Advance by one tick at host time `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> TickStamp {
        self.tick = self.tick.saturating_add(1);

        let now_ms = if now_ms.is_finite() {
            now_ms
        } else {
            self.last_now_ms.unwrap_or(0.0)
        };

        let elapsed_ms = self.last_now_ms.map(|prev| (now_ms - prev).max(0.0));
        self.sim_ms = match elapsed_ms {
            Some(elapsed) => self.sim_ms + elapsed,
            None => now_ms.max(0.0),
        };
        self.last_now_ms = Some(now_ms);

        TickStamp {
            tick: self.tick,
            now_ms,
            elapsed_ms,
            sim_ms: self.sim_ms,
        }
    }

    /// Number of ticks processed.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Latest host time seen, if any tick has run.
    pub const fn last_now_ms(&self) -> Option<f64> {
        self.last_now_ms
    }

    /// Simulation time reached so far.
    pub const fn sim_ms(&self) -> f64 {
        self.sim_ms
    }
}
