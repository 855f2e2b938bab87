//! Carousel engine, storage grid, and tick orchestration for the luggage
//! carousel simulation.
//!
//! Items spawn just off the leading edge of a horizontal track, move right
//! every tick, and are culled past the far edge unless the user drags one
//! into the storage grid. The grid unloads priority cells first and, within
//! a tier, the most recently stored item first.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `carousel-config.yaml` into
//!   strongly-typed structs.
//! - [`ids`] -- [`IdSource`] trait with sequential and time-ordered sources.
//! - [`spawn`] -- [`SpawnDelay`] trait with seeded uniform and fixed sources.
//! - [`clock`] -- Tick counter with elapsed-time tracking.
//! - [`carousel`] -- The carousel engine: spawn, advance, cull, claim.
//! - [`storage`] -- The storage grid: placement and priority-first LIFO
//!   unload.
//! - [`drag`] -- Drag state between pick-up and drop.
//! - [`session`] -- Facade routing host events to engine and storage.
//! - [`operator`] -- Pause, resume, pace, and stop controls.
//! - [`runner`] -- The self-driven async tick loop.
//!
//! [`IdSource`]: ids::IdSource
//! [`SpawnDelay`]: spawn::SpawnDelay

pub mod carousel;
pub mod clock;
pub mod config;
pub mod drag;
pub mod ids;
pub mod operator;
pub mod runner;
pub mod session;
pub mod spawn;
pub mod storage;
