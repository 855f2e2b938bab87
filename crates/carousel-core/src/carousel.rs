//! Carousel engine: spawn, advance, and cull in-flight items.
//!
//! Each call to [`CarouselEngine::advance`] is one atomic tick:
//!
//! 1. **Spawn** -- once the drawn delay has passed since the last spawn, a
//!    new item is appended just off the leading edge, provided the previous
//!    item has moved more than `min_spacing` past the spawn point.
//! 2. **Advance** -- unless reduced motion is set, every item moves forward
//!    by the step distance of the configured [`MotionModel`].
//! 3. **Cull** -- items past `track_width + exit_margin` are dropped.
//!
//! Items are kept in spawn order. [`CarouselEngine::claim`] removes an item
//! from anywhere in the sequence when storage accepts it.

use carousel_types::{Item, ItemId, TrackView};
use tracing::{debug, trace, warn};

use crate::clock::{TickClock, TickStamp};
use crate::config::{CarouselConfig, MotionModel};
use crate::ids::{self, IdSource};
use crate::spawn::{SpawnDelay, UniformDelay};

/// Fixed geometry and motion parameters of the track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackGeometry {
    /// Distance per tick (or per reference frame).
    pub speed: f64,
    /// Width of one item.
    pub item_width: f64,
    /// Extra offset beyond the item width at which items spawn.
    pub spawn_margin: f64,
    /// Required clearance of the previous item past the spawn point.
    pub min_spacing: f64,
    /// Slack beyond the visible track before culling.
    pub exit_margin: f64,
    /// Per-tick or elapsed-time movement.
    pub motion: MotionModel,
    /// Reference frame length for elapsed-time movement.
    pub reference_frame_ms: f64,
}

impl TrackGeometry {
    /// Extract the geometry from the carousel configuration.
    pub fn from_config(config: &CarouselConfig) -> Self {
        Self {
            speed: config.speed,
            item_width: config.item_width,
            spawn_margin: config.spawn_margin,
            min_spacing: config.min_spacing,
            exit_margin: config.exit_margin,
            motion: config.motion,
            reference_frame_ms: f64::from(config.reference_frame_ms.max(1)),
        }
    }

    /// Position at which new items appear, just out of view.
    pub fn spawn_position(&self) -> f64 {
        -self.item_width - self.spawn_margin
    }

    /// Distance items move on the given tick.
    pub fn step_distance(&self, stamp: &TickStamp) -> f64 {
        match self.motion {
            MotionModel::PerTick => self.speed,
            MotionModel::Elapsed => {
                let elapsed = stamp.elapsed_ms.unwrap_or(self.reference_frame_ms);
                self.speed * (elapsed / self.reference_frame_ms)
            }
        }
    }
}

/// What happened during one tick of the carousel.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceReport {
    /// Tick number just completed.
    pub tick: u64,
    /// Item spawned this tick, if any.
    pub spawned: Option<ItemId>,
    /// Items culled at the far edge, in spawn order.
    pub culled: Vec<ItemId>,
    /// Items still in flight after the tick.
    pub in_flight: usize,
}

/// The carousel engine. Sole owner and writer of the in-flight sequence.
#[derive(Debug)]
pub struct CarouselEngine {
    geometry: TrackGeometry,
    items: Vec<Item>,
    last_spawn_ms: f64,
    next_spawn_delay_ms: f64,
    track_width: f64,
    reduced_motion: bool,
    clock: TickClock,
    ids: Box<dyn IdSource>,
    delays: Box<dyn SpawnDelay>,
}

impl CarouselEngine {
    /// Create an engine with injected id and delay sources.
    ///
    /// The first spawn delay is drawn immediately, measured from time zero.
    pub fn new(
        config: &CarouselConfig,
        ids: Box<dyn IdSource>,
        mut delays: Box<dyn SpawnDelay>,
    ) -> Self {
        let next_spawn_delay_ms = delays.next_delay_ms();
        Self {
            geometry: TrackGeometry::from_config(config),
            items: Vec::new(),
            last_spawn_ms: 0.0,
            next_spawn_delay_ms,
            track_width: config.initial_track_width.max(0.0),
            reduced_motion: config.reduced_motion,
            clock: TickClock::new(),
            ids,
            delays,
        }
    }

    /// Create an engine using the configured id scheme and a seeded uniform
    /// spawn delay.
    pub fn from_config(config: &CarouselConfig, seed: u64) -> Self {
        Self::new(
            config,
            ids::from_scheme(config.id_scheme, &config.id_prefix),
            Box::new(UniformDelay::new(
                seed,
                config.min_spawn_interval_ms,
                config.max_spawn_interval_ms,
            )),
        )
    }

    /// Run one tick at host time `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> AdvanceReport {
        let stamp = self.clock.advance(now_ms);

        let spawned = self.try_spawn(stamp.sim_ms);

        if !self.reduced_motion {
            let step = self.geometry.step_distance(&stamp);
            for item in &mut self.items {
                item.position += step;
            }
        }

        let culled = self.cull();

        trace!(
            tick = stamp.tick,
            in_flight = self.items.len(),
            spawned = spawned.as_ref().map(ItemId::as_str),
            culled = culled.len(),
            "Carousel advanced"
        );

        AdvanceReport {
            tick: stamp.tick,
            spawned,
            culled,
            in_flight: self.items.len(),
        }
    }

    /// Append a new item if the spawn delay has passed in simulation time and
    /// the previous item has cleared the spawn point by more than
    /// `min_spacing`.
    fn try_spawn(&mut self, sim_ms: f64) -> Option<ItemId> {
        if sim_ms - self.last_spawn_ms <= self.next_spawn_delay_ms {
            return None;
        }

        let spawn_position = self.geometry.spawn_position();
        let crowded = self
            .items
            .last()
            .is_some_and(|last| last.position <= spawn_position + self.geometry.min_spacing);
        if crowded {
            return None;
        }

        let id = self.ids.next_id();
        self.items.push(Item::new(id.clone(), spawn_position));
        self.last_spawn_ms = sim_ms;
        self.next_spawn_delay_ms = self.delays.next_delay_ms();

        debug!(
            item_id = %id,
            position = spawn_position,
            next_delay_ms = self.next_spawn_delay_ms,
            "Item spawned"
        );
        Some(id)
    }

    /// Remove every item past the cull threshold, returning their ids.
    fn cull(&mut self) -> Vec<ItemId> {
        let threshold = self.cull_threshold();
        let mut culled = Vec::new();
        self.items.retain(|item| {
            if item.position > threshold {
                culled.push(item.id.clone());
                false
            } else {
                true
            }
        });
        culled
    }

    /// Remove the item with the given id from the track.
    ///
    /// Returns the removed item, or `None` if it already exited or was
    /// claimed. Absence is not an error.
    pub fn claim(&mut self, item_id: &ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| &item.id == item_id)?;
        let item = self.items.remove(index);
        debug!(item_id = %item.id, position = item.position, "Item claimed");
        Some(item)
    }

    /// Record the host's measured track width.
    ///
    /// Negative widths clamp to zero; non-finite widths are ignored.
    pub fn set_track_width(&mut self, width: f64) {
        if !width.is_finite() {
            warn!(width, "Ignoring non-finite track width");
            return;
        }
        self.track_width = width.max(0.0);
        debug!(
            track_width = self.track_width,
            cull_threshold = self.cull_threshold(),
            "Track width updated"
        );
    }

    /// Suspend or resume movement. Spawning and culling continue either way.
    pub const fn set_reduced_motion(&mut self, enabled: bool) {
        self.reduced_motion = enabled;
    }

    /// Whether movement is suspended.
    pub const fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Current track width.
    pub const fn track_width(&self) -> f64 {
        self.track_width
    }

    /// Position beyond which items are culled.
    pub fn cull_threshold(&self) -> f64 {
        self.track_width + self.geometry.exit_margin
    }

    /// Track geometry.
    pub const fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// In-flight items in spawn order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an in-flight item.
    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    /// Number of ticks processed.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Delay currently awaited before the next spawn attempt.
    pub const fn next_spawn_delay_ms(&self) -> f64 {
        self.next_spawn_delay_ms
    }

    /// Read-only snapshot for rendering.
    pub fn view(&self) -> TrackView {
        TrackView {
            tick: self.clock.tick(),
            track_width: self.track_width,
            cull_threshold: self.cull_threshold(),
            reduced_motion: self.reduced_motion,
            items: self.items.clone(),
        }
    }
}
