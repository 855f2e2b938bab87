//! Session facade: one carousel, one storage grid, one drag.
//!
//! [`CarouselSession`] is the single writer behind every host operation.
//! It routes host events to the carousel engine and the storage manager and
//! owns the coupling between them: a successful drop claims the item from
//! the carousel, a failed drop leaves it where it is.

use carousel_types::{
    CellId, DropRejection, GridView, HostEvent, HostReply, Item, ItemId, TrackView, Unloaded,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::carousel::CarouselEngine;
use crate::config::SimulationConfig;
use crate::drag::DragTracker;
use crate::storage::StorageManager;

/// Summary of one session tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Tick number just completed.
    pub tick: u64,
    /// Host time supplied for the tick.
    pub now_ms: f64,
    /// Item spawned this tick, if any.
    pub spawned: Option<ItemId>,
    /// Items culled this tick.
    pub culled: Vec<ItemId>,
    /// Items on the carousel after the tick.
    pub in_flight: usize,
    /// Occupied storage cells.
    pub stored: usize,
}

/// Outcome of a drop onto a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The item was stored with this placement stamp.
    Placed {
        /// Placement sequence number.
        seq: u64,
    },
    /// The item was not stored.
    Rejected(DropRejection),
}

impl DropOutcome {
    /// Whether the item was stored.
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    /// The placement stamp, if stored.
    pub const fn seq(&self) -> Option<u64> {
        match self {
            Self::Placed { seq } => Some(*seq),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    pub const fn rejection(&self) -> Option<DropRejection> {
        match self {
            Self::Placed { .. } => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// The simulation state a host interacts with.
#[derive(Debug)]
pub struct CarouselSession {
    carousel: CarouselEngine,
    storage: StorageManager,
    drag: DragTracker,
}

impl CarouselSession {
    /// Assemble a session from its parts.
    pub const fn new(carousel: CarouselEngine, storage: StorageManager) -> Self {
        Self {
            carousel,
            storage,
            drag: DragTracker::new(),
        }
    }

    /// Build a session from configuration, seeding spawn delays with
    /// `world.seed`.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            CarouselEngine::from_config(&config.carousel, config.world.seed),
            StorageManager::new(&config.storage),
        )
    }

    // -----------------------------------------------------------------------
    // Track
    // -----------------------------------------------------------------------

    /// Record the measured track width.
    pub fn set_track_width(&mut self, width: f64) {
        self.carousel.set_track_width(width);
    }

    /// Enable or disable reduced motion.
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        if self.carousel.reduced_motion() != enabled {
            info!(enabled, "Reduced motion changed");
        }
        self.carousel.set_reduced_motion(enabled);
    }

    /// Run one tick at host time `now_ms`.
    ///
    /// A drag whose item is culled this tick is cancelled.
    pub fn on_tick(&mut self, now_ms: f64) -> TickSummary {
        let report = self.carousel.advance(now_ms);

        let dragged_culled = self
            .drag
            .current()
            .is_some_and(|dragged| report.culled.contains(&dragged.id));
        if dragged_culled && let Some(lost) = self.drag.end() {
            debug!(item_id = %lost.id, "Dragged item left the track");
        }

        TickSummary {
            tick: report.tick,
            now_ms,
            spawned: report.spawned,
            culled: report.culled,
            in_flight: report.in_flight,
            stored: self.storage.occupied_count(),
        }
    }

    /// Items on the carousel in spawn order.
    pub fn visible_items(&self) -> &[Item] {
        self.carousel.items()
    }

    /// Snapshot of the track for rendering.
    pub fn track(&self) -> TrackView {
        self.carousel.view()
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    /// Begin dragging an in-flight item. Returns `false` if the item is not
    /// on the carousel.
    pub fn start_drag(&mut self, item_id: &ItemId) -> bool {
        match self.carousel.item(item_id) {
            Some(item) => {
                let snapshot = item.clone();
                debug!(item_id = %item_id, position = snapshot.position, "Drag started");
                self.drag.start(snapshot);
                true
            }
            None => {
                warn!(item_id = %item_id, "Drag of unknown item ignored");
                false
            }
        }
    }

    /// End the current drag without storing anything.
    pub fn end_drag(&mut self) {
        if let Some(item) = self.drag.end() {
            debug!(item_id = %item.id, "Drag ended");
        }
    }

    /// Store `item` (or the dragged item when `None`) in the named cell.
    ///
    /// On success the item is removed from the carousel and the drag ends.
    /// On failure nothing changes.
    pub fn drop_on_cell(&mut self, cell_id: &CellId, item: Option<Item>) -> DropOutcome {
        let Some(item) = item.or_else(|| self.drag.current().cloned()) else {
            warn!(cell_id = %cell_id, "Drop with nothing dragged");
            return DropOutcome::Rejected(DropRejection::NothingDragged);
        };
        let item_id = item.id.clone();

        match self.storage.try_place(cell_id, item) {
            Ok(seq) => {
                if self.carousel.claim(&item_id).is_none() {
                    debug!(item_id = %item_id, "Stored item was not in flight");
                }
                if self.drag.is_dragging_item(&item_id) {
                    self.end_drag();
                }
                DropOutcome::Placed { seq }
            }
            Err(e) => {
                warn!(cell_id = %cell_id, item_id = %item_id, error = %e, "Drop rejected");
                DropOutcome::Rejected(e.rejection())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    /// Unload one item: newest priority first, then newest regular.
    pub fn request_unload(&mut self) -> Option<Unloaded> {
        let unloaded = self.storage.unload();
        if unloaded.is_none() {
            debug!("Unload requested with empty storage");
        }
        unloaded
    }

    /// Snapshot of the storage grid.
    pub fn grid(&self) -> GridView {
        self.storage.view()
    }

    /// Whether any cell holds an item.
    pub fn has_any_occupant(&self) -> bool {
        self.storage.has_any_occupant()
    }

    // -----------------------------------------------------------------------
    // Event interface
    // -----------------------------------------------------------------------

    /// Apply one host event and describe the result.
    pub fn apply(&mut self, event: HostEvent) -> HostReply {
        match event {
            HostEvent::SetTrackWidth { width } => {
                self.set_track_width(width);
                HostReply::Ack
            }
            HostEvent::Tick { now_ms } => {
                let summary = self.on_tick(now_ms);
                HostReply::Ticked {
                    tick: summary.tick,
                    spawned: summary.spawned,
                    culled: summary.culled,
                }
            }
            HostEvent::SetReducedMotion { enabled } => {
                self.set_reduced_motion(enabled);
                HostReply::Ack
            }
            HostEvent::StartDrag { item_id } => HostReply::DragStarted {
                accepted: self.start_drag(&item_id),
            },
            HostEvent::EndDrag => {
                self.end_drag();
                HostReply::Ack
            }
            HostEvent::DropOnCell { cell_id, item } => {
                let outcome = self.drop_on_cell(&cell_id, item);
                HostReply::Dropped {
                    placed: outcome.is_placed(),
                    cell_id,
                    rejection: outcome.rejection(),
                }
            }
            HostEvent::RequestUnload => HostReply::Unloaded {
                unloaded: self.request_unload(),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The carousel engine.
    pub const fn carousel(&self) -> &CarouselEngine {
        &self.carousel
    }

    /// The storage grid.
    pub const fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// The drag tracker.
    pub const fn drag(&self) -> &DragTracker {
        &self.drag
    }
}
