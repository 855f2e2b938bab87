//! Host event interface.
//!
//! The presentation layer never touches engine state directly. It reports
//! what happened (a frame elapsed, the track was resized, a drag started, a
//! drop landed, unload was pressed) as a [`HostEvent`] and receives a
//! [`HostReply`]. Every event is total: invalid references produce a reply
//! describing the no-op, never an error.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DropRejection;
use crate::ids::{CellId, ItemId};
use crate::structs::{Item, Unloaded};

/// An event reported by the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HostEvent {
    /// The visible track was measured (after layout or a resize).
    SetTrackWidth {
        /// Measured width in track units.
        width: f64,
    },
    /// The host clock produced a frame.
    Tick {
        /// Current host time in milliseconds.
        now_ms: f64,
    },
    /// The reduced-motion preference changed.
    SetReducedMotion {
        /// Whether movement should be suspended.
        enabled: bool,
    },
    /// The user picked an item up off the carousel.
    StartDrag {
        /// The item being dragged.
        item_id: ItemId,
    },
    /// The drag gesture ended (dropped anywhere or cancelled).
    EndDrag,
    /// The user released an item over a storage cell.
    DropOnCell {
        /// Target cell.
        cell_id: CellId,
        /// The dropped item; the current drag is used when absent.
        item: Option<Item>,
    },
    /// The user pressed unload.
    RequestUnload,
}

/// The engine's answer to a [`HostEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HostReply {
    /// The event was applied and has nothing further to report.
    Ack,
    /// A frame was processed.
    Ticked {
        /// Tick number just completed.
        tick: u64,
        /// Item spawned this tick, if any.
        spawned: Option<ItemId>,
        /// Items culled at the far edge this tick.
        culled: Vec<ItemId>,
    },
    /// Result of a drag start.
    DragStarted {
        /// Whether the item was on the carousel and is now being dragged.
        accepted: bool,
    },
    /// Result of a drop onto a cell.
    Dropped {
        /// Whether the item was stored.
        placed: bool,
        /// The target cell.
        cell_id: CellId,
        /// Why the item was not stored.
        rejection: Option<DropRejection>,
    },
    /// Result of an unload request.
    Unloaded {
        /// The removed item, or `None` when storage was empty.
        unloaded: Option<Unloaded>,
    },
}
