//! Core data structs and the read-only views handed to the host.
//!
//! Views are snapshots: the host renders them and sends events back, it never
//! holds a reference into live engine state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Tier;
use crate::ids::{CellId, ItemId};

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A unit of luggage travelling the carousel.
///
/// `position` is the horizontal offset along the track. Items spawn just off
/// the leading edge (negative position) and move toward larger values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    /// Unique identifier assigned at spawn.
    pub id: ItemId,
    /// Horizontal offset along the track.
    pub position: f64,
}

impl Item {
    /// Create an item at the given position.
    pub const fn new(id: ItemId, position: f64) -> Self {
        Self { id, position }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Read-only snapshot of the carousel track for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrackView {
    /// Number of ticks the engine has processed.
    pub tick: u64,
    /// Track width last reported by the host.
    pub track_width: f64,
    /// Position beyond which items are culled.
    pub cull_threshold: f64,
    /// Whether movement is currently suspended.
    pub reduced_motion: bool,
    /// In-flight items in spawn order.
    pub items: Vec<Item>,
}

/// One storage cell as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellView {
    /// Cell identifier.
    pub id: CellId,
    /// Whether the cell belongs to the priority tier.
    pub is_priority: bool,
    /// Zero-based grid row.
    pub row: u32,
    /// Zero-based grid column.
    pub column: u32,
    /// The stored item, if any.
    pub occupant: Option<Item>,
    /// Placement sequence number of the occupant, if any.
    pub placed_seq: Option<u64>,
}

/// Read-only snapshot of the storage grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridView {
    /// Number of columns the host should lay the cells out in.
    pub columns: u32,
    /// Cells in grid order.
    pub cells: Vec<CellView>,
    /// Whether any cell holds an item (enables the unload control).
    pub has_any_occupant: bool,
}

/// An item removed from storage by an unload request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Unloaded {
    /// The cell that was cleared.
    pub cell_id: CellId,
    /// The tier the cell belongs to.
    pub tier: Tier,
    /// The item that was stored there.
    pub item: Item,
    /// Placement sequence number the item was stored with.
    pub placed_seq: u64,
}
