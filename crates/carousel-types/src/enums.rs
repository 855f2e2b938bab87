//! Enumeration types shared between the core and the host adapter.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which group of storage cells a cell belongs to.
///
/// Unload always drains every occupied [`Tier::Priority`] cell before it
/// touches a [`Tier::Regular`] one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Tier {
    /// Drained first on unload.
    Priority,
    /// Drained once no priority cell holds an item.
    Regular,
}

impl Tier {
    /// Tiers in the order unload visits them.
    pub const UNLOAD_ORDER: [Self; 2] = [Self::Priority, Self::Regular];

    /// Whether this is the priority tier.
    pub const fn is_priority(self) -> bool {
        matches!(self, Self::Priority)
    }
}

/// Why a drop onto a storage cell did not store the item.
///
/// Rejections are ordinary outcomes of racing gestures against ticks; the
/// host surfaces them by leaving the item where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DropRejection {
    /// No cell with the given id exists in the grid.
    UnknownCell,
    /// The target cell already holds an item.
    CellOccupied,
    /// The item is already stored in another cell.
    AlreadyStored,
    /// The drop named no item and no drag was in progress.
    NothingDragged,
    /// The placement sequence counter is exhausted.
    SequenceExhausted,
}

