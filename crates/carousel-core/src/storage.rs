//! Storage grid: placement and priority-first LIFO unload.
//!
//! The grid is a fixed sequence of single-occupant cells. The leading
//! `priority_count` cells form the [`Tier::Priority`] tier; the rest are
//! [`Tier::Regular`]. Every successful placement is stamped with a strictly
//! increasing sequence number from a logical counter owned by the grid, so
//! two occupied cells never share a stamp.
//!
//! Unload visits tiers in [`Tier::UNLOAD_ORDER`] and, within the first tier
//! that holds anything, clears the cell with the greatest stamp.

use carousel_types::{CellId, CellView, DropRejection, GridView, Item, ItemId, Tier, Unloaded};
use tracing::{debug, info};

use crate::config::StorageConfig;

/// Why a placement was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No cell with this id exists.
    #[error("unknown cell: {0}")]
    UnknownCell(CellId),

    /// The cell already holds an item.
    #[error("cell {cell} is occupied by {occupant}")]
    CellOccupied {
        /// The target cell.
        cell: CellId,
        /// The item already stored there.
        occupant: ItemId,
    },

    /// The item is already stored elsewhere in the grid.
    #[error("item {item} is already stored in {cell}")]
    AlreadyStored {
        /// The item being placed.
        item: ItemId,
        /// The cell currently holding it.
        cell: CellId,
    },

    /// The placement counter cannot advance further.
    #[error("placement sequence exhausted")]
    SequenceExhausted,
}

impl StorageError {
    /// The host-facing rejection reason.
    pub const fn rejection(&self) -> DropRejection {
        match self {
            Self::UnknownCell(_) => DropRejection::UnknownCell,
            Self::CellOccupied { .. } => DropRejection::CellOccupied,
            Self::AlreadyStored { .. } => DropRejection::AlreadyStored,
            Self::SequenceExhausted => DropRejection::SequenceExhausted,
        }
    }
}

/// An item stored in a cell together with its placement stamp.
#[derive(Debug, Clone, PartialEq)]
struct Placement {
    item: Item,
    seq: u64,
}

/// A single storage cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    id: CellId,
    tier: Tier,
    row: u32,
    column: u32,
    placement: Option<Placement>,
}

impl Cell {
    /// Cell identifier.
    pub const fn id(&self) -> &CellId {
        &self.id
    }

    /// The tier this cell belongs to.
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Whether this is a priority cell.
    pub const fn is_priority(&self) -> bool {
        self.tier.is_priority()
    }

    /// The stored item, if any.
    pub fn occupant(&self) -> Option<&Item> {
        self.placement.as_ref().map(|p| &p.item)
    }

    /// Placement stamp of the stored item, if any.
    pub fn placed_seq(&self) -> Option<u64> {
        self.placement.as_ref().map(|p| p.seq)
    }

    /// Whether the cell holds an item.
    pub const fn is_occupied(&self) -> bool {
        self.placement.is_some()
    }

    /// Read-only snapshot of this cell.
    pub fn view(&self) -> CellView {
        CellView {
            id: self.id.clone(),
            is_priority: self.is_priority(),
            row: self.row,
            column: self.column,
            occupant: self.occupant().cloned(),
            placed_seq: self.placed_seq(),
        }
    }
}

/// The storage grid. Composition is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageManager {
    cells: Vec<Cell>,
    columns: u32,
    last_seq: u64,
}

impl StorageManager {
    /// Build the grid described by the storage configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self::with_layout(
            &config.cell_prefix,
            config.grid_size,
            config.grid_columns,
            config.priority_count,
        )
    }

    /// Build a grid of `grid_size` cells named `prefix-0`, `prefix-1`, ...
    /// laid out in `columns` columns, the first `priority_count` of which
    /// are priority.
    pub fn with_layout(prefix: &str, grid_size: u32, columns: u32, priority_count: u32) -> Self {
        let columns = columns.max(1);
        let cells = (0..grid_size)
            .map(|index| Cell {
                id: CellId::new(format!("{prefix}-{index}")),
                tier: if index < priority_count {
                    Tier::Priority
                } else {
                    Tier::Regular
                },
                row: index.checked_div(columns).unwrap_or(0),
                column: index.checked_rem(columns).unwrap_or(0),
                placement: None,
            })
            .collect();
        Self {
            cells,
            columns,
            last_seq: 0,
        }
    }

    /// Store `item` in the named cell.
    ///
    /// Returns the placement stamp on success. Never overwrites an occupant.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] naming the reason the item was refused.
    pub fn try_place(&mut self, cell_id: &CellId, item: Item) -> Result<u64, StorageError> {
        let index = self
            .cells
            .iter()
            .position(|cell| &cell.id == cell_id)
            .ok_or_else(|| StorageError::UnknownCell(cell_id.clone()))?;

        if let Some(holder) = self
            .cells
            .iter()
            .find(|cell| cell.occupant().is_some_and(|stored| stored.id == item.id))
        {
            return Err(StorageError::AlreadyStored {
                item: item.id,
                cell: holder.id.clone(),
            });
        }

        let seq = self
            .last_seq
            .checked_add(1)
            .ok_or(StorageError::SequenceExhausted)?;

        let cell = self
            .cells
            .get_mut(index)
            .ok_or_else(|| StorageError::UnknownCell(cell_id.clone()))?;
        if let Some(existing) = &cell.placement {
            return Err(StorageError::CellOccupied {
                cell: cell.id.clone(),
                occupant: existing.item.id.clone(),
            });
        }

        info!(
            cell_id = %cell.id,
            item_id = %item.id,
            tier = ?cell.tier,
            seq,
            "Item stored"
        );
        cell.placement = Some(Placement { item, seq });
        self.last_seq = seq;
        Ok(seq)
    }

    /// Store `item` in the named cell, reporting only success.
    pub fn place_item(&mut self, cell_id: &CellId, item: Item) -> bool {
        match self.try_place(cell_id, item) {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Placement refused");
                false
            }
        }
    }

    /// Remove one item: the most recently placed priority item if any,
    /// otherwise the most recently placed regular item.
    ///
    /// Returns `None` without touching the grid when every cell is empty.
    pub fn unload(&mut self) -> Option<Unloaded> {
        let index = Tier::UNLOAD_ORDER
            .iter()
            .find_map(|tier| self.most_recent_in(*tier))?;
        let cell = self.cells.get_mut(index)?;
        let placement = cell.placement.take()?;

        info!(
            cell_id = %cell.id,
            item_id = %placement.item.id,
            tier = ?cell.tier,
            seq = placement.seq,
            "Item unloaded"
        );

        Some(Unloaded {
            cell_id: cell.id.clone(),
            tier: cell.tier,
            item: placement.item,
            placed_seq: placement.seq,
        })
    }

    /// Index of the occupied cell in `tier` with the greatest stamp.
    fn most_recent_in(&self, tier: Tier) -> Option<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.tier == tier)
            .filter_map(|(index, cell)| cell.placed_seq().map(|seq| (index, seq)))
            .max_by_key(|&(_, seq)| seq)
            .map(|(index, _)| index)
    }

    /// Whether any cell holds an item.
    pub fn has_any_occupant(&self) -> bool {
        self.cells.iter().any(Cell::is_occupied)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Cells in grid order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Look up a cell by id.
    pub fn cell(&self, cell_id: &CellId) -> Option<&Cell> {
        self.cells.iter().find(|cell| &cell.id == cell_id)
    }

    /// Read-only snapshot of the whole grid.
    pub fn view(&self) -> GridView {
        GridView {
            columns: self.columns,
            cells: self.cells.iter().map(Cell::view).collect(),
            has_any_occupant: self.has_any_occupant(),
        }
    }
}
