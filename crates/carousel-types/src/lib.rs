//! Shared type definitions for the luggage carousel simulation.
//!
//! This crate is the single source of truth for every type that crosses the
//! boundary between the simulation core and the host UI. Types flow
//! downstream to `TypeScript` via `ts-rs` so the browser host can share them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for item and cell identifiers
//! - [`enums`] -- Storage tiers and drop rejection reasons
//! - [`structs`] -- Items and the read-only track/grid views
//! - [`events`] -- Host events and the replies the engine sends back

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DropRejection, Tier};
pub use events::{HostEvent, HostReply};
pub use ids::{CellId, ItemId};
pub use structs::{CellView, GridView, Item, TrackView, Unloaded};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the host UI.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to `bindings/` relative to the crate
        // root when `export_all` runs.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::ItemId::export_all();
        let _ = crate::ids::CellId::export_all();

        // Enums
        let _ = crate::enums::Tier::export_all();
        let _ = crate::enums::DropRejection::export_all();

        // Structs
        let _ = crate::structs::Item::export_all();
        let _ = crate::structs::TrackView::export_all();
        let _ = crate::structs::CellView::export_all();
        let _ = crate::structs::GridView::export_all();
        let _ = crate::structs::Unloaded::export_all();

        // Events
        let _ = crate::events::HostEvent::export_all();
        let _ = crate::events::HostReply::export_all();
    }
}
