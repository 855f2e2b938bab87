//! Drag state between `startDrag` and the drop or cancel that ends it.

use carousel_types::{Item, ItemId};
use tracing::debug;

/// Tracks the item currently being dragged, if any.
///
/// Holds a snapshot of the item taken when the drag started. The carousel
/// keeps the live item until a drop succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragTracker {
    dragged: Option<Item>,
}

impl DragTracker {
    /// Create a tracker with no drag in progress.
    pub const fn new() -> Self {
        Self { dragged: None }
    }

    /// Begin dragging `item`, replacing any earlier drag.
    pub fn start(&mut self, item: Item) {
        if let Some(previous) = self.dragged.as_ref() {
            debug!(previous = %previous.id, next = %item.id, "Drag replaced");
        }
        self.dragged = Some(item);
    }

    /// End the drag, returning the item that was being dragged.
    pub const fn end(&mut self) -> Option<Item> {
        self.dragged.take()
    }

    /// The item being dragged.
    pub const fn current(&self) -> Option<&Item> {
        self.dragged.as_ref()
    }

    /// Whether a drag is in progress.
    pub const fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Whether `item_id` is the item being dragged.
    pub fn is_dragging_item(&self, item_id: &ItemId) -> bool {
        self.dragged.as_ref().is_some_and(|item| &item.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(id: &str) -> Item {
        Item::new(ItemId::new(id), 0.0)
    }

    #[test]
    fn starts_idle() {
        let drag = DragTracker::new();
        assert!(!drag.is_dragging());
        assert!(drag.current().is_none());
    }

    #[test]
    fn start_then_end() {
        let mut drag = DragTracker::new();
        drag.start(bag("a"));
        assert!(drag.is_dragging_item(&ItemId::new("a")));
        assert_eq!(drag.end().map(|i| i.id), Some(ItemId::new("a")));
        assert!(!drag.is_dragging());
        assert!(drag.end().is_none());
    }

    #[test]
    fn new_drag_replaces_old() {
        let mut drag = DragTracker::new();
        drag.start(bag("a"));
        drag.start(bag("b"));
        assert!(!drag.is_dragging_item(&ItemId::new("a")));
        assert!(drag.is_dragging_item(&ItemId::new("b")));
    }
}
