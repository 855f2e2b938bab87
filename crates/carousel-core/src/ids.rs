//! Item identifier sources.
//!
//! The carousel engine owns exactly one [`IdSource`] and asks it for a fresh
//! identifier on every spawn. Keeping the source on the engine instance means
//! two engines never share a counter, and tests can inject a predictable one.

use carousel_types::ItemId;
use uuid::Uuid;

use crate::config::IdScheme;

/// A source of unique item identifiers.
///
/// Implementations must never return the same identifier twice over their
/// lifetime.
pub trait IdSource: Send + core::fmt::Debug {
    /// Mint the next identifier.
    fn next_id(&mut self) -> ItemId;
}

/// Counter-backed identifiers: `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialIds {
    prefix: String,
    issued: u64,
}

impl SequentialIds {
    /// Create a counter that starts at 1.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }

    /// Number of identifiers minted so far.
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> ItemId {
        self.issued = self.issued.saturating_add(1);
        ItemId::new(format!("{}-{}", self.prefix, self.issued))
    }
}

/// Clock-backed identifiers using UUID v7 (time-ordered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOrderedIds {
    prefix: String,
}

impl TimeOrderedIds {
    /// Create a time-ordered source with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl IdSource for TimeOrderedIds {
    fn next_id(&mut self) -> ItemId {
        ItemId::new(format!("{}-{}", self.prefix, Uuid::now_v7()))
    }
}

/// Build the id source named by the configuration.
pub fn from_scheme(scheme: IdScheme, prefix: &str) -> Box<dyn IdSource> {
    match scheme {
        IdScheme::Sequential => Box::new(SequentialIds::new(prefix)),
        IdScheme::TimeOrdered => Box::new(TimeOrderedIds::new(prefix)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn sequential_ids_count_from_one() {
        let mut ids = SequentialIds::new("luggage");
        assert_eq!(ids.next_id().as_str(), "luggage-1");
        assert_eq!(ids.next_id().as_str(), "luggage-2");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn separate_sources_do_not_share_a_counter() {
        let mut a = SequentialIds::new("luggage");
        let mut b = SequentialIds::new("luggage");
        let _ = a.next_id();
        let _ = a.next_id();
        assert_eq!(b.next_id().as_str(), "luggage-1");
    }

    #[test]
    fn time_ordered_ids_are_unique_and_prefixed() {
        let mut ids = from_scheme(IdScheme::TimeOrdered, "bag");
        let minted: BTreeSet<ItemId> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(minted.len(), 100);
        assert!(minted.iter().all(|id| id.as_str().starts_with("bag-")));
    }
}
