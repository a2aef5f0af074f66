//! Pairwise overlap detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Event;

/// Two overlapping reservations on one property.
///
/// Stored in canonical order (`first_id < second_id`), so a pair is
/// reported once regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConflictPair {
    /// Shared property.
    pub property_id: i64,
    /// Lexicographically smaller event ID.
    pub first_id: String,
    /// Lexicographically larger event ID.
    pub second_id: String,
}

impl ConflictPair {
    /// Creates a pair in canonical order.
    pub fn new(property_id: i64, a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        let (first_id, second_id) = if a <= b { (a, b) } else { (b, a) };
        Self {
            property_id,
            first_id,
            second_id,
        }
    }

    /// Whether `event_id` is part of this pair.
    pub fn involves(&self, event_id: &str) -> bool {
        self.first_id == event_id || self.second_id == event_id
    }
}

/// Finds every pair of overlapping reservations sharing a property.
///
/// Non-reservation events are ignored. Result is sorted by property, then
/// IDs.
///
/// # Complexity
/// O(n²) per property.
pub fn detect_conflicts(events: &[Event]) -> Vec<ConflictPair> {
    let mut by_property: BTreeMap<i64, Vec<&Event>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.is_reservation()) {
        by_property.entry(event.property_id).or_default().push(event);
    }

    let mut pairs = Vec::new();
    for (property_id, group) in by_property {
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                if a.id != b.id && a.overlaps(b) {
                    pairs.push(ConflictPair::new(property_id, a.id.as_str(), b.id.as_str()));
                }
            }
        }
    }
    pairs.sort();
    pairs.dedup();
    pairs
}
