//! Optimistic local edits layered over fetched data.
//!
//! A mutation writes the edited event here immediately. Reads merge the
//! overlay over the latest fetched events. When a fetched chunk carries an
//! event whose schedule matches the overlay entry, the entry has been
//! confirmed and is dropped.

use std::collections::BTreeMap;

use crate::models::{Event, EventPatch};

/// Optimistic edits and creations keyed by event ID.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    entries: BTreeMap<String, Event>,
}

impl Overlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the local version of an event (edit or creation).
    pub fn upsert(&mut self, event: Event) {
        self.entries.insert(event.id.clone(), event);
    }

    /// Applies `patch` on top of the local version of `base`, returning the
    /// new local version.
    pub fn apply_patch(&mut self, base: &Event, patch: &EventPatch) -> Event {
        let mut event = self
            .entries
            .get(&base.id)
            .cloned()
            .unwrap_or_else(|| base.clone());
        event.apply(patch);
        self.upsert(event.clone());
        event
    }

    /// Local version of an event, if any.
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.entries.get(id)
    }

    /// Drops a local version without confirmation.
    pub fn discard(&mut self, id: &str) -> Option<Event> {
        self.entries.remove(id)
    }

    /// Drops entries whose schedule `fetched` now reports. Returns how many
    /// were confirmed.
    pub fn confirm(&mut self, fetched: &[Event]) -> usize {
        let before = self.entries.len();
        for remote in fetched {
            let confirmed = self
                .entries
                .get(&remote.id)
                .is_some_and(|local| same_schedule(local, remote));
            if confirmed {
                self.entries.remove(&remote.id);
                tracing::debug!(event_id = %remote.id, "optimistic edit confirmed");
            }
        }
        before - self.entries.len()
    }

    /// Merges the overlay over `remote`: local versions replace fetched
    /// ones, local creations are appended.
    pub fn merge(&self, remote: Vec<Event>) -> Vec<Event> {
        let mut seen = std::collections::HashSet::new();
        let mut merged: Vec<Event> = remote
            .into_iter()
            .map(|event| {
                seen.insert(event.id.clone());
                match self.entries.get(&event.id) {
                    Some(local) => local.clone(),
                    None => event,
                }
            })
            .collect();
        merged.extend(
            self.entries
                .values()
                .filter(|local| !seen.contains(&local.id))
                .cloned(),
        );
        merged
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Equality on the fields this engine mutates.
fn same_schedule(a: &Event, b: &Event) -> bool {
    a.id == b.id
        && a.kind == b.kind
        && a.property_id == b.property_id
        && a.start_date == b.start_date
        && a.end_date == b.end_date
        && a.start_time == b.start_time
        && a.end_time == b.end_time
}
