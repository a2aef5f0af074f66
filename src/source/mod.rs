//! Data contracts with the outside world, and the local event cache.
//!
//! - [`EventSource`]: read side, one call per (property set, chunk).
//! - [`MutationSink`]: write side, partial updates and creations.
//! - [`EventCache`]: fetched chunks, merged first-writer-wins by event ID,
//!   with an [`Overlay`] of optimistic local edits on top.
//!
//! Transport, query caching policy and wire formats belong to the
//! implementors of these traits.

mod cache;
mod overlay;

pub use cache::{ChunkKey, EventCache};
pub use overlay::Overlay;

use crate::buffer::DateChunk;
use crate::error::{MutationError, PlanningError};
use crate::models::{Event, EventPatch};

/// Read side: events of some properties within one date chunk.
pub trait EventSource {
    /// Fetches events for `property_ids` intersecting `chunk`.
    fn fetch_events(&mut self, property_ids: &[i64], chunk: &DateChunk) -> Result<Vec<Event>, PlanningError>;
}

/// Write side: applies changes remotely.
///
/// Callers never assume success; every call site branches on the result.
pub trait MutationSink {
    /// Applies a partial update to an existing event.
    fn update_event(&mut self, id: &str, patch: &EventPatch) -> Result<(), MutationError>;

    /// Creates a new event.
    fn create_event(&mut self, event: &Event) -> Result<(), MutationError>;
}
