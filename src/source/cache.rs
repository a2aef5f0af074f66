//! Chunk-keyed event cache.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{EventSource, Overlay};
use crate::buffer::DateChunk;
use crate::error::PlanningError;
use crate::models::Event;

/// Cache key: a property set and a chunk.
///
/// Property IDs are sorted and deduplicated so the same set always maps to
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Chunk number.
    pub chunk_index: i64,
    /// Properties the chunk was fetched for.
    pub property_ids: Vec<i64>,
}

impl ChunkKey {
    /// Creates a normalized key.
    pub fn new(property_ids: &[i64], chunk: &DateChunk) -> Self {
        let mut ids = property_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Self {
            chunk_index: chunk.index,
            property_ids: ids,
        }
    }
}

/// Fetched events per chunk plus the optimistic overlay.
///
/// # Merge Rules
/// - Across chunks, the first chunk (in key order) to report an ID wins.
/// - Re-storing a chunk replaces its previous contents.
/// - The overlay is applied last, over the merged remote view.
#[derive(Debug, Clone, Default)]
pub struct EventCache {
    chunks: BTreeMap<ChunkKey, Vec<Event>>,
    overlay: Overlay,
}

impl EventCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chunk is cached.
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.chunks.contains_key(key)
    }

    /// Keys for `chunks` that are not cached yet.
    pub fn missing(&self, property_ids: &[i64], chunks: &[DateChunk]) -> Vec<(ChunkKey, DateChunk)> {
        chunks
            .iter()
            .map(|chunk| (ChunkKey::new(property_ids, chunk), *chunk))
            .filter(|(key, _)| !self.contains(key))
            .collect()
    }

    /// Stores a resolved chunk.
    ///
    /// Invalid events are dropped; duplicates within the chunk keep the
    /// first occurrence. Overlay entries are released once the merged
    /// remote view, not just this chunk, reports the same schedule.
    pub fn store(&mut self, key: ChunkKey, events: Vec<Event>) {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(events.len());
        for event in events {
            if let Err(err) = event.validate() {
                tracing::warn!(event_id = %event.id, error = %err, "dropping invalid event");
                continue;
            }
            if seen.insert(event.id.clone()) {
                kept.push(event);
            }
        }
        tracing::debug!(chunk = key.chunk_index, events = kept.len(), "chunk stored");
        self.chunks.insert(key, kept);
        let remote = self.remote_events();
        self.overlay.confirm(&remote);
    }

    /// Fetches and stores every chunk of `chunks` not cached yet.
    ///
    /// Chunks are independent: a failure is logged and returned, and the
    /// remaining chunks are still fetched. Failed chunks stay missing and
    /// are retried on the next call.
    pub fn fetch_missing<S: EventSource + ?Sized>(
        &mut self,
        source: &mut S,
        property_ids: &[i64],
        chunks: &[DateChunk],
    ) -> Vec<PlanningError> {
        let mut failures = Vec::new();
        for (key, chunk) in self.missing(property_ids, chunks) {
            tracing::debug!(chunk = chunk.index, start = %chunk.start, end = %chunk.end, "fetching chunk");
            match source.fetch_events(&key.property_ids, &chunk) {
                Ok(events) => self.store(key, events),
                Err(err) => {
                    tracing::warn!(chunk = chunk.index, error = %err, "chunk fetch failed");
                    failures.push(err);
                }
            }
        }
        failures
    }

    /// Forgets a chunk so the next fetch reloads it.
    pub fn invalidate(&mut self, key: &ChunkKey) -> bool {
        self.chunks.remove(key).is_some()
    }

    /// Forgets every chunk. Pending overlay entries are kept.
    pub fn invalidate_all(&mut self) {
        self.chunks.clear();
    }

    /// Number of cached chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Fetched events, deduplicated by ID (first writer wins).
    pub fn remote_events(&self) -> Vec<Event> {
        let mut seen = HashSet::new();
        self.chunks
            .values()
            .flatten()
            .filter(|event| seen.insert(event.id.clone()))
            .cloned()
            .collect()
    }

    /// Fetched events with optimistic edits applied.
    pub fn events(&self) -> Vec<Event> {
        self.overlay.merge(self.remote_events())
    }

    /// Pending optimistic edits.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Pending optimistic edits, mutable.
    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChunkGrid;
    use crate::models::EventPatch;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Serves a fixed event list, counting calls and failing on request.
    struct FakeSource {
        events: Vec<Event>,
        calls: usize,
        fail_chunk: Option<i64>,
    }

    impl EventSource for FakeSource {
        fn fetch_events(&mut self, property_ids: &[i64], chunk: &DateChunk) -> Result<Vec<Event>, PlanningError> {
            self.calls += 1;
            if self.fail_chunk == Some(chunk.index) {
                return Err(PlanningError::Fetch {
                    chunk_index: chunk.index,
                    message: "timeout".into(),
                });
            }
            Ok(self
                .events
                .iter()
                .filter(|e| property_ids.contains(&e.property_id))
                .filter(|e| e.start_date <= chunk.end && e.end_date >= chunk.start)
                .cloned()
                .collect())
        }
    }

    fn grid() -> ChunkGrid {
        ChunkGrid::new(d("2024-01-01"), 30)
    }

    fn source() -> FakeSource {
        FakeSource {
            events: vec![
                // Spans chunks 4 and 5 (2024-05-30 boundary).
                Event::reservation(1, 1, d("2024-05-28"), d("2024-06-03")),
                Event::reservation(2, 1, d("2024-06-10"), d("2024-06-12")),
                Event::reservation(3, 2, d("2024-06-10"), d("2024-06-12")),
            ],
            calls: 0,
            fail_chunk: None,
        }
    }

    #[test]
    fn test_key_normalized() {
        let chunk = grid().chunk(3);
        assert_eq!(ChunkKey::new(&[3, 1, 3], &chunk), ChunkKey::new(&[1, 3], &chunk));
    }

    #[test]
    fn test_fetch_dedups_across_chunks_and_caches() {
        let mut cache = EventCache::new();
        let mut src = source();
        let chunks = grid().chunks_overlapping(d("2024-05-20"), d("2024-06-20"));
        assert_eq!(chunks.len(), 2);

        assert!(cache.fetch_missing(&mut src, &[1], &chunks).is_empty());
        assert_eq!(src.calls, 2);
        let events = cache.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events.iter().filter(|e| e.id == "res-1").count(), 1);

        // Second pass hits the cache.
        cache.fetch_missing(&mut src, &[1], &chunks);
        assert_eq!(src.calls, 2);

        // Another property set is another key.
        cache.fetch_missing(&mut src, &[1, 2], &chunks);
        assert_eq!(src.calls, 4);
        assert_eq!(cache.events().len(), 3);
    }

    #[test]
    fn test_failed_chunk_is_retried() {
        let mut cache = EventCache::new();
        let mut src = source();
        let chunks = grid().chunks_overlapping(d("2024-05-20"), d("2024-06-20"));
        src.fail_chunk = Some(chunks[1].index);

        let failures = cache.fetch_missing(&mut src, &[1], &chunks);
        assert_eq!(failures.len(), 1);
        assert_eq!(cache.chunk_count(), 1);

        src.fail_chunk = None;
        assert!(cache.fetch_missing(&mut src, &[1], &chunks).is_empty());
        assert_eq!(cache.chunk_count(), 2);
        assert_eq!(src.calls, 3);
    }

    #[test]
    fn test_invalid_and_duplicate_events_dropped() {
        let mut cache = EventCache::new();
        let key = ChunkKey::new(&[1], &grid().chunk(5));
        cache.store(
            key,
            vec![
                Event::reservation(1, 1, d("2024-06-01"), d("2024-06-03")),
                Event::reservation(1, 1, d("2024-06-05"), d("2024-06-08")),
                Event::reservation(2, 1, d("2024-06-05"), d("2024-06-05")),
            ],
        );
        let events = cache.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_date, d("2024-06-01"));
    }

    #[test]
    fn test_refetch_supersedes_and_confirms_overlay() {
        let mut cache = EventCache::new();
        let key = ChunkKey::new(&[1], &grid().chunk(5));
        let original = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-03"));
        cache.store(key.clone(), vec![original.clone()]);

        let patch = EventPatch::dates(d("2024-06-02"), d("2024-06-04"));
        let local = cache.overlay_mut().apply_patch(&original, &patch);
        assert_eq!(cache.events()[0].start_date, d("2024-06-02"));

        cache.store(key, vec![local]);
        assert!(cache.overlay().is_empty());
        assert_eq!(cache.events()[0].start_date, d("2024-06-02"));
    }

    #[test]
    fn test_move_across_chunks_survives_partial_refetch() {
        let mut cache = EventCache::new();
        let g = grid();
        let june = ChunkKey::new(&[1], &g.chunk(5));
        let july = ChunkKey::new(&[1], &g.chunk(6));
        let original = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-03"));
        cache.store(june.clone(), vec![original.clone()]);

        let patch = EventPatch::dates(d("2024-07-10"), d("2024-07-12"));
        let moved = cache.overlay_mut().apply_patch(&original, &patch);

        // The July chunk reports the move, but the cached June chunk still
        // holds the old dates and wins the merge: the edit must stay.
        cache.store(july, vec![moved]);
        assert_eq!(cache.overlay().len(), 1);
        assert_eq!(cache.events()[0].start_date, d("2024-07-10"));

        cache.store(june, Vec::new());
        assert!(cache.overlay().is_empty());
        let events = cache.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_date, d("2024-07-10"));
    }
}
