//! Epoch-aligned fetch chunks.
//!
//! Chunk `k` covers days `[epoch + k*size, epoch + (k+1)*size - 1]`.
//! Aligning to a fixed epoch instead of the buffer edges means two
//! overlapping buffers ask for the same chunk keys.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A fixed-size date window used as the unit of fetching and caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateChunk {
    /// Chunk number relative to the epoch (may be negative).
    pub index: i64,
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

/// Chunk geometry: epoch and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGrid {
    epoch: NaiveDate,
    size: i64,
}

impl ChunkGrid {
    /// Creates a grid. A zero size is treated as one day.
    pub fn new(epoch: NaiveDate, size: u32) -> Self {
        Self {
            epoch,
            size: i64::from(size.max(1)),
        }
    }

    /// Chunk index containing `date`.
    pub fn index_of(&self, date: NaiveDate) -> i64 {
        (date - self.epoch).num_days().div_euclid(self.size)
    }

    /// Chunk with the given index.
    pub fn chunk(&self, index: i64) -> DateChunk {
        let start = self.epoch + Duration::days(index * self.size);
        DateChunk {
            index,
            start,
            end: start + Duration::days(self.size - 1),
        }
    }

    /// Minimal set of chunks covering `[start, end]`, in date order.
    pub fn chunks_overlapping(&self, start: NaiveDate, end: NaiveDate) -> Vec<DateChunk> {
        debug_assert!(start <= end, "inverted chunk range {start}..{end}");
        if end < start {
            return Vec::new();
        }
        (self.index_of(start)..=self.index_of(end))
            .map(|i| self.chunk(i))
            .collect()
    }
}

impl Default for ChunkGrid {
    fn default() -> Self {
        Self::new(NaiveDate::default(), 30)
    }
}

/// Chunks of `chunk_size` days, aligned to 1970-01-01, covering `[start, end]`.
pub fn chunks_overlapping(start: NaiveDate, end: NaiveDate, chunk_size: u32) -> Vec<DateChunk> {
    ChunkGrid::new(NaiveDate::default(), chunk_size).chunks_overlapping(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_chunk_bounds() {
        let grid = ChunkGrid::new(d("2024-01-01"), 30);
        let c = grid.chunk(0);
        assert_eq!(c.start, d("2024-01-01"));
        assert_eq!(c.end, d("2024-01-30"));
        assert_eq!(grid.index_of(d("2024-01-30")), 0);
        assert_eq!(grid.index_of(d("2024-01-31")), 1);
        assert_eq!(grid.index_of(d("2023-12-31")), -1);
        assert_eq!(grid.chunk(-1).end, d("2023-12-31"));
    }

    #[test]
    fn test_minimal_cover() {
        let grid = ChunkGrid::new(d("2024-01-01"), 30);
        let chunks = grid.chunks_overlapping(d("2024-01-25"), d("2024-03-02"));
        let indices: Vec<i64> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(chunks[0].start <= d("2024-01-25"));
        assert!(chunks[2].end >= d("2024-03-02"));

        let single = grid.chunks_overlapping(d("2024-01-05"), d("2024-01-06"));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_overlapping_ranges_share_keys() {
        let a = chunks_overlapping(d("2024-05-01"), d("2024-07-01"), 30);
        let b = chunks_overlapping(d("2024-06-01"), d("2024-08-01"), 30);
        let shared = a.iter().filter(|c| b.contains(c)).count();
        assert!(shared >= 2);
        // Unix-epoch alignment: chunk boundaries do not follow the range.
        assert_ne!(a[0].start, d("2024-05-01"));
    }
}
