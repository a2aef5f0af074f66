//! Day buffer management for infinite horizontal scrolling.
//!
//! The buffer is the materialized, contiguous range of calendar days the
//! grid is drawn over. It starts centered on an anchor date, grows at
//! either edge as the user scrolls toward it, and is rebuilt when the user
//! navigates (today, previous/next, zoom change).
//!
//! Data is fetched in fixed-size chunks aligned to an epoch rather than to
//! the buffer edges, so overlapping buffers reuse cached chunks.
//!
//! ```
//! use chrono::NaiveDate;
//! use u_planning::buffer::{DayBuffer, Direction};
//! use u_planning::config::ZoomSettings;
//!
//! let anchor = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let mut buffer = DayBuffer::initialize(anchor, &ZoomSettings::new(40.0, 7), 2);
//! assert_eq!(buffer.len(), 29);
//!
//! let compensation = buffer.extend(Direction::Left, 10);
//! assert_eq!(compensation, 400.0);
//! assert_eq!(buffer.len(), 39);
//! ```

mod chunk;
mod days;

pub use chunk::{chunks_overlapping, ChunkGrid, DateChunk};
pub use days::{DayBuffer, Direction, ScrollGuard};
