//! Bar layout engine.
//!
//! Turns events into pixel rectangles over the current day buffer and
//! stacks overlapping service events into lanes.
//!
//! # Algorithm
//!
//! 1. Per event: clip the interval to the buffer, convert days to pixels,
//!    refine with clock times when a day cell is wide enough, extend
//!    reservations into their checkout day, clamp to a minimum width.
//! 2. Per property: build an overlap graph over secondary-layer bars,
//!    find its connected components with union-find, and give each member
//!    of a multi-bar component its own lane.
//!
//! # Complexity
//! O(n²) per property for the overlap graph, where n is the number of
//! service events in the buffer for that property.
//!
//! ```
//! use chrono::NaiveDate;
//! use u_planning::config::DensityConfig;
//! use u_planning::layout::compute_bar_layout;
//! use u_planning::models::Event;
//!
//! let first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let days: Vec<NaiveDate> = first.iter_days().take(30).collect();
//! let stay = Event::reservation(1, 1, first + chrono::Duration::days(2), first + chrono::Duration::days(5));
//!
//! let bar = compute_bar_layout(&stay, &days, 40.0, &DensityConfig::default()).unwrap();
//! assert_eq!(bar.left, 80.0);
//! assert_eq!(bar.width, 3.0 * 40.0 + 0.4 * 40.0);
//! ```

mod bar;
mod lanes;

pub use bar::compute_bar_layout;
pub use lanes::{compute_property_bar_layouts, UnionFind};
