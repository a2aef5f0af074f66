//! Planning timeline engine for short-term property rentals.
//!
//! Lays out reservations, cleanings, maintenance and blocks as bars on a
//! horizontally scrolling per-property calendar, and checks moves and
//! resizes against the turnover rules before they are committed.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Event`, `EventPatch`, `Property`,
//!   `BarLayout`, `ZoomLevel`, `DensityMode`
//! - **`config`**: `TimelineConfig` and its zoom, density, buffer and
//!   turnover tables
//! - **`buffer`**: Sliding day buffer with scroll compensation, and
//!   epoch-aligned fetch chunks
//! - **`layout`**: Bar geometry and overlap lane packing (union-find)
//! - **`conflict`**: Overlap detection and edit validation, including the
//!   post-checkout service budget
//! - **`interaction`**: Drag state machine for move and resize gestures
//! - **`source`**: Event source and mutation sink seams, chunk cache and
//!   optimistic overlay
//! - **`pagination`**: Viewport-driven row paging
//! - **`timeline`**: `TimelineContext`, which owns all per-view state
//!
//! # Time Model
//!
//! Stays are half-open `[start_date, end_date)`: the checkout day belongs
//! to the next arrival. Optional times refine this to minutes for
//! same-day turnovers and service budgets.
//!
//! # References
//!
//! - Tarjan (1975), "Efficiency of a Good But Not Linear Set Union Algorithm"
//! - Cormen et al. (2009), "Introduction to Algorithms", ch. 21 (disjoint sets)

pub mod buffer;
pub mod config;
pub mod conflict;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod models;
pub mod pagination;
pub mod source;
pub mod timeline;
