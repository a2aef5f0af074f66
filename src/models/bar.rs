//! Bar geometry model.

use serde::{Deserialize, Serialize};

use super::Layer;

/// Pixel rectangle for one event within the current day buffer.
///
/// Derived on every layout pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarLayout {
    /// Event this bar draws.
    pub event_id: String,
    /// Offset from the first buffered day (px).
    pub left: f64,
    /// Offset from the row top (px).
    pub top: f64,
    /// Horizontal extent (px). Never below the configured minimum.
    pub width: f64,
    /// Vertical extent (px).
    pub height: f64,
    /// Band the bar belongs to.
    pub layer: Layer,
    /// Lane within an overlap group (0 when not stacked).
    pub lane: usize,
    /// Number of lanes in the bar's overlap group (1 when not stacked).
    pub lane_count: usize,
}

impl BarLayout {
    /// Right edge (px).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether the horizontal extents intersect (touching edges do not).
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        self.left < other.right() && self.right() > other.left
    }
}
