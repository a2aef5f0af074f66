//! View modes: horizontal zoom and vertical density.

use serde::{Deserialize, Serialize};

/// Horizontal zoom. Fixes the day pixel width and the visible window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    /// About one week on screen.
    Week,
    /// About two weeks on screen.
    #[default]
    TwoWeeks,
    /// About one month on screen.
    Month,
    /// About three months on screen.
    Quarter,
}

/// Row density.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityMode {
    /// Short rows.
    Compact,
    /// Default rows.
    #[default]
    Normal,
    /// Tall rows.
    Comfortable,
}
