//! Timeline configuration.
//!
//! Every section has working defaults; a JSON document only needs to
//! name the values it overrides.
//!
//! ```
//! use u_planning::config::TimelineConfig;
//! use u_planning::models::ZoomLevel;
//!
//! let cfg = TimelineConfig::from_json_str(r#"{ "layout": { "checkout_fraction": 0.5 } }"#).unwrap();
//! assert_eq!(cfg.layout.checkout_fraction, 0.5);
//! assert_eq!(cfg.layout.min_bar_width, 8.0);
//! assert_eq!(cfg.zoom.get(ZoomLevel::Week).visible_days, 7);
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::PlanningResult;
use crate::models::{DensityMode, Layer, ZoomLevel};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Per-zoom day width and visible window.
    pub zoom: ZoomTable,
    /// Buffer growth and chunking.
    pub buffer: BufferConfig,
    /// Bar geometry tuning.
    pub layout: LayoutConfig,
    /// Per-density row geometry.
    pub density: DensityTable,
    /// Pointer gesture tuning.
    pub interaction: InteractionConfig,
    /// Default check-in/check-out times.
    pub turnover: TurnoverConfig,
    /// Viewport pagination.
    pub pagination: PaginationConfig,
}

impl TimelineConfig {
    /// Parses a JSON document, filling missing values with defaults.
    pub fn from_json_str(json: &str) -> PlanningResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layout inputs for one density mode.
    pub fn density_config(&self, mode: DensityMode) -> DensityConfig {
        DensityConfig {
            profile: *self.density.get(mode),
            layout: self.layout,
        }
    }
}

/// Day width and visible window for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomSettings {
    /// Width of one day cell (px).
    pub day_width: f64,
    /// Days visible at once.
    pub visible_days: u32,
}

impl ZoomSettings {
    /// Creates zoom settings.
    pub fn new(day_width: f64, visible_days: u32) -> Self {
        Self {
            day_width,
            visible_days,
        }
    }
}

/// Zoom settings per [`ZoomLevel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomTable {
    /// [`ZoomLevel::Week`]: 120px days, 7 visible.
    pub week: ZoomSettings,
    /// [`ZoomLevel::TwoWeeks`]: 72px days, 14 visible.
    pub two_weeks: ZoomSettings,
    /// [`ZoomLevel::Month`]: 40px days, 31 visible.
    pub month: ZoomSettings,
    /// [`ZoomLevel::Quarter`]: 16px days, 92 visible.
    pub quarter: ZoomSettings,
}

impl ZoomTable {
    /// Settings for a zoom level.
    pub fn get(&self, level: ZoomLevel) -> &ZoomSettings {
        match level {
            ZoomLevel::Week => &self.week,
            ZoomLevel::TwoWeeks => &self.two_weeks,
            ZoomLevel::Month => &self.month,
            ZoomLevel::Quarter => &self.quarter,
        }
    }
}

impl Default for ZoomTable {
    fn default() -> Self {
        Self {
            week: ZoomSettings::new(120.0, 7),
            two_weeks: ZoomSettings::new(72.0, 14),
            month: ZoomSettings::new(40.0, 31),
            quarter: ZoomSettings::new(16.0, 92),
        }
    }
}

/// Buffer growth and fetch chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Visible windows materialized on each side of the anchor.
    pub multiplier: u32,
    /// Distance from a buffer edge (days) that triggers extension.
    pub threshold_days: u32,
    /// Days added per extension.
    pub extend_days: u32,
    /// Fetch chunk size (days).
    pub chunk_days: u32,
    /// Day chunk 0 starts on.
    pub chunk_epoch: NaiveDate,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            multiplier: 3,
            threshold_days: 7,
            extend_days: 30,
            chunk_days: 30,
            chunk_epoch: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
        }
    }
}

/// Bar geometry tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Smallest bar width, so short events stay clickable (px).
    pub min_bar_width: f64,
    /// Share of the checkout day a reservation covers when no checkout
    /// time is shown.
    pub checkout_fraction: f64,
    /// Day width from which times are drawn with sub-day precision (px).
    pub sub_day_min_day_width: f64,
    /// Gap between stacked lanes (px).
    pub lane_gap: f64,
    /// Smallest stacked lane height (px).
    pub min_lane_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_bar_width: 8.0,
            checkout_fraction: 0.4,
            sub_day_min_day_width: 60.0,
            lane_gap: 2.0,
            min_lane_height: 6.0,
        }
    }
}

/// A vertical band inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Offset from the row top (px).
    pub top: f64,
    /// Band height (px).
    pub height: f64,
}

impl Band {
    /// Creates a band.
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

/// Row geometry for one density mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityProfile {
    /// Property row height (px).
    pub row_height: f64,
    /// Extra price row height when prices are shown (px).
    pub price_row_height: f64,
    /// Reservation band.
    pub primary: Band,
    /// Service event band.
    pub secondary: Band,
}

impl DensityProfile {
    /// Band for a layer.
    pub fn band(&self, layer: Layer) -> Band {
        match layer {
            Layer::Primary => self.primary,
            Layer::Secondary => self.secondary,
        }
    }

    /// Total row height, with or without the price row.
    pub fn total_row_height(&self, show_prices: bool) -> f64 {
        if show_prices {
            self.row_height + self.price_row_height
        } else {
            self.row_height
        }
    }
}

/// Row geometry per [`DensityMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityTable {
    /// [`DensityMode::Compact`]: 48px rows.
    pub compact: DensityProfile,
    /// [`DensityMode::Normal`]: 68px rows.
    pub normal: DensityProfile,
    /// [`DensityMode::Comfortable`]: 88px rows.
    pub comfortable: DensityProfile,
}

impl DensityTable {
    /// Profile for a density mode.
    pub fn get(&self, mode: DensityMode) -> &DensityProfile {
        match mode {
            DensityMode::Compact => &self.compact,
            DensityMode::Normal => &self.normal,
            DensityMode::Comfortable => &self.comfortable,
        }
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self {
            compact: DensityProfile {
                row_height: 48.0,
                price_row_height: 20.0,
                primary: Band::new(4.0, 22.0),
                secondary: Band::new(28.0, 16.0),
            },
            normal: DensityProfile {
                row_height: 68.0,
                price_row_height: 24.0,
                primary: Band::new(6.0, 30.0),
                secondary: Band::new(40.0, 22.0),
            },
            comfortable: DensityProfile {
                row_height: 88.0,
                price_row_height: 28.0,
                primary: Band::new(8.0, 40.0),
                secondary: Band::new(52.0, 30.0),
            },
        }
    }
}

/// Everything the bar layout engine needs besides days and day width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityConfig {
    /// Row geometry for the active density.
    pub profile: DensityProfile,
    /// Geometry tuning.
    pub layout: LayoutConfig,
}

impl Default for DensityConfig {
    fn default() -> Self {
        TimelineConfig::default().density_config(DensityMode::Normal)
    }
}

/// Pointer gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel before a press becomes a drag (px).
    pub activation_distance: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            activation_distance: 8.0,
        }
    }
}

/// Times assumed when an event carries none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnoverConfig {
    /// Default check-in time.
    pub check_in: NaiveTime,
    /// Default check-out time.
    pub check_out: NaiveTime,
}

impl Default for TurnoverConfig {
    fn default() -> Self {
        Self {
            check_in: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            check_out: NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default(),
        }
    }
}

/// Viewport pagination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Fixed chrome (header, toolbar, footer) above and below the rows (px).
    pub chrome_height: f64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            chrome_height: 120.0,
        }
    }
}
