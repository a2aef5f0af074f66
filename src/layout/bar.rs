//! Single-event bar geometry.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::config::DensityConfig;
use crate::models::{BarLayout, Event, EventKind};

/// Computes the bar for one event, or `None` when the event does not
/// intersect `[days[0], days[last]]`.
///
/// # Geometry
/// - `left`: whole days from the buffer start to the (clipped) event start,
///   plus the check-in time as a fraction of a day when the cell is at
///   least `sub_day_min_day_width` wide and the event starts inside the
///   buffer.
/// - `width`: visible days, plus for reservations whose checkout day is in
///   the buffer either the precise checkout time or `checkout_fraction` of
///   a day, minus the sub-day start offset, clamped to `min_bar_width`.
/// - `top`/`height`: the layer's band for the active density.
///
/// Pure and deterministic.
pub fn compute_bar_layout(
    event: &Event,
    days: &[NaiveDate],
    day_width: f64,
    density: &DensityConfig,
) -> Option<BarLayout> {
    let (&first, &last) = (days.first()?, days.last()?);
    debug_assert!(
        event.start_date <= event.end_date,
        "event {} has an inverted interval",
        event.id
    );
    if event.start_date > last || event.end_date < first {
        return None;
    }

    let tuning = &density.layout;
    let precise = day_width >= tuning.sub_day_min_day_width;

    let visible_start = event.start_date.max(first);
    let visible_end = event.end_date.min(last + Duration::days(1));

    let start_offset = match event.start_time {
        Some(time) if precise && event.start_date >= first => day_fraction(time) * day_width,
        _ => 0.0,
    };
    let left = (visible_start - first).num_days() as f64 * day_width + start_offset;

    let mut width = (visible_end - visible_start).num_days() as f64 * day_width;
    if event.kind == EventKind::Reservation && event.end_date <= last {
        width += match event.end_time {
            Some(time) if precise => day_fraction(time) * day_width,
            _ => tuning.checkout_fraction * day_width,
        };
    }
    width -= start_offset;
    width = width.max(tuning.min_bar_width);

    let layer = event.layer();
    let band = density.profile.band(layer);
    Some(BarLayout {
        event_id: event.id.clone(),
        left,
        top: band.top,
        width,
        height: band.height,
        layer,
        lane: 0,
        lane_count: 1,
    })
}

/// Share of a day elapsed at `time`.
fn day_fraction(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / 86_400.0
}
