//! Event model.
//!
//! An event is the atomic schedulable unit on the timeline: a guest
//! reservation, a cleaning, a maintenance intervention, or an owner block.
//!
//! # Interval Model
//! `start_date` is the first occupied day. `end_date` is the checkout day:
//! the unit is only partially occupied on it. Optional clock times refine
//! both boundaries. As instants, a missing time reads as midnight.
//!
//! # Turnover
//! Two events that meet on the same day (one checks out, the other checks
//! in) do not overlap unless both boundary times are known and the checkout
//! time is after the check-in time.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Origin and meaning of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Guest stay.
    Reservation,
    /// Housekeeping between stays.
    Cleaning,
    /// Repair or inspection.
    Maintenance,
    /// Owner block or closed period.
    Blocked,
}

/// Vertical band an event is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Reservations and blocks.
    Primary,
    /// Service events (cleaning, maintenance).
    Secondary,
}

impl EventKind {
    /// Band this kind is drawn in.
    pub fn layer(self) -> Layer {
        match self {
            Self::Reservation | Self::Blocked => Layer::Primary,
            Self::Cleaning | Self::Maintenance => Layer::Secondary,
        }
    }

    /// Whether this is a service event (cleaning or maintenance).
    pub fn is_service(self) -> bool {
        matches!(self, Self::Cleaning | Self::Maintenance)
    }

    /// Ordering used to break ties when stacking overlapping bars.
    ///
    /// Lower = stacked higher.
    pub fn stacking_priority(self) -> u8 {
        match self {
            Self::Cleaning => 0,
            Self::Maintenance => 1,
            Self::Reservation => 2,
            Self::Blocked => 3,
        }
    }

    /// ID namespace of events of this kind (`res-…` or `int-…`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Reservation => "res",
            Self::Cleaning | Self::Maintenance | Self::Blocked => "int",
        }
    }
}

/// A time-ranged event on one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique ID, namespaced by origin (`res-<id>`, `int-<id>`).
    pub id: String,
    /// Event kind.
    pub kind: EventKind,
    /// Owning property.
    pub property_id: i64,
    /// First occupied day.
    pub start_date: NaiveDate,
    /// Checkout day.
    pub end_date: NaiveDate,
    /// Check-in time on `start_date`.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// Check-out time on `end_date`.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Display label (guest name, task title).
    #[serde(default)]
    pub label: String,
    /// Secondary display line.
    #[serde(default)]
    pub sublabel: Option<String>,
    /// Opaque status tag.
    #[serde(default)]
    pub status: Option<String>,
    /// Opaque display color.
    #[serde(default)]
    pub color: Option<String>,
    /// Reservation this service event is tied to.
    #[serde(default)]
    pub linked_reservation_id: Option<String>,
    /// Party size, for reservations.
    #[serde(default)]
    pub guests: Option<u32>,
}

impl Event {
    /// Creates an event with no times or display metadata.
    pub fn new(
        id: impl Into<String>,
        kind: EventKind,
        property_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            property_id,
            start_date,
            end_date,
            start_time: None,
            end_time: None,
            label: String::new(),
            sublabel: None,
            status: None,
            color: None,
            linked_reservation_id: None,
            guests: None,
        }
    }

    /// Creates a reservation with a namespaced ID (`res-<raw_id>`).
    pub fn reservation(
        raw_id: impl std::fmt::Display,
        property_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let kind = EventKind::Reservation;
        Self::new(
            format!("{}-{raw_id}", kind.id_prefix()),
            kind,
            property_id,
            start_date,
            end_date,
        )
    }

    /// Creates an intervention (cleaning, maintenance, block) with a
    /// namespaced ID (`int-<raw_id>`).
    pub fn intervention(
        raw_id: impl std::fmt::Display,
        kind: EventKind,
        property_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self::new(
            format!("{}-{raw_id}", kind.id_prefix()),
            kind,
            property_id,
            start_date,
            end_date,
        )
    }

    /// Sets both boundary times.
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Sets the check-in time.
    pub fn with_start_time(mut self, start: NaiveTime) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Sets the check-out time.
    pub fn with_end_time(mut self, end: NaiveTime) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the status tag.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Ties this service event to a reservation.
    pub fn linked_to(mut self, reservation_id: impl Into<String>) -> Self {
        self.linked_reservation_id = Some(reservation_id.into());
        self
    }

    /// Sets the party size.
    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = Some(guests);
        self
    }

    /// Whether this is a reservation.
    #[inline]
    pub fn is_reservation(&self) -> bool {
        self.kind == EventKind::Reservation
    }

    /// Band this event is drawn in.
    #[inline]
    pub fn layer(&self) -> Layer {
        self.kind.layer()
    }

    /// Start as an instant (missing time = midnight).
    pub fn start_instant(&self) -> NaiveDateTime {
        self.start_date.and_time(self.start_time.unwrap_or(NaiveTime::MIN))
    }

    /// End as an instant (missing time = midnight).
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end_time.unwrap_or(NaiveTime::MIN))
    }

    /// Number of calendar days between start and checkout.
    #[inline]
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Duration between the start and end instants, in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_instant() - self.start_instant()).num_minutes()
    }

    /// Checks `start <= end` and a non-empty interval.
    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.end_date < self.start_date {
            return Err(PlanningError::InvalidEvent {
                event_id: self.id.clone(),
                reason: format!("ends {} before it starts {}", self.end_date, self.start_date),
            });
        }
        if self.end_instant() <= self.start_instant() {
            return Err(PlanningError::InvalidEvent {
                event_id: self.id.clone(),
                reason: "zero-length interval".into(),
            });
        }
        Ok(())
    }

    /// Whether this event is over by the time `other` starts.
    ///
    /// Same-day turnover counts as "over" unless both boundary times are
    /// known and the checkout is after the check-in.
    pub fn ends_before(&self, other: &Event) -> bool {
        match self.end_date.cmp(&other.start_date) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => match (self.end_time, other.start_time) {
                (Some(end), Some(start)) => end <= start,
                _ => true,
            },
        }
    }

    /// Half-open overlap test with turnover semantics.
    pub fn overlaps(&self, other: &Event) -> bool {
        !self.ends_before(other) && !other.ends_before(self)
    }

    /// Copy shifted by `days` on both boundaries.
    pub fn shifted(&self, days: i64) -> Self {
        let mut e = self.clone();
        e.start_date += Duration::days(days);
        e.end_date += Duration::days(days);
        e
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &EventPatch) {
        if let Some(property_id) = patch.property_id {
            self.property_id = property_id;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if patch.start_time.is_some() {
            self.start_time = patch.start_time;
        }
        if patch.end_time.is_some() {
            self.end_time = patch.end_time;
        }
        if let Some(status) = &patch.status {
            self.status = Some(status.clone());
        }
    }
}

/// Partial update sent to the mutation sink.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    /// Move to another property.
    pub property_id: Option<i64>,
    /// New first day.
    pub start_date: Option<NaiveDate>,
    /// New checkout day.
    pub end_date: Option<NaiveDate>,
    /// New check-in time.
    pub start_time: Option<NaiveTime>,
    /// New check-out time.
    pub end_time: Option<NaiveTime>,
    /// New status tag.
    pub status: Option<String>,
}

impl EventPatch {
    /// Patch replacing both dates.
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }

    /// Sets boundary times.
    pub fn with_times(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Moves to another property.
    pub fn with_property(mut self, property_id: i64) -> Self {
        self.property_id = Some(property_id);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_namespaced_ids() {
        let r = Event::reservation(12, 1, d("2024-06-01"), d("2024-06-05"));
        assert_eq!(r.id, "res-12");
        let c = Event::intervention(3, EventKind::Cleaning, 1, d("2024-06-05"), d("2024-06-06"));
        assert_eq!(c.id, "int-3");
        assert_eq!(c.layer(), Layer::Secondary);
        assert_eq!(r.layer(), Layer::Primary);
    }

    #[test]
    fn test_validate() {
        let ok = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-05"));
        assert!(ok.validate().is_ok());

        let inverted = Event::reservation(2, 1, d("2024-06-05"), d("2024-06-01"));
        assert!(inverted.validate().is_err());

        let empty = Event::reservation(3, 1, d("2024-06-05"), d("2024-06-05"));
        assert!(empty.validate().is_err());

        // Same day, but with a real time range.
        let same_day = Event::intervention(4, EventKind::Cleaning, 1, d("2024-06-05"), d("2024-06-05"))
            .with_times(t(11, 0), t(14, 0));
        assert!(same_day.validate().is_ok());
        assert_eq!(same_day.duration_minutes(), 180);
    }

    #[test]
    fn test_back_to_back_does_not_overlap() {
        let a = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-05"));
        let b = Event::reservation(2, 1, d("2024-06-05"), d("2024-06-08"));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_turnover_with_times() {
        let a = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-05")).with_end_time(t(11, 1));
        let b = Event::reservation(2, 1, d("2024-06-05"), d("2024-06-08")).with_start_time(t(11, 0));
        assert!(a.overlaps(&b));

        let a2 = a.clone().with_end_time(t(11, 0));
        assert!(!a2.overlaps(&b));

        // Only one side has a time: date-level turnover.
        let b2 = Event::reservation(3, 1, d("2024-06-05"), d("2024-06-08"));
        assert!(!a.overlaps(&b2));
    }

    #[test]
    fn test_real_overlap() {
        let a = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-05"));
        let b = Event::reservation(2, 1, d("2024-06-04"), d("2024-06-08"));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_shift_and_patch() {
        let a = Event::reservation(1, 1, d("2024-06-01"), d("2024-06-05"));
        let s = a.shifted(3);
        assert_eq!(s.start_date, d("2024-06-04"));
        assert_eq!(s.end_date, d("2024-06-08"));

        let mut p = a.clone();
        p.apply(&EventPatch::dates(d("2024-06-02"), d("2024-06-09")).with_property(7));
        assert_eq!(p.property_id, 7);
        assert_eq!(p.span_days(), 7);
        assert!(EventPatch::default().is_empty());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "res-9", "kind": "reservation", "propertyId": 4,
            "startDate": "2024-06-01", "endDate": "2024-06-03",
            "startTime": "15:00:00", "label": "Martin"
        }"#;
        let e: Event = serde_json::from_str(json).unwrap();
        assert_eq!(e.property_id, 4);
        assert_eq!(e.start_time, Some(t(15, 0)));
        assert!(e.end_time.is_none());
        assert_eq!(e.label, "Martin");
    }
}
