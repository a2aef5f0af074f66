//! Edit validation for reservations and their linked service events.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::TurnoverConfig;
use crate::error::ConflictError;
use crate::models::{Event, EventKind, EventPatch, PropertyRegistry};

/// A proposed change to a reservation's dates, times or property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdate {
    /// Reservation being edited.
    pub id: String,
    /// Property it should end up on.
    pub property_id: i64,
    /// New first night.
    pub check_in: NaiveDate,
    /// New checkout day.
    pub check_out: NaiveDate,
    /// New check-in time (`None` keeps the current one).
    #[serde(default)]
    pub check_in_time: Option<NaiveTime>,
    /// New check-out time (`None` keeps the current one).
    #[serde(default)]
    pub check_out_time: Option<NaiveTime>,
}

impl ReservationUpdate {
    /// Creates an update with dates only.
    pub fn new(
        id: impl Into<String>,
        property_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            property_id,
            check_in,
            check_out,
            check_in_time: None,
            check_out_time: None,
        }
    }

    /// Sets check-in and check-out times.
    pub fn with_times(mut self, check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> Self {
        self.check_in_time = check_in;
        self.check_out_time = check_out;
        self
    }

    /// The reservation as it would look after the update.
    ///
    /// Starts from the current event when known so display fields survive.
    /// A missing time keeps the current one, as [`Event::apply`] does.
    pub fn apply_to(&self, current: Option<&Event>) -> Event {
        let mut event = match current {
            Some(e) => e.clone(),
            None => Event::new(
                self.id.clone(),
                EventKind::Reservation,
                self.property_id,
                self.check_in,
                self.check_out,
            ),
        };
        event.property_id = self.property_id;
        event.start_date = self.check_in;
        event.end_date = self.check_out;
        if self.check_in_time.is_some() {
            event.start_time = self.check_in_time;
        }
        if self.check_out_time.is_some() {
            event.end_time = self.check_out_time;
        }
        event
    }

    /// Patch that stores exactly what [`apply_to`](Self::apply_to) builds.
    pub fn to_patch(&self) -> EventPatch {
        EventPatch::dates(self.check_in, self.check_out)
            .with_times(self.check_in_time, self.check_out_time)
            .with_property(self.property_id)
    }
}

/// What a proposed reservation collides with.
enum Collision<'a> {
    Overlap(&'a Event),
    ServiceBudget {
        service: &'a Event,
        service_end: NaiveDateTime,
        next: &'a Event,
        next_start: NaiveDateTime,
    },
}

/// Checks reservation edits against the rest of the calendar.
///
/// Holds the default check-in/check-out times used when an event has none.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateValidator {
    turnover: TurnoverConfig,
}

impl UpdateValidator {
    /// Creates a validator with the given turnover defaults.
    pub fn new(turnover: TurnoverConfig) -> Self {
        Self { turnover }
    }

    /// Whether `modified` would collide with another reservation or push a
    /// linked service event past the next check-in.
    ///
    /// Only reservations are checked; other kinds never conflict.
    pub fn would_conflict(
        &self,
        modified: &Event,
        all_events: &[Event],
        linked_services: &[Event],
    ) -> bool {
        self.first_collision(modified, all_events, linked_services)
            .is_some()
    }

    /// Validates a form edit, naming the conflicting party on failure.
    pub fn validate_reservation_update(
        &self,
        update: &ReservationUpdate,
        all_events: &[Event],
        linked_services: &[Event],
    ) -> Result<(), ConflictError> {
        if update.check_out <= update.check_in {
            return Err(ConflictError::InvalidInterval {
                start: update.check_in,
                end: update.check_out,
            });
        }
        let current = all_events.iter().find(|e| e.id == update.id);
        let mut candidate = update.apply_to(current);
        candidate.kind = EventKind::Reservation;

        match self.first_collision(&candidate, all_events, linked_services) {
            None => Ok(()),
            Some(collision) => Err(to_error(collision)),
        }
    }

    /// Pre-checks moving `event` to another property: the property must
    /// exist, host the party, and be free over the event's dates.
    pub fn validate_property_change(
        &self,
        event: &Event,
        target_property_id: i64,
        registry: &PropertyRegistry,
        all_events: &[Event],
    ) -> Result<(), ConflictError> {
        let property = registry
            .get(target_property_id)
            .ok_or(ConflictError::UnknownProperty(target_property_id))?;

        let guests = event.guests.unwrap_or(0);
        if !property.can_host(guests) {
            return Err(ConflictError::CapacityExceeded {
                property_id: target_property_id,
                max_guests: property.max_guests,
                guests,
            });
        }

        let mut moved = event.clone();
        moved.property_id = target_property_id;
        match self.overlapping_reservation(&moved, all_events) {
            Some(other) => Err(to_error(Collision::Overlap(other))),
            None => Ok(()),
        }
    }

    fn first_collision<'a>(
        &self,
        modified: &Event,
        all_events: &'a [Event],
        linked_services: &'a [Event],
    ) -> Option<Collision<'a>> {
        if !modified.is_reservation() {
            return None;
        }
        if let Some(other) = self.overlapping_reservation(modified, all_events) {
            return Some(Collision::Overlap(other));
        }
        if linked_services.is_empty() {
            return None;
        }

        let (next, next_start) = all_events
            .iter()
            .filter(|e| is_other_reservation(e, modified) && e.start_date >= modified.end_date)
            .map(|e| (e, self.check_in_instant(e)))
            .min_by(|(a, a_start), (b, b_start)| a_start.cmp(b_start).then_with(|| a.id.cmp(&b.id)))?;

        let checkout = self.check_out_instant(modified);
        linked_services.iter().find_map(|service| {
            let service_end = checkout + Duration::minutes(service.duration_minutes());
            (service_end >= next_start).then_some(Collision::ServiceBudget {
                service,
                service_end,
                next,
                next_start,
            })
        })
    }

    fn overlapping_reservation<'a>(&self, modified: &Event, all_events: &'a [Event]) -> Option<&'a Event> {
        all_events
            .iter()
            .find(|e| is_other_reservation(e, modified) && e.overlaps(modified))
    }

    fn check_in_instant(&self, event: &Event) -> NaiveDateTime {
        event
            .start_date
            .and_time(event.start_time.unwrap_or(self.turnover.check_in))
    }

    fn check_out_instant(&self, event: &Event) -> NaiveDateTime {
        event
            .end_date
            .and_time(event.end_time.unwrap_or(self.turnover.check_out))
    }
}

fn is_other_reservation(candidate: &Event, modified: &Event) -> bool {
    candidate.is_reservation()
        && candidate.property_id == modified.property_id
        && candidate.id != modified.id
}

fn display_label(event: &Event) -> String {
    if event.label.is_empty() {
        match event.kind {
            EventKind::Reservation => "reservation".into(),
            EventKind::Cleaning => "cleaning".into(),
            EventKind::Maintenance => "maintenance".into(),
            EventKind::Blocked => "block".into(),
        }
    } else {
        event.label.clone()
    }
}

fn to_error(collision: Collision<'_>) -> ConflictError {
    match collision {
        Collision::Overlap(other) => ConflictError::Overlap {
            event_id: other.id.clone(),
            label: display_label(other),
            start: other.start_date,
            end: other.end_date,
        },
        Collision::ServiceBudget {
            service,
            service_end,
            next,
            next_start,
        } => ConflictError::ServiceBudget {
            service_id: service.id.clone(),
            service_label: display_label(service),
            service_end,
            next_id: next.id.clone(),
            next_label: display_label(next),
            next_start,
        },
    }
}
