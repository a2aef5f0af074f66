//! Error taxonomy.
//!
//! - [`ConflictError`]: a proposed edit collides with another reservation or
//!   with a linked service event's time budget. The `Display` text is the
//!   message shown to the operator.
//! - [`MutationError`]: the mutation sink reported a failure. The optimistic
//!   overlay is left in place; the next refetch reconciles.
//! - [`PlanningError`]: crate-level wrapper for everything else.
//!
//! Broken invariants (empty buffer, inverted range) are programming errors
//! and are checked with `debug_assert!` instead of being returned.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// A rejected schedule edit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConflictError {
    /// Check-out is not after check-in.
    #[error("check-out {end} must be after check-in {start}")]
    InvalidInterval {
        /// Proposed first day.
        start: NaiveDate,
        /// Proposed checkout day.
        end: NaiveDate,
    },
    /// Another reservation occupies part of the proposed range.
    #[error("overlaps reservation '{label}' ({event_id}) from {start} to {end}")]
    Overlap {
        /// Conflicting reservation ID.
        event_id: String,
        /// Conflicting reservation label (guest name).
        label: String,
        /// Conflicting reservation check-in.
        start: NaiveDate,
        /// Conflicting reservation check-out.
        end: NaiveDate,
    },
    /// A linked service event would not finish before the next check-in.
    #[error(
        "{service_label} ({service_id}) would end at {service_end}, \
         not before the check-in of '{next_label}' ({next_id}) at {next_start}"
    )]
    ServiceBudget {
        /// Linked service event ID.
        service_id: String,
        /// Linked service label.
        service_label: String,
        /// Simulated end of the service event.
        service_end: NaiveDateTime,
        /// Next reservation ID.
        next_id: String,
        /// Next reservation label.
        next_label: String,
        /// Next reservation check-in instant.
        next_start: NaiveDateTime,
    },
    /// The target property is not in the registry.
    #[error("property {0} does not exist")]
    UnknownProperty(i64),
    /// The target property cannot host the party.
    #[error("property {property_id} hosts at most {max_guests} guests, {guests} requested")]
    CapacityExceeded {
        /// Target property.
        property_id: i64,
        /// Registry capacity.
        max_guests: u32,
        /// Requested party size.
        guests: u32,
    },
}

/// Failure reported by a [`MutationSink`](crate::source::MutationSink).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The remote side refused the change.
    #[error("mutation rejected: {0}")]
    Rejected(String),
    /// Transport-level failure.
    #[error("mutation failed: {0}")]
    Transport(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Validation conflict.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    /// Mutation sink failure.
    #[error(transparent)]
    Mutation(#[from] MutationError),
    /// Event source failure for one chunk.
    #[error("fetch failed for chunk {chunk_index}: {message}")]
    Fetch {
        /// Chunk that failed.
        chunk_index: i64,
        /// Source-provided reason.
        message: String,
    },
    /// The event is not known to the timeline.
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    /// Event failed structural validation.
    #[error("invalid event {event_id}: {reason}")]
    InvalidEvent {
        /// Offending event.
        event_id: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Crate result alias.
pub type PlanningResult<T> = Result<T, PlanningError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_overlap_message_names_party() {
        let err = ConflictError::Overlap {
            event_id: "res-7".into(),
            label: "Dupont".into(),
            start: d("2024-06-03"),
            end: d("2024-06-07"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Dupont"));
        assert!(msg.contains("res-7"));
        assert!(msg.contains("2024-06-03"));
    }

    #[test]
    fn test_conflict_wraps_into_planning_error() {
        let err: PlanningError = ConflictError::UnknownProperty(42).into();
        assert!(matches!(err, PlanningError::Conflict(_)));
        assert_eq!(err.to_string(), "property 42 does not exist");
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: PlanningError = json_err.into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
