//! Reservation conflict detection and edit validation.
//!
//! Two reservations on the same property conflict when their intervals
//! overlap (half-open: same-day turnover is allowed). An edit to a
//! reservation is additionally rejected when a linked service event
//! (post-checkout cleaning) would no longer fit before the next check-in.
//!
//! Two entry points share the same rule:
//! - [`UpdateValidator::would_conflict`]: boolean, run on every drag tick.
//! - [`UpdateValidator::validate_reservation_update`]: returns a
//!   [`ConflictError`](crate::error::ConflictError) naming the other party,
//!   run once when a form is submitted.
//!
//! This is pairwise interval checking, not a scheduling optimizer.

mod detect;
mod validate;

pub use detect::{detect_conflicts, ConflictPair};
pub use validate::{ReservationUpdate, UpdateValidator};
