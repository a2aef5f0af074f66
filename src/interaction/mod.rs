//! Drag/resize interaction machine.
//!
//! # States
//!
//! ```text
//! Idle ──press──▶ Pending ──travel ≥ activation──▶ Dragging ──release──▶ Idle
//!                    │                                 │
//!                    └──release──▶ Idle (click)        └──cancel──▶ Idle
//! ```
//!
//! The machine owns the only gesture slot, so a second press while a
//! gesture is live is refused. Each move tick converts the horizontal
//! pointer delta to whole days, derives a candidate event, lays it out as
//! a ghost bar and checks it for conflicts against the unchanged event set.
//! Nothing is mutated until release; the resulting [`DragCommit`] carries
//! the patches to send, including cascades onto linked service events.

mod drag;

pub use drag::{DragCommit, DragKind, DragMachine, DragOutcome, DragState, DragView};
