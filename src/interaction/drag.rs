//! Pointer gesture state machine for moving and resizing bars.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::DensityConfig;
use crate::conflict::UpdateValidator;
use crate::layout::compute_bar_layout;
use crate::models::{BarLayout, Event, EventPatch};

/// What a gesture changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    /// Shift start and end together.
    Move,
    /// Change the checkout day only.
    Resize,
}

impl DragKind {
    /// Picks the gesture for a press hitting the resize handle and/or the
    /// bar body. The handle wins when both are hit.
    pub fn from_hits(on_resize_handle: bool, on_bar: bool) -> Option<Self> {
        if on_resize_handle {
            Some(Self::Resize)
        } else if on_bar {
            Some(Self::Move)
        } else {
            None
        }
    }

    /// The event as it would be after `days_delta` whole days.
    ///
    /// Resizing never leaves fewer than one night.
    pub fn apply(self, event: &Event, days_delta: i64) -> Event {
        match self {
            Self::Move => event.shifted(days_delta),
            Self::Resize => {
                let mut resized = event.clone();
                let floor = event.start_date + Duration::days(1);
                resized.end_date = (event.end_date + Duration::days(days_delta)).max(floor);
                resized
            }
        }
    }
}

/// Live state of an active drag, exposed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Event being dragged.
    pub active_id: String,
    /// Move or resize.
    pub active_kind: DragKind,
    /// Whole days the pointer has travelled.
    pub days_delta: i64,
    /// Event as it would be if released now.
    pub candidate: Event,
    /// Provisional geometry; `None` when the candidate left the buffer.
    pub ghost_layout: Option<BarLayout>,
    /// Whether releasing now would be refused.
    pub conflict: bool,
}

/// Read-only inputs for computing a drag tick.
#[derive(Debug, Clone, Copy)]
pub struct DragView<'a> {
    /// Current (unchanged) event set.
    pub events: &'a [Event],
    /// Buffered days.
    pub days: &'a [NaiveDate],
    /// Width of one day (px).
    pub day_width: f64,
    /// Layout inputs for the ghost bar.
    pub density: &'a DensityConfig,
    /// Conflict rule.
    pub validator: &'a UpdateValidator,
}

/// Patches produced by a successful release.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    /// Dragged event.
    pub event_id: String,
    /// Move or resize.
    pub kind: DragKind,
    /// Whole days applied.
    pub days_delta: i64,
    /// Update for the dragged event.
    pub patch: EventPatch,
    /// Updates for linked service events, by ID.
    pub cascades: Vec<(String, EventPatch)>,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No gesture was in progress.
    Idle,
    /// Released before the activation distance: a selection click.
    Click {
        /// Pressed event.
        event_id: String,
    },
    /// Released where it started.
    NoChange {
        /// Dragged event.
        event_id: String,
    },
    /// Released on a conflicting position; the bar snaps back.
    Discarded {
        /// Dragged event.
        event_id: String,
    },
    /// Released on a valid position.
    Commit(DragCommit),
}

#[derive(Debug, Clone)]
struct Gesture {
    original: Event,
    linked: Vec<Event>,
    kind: DragKind,
    origin_x: f64,
    origin_y: f64,
}

#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Idle,
    Pending(Gesture),
    Dragging(Gesture, DragState),
}

/// Owns the single gesture slot.
#[derive(Debug, Clone)]
pub struct DragMachine {
    phase: Phase,
    activation_distance: f64,
}

impl DragMachine {
    /// Creates an idle machine.
    pub fn new(activation_distance: f64) -> Self {
        Self {
            phase: Phase::Idle,
            activation_distance,
        }
    }

    /// Starts a gesture on `event`.
    ///
    /// `linked` are the event's linked service events, moved along on
    /// commit. Returns `false` if another gesture is live.
    pub fn press(&mut self, event: &Event, linked: Vec<Event>, kind: DragKind, x: f64, y: f64) -> bool {
        if !matches!(self.phase, Phase::Idle) {
            return false;
        }
        self.phase = Phase::Pending(Gesture {
            original: event.clone(),
            linked,
            kind,
            origin_x: x,
            origin_y: y,
        });
        true
    }

    /// Handles a pointer move.
    ///
    /// Returns the live drag state once the gesture is a drag.
    pub fn pointer_move(&mut self, x: f64, y: f64, view: &DragView<'_>) -> Option<&DragState> {
        let phase = std::mem::take(&mut self.phase);
        self.phase = match phase {
            Phase::Idle => Phase::Idle,
            Phase::Pending(gesture) => {
                let travel = (x - gesture.origin_x).hypot(y - gesture.origin_y);
                if travel < self.activation_distance {
                    Phase::Pending(gesture)
                } else {
                    tracing::debug!(event_id = %gesture.original.id, kind = ?gesture.kind, "drag activated");
                    let state = tick(&gesture, x, view);
                    Phase::Dragging(gesture, state)
                }
            }
            Phase::Dragging(gesture, _) => {
                let state = tick(&gesture, x, view);
                Phase::Dragging(gesture, state)
            }
        };
        self.state()
    }

    /// Ends the gesture and reports what it amounted to.
    pub fn release(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.phase) {
            Phase::Idle => DragOutcome::Idle,
            Phase::Pending(gesture) => DragOutcome::Click {
                event_id: gesture.original.id,
            },
            Phase::Dragging(gesture, state) => {
                let original = &gesture.original;
                let unchanged = state.candidate.start_date == original.start_date
                    && state.candidate.end_date == original.end_date;
                if unchanged {
                    DragOutcome::NoChange {
                        event_id: state.active_id,
                    }
                } else if state.conflict {
                    tracing::debug!(event_id = %state.active_id, "drag discarded on conflict");
                    DragOutcome::Discarded {
                        event_id: state.active_id,
                    }
                } else {
                    DragOutcome::Commit(build_commit(&gesture, &state))
                }
            }
        }
    }

    /// Drops the gesture without any change. Returns whether one was live.
    pub fn cancel(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.phase), Phase::Idle)
    }

    /// Live drag state, if dragging.
    pub fn state(&self) -> Option<&DragState> {
        match &self.phase {
            Phase::Dragging(_, state) => Some(state),
            _ => None,
        }
    }

    /// Whether no gesture is live.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Whether the live gesture has passed the activation distance.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(..))
    }

    /// Event under the live gesture, if any.
    pub fn active_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Pending(g) | Phase::Dragging(g, _) => Some(g.original.id.as_str()),
        }
    }
}

impl Default for DragMachine {
    fn default() -> Self {
        Self::new(8.0)
    }
}

fn tick(gesture: &Gesture, x: f64, view: &DragView<'_>) -> DragState {
    let days_delta = if view.day_width > 0.0 {
        ((x - gesture.origin_x) / view.day_width).round() as i64
    } else {
        0
    };
    let candidate = gesture.kind.apply(&gesture.original, days_delta);
    let ghost_layout = compute_bar_layout(&candidate, view.days, view.day_width, view.density);
    let conflict = view
        .validator
        .would_conflict(&candidate, view.events, &gesture.linked);
    DragState {
        active_id: gesture.original.id.clone(),
        active_kind: gesture.kind,
        days_delta,
        candidate,
        ghost_layout,
        conflict,
    }
}

fn build_commit(gesture: &Gesture, state: &DragState) -> DragCommit {
    let candidate = &state.candidate;
    let cascades = gesture
        .linked
        .iter()
        .map(|service| {
            let patch = match gesture.kind {
                DragKind::Move => {
                    let shifted = service.shifted(state.days_delta);
                    EventPatch::dates(shifted.start_date, shifted.end_date)
                }
                DragKind::Resize => {
                    let start = candidate.end_date;
                    EventPatch::dates(start, start + Duration::days(service.span_days()))
                }
            };
            (service.id.clone(), patch)
        })
        .collect();

    DragCommit {
        event_id: state.active_id.clone(),
        kind: gesture.kind,
        days_delta: state.days_delta,
        patch: EventPatch::dates(candidate.start_date, candidate.end_date),
        cascades,
    }
}
