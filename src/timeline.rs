//! Owning context for one planning timeline view.
//!
//! Every UI handler (scroll, navigation, pointer, form submit) goes through
//! a [`TimelineContext`], which owns the day buffer, the scroll re-entrancy
//! guard, the event cache, the single drag slot and the pager. Nothing is
//! global.
//!
//! All methods are synchronous and meant for the thread handling input
//! events. Mutations are optimistic: the overlay is updated before the sink
//! is called, and a failed sink call leaves it in place until the next
//! refetch.
//!
//! ```
//! use chrono::NaiveDate;
//! use u_planning::config::TimelineConfig;
//! use u_planning::timeline::{Navigation, TimelineContext};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let mut timeline = TimelineContext::new(TimelineConfig::default(), today);
//! assert!(timeline.buffer().index_of(today).is_some());
//!
//! timeline.navigate(Navigation::Next);
//! assert_eq!(timeline.anchor(), NaiveDate::from_ymd_opt(2024, 6, 29).unwrap());
//! ```

use chrono::{Duration, NaiveDate};

use crate::buffer::{ChunkGrid, DateChunk, DayBuffer, Direction, ScrollGuard};
use crate::config::{DensityConfig, TimelineConfig, ZoomSettings};
use crate::conflict::{detect_conflicts, ConflictPair, ReservationUpdate, UpdateValidator};
use crate::error::{PlanningError, PlanningResult};
use crate::interaction::{DragKind, DragMachine, DragOutcome, DragState, DragView};
use crate::layout::compute_property_bar_layouts;
use crate::models::{BarLayout, DensityMode, Event, EventKind, EventPatch, PropertyRegistry, ZoomLevel};
use crate::pagination::Paginator;
use crate::source::{ChunkKey, EventCache, EventSource, MutationSink};

/// Explicit navigation (as opposed to scrolling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Jump to today (caller supplies the date).
    Today(NaiveDate),
    /// Jump to an arbitrary date.
    Jump(NaiveDate),
    /// One visible window back.
    Previous,
    /// One visible window forward.
    Next,
    /// Change zoom, keeping the anchor.
    Zoom(ZoomLevel),
}

/// State and handlers for one timeline view.
#[derive(Debug, Clone)]
pub struct TimelineContext {
    config: TimelineConfig,
    zoom: ZoomLevel,
    density_mode: DensityMode,
    show_prices: bool,
    anchor: NaiveDate,
    buffer: DayBuffer,
    scroll_left: f64,
    scroll_guard: ScrollGuard,
    chunk_grid: ChunkGrid,
    cache: EventCache,
    drag: DragMachine,
    pager: Paginator,
    validator: UpdateValidator,
}

impl TimelineContext {
    /// Creates a view centered on `anchor` at the default zoom and density.
    ///
    /// The caller must write [`scroll_left`](Self::scroll_left) to the
    /// scroll container on mount. The scroll guard starts armed, so the
    /// scroll event produced by that write is consumed rather than handled
    /// as user input.
    pub fn new(config: TimelineConfig, anchor: NaiveDate) -> Self {
        let zoom = ZoomLevel::default();
        let buffer = DayBuffer::initialize(anchor, config.zoom.get(zoom), config.buffer.multiplier);
        let scroll_left = buffer.offset_of(anchor).unwrap_or(0.0);
        let mut scroll_guard = ScrollGuard::default();
        scroll_guard.arm();
        Self {
            zoom,
            density_mode: DensityMode::default(),
            show_prices: false,
            anchor,
            buffer,
            scroll_left,
            scroll_guard,
            chunk_grid: ChunkGrid::new(config.buffer.chunk_epoch, config.buffer.chunk_days),
            cache: EventCache::new(),
            drag: DragMachine::new(config.interaction.activation_distance),
            pager: Paginator::default(),
            validator: UpdateValidator::new(config.turnover),
            config,
        }
    }

    // ======================== View state ========================

    /// Configuration in use.
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Current buffer.
    pub fn buffer(&self) -> &DayBuffer {
        &self.buffer
    }

    /// Last navigation anchor.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Current zoom.
    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Current horizontal scroll offset (px). Write it back to the scroll
    /// container after construction, navigation or a left extension.
    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Layout inputs for the current density.
    pub fn density_config(&self) -> DensityConfig {
        self.config.density_config(self.density_mode)
    }

    /// Changes row density.
    pub fn set_density(&mut self, mode: DensityMode) {
        self.density_mode = mode;
    }

    /// Shows or hides the price row under each property.
    pub fn set_show_prices(&mut self, show: bool) {
        self.show_prices = show;
    }

    fn zoom_settings(&self) -> ZoomSettings {
        *self.config.zoom.get(self.zoom)
    }

    // ======================== Horizontal scrolling ========================

    /// Rebuilds the buffer for a navigation and returns the new scroll
    /// offset, which the caller writes to the scroll container.
    pub fn navigate(&mut self, navigation: Navigation) -> f64 {
        let window = Duration::days(i64::from(self.zoom_settings().visible_days));
        match navigation {
            Navigation::Today(date) | Navigation::Jump(date) => self.anchor = date,
            Navigation::Previous => self.anchor -= window,
            Navigation::Next => self.anchor += window,
            Navigation::Zoom(level) => self.zoom = level,
        }
        let zoom = self.zoom_settings();
        self.scroll_left = self
            .buffer
            .recenter(self.anchor, &zoom, self.config.buffer.multiplier);
        self.scroll_guard.arm();
        self.scroll_left
    }

    /// Handles a scroll event.
    ///
    /// Extends the buffer when the viewport nears an edge. A left extension
    /// shifts the scroll offset by the inserted width in the same step and
    /// arms the guard, so the resulting scroll event is not treated as a
    /// new user scroll. Returns the extended edge, if any; read the
    /// compensated offset from [`scroll_left`](Self::scroll_left).
    pub fn on_scroll(&mut self, scroll_left: f64, viewport_width: f64) -> Option<Direction> {
        self.scroll_left = scroll_left;
        if self.scroll_guard.take() {
            return None;
        }
        let (first, last) = self.buffer.visible_range(scroll_left, viewport_width);
        let direction = self
            .buffer
            .threshold_check(first, last, self.config.buffer.threshold_days)?;
        let compensation = self.buffer.extend(direction, self.config.buffer.extend_days);
        if compensation > 0.0 {
            self.scroll_left += compensation;
            self.scroll_guard.arm();
        }
        Some(direction)
    }

    // ======================== Data ========================

    /// Epoch-aligned chunks covering the buffer.
    pub fn required_chunks(&self) -> Vec<DateChunk> {
        self.chunk_grid
            .chunks_overlapping(self.buffer.start(), self.buffer.end())
    }

    /// Chunk keys for `property_ids` not cached yet.
    pub fn pending_chunks(&self, property_ids: &[i64]) -> Vec<(ChunkKey, DateChunk)> {
        self.cache.missing(property_ids, &self.required_chunks())
    }

    /// Fetches every missing chunk for the buffer. Returns per-chunk failures.
    pub fn load<S: EventSource + ?Sized>(&mut self, source: &mut S, property_ids: &[i64]) -> Vec<PlanningError> {
        let chunks = self.required_chunks();
        self.cache.fetch_missing(source, property_ids, &chunks)
    }

    /// Stores a chunk resolved outside [`load`](Self::load).
    pub fn store_chunk(&mut self, key: ChunkKey, events: Vec<Event>) {
        self.cache.store(key, events);
    }

    /// Forgets all cached chunks; pending optimistic edits survive.
    pub fn invalidate(&mut self) {
        self.cache.invalidate_all();
    }

    /// Current event set (fetched data with optimistic edits).
    pub fn events(&self) -> Vec<Event> {
        self.cache.events()
    }

    /// Event by ID.
    pub fn event(&self, id: &str) -> Option<Event> {
        self.events().into_iter().find(|e| e.id == id)
    }

    /// Service events linked to a reservation.
    pub fn linked_services(&self, reservation_id: &str) -> Vec<Event> {
        linked_services(&self.events(), reservation_id)
    }

    // ======================== Derived views ========================

    /// Bars for one property over the current buffer.
    pub fn property_layouts(&self, property_id: i64) -> Vec<BarLayout> {
        let events: Vec<Event> = self
            .events()
            .into_iter()
            .filter(|e| e.property_id == property_id)
            .collect();
        compute_property_bar_layouts(
            &events,
            self.buffer.days(),
            self.buffer.day_width(),
            &self.density_config(),
        )
    }

    /// Overlapping reservation pairs in the current event set.
    pub fn conflicts(&self) -> Vec<ConflictPair> {
        detect_conflicts(&self.events())
    }

    // ======================== Drag ========================

    /// Starts a gesture on an event. Returns `Ok(false)` when another
    /// gesture is live.
    pub fn begin_drag(&mut self, event_id: &str, kind: DragKind, x: f64, y: f64) -> PlanningResult<bool> {
        let events = self.events();
        let event = events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| PlanningError::UnknownEvent(event_id.to_string()))?;
        let linked = if event.is_reservation() {
            linked_services(&events, event_id)
        } else {
            Vec::new()
        };
        Ok(self.drag.press(event, linked, kind, x, y))
    }

    /// Handles a pointer move during a gesture.
    pub fn drag_to(&mut self, x: f64, y: f64) -> Option<DragState> {
        if self.drag.is_idle() {
            return None;
        }
        let events = self.events();
        let density = self.density_config();
        let view = DragView {
            events: &events,
            days: self.buffer.days(),
            day_width: self.buffer.day_width(),
            density: &density,
            validator: &self.validator,
        };
        self.drag.pointer_move(x, y, &view).cloned()
    }

    /// Live drag state.
    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.state()
    }

    /// Ends a gesture. A valid commit is applied optimistically and sent
    /// to the sink, cascading onto linked service events.
    ///
    /// Sink failures are logged and swallowed; the next refetch reconciles.
    pub fn end_drag<M: MutationSink + ?Sized>(&mut self, sink: &mut M) -> DragOutcome {
        let outcome = self.drag.release();
        if let DragOutcome::Commit(commit) = &outcome {
            tracing::debug!(event_id = %commit.event_id, kind = ?commit.kind, days = commit.days_delta, "drag committed");
            let updates = std::iter::once((commit.event_id.clone(), commit.patch.clone()))
                .chain(commit.cascades.iter().cloned());
            for (id, patch) in updates {
                if let Err(err) = self.apply_update(sink, &id, &patch) {
                    tracing::warn!(event_id = %id, error = %err, "drag mutation failed");
                }
            }
        }
        outcome
    }

    /// Aborts the live gesture without changes.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }

    // ======================== Form and creation paths ========================

    /// Validates and applies a reservation edit from the side panel.
    ///
    /// Linked service events are re-anchored at the new checkout when it
    /// changes. On a sink failure the local edit stays in place and the
    /// error is returned.
    pub fn update_reservation<M: MutationSink + ?Sized>(
        &mut self,
        sink: &mut M,
        update: &ReservationUpdate,
    ) -> PlanningResult<()> {
        let events = self.events();
        let current = events
            .iter()
            .find(|e| e.id == update.id)
            .ok_or_else(|| PlanningError::UnknownEvent(update.id.clone()))?;
        let linked = linked_services(&events, &update.id);
        self.validator
            .validate_reservation_update(update, &events, &linked)?;

        let mut updates = vec![(update.id.clone(), update.to_patch())];
        if current.end_date != update.check_out || current.property_id != update.property_id {
            updates.extend(linked.iter().map(|service| {
                let start = update.check_out;
                let patch = EventPatch::dates(start, start + Duration::days(service.span_days()))
                    .with_property(update.property_id);
                (service.id.clone(), patch)
            }));
        }

        let mut first_error = None;
        for (id, patch) in &updates {
            if let Err(err) = self.apply_update(sink, id, patch) {
                tracing::warn!(event_id = %id, error = %err, "reservation update failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Pre-checks moving an event to another property.
    pub fn check_property_change(
        &self,
        event_id: &str,
        target_property_id: i64,
        registry: &PropertyRegistry,
    ) -> PlanningResult<()> {
        let events = self.events();
        let event = events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| PlanningError::UnknownEvent(event_id.to_string()))?;
        self.validator
            .validate_property_change(event, target_property_id, registry, &events)?;
        Ok(())
    }

    /// Copies an event to a new start date under `new_id`, keeping its
    /// length, times and display fields.
    pub fn duplicate_event<M: MutationSink + ?Sized>(
        &mut self,
        sink: &mut M,
        event_id: &str,
        new_id: impl Into<String>,
        start_date: NaiveDate,
    ) -> PlanningResult<Event> {
        let source = self
            .event(event_id)
            .ok_or_else(|| PlanningError::UnknownEvent(event_id.to_string()))?;
        let mut copy = source.shifted((start_date - source.start_date).num_days());
        copy.id = new_id.into();
        copy.linked_reservation_id = None;

        if copy.is_reservation() {
            let update = ReservationUpdate::new(copy.id.clone(), copy.property_id, copy.start_date, copy.end_date)
                .with_times(copy.start_time, copy.end_time);
            self.validator
                .validate_reservation_update(&update, &self.events(), &[])?;
        }
        self.create(sink, copy)
    }

    /// Creates a cleaning starting at a reservation's checkout and lasting
    /// `duration_minutes`, linked to that reservation.
    ///
    /// Refused when the cleaning would not finish before the next check-in.
    pub fn create_checkout_cleaning<M: MutationSink + ?Sized>(
        &mut self,
        sink: &mut M,
        reservation_id: &str,
        cleaning_id: impl Into<String>,
        duration_minutes: i64,
    ) -> PlanningResult<Event> {
        let events = self.events();
        let reservation = events
            .iter()
            .find(|e| e.id == reservation_id && e.is_reservation())
            .ok_or_else(|| PlanningError::UnknownEvent(reservation_id.to_string()))?;

        let start_time = reservation.end_time.unwrap_or(self.config.turnover.check_out);
        let end = reservation.end_date.and_time(start_time) + Duration::minutes(duration_minutes.max(1));
        let mut cleaning = Event::new(
            cleaning_id,
            EventKind::Cleaning,
            reservation.property_id,
            reservation.end_date,
            end.date(),
        )
        .with_times(start_time, end.time())
        .linked_to(reservation_id);
        cleaning.label = "Cleaning".into();

        let update = ReservationUpdate::new(
            reservation.id.clone(),
            reservation.property_id,
            reservation.start_date,
            reservation.end_date,
        )
        .with_times(reservation.start_time, reservation.end_time);
        self.validator
            .validate_reservation_update(&update, &events, std::slice::from_ref(&cleaning))?;

        self.create(sink, cleaning)
    }

    // ======================== Rows ========================

    /// Recomputes paging for `row_count` filtered properties in a viewport
    /// of `viewport_height` px.
    pub fn update_rows(&mut self, row_count: usize, viewport_height: f64) {
        let row_height = self
            .config
            .density
            .get(self.density_mode)
            .total_row_height(self.show_prices);
        let available = viewport_height - self.config.pagination.chrome_height;
        self.pager.update(row_count, row_height, available);
    }

    /// Row pager.
    pub fn pager(&self) -> &Paginator {
        &self.pager
    }

    /// Row pager, mutable (page navigation).
    pub fn pager_mut(&mut self) -> &mut Paginator {
        &mut self.pager
    }

    // ======================== Helpers ========================

    fn apply_update<M: MutationSink + ?Sized>(
        &mut self,
        sink: &mut M,
        id: &str,
        patch: &EventPatch,
    ) -> PlanningResult<()> {
        let base = self
            .event(id)
            .ok_or_else(|| PlanningError::UnknownEvent(id.to_string()))?;
        self.cache.overlay_mut().apply_patch(&base, patch);
        sink.update_event(id, patch)?;
        Ok(())
    }

    fn create<M: MutationSink + ?Sized>(&mut self, sink: &mut M, event: Event) -> PlanningResult<Event> {
        event.validate()?;
        self.cache.overlay_mut().upsert(event.clone());
        if let Err(err) = sink.create_event(&event) {
            tracing::warn!(event_id = %event.id, error = %err, "event creation failed");
            return Err(err.into());
        }
        Ok(event)
    }
}

fn linked_services(events: &[Event], reservation_id: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.kind.is_service() && e.linked_reservation_id.as_deref() == Some(reservation_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConflictError, MutationError};
    use crate::models::Property;
    use chrono::NaiveTime;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct StaticSource(Vec<Event>);

    impl EventSource for StaticSource {
        fn fetch_events(&mut self, property_ids: &[i64], chunk: &DateChunk) -> Result<Vec<Event>, PlanningError> {
            Ok(self
                .0
                .iter()
                .filter(|e| property_ids.contains(&e.property_id))
                .filter(|e| e.start_date <= chunk.end && e.end_date >= chunk.start)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        updates: Vec<(String, EventPatch)>,
        created: Vec<Event>,
        fail: bool,
    }

    impl MutationSink for RecordingSink {
        fn update_event(&mut self, id: &str, patch: &EventPatch) -> Result<(), MutationError> {
            if self.fail {
                return Err(MutationError::Transport("offline".into()));
            }
            self.updates.push((id.to_string(), patch.clone()));
            Ok(())
        }

        fn create_event(&mut self, event: &Event) -> Result<(), MutationError> {
            if self.fail {
                return Err(MutationError::Transport("offline".into()));
            }
            self.created.push(event.clone());
            Ok(())
        }
    }

    fn fixture(b_start: &str) -> TimelineContext {
        let b_start = d(b_start);
        let mut source = StaticSource(vec![
            Event::reservation("A", 1, d("2024-06-01"), d("2024-06-05")).with_label("Alpha"),
            Event::intervention(1, EventKind::Cleaning, 1, d("2024-06-05"), d("2024-06-06")).linked_to("res-A"),
            Event::reservation("B", 1, b_start, b_start + Duration::days(3)).with_label("Bravo"),
        ]);
        let mut tl = TimelineContext::new(TimelineConfig::default(), d("2024-06-03"));
        assert!(tl.load(&mut source, &[1]).is_empty());
        tl
    }

    #[test]
    fn test_new_centers_on_anchor() {
        let tl = TimelineContext::new(TimelineConfig::default(), d("2024-06-15"));
        // Two-week zoom, multiplier 3: 42 days each side.
        assert_eq!(tl.buffer().len(), 85);
        assert_eq!(tl.scroll_left(), 42.0 * 72.0);
        assert!(!tl.required_chunks().is_empty());
    }

    #[test]
    fn test_navigation_recenters() {
        let mut tl = TimelineContext::new(TimelineConfig::default(), d("2024-06-15"));
        tl.navigate(Navigation::Previous);
        assert_eq!(tl.anchor(), d("2024-06-01"));
        let offset = tl.navigate(Navigation::Zoom(ZoomLevel::Month));
        assert_eq!(tl.zoom(), ZoomLevel::Month);
        assert_eq!(tl.buffer().day_width(), 40.0);
        assert_eq!(tl.buffer().offset_of(d("2024-06-01")), Some(offset));
        tl.navigate(Navigation::Today(d("2024-09-09")));
        assert!(tl.buffer().index_of(d("2024-09-09")).is_some());
    }

    #[test]
    fn test_scroll_extension_and_guard() {
        let mut tl = TimelineContext::new(TimelineConfig::default(), d("2024-06-15"));
        let start = tl.buffer().start();
        // Echo of writing the initial offset on mount is consumed.
        assert_eq!(tl.on_scroll(0.0, 700.0), None);

        assert_eq!(tl.on_scroll(0.0, 700.0), Some(Direction::Left));
        assert_eq!(tl.buffer().start(), start - Duration::days(30));
        assert_eq!(tl.scroll_left(), 30.0 * 72.0);

        // Echo of the compensation write does not extend again.
        let len = tl.buffer().len();
        assert_eq!(tl.on_scroll(30.0 * 72.0, 700.0), None);
        assert_eq!(tl.buffer().len(), len);

        // Middle of the buffer: nothing to do.
        assert_eq!(tl.on_scroll(60.0 * 72.0, 700.0), None);

        // Right edge: extends without compensation.
        let right = tl.buffer().total_width() - 700.0;
        assert_eq!(tl.on_scroll(right, 700.0), Some(Direction::Right));
        assert_eq!(tl.scroll_left(), right);
    }

    #[test]
    fn test_layouts_and_conflicts() {
        let tl = fixture("2024-06-08");
        let bars = tl.property_layouts(1);
        assert_eq!(bars.len(), 3);
        assert!(tl.property_layouts(2).is_empty());
        assert!(tl.conflicts().is_empty());
        assert_eq!(tl.linked_services("res-A").len(), 1);
    }

    #[test]
    fn test_drag_resize_commit_cascades() {
        let mut tl = fixture("2024-06-08");
        let mut sink = RecordingSink::default();
        assert!(tl.begin_drag("res-A", DragKind::Resize, 100.0, 10.0).unwrap());
        let state = tl.drag_to(172.0, 10.0).unwrap();
        assert!(!state.conflict);

        match tl.end_drag(&mut sink) {
            DragOutcome::Commit(commit) => assert_eq!(commit.days_delta, 1),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sink.updates.len(), 2);
        let a = tl.event("res-A").unwrap();
        assert_eq!(a.end_date, d("2024-06-06"));
        let cleaning = tl.event("int-1").unwrap();
        assert_eq!((cleaning.start_date, cleaning.end_date), (d("2024-06-06"), d("2024-06-07")));
    }

    #[test]
    fn test_drag_conflict_snaps_back() {
        let mut tl = fixture("2024-06-06");
        let mut sink = RecordingSink::default();
        tl.begin_drag("res-A", DragKind::Resize, 100.0, 10.0).unwrap();
        assert!(tl.drag_to(172.0, 10.0).unwrap().conflict);
        assert!(matches!(tl.end_drag(&mut sink), DragOutcome::Discarded { .. }));
        assert!(sink.updates.is_empty());
        assert_eq!(tl.event("res-A").unwrap().end_date, d("2024-06-05"));
    }

    #[test]
    fn test_drag_sink_failure_is_swallowed() {
        let mut tl = fixture("2024-06-20");
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        tl.begin_drag("res-A", DragKind::Move, 100.0, 10.0).unwrap();
        tl.drag_to(244.0, 10.0);
        assert!(matches!(tl.end_drag(&mut sink), DragOutcome::Commit(_)));
        // Optimistic state stays.
        assert_eq!(tl.event("res-A").unwrap().start_date, d("2024-06-03"));
    }

    #[test]
    fn test_begin_drag_unknown_event() {
        let mut tl = fixture("2024-06-20");
        assert!(matches!(
            tl.begin_drag("res-404", DragKind::Move, 0.0, 0.0),
            Err(PlanningError::UnknownEvent(_))
        ));
    }

    #[test]
    fn test_update_reservation_form_path() {
        let mut tl = fixture("2024-06-06");
        let mut sink = RecordingSink::default();

        let bad = ReservationUpdate::new("res-A", 1, d("2024-06-01"), d("2024-06-06"));
        let err = tl.update_reservation(&mut sink, &bad).unwrap_err();
        assert!(matches!(err, PlanningError::Conflict(ConflictError::ServiceBudget { .. })));
        assert!(sink.updates.is_empty());

        let ok = ReservationUpdate::new("res-A", 1, d("2024-05-30"), d("2024-06-04"));
        tl.update_reservation(&mut sink, &ok).unwrap();
        assert_eq!(sink.updates.len(), 2);
        assert_eq!(tl.event("int-1").unwrap().start_date, d("2024-06-04"));
    }

    #[test]
    fn test_update_reservation_sink_failure_keeps_overlay() {
        let mut tl = fixture("2024-06-20");
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let update = ReservationUpdate::new("res-A", 1, d("2024-06-02"), d("2024-06-05"));
        let err = tl.update_reservation(&mut sink, &update).unwrap_err();
        assert!(matches!(err, PlanningError::Mutation(_)));
        assert_eq!(tl.event("res-A").unwrap().start_date, d("2024-06-02"));
    }

    #[test]
    fn test_update_without_times_is_checked_with_stored_times() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let mut source = StaticSource(vec![
            Event::reservation("A", 1, d("2024-06-01"), d("2024-06-04")).with_end_time(t(16)),
            Event::reservation("B", 1, d("2024-06-05"), d("2024-06-08")).with_start_time(t(15)),
        ]);
        let mut tl = TimelineContext::new(TimelineConfig::default(), d("2024-06-03"));
        assert!(tl.load(&mut source, &[1]).is_empty());
        let mut sink = RecordingSink::default();

        // Dates only: the 16:00 checkout is kept, so it runs into B's 15:00 check-in.
        let dates_only = ReservationUpdate::new("res-A", 1, d("2024-06-01"), d("2024-06-05"));
        let err = tl.update_reservation(&mut sink, &dates_only).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::Conflict(ConflictError::Overlap { ref event_id, .. }) if event_id == "res-B"
        ));
        assert!(sink.updates.is_empty());
        assert_eq!(tl.event("res-A").unwrap().end_date, d("2024-06-04"));

        // An earlier checkout time makes the same-day turnover fit.
        let early = dates_only.with_times(None, Some(t(10)));
        tl.update_reservation(&mut sink, &early).unwrap();
        let stored = tl.event("res-A").unwrap();
        assert_eq!((stored.end_date, stored.end_time), (d("2024-06-05"), Some(t(10))));
        assert!(tl.conflicts().is_empty());
    }

    #[test]
    fn test_duplicate_and_cleaning_creation() {
        let mut tl = fixture("2024-06-20");
        let mut sink = RecordingSink::default();

        let copy = tl.duplicate_event(&mut sink, "res-A", "res-A2", d("2024-06-10")).unwrap();
        assert_eq!((copy.start_date, copy.end_date), (d("2024-06-10"), d("2024-06-14")));
        assert_eq!(copy.label, "Alpha");
        assert!(tl.event("res-A2").is_some());

        let clash = tl.duplicate_event(&mut sink, "res-A", "res-A3", d("2024-06-18"));
        assert!(matches!(clash, Err(PlanningError::Conflict(ConflictError::Overlap { .. }))));

        let cleaning = tl.create_checkout_cleaning(&mut sink, "res-A2", "int-9", 180).unwrap();
        assert_eq!(cleaning.start_date, d("2024-06-14"));
        assert_eq!(cleaning.start_time, NaiveTime::from_hms_opt(11, 0, 0));
        assert_eq!(cleaning.end_time, NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(tl.linked_services("res-A2").len(), 1);
        assert_eq!(sink.created.len(), 2);
    }

    #[test]
    fn test_cleaning_refused_before_tight_check_in() {
        let mut tl = fixture("2024-06-05");
        let mut sink = RecordingSink::default();
        // B checks in 06-05 at 15:00; a 5h cleaning from 11:00 ends 16:00.
        let err = tl
            .create_checkout_cleaning(&mut sink, "res-A", "int-2", 300)
            .unwrap_err();
        assert!(matches!(err, PlanningError::Conflict(ConflictError::ServiceBudget { .. })));
        assert!(sink.created.is_empty());
    }

    #[test]
    fn test_property_change_check() {
        let tl = fixture("2024-06-20");
        let registry = PropertyRegistry::new(vec![Property::new(1, 4), Property::new(2, 4)]);
        assert!(tl.check_property_change("res-A", 2, &registry).is_ok());
        assert!(tl.check_property_change("res-A", 3, &registry).is_err());
    }

    #[test]
    fn test_row_pagination_follows_density() {
        let mut tl = TimelineContext::new(TimelineConfig::default(), d("2024-06-15"));
        // 820 - 120 chrome = 700 available, 68px rows.
        tl.update_rows(23, 820.0);
        assert_eq!(tl.pager().page_size(), 10);
        assert_eq!(tl.pager().total_pages(), 3);

        tl.set_show_prices(true);
        tl.update_rows(23, 820.0);
        assert_eq!(tl.pager().page_size(), 7);

        tl.set_density(DensityMode::Compact);
        tl.set_show_prices(false);
        tl.update_rows(23, 820.0);
        assert_eq!(tl.pager().page_size(), 14);
    }
}
