//! Materialized day range.

use chrono::{Duration, NaiveDate};

use crate::config::ZoomSettings;

/// Buffer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Earlier days.
    Left,
    /// Later days.
    Right,
}

/// Ordered, contiguous run of calendar days backing the grid.
///
/// # Invariants
/// - Never empty.
/// - Strictly increasing by exactly one day.
/// - Only grows, except when rebuilt by [`recenter`](Self::recenter).
#[derive(Debug, Clone, PartialEq)]
pub struct DayBuffer {
    days: Vec<NaiveDate>,
    day_width: f64,
}

impl DayBuffer {
    /// Builds a buffer spanning `visible_days * multiplier` days on each side
    /// of `anchor`.
    pub fn initialize(anchor: NaiveDate, zoom: &ZoomSettings, multiplier: u32) -> Self {
        let half = i64::from(zoom.visible_days.max(1) * multiplier.max(1));
        let start = anchor - Duration::days(half);
        let days: Vec<NaiveDate> = start.iter_days().take((2 * half + 1) as usize).collect();
        let buffer = Self {
            days,
            day_width: zoom.day_width,
        };
        buffer.debug_check();
        buffer
    }

    /// Rebuilds the buffer around a new anchor or zoom.
    ///
    /// Returns the scroll offset that puts `anchor` at the left edge of the
    /// viewport.
    pub fn recenter(&mut self, anchor: NaiveDate, zoom: &ZoomSettings, multiplier: u32) -> f64 {
        *self = Self::initialize(anchor, zoom, multiplier);
        tracing::debug!(%anchor, days = self.days.len(), "day buffer recentered");
        self.offset_of(anchor).unwrap_or(0.0)
    }

    /// Grows the buffer by `amount` days on one edge.
    ///
    /// Returns the scroll compensation the caller must add to its scroll
    /// offset in the same step: `amount * day_width` for a left extension,
    /// zero for a right extension.
    pub fn extend(&mut self, direction: Direction, amount: u32) -> f64 {
        if amount == 0 {
            return 0.0;
        }
        let compensation = match direction {
            Direction::Left => {
                let first = self.start();
                let added = (1..=i64::from(amount))
                    .rev()
                    .map(|offset| first - Duration::days(offset));
                self.days.splice(0..0, added);
                f64::from(amount) * self.day_width
            }
            Direction::Right => {
                let last = self.end();
                self.days
                    .extend((1..=i64::from(amount)).map(|offset| last + Duration::days(offset)));
                0.0
            }
        };
        self.debug_check();
        tracing::debug!(?direction, amount, days = self.days.len(), "day buffer extended");
        compensation
    }

    /// Edge the visible window is within `threshold` days of, if any.
    ///
    /// The left edge wins when both are close.
    pub fn threshold_check(
        &self,
        visible_start: usize,
        visible_end: usize,
        threshold: u32,
    ) -> Option<Direction> {
        let threshold = threshold as usize;
        let last = self.days.len() - 1;
        if visible_start <= threshold {
            Some(Direction::Left)
        } else if visible_end + threshold >= last {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Index range `[first, last]` of days intersecting the viewport.
    pub fn visible_range(&self, scroll_left: f64, viewport_width: f64) -> (usize, usize) {
        let last = self.days.len() - 1;
        if self.day_width <= 0.0 {
            return (0, last);
        }
        let first = (scroll_left.max(0.0) / self.day_width).floor() as usize;
        let end_px = (scroll_left + viewport_width).max(0.0);
        let end = (end_px / self.day_width).ceil() as usize;
        (first.min(last), end.saturating_sub(1).max(first).min(last))
    }

    /// All buffered days.
    #[inline]
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// First buffered day.
    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.days[0]
    }

    /// Last buffered day.
    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.days[self.days.len() - 1]
    }

    /// Number of buffered days.
    #[inline]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the buffer holds no days. Never true once built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Width of one day (px).
    #[inline]
    pub fn day_width(&self) -> f64 {
        self.day_width
    }

    /// Total pixel width of the buffer.
    pub fn total_width(&self) -> f64 {
        self.days.len() as f64 * self.day_width
    }

    /// Position of `date` in the buffer.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start()).num_days();
        if offset < 0 || offset as usize >= self.days.len() {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// Pixel offset of `date` from the buffer start.
    pub fn offset_of(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| i as f64 * self.day_width)
    }

    fn debug_check(&self) {
        debug_assert!(!self.days.is_empty(), "day buffer is empty");
        debug_assert!(
            self.days
                .windows(2)
                .all(|w| w[1] - w[0] == Duration::days(1)),
            "day buffer is not contiguous"
        );
    }
}

/// Re-entrancy guard for scroll-triggered extension.
///
/// Armed when an extension writes a compensating scroll offset; the scroll
/// event that write produces consumes it instead of extending again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollGuard {
    armed: bool,
}

impl ScrollGuard {
    /// Arms the guard.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Returns whether the guard was armed, disarming it.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }

    /// Whether the guard is armed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn zoom() -> ZoomSettings {
        ZoomSettings::new(40.0, 7)
    }

    fn is_contiguous(days: &[NaiveDate]) -> bool {
        days.windows(2).all(|w| w[1] - w[0] == Duration::days(1))
    }

    #[test]
    fn test_initialize_centered() {
        let b = DayBuffer::initialize(d("2024-06-15"), &zoom(), 3);
        assert_eq!(b.len(), 43);
        assert_eq!(b.start(), d("2024-05-25"));
        assert_eq!(b.end(), d("2024-07-06"));
        assert_eq!(b.index_of(d("2024-06-15")), Some(21));
        assert!(is_contiguous(b.days()));
    }

    #[test]
    fn test_extend_left_compensates() {
        let mut b = DayBuffer::initialize(d("2024-06-15"), &zoom(), 1);
        let before = b.start();
        let comp = b.extend(Direction::Left, 5);
        assert_eq!(comp, 200.0);
        assert_eq!(b.start(), before - Duration::days(5));
        assert!(is_contiguous(b.days()));
    }

    #[test]
    fn test_extend_right_no_compensation() {
        let mut b = DayBuffer::initialize(d("2024-06-15"), &zoom(), 1);
        let before = b.end();
        assert_eq!(b.extend(Direction::Right, 4), 0.0);
        assert_eq!(b.end(), before + Duration::days(4));
        assert_eq!(b.extend(Direction::Right, 0), 0.0);
    }

    #[test]
    fn test_random_extensions_stay_contiguous() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut b = DayBuffer::initialize(d("2024-01-01"), &zoom(), 1);
        for _ in 0..200 {
            let len = b.len();
            let (start, end) = (b.start(), b.end());
            let dir = if rng.random_bool(0.5) {
                Direction::Left
            } else {
                Direction::Right
            };
            let amount = rng.random_range(0..20);
            b.extend(dir, amount);
            assert_eq!(b.len(), len + amount as usize);
            assert!(b.start() <= start);
            assert!(b.end() >= end);
            assert!(is_contiguous(b.days()));
        }
    }

    #[test]
    fn test_recenter_returns_anchor_offset() {
        let mut b = DayBuffer::initialize(d("2024-06-15"), &zoom(), 1);
        b.extend(Direction::Left, 30);
        let offset = b.recenter(d("2024-09-01"), &ZoomSettings::new(20.0, 14), 2);
        assert_eq!(b.len(), 57);
        assert_eq!(b.index_of(d("2024-09-01")), Some(28));
        assert_eq!(offset, 28.0 * 20.0);
        assert_eq!(b.day_width(), 20.0);
    }

    #[test]
    fn test_threshold_check() {
        let b = DayBuffer::initialize(d("2024-06-15"), &zoom(), 3); // 43 days
        assert_eq!(b.threshold_check(20, 27, 5), None);
        assert_eq!(b.threshold_check(3, 10, 5), Some(Direction::Left));
        assert_eq!(b.threshold_check(30, 38, 5), Some(Direction::Right));
        assert_eq!(b.threshold_check(0, 42, 5), Some(Direction::Left));
    }

    #[test]
    fn test_visible_range() {
        let b = DayBuffer::initialize(d("2024-06-15"), &zoom(), 3);
        assert_eq!(b.visible_range(0.0, 280.0), (0, 6));
        assert_eq!(b.visible_range(400.0, 300.0), (10, 17));
        let (_, last) = b.visible_range(10_000.0, 300.0);
        assert_eq!(last, b.len() - 1);
    }

    #[test]
    fn test_scroll_guard() {
        let mut g = ScrollGuard::default();
        assert!(!g.take());
        g.arm();
        assert!(g.is_armed());
        assert!(g.take());
        assert!(!g.take());
    }
}
