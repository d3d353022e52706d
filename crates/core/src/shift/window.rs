use chrono::{NaiveTime, Timelike};

use crate::model::ScheduleEntry;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A shift's `[start, end)` span within one day. An end reading earlier
/// than the start means the window runs past midnight into the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn of_entry(entry: &ScheduleEntry) -> Option<Self> {
        Some(Self::new(entry.shift_start?, entry.shift_end?))
    }

    pub fn break_of_entry(entry: &ScheduleEntry) -> Option<Self> {
        Some(Self::new(entry.break_start?, entry.break_end?))
    }

    /// Gross minutes from start to end, wrapping past midnight when
    /// needed. A zero-length window counts as zero minutes, not a day.
    pub fn span_minutes(&self) -> i64 {
        let (start, end) = self.normalized();
        end - start
    }

    /// Minutes after subtracting an optional break window.
    pub fn net_minutes(&self, break_window: Option<&TimeWindow>) -> i64 {
        let gross = self.span_minutes();
        let pause = break_window.map(TimeWindow::span_minutes).unwrap_or(0);
        (gross - pause).max(0)
    }

    pub fn net_hours(&self, break_window: Option<&TimeWindow>) -> f64 {
        self.net_minutes(break_window) as f64 / 60.0
    }

    /// Half-open overlap check. Both windows are anchored to the same
    /// calendar day before comparing, so a night shift overlaps an
    /// evening shift it runs into.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        let (start_a, end_a) = self.normalized();
        let (start_b, end_b) = other.normalized();
        start_a < end_b && start_b < end_a
    }

    fn normalized(&self) -> (i64, i64) {
        let start = minute_of_day(self.start);
        let mut end = minute_of_day(self.end);
        if end < start {
            end += MINUTES_PER_DAY;
        }
        (start, end)
    }
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn plain_span() {
        let window = TimeWindow::new(t(9, 0), t(17, 30));
        assert_eq!(window.span_minutes(), 510);
    }

    #[test]
    fn span_wraps_past_midnight() {
        let window = TimeWindow::new(t(22, 0), t(6, 0));
        assert_eq!(window.span_minutes(), 480);
        assert_eq!(window.net_hours(None), 8.0);
    }

    #[test]
    fn zero_length_window_is_zero_minutes() {
        let window = TimeWindow::new(t(9, 0), t(9, 0));
        assert_eq!(window.span_minutes(), 0);
    }

    #[test]
    fn break_is_subtracted_from_gross_span() {
        let window = TimeWindow::new(t(9, 0), t(17, 30));
        let pause = TimeWindow::new(t(12, 0), t(12, 30));
        assert_eq!(window.net_minutes(Some(&pause)), 480);
        assert_eq!(window.net_hours(Some(&pause)), 8.0);
    }

    #[test]
    fn net_minutes_never_goes_negative() {
        let window = TimeWindow::new(t(9, 0), t(10, 0));
        let pause = TimeWindow::new(t(8, 0), t(11, 0));
        assert_eq!(window.net_minutes(Some(&pause)), 0);
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let morning = TimeWindow::new(t(9, 0), t(13, 0));
        let afternoon = TimeWindow::new(t(13, 0), t(18, 0));
        assert!(!morning.overlaps(&afternoon));
        assert!(!afternoon.overlaps(&morning));
    }

    #[test]
    fn nested_and_partial_overlaps_are_detected() {
        let long = TimeWindow::new(t(9, 0), t(18, 0));
        let inside = TimeWindow::new(t(11, 0), t(12, 0));
        let spill = TimeWindow::new(t(17, 0), t(21, 0));

        assert!(long.overlaps(&inside));
        assert!(inside.overlaps(&long));
        assert!(long.overlaps(&spill));
    }

    #[test]
    fn night_shift_overlaps_evening_shift() {
        let night = TimeWindow::new(t(22, 0), t(6, 0));
        let evening = TimeWindow::new(t(18, 0), t(23, 0));
        assert!(night.overlaps(&evening));
        assert!(evening.overlaps(&night));
    }
}
