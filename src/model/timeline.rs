use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;

use super::work_item::WorkItem;
use crate::timeline::scale;

/// Controls what the timeline header displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineScale {
    Days,
    Weeks,
    Months,
}

/// A mutually exclusive interaction mode (e.g. picking a relation target)
/// that takes precedence over dragging. Pressing on an item hands the item
/// to the callback instead of starting a drag.
#[derive(Clone)]
pub struct SelectionMode(Rc<dyn Fn(&WorkItem)>);

impl SelectionMode {
    pub fn new(callback: impl Fn(&WorkItem) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn select(&self, item: &WorkItem) {
        (self.0)(item)
    }
}

impl fmt::Debug for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SelectionMode(..)")
    }
}

/// Per-pass view parameters handed to the cell renderers.
#[derive(Debug, Clone)]
pub struct ViewParams {
    /// Day at x = 0.
    pub date_display_start: NaiveDate,
    /// Last visible day.
    pub date_display_end: NaiveDate,
    /// Must be positive; the host guarantees this.
    pub pixels_per_day: f32,
    pub active_selection_mode: Option<SelectionMode>,
}

impl ViewParams {
    pub fn new(start: NaiveDate, end: NaiveDate, pixels_per_day: f32) -> Self {
        Self {
            date_display_start: start,
            date_display_end: end,
            pixels_per_day,
            active_selection_mode: None,
        }
    }

    pub fn with_selection_mode(mut self, mode: Option<SelectionMode>) -> Self {
        self.active_selection_mode = mode;
        self
    }

    /// Whether the day range `first..=last` touches the displayed days.
    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        first <= self.date_display_end && last >= self.date_display_start
    }
}

/// Manages the visible viewport of the timeline.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    /// Current header scale.
    pub scale: TimelineScale,
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate, pixels_per_day: f32) -> Self {
        Self {
            start,
            end,
            scale: TimelineScale::Weeks,
            pixels_per_day,
        }
    }

    /// Snapshot the viewport as render-pass parameters.
    pub fn view_params(&self, selection: Option<SelectionMode>) -> ViewParams {
        ViewParams::new(self.start, self.end, self.pixels_per_day).with_selection_mode(selection)
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        scale::offset_px(
            &self.view_params(None),
            scale::days_between(date, self.start),
        )
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.date_to_x(self.end)
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * 1.2).min(80.0);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / 1.2).max(2.0);
    }

    /// Fit the viewport around a date range with some breathing room.
    pub fn fit(&mut self, first: NaiveDate, last: NaiveDate) {
        self.start = scale::shift_days(first, -7).unwrap_or(first);
        self.end = scale::shift_days(last, 30).unwrap_or(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_to_x() {
        let vp = TimelineViewport::new(ymd(2024, 1, 1), ymd(2024, 2, 1), 10.0);
        assert_eq!(vp.date_to_x(ymd(2024, 1, 1)), 0.0);
        assert_eq!(vp.date_to_x(ymd(2024, 1, 11)), 100.0);
        assert_eq!(vp.date_to_x(ymd(2023, 12, 31)), -10.0);
        assert_eq!(vp.total_width(), 310.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = TimelineViewport::new(ymd(2024, 1, 1), ymd(2024, 2, 1), 70.0);
        vp.zoom_in();
        vp.zoom_in();
        assert_eq!(vp.pixels_per_day, 80.0);
        for _ in 0..50 {
            vp.zoom_out();
        }
        assert_eq!(vp.pixels_per_day, 2.0);
    }

    #[test]
    fn test_overlaps_display_range() {
        let v = ViewParams::new(ymd(2024, 1, 1), ymd(2024, 1, 31), 10.0);
        assert!(v.overlaps(ymd(2024, 1, 31), ymd(2024, 2, 5)));
        assert!(v.overlaps(ymd(2023, 12, 1), ymd(2024, 1, 1)));
        assert!(v.overlaps(ymd(2023, 12, 1), ymd(2024, 3, 1)));
        assert!(!v.overlaps(ymd(2024, 2, 1), ymd(2024, 2, 1)));
        assert!(!v.overlaps(ymd(2023, 12, 1), ymd(2023, 12, 31)));
    }

    #[test]
    fn test_fit_adds_margins_and_stays_in_range() {
        let mut vp = TimelineViewport::new(ymd(2024, 1, 1), ymd(2024, 2, 1), 10.0);
        vp.fit(ymd(2024, 3, 10), ymd(2024, 4, 1));
        assert_eq!(vp.start, ymd(2024, 3, 3));
        assert_eq!(vp.end, ymd(2024, 5, 1));

        vp.fit(NaiveDate::MIN, NaiveDate::MAX);
        assert_eq!((vp.start, vp.end), (NaiveDate::MIN, NaiveDate::MAX));
    }

    #[test]
    fn test_selection_mode_forwards_item() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let mode = SelectionMode::new(move |_| counter.set(counter.get() + 1));
        let item = WorkItem::new_milestone("M", None);
        mode.clone().select(&item);
        assert_eq!(hits.get(), 1);
    }
}
