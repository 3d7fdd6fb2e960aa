//! Date <-> pixel mapping along the horizontal day axis.

use chrono::NaiveDate;

use crate::model::ViewParams;

/// Horizontal offset in pixels of the day `days` after the display start.
///
/// Negative values (before the view start) and values beyond the visible
/// range are mapped as-is; culling is up to the caller.
pub fn offset_px(view: &ViewParams, days: i64) -> f32 {
    days as f32 * view.pixels_per_day
}

/// Whole days from `start` to `date` (negative if `date` is earlier).
pub fn days_between(date: NaiveDate, start: NaiveDate) -> i64 {
    (date - start).num_days()
}

/// Day index under a horizontal pixel offset (floored).
pub fn day_at_offset(view: &ViewParams, x: f32) -> i64 {
    (x / view.pixels_per_day).floor() as i64
}

/// `date` moved by `days`, or `None` when the result leaves chrono's
/// representable range.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    chrono::Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

/// Calendar date under a horizontal pixel offset, clamped to the
/// representable range.
pub fn date_at_offset(view: &ViewParams, x: f32) -> NaiveDate {
    let days = day_at_offset(view, x);
    shift_days(view.date_display_start, days).unwrap_or(if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// Number of whole days a pointer travelled, rounded to the nearest day.
pub fn drag_days(delta_x: f32, view: &ViewParams) -> i64 {
    (delta_x / view.pixels_per_day).round() as i64
}
