use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ISO date format used when writing dates back into an item.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Parse a raw date attribute into a calendar date.
///
/// Accepts plain ISO dates (`2024-03-01`) and RFC 3339 timestamps, of which
/// only the date part is kept. Missing and malformed values both yield `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, ISO_DATE) {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// A precedes/follows link between two work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub from: Uuid,
    pub to: Uuid,
}

/// A single row on the timeline: either a milestone (one governing `date`)
/// or a ranged item (`start_date` / `due_date`).
///
/// Date attributes are kept as the raw strings the data store hands over.
/// Use the typed accessors to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub subject: String,
    /// Type name, used to look up tint color and label configuration.
    pub item_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub milestone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl WorkItem {
    /// Create a new ranged item.
    pub fn new(
        subject: impl Into<String>,
        item_type: impl Into<String>,
        start: Option<NaiveDate>,
        due: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            item_type: item_type.into(),
            status: "New".to_string(),
            milestone: false,
            date: None,
            start_date: start.map(format_date),
            due_date: due.map(format_date),
        }
    }

    /// Create a new milestone. `date` may be `None` for an item that is
    /// still waiting to be placed on the timeline.
    pub fn new_milestone(subject: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            item_type: "Milestone".to_string(),
            status: "New".to_string(),
            milestone: true,
            date: date.map(format_date),
            start_date: None,
            due_date: None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(self.date.as_deref())
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_date(self.start_date.as_deref())
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        parse_date(self.due_date.as_deref())
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date.map(format_date);
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.start_date = date.map(format_date);
    }

    pub fn set_due_date(&mut self, date: Option<NaiveDate>) {
        self.due_date = date.map(format_date);
    }

    /// Earliest and latest date this item occupies, if any.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        if self.milestone {
            return self.date().map(|d| (d, d));
        }
        match (self.start_date(), self.due_date()) {
            (Some(s), Some(d)) => Some((s.min(d), s.max(d))),
            (Some(s), None) => Some((s, s)),
            (None, Some(d)) => Some((d, d)),
            (None, None) => None,
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(Some("2024-03-01")), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date(Some(" 2024-03-01 ")), Some(ymd(2024, 3, 1)));
        assert_eq!(
            parse_date(Some("2024-03-01T23:30:00+02:00")),
            Some(ymd(2024, 3, 1))
        );
    }

    #[test]
    fn test_parse_date_missing_and_malformed_are_equal() {
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("2024-02-30")), None);
    }

    #[test]
    fn test_set_date_writes_iso() {
        let mut item = WorkItem::new_milestone("Launch", None);
        item.set_date(Some(ymd(2024, 12, 5)));
        assert_eq!(item.date.as_deref(), Some("2024-12-05"));
        assert_eq!(item.date(), Some(ymd(2024, 12, 5)));
        item.set_date(None);
        assert!(item.date.is_none());
    }

    #[test]
    fn test_span() {
        let m = WorkItem::new_milestone("M", Some(ymd(2024, 1, 10)));
        assert_eq!(m.span(), Some((ymd(2024, 1, 10), ymd(2024, 1, 10))));

        let t = WorkItem::new("T", "Task", Some(ymd(2024, 1, 1)), Some(ymd(2024, 1, 5)));
        assert_eq!(t.span(), Some((ymd(2024, 1, 1), ymd(2024, 1, 5))));

        let open = WorkItem::new("T", "Task", None, Some(ymd(2024, 1, 5)));
        assert_eq!(open.span(), Some((ymd(2024, 1, 5), ymd(2024, 1, 5))));

        let undated = WorkItem::new("T", "Task", None, None);
        assert_eq!(undated.span(), None);
    }
}
