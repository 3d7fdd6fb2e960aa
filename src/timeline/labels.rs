//! Label slots drawn beside a timeline cell.

use std::fmt::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DEFAULT_DATE_FORMAT;
use crate::model::WorkItem;

pub const LEFT_LABEL_CLASS: &str = "labelLeft";
pub const RIGHT_LABEL_CLASS: &str = "labelRight";
pub const FAR_RIGHT_LABEL_CLASS: &str = "labelFarRight";
pub const LEFT_HOVER_LABEL_CLASS: &str = "labelHoverLeft";
pub const RIGHT_HOVER_LABEL_CLASS: &str = "labelHoverRight";
pub const HIDE_ON_HOVER_CLASS: &str = "hide-on-hover";
pub const SHOW_ON_HOVER_CLASS: &str = "show-on-hover";
pub const HOVER_STYLE_CLASS: &str = "label-hover";
pub const NOT_EMPTY_CLASS: &str = "not-empty";

fn try_format(date: NaiveDate, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

/// Whether `pattern` formats a calendar date without error. Rejects unknown
/// specifiers as well as time-of-day fields a date cannot supply.
pub fn is_valid_date_format(pattern: &str) -> bool {
    !pattern.trim().is_empty()
        && NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| try_format(d, pattern))
            .is_some()
}

/// Format `date` with `pattern`, falling back to [`DEFAULT_DATE_FORMAT`]
/// when the pattern cannot be applied.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    try_format(date, pattern).unwrap_or_else(|| date.format(DEFAULT_DATE_FORMAT).to_string())
}

/// Work item attribute a label can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelAttribute {
    Subject,
    Type,
    Status,
    StartDate,
    DueDate,
    Date,
}

impl LabelAttribute {
    pub const ALL: [LabelAttribute; 6] = [
        LabelAttribute::Subject,
        LabelAttribute::Type,
        LabelAttribute::Status,
        LabelAttribute::StartDate,
        LabelAttribute::DueDate,
        LabelAttribute::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LabelAttribute::Subject => "Subject",
            LabelAttribute::Type => "Type",
            LabelAttribute::Status => "Status",
            LabelAttribute::StartDate => "Start date",
            LabelAttribute::DueDate => "Due date",
            LabelAttribute::Date => "Date",
        }
    }

    /// Text to show for this attribute, or `None` when the item has no value.
    /// Dates that do not parse count as no value.
    pub fn display_value(self, item: &WorkItem, date_format: &str) -> Option<String> {
        let date = |parsed: Option<NaiveDate>| parsed.map(|d| format_date(d, date_format));
        let text = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
        match self {
            LabelAttribute::Subject => text(&item.subject),
            LabelAttribute::Type => text(&item.item_type),
            LabelAttribute::Status => text(&item.status),
            LabelAttribute::StartDate => date(item.start_date()),
            LabelAttribute::DueDate => date(item.due_date()),
            LabelAttribute::Date => date(item.date()),
        }
    }
}

/// Named label position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSlot {
    Center,
    Left,
    LeftHover,
    Right,
    RightHover,
    FarRight,
}

/// Which attribute each static slot displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelConfig {
    pub left: Option<LabelAttribute>,
    pub right: Option<LabelAttribute>,
    pub far_right: Option<LabelAttribute>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            left: Some(LabelAttribute::StartDate),
            right: Some(LabelAttribute::DueDate),
            far_right: Some(LabelAttribute::Subject),
        }
    }
}

/// One label box.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub classes: Vec<&'static str>,
    /// Attribute currently bound, after any renderer-specific rewrite.
    pub attribute: Option<LabelAttribute>,
    pub text: Option<String>,
}

impl Label {
    pub fn new(classes: &[&'static str]) -> Self {
        Self {
            classes: classes.to_vec(),
            attribute: None,
            text: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }

    pub fn shows_on_hover(&self) -> bool {
        self.classes.contains(&SHOW_ON_HOVER_CLASS)
    }

    pub fn hides_on_hover(&self) -> bool {
        self.classes.contains(&HIDE_ON_HOVER_CLASS)
    }

    /// Bind `attribute` and render its value, or clear the label.
    pub fn bind(&mut self, item: &WorkItem, attribute: Option<LabelAttribute>, date_format: &str) {
        self.attribute = attribute;
        self.text = attribute.and_then(|a| a.display_value(item, date_format));
        self.classes.retain(|c| *c != NOT_EMPTY_CLASS);
        if self.text.is_some() {
            self.classes.push(NOT_EMPTY_CLASS);
        }
    }
}

/// The label boxes attached to one cell. Slots a renderer does not use stay
/// `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellLabels {
    pub center: Option<Label>,
    pub left: Option<Label>,
    pub left_hover: Option<Label>,
    pub right: Option<Label>,
    pub right_hover: Option<Label>,
    pub far_right: Option<Label>,
}

impl CellLabels {
    /// The standard slot set: left, right and far right hidden on hover,
    /// plus hover labels on both sides.
    pub fn standard() -> Self {
        Self {
            center: None,
            left: Some(Label::new(&[LEFT_LABEL_CLASS, HIDE_ON_HOVER_CLASS])),
            left_hover: Some(Label::new(&[
                LEFT_HOVER_LABEL_CLASS,
                SHOW_ON_HOVER_CLASS,
                HOVER_STYLE_CLASS,
            ])),
            right: Some(Label::new(&[RIGHT_LABEL_CLASS, HIDE_ON_HOVER_CLASS])),
            right_hover: Some(Label::new(&[
                RIGHT_HOVER_LABEL_CLASS,
                SHOW_ON_HOVER_CLASS,
                HOVER_STYLE_CLASS,
            ])),
            far_right: Some(Label::new(&[FAR_RIGHT_LABEL_CLASS, HIDE_ON_HOVER_CLASS])),
        }
    }

    pub fn slot(&self, slot: LabelSlot) -> Option<&Label> {
        match slot {
            LabelSlot::Center => self.center.as_ref(),
            LabelSlot::Left => self.left.as_ref(),
            LabelSlot::LeftHover => self.left_hover.as_ref(),
            LabelSlot::Right => self.right.as_ref(),
            LabelSlot::RightHover => self.right_hover.as_ref(),
            LabelSlot::FarRight => self.far_right.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: LabelSlot) -> Option<&mut Label> {
        match slot {
            LabelSlot::Center => self.center.as_mut(),
            LabelSlot::Left => self.left.as_mut(),
            LabelSlot::LeftHover => self.left_hover.as_mut(),
            LabelSlot::Right => self.right.as_mut(),
            LabelSlot::RightHover => self.right_hover.as_mut(),
            LabelSlot::FarRight => self.far_right.as_mut(),
        }
    }

    /// Rendered text of a slot, if the slot exists and shows something.
    pub fn text(&self, slot: LabelSlot) -> Option<&str> {
        self.slot(slot).and_then(|l| l.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_value_formats_dates() {
        let item = WorkItem::new_milestone("Launch", Some(ymd(2024, 3, 1)));
        assert_eq!(
            LabelAttribute::Date.display_value(&item, "%d/%m/%Y").as_deref(),
            Some("01/03/2024")
        );
        assert_eq!(LabelAttribute::StartDate.display_value(&item, "%d/%m/%Y"), None);
        assert_eq!(
            LabelAttribute::Subject.display_value(&item, "%d/%m/%Y").as_deref(),
            Some("Launch")
        );
    }

    #[test]
    fn test_display_value_hides_unparsable_dates() {
        let mut item = WorkItem::new_milestone("Launch", None);
        item.date = Some("soon".to_string());
        assert_eq!(LabelAttribute::Date.display_value(&item, "%d/%m/%Y"), None);

        let mut label = Label::new(&[RIGHT_HOVER_LABEL_CLASS]);
        label.bind(&item, Some(LabelAttribute::Date), "%d/%m/%Y");
        assert!(label.is_empty());
    }

    #[test]
    fn test_invalid_date_format_is_detected() {
        assert!(is_valid_date_format("%d/%m/%Y"));
        assert!(is_valid_date_format("%e %b %Y"));
        assert!(!is_valid_date_format("%Q"));
        assert!(!is_valid_date_format("%H:%M"));
        assert!(!is_valid_date_format("  "));
    }

    #[test]
    fn test_invalid_date_format_falls_back_to_default() {
        let item = WorkItem::new_milestone("Launch", Some(ymd(2024, 3, 1)));
        assert_eq!(format_date(ymd(2024, 3, 1), "%Q"), "01/03/2024");
        assert_eq!(
            LabelAttribute::Date.display_value(&item, "%Q").as_deref(),
            Some("01/03/2024")
        );
    }

    #[test]
    fn test_bind_sets_and_clears_not_empty() {
        let item = WorkItem::new_milestone("Launch", Some(ymd(2024, 3, 1)));
        let mut label = Label::new(&[RIGHT_LABEL_CLASS]);

        label.bind(&item, Some(LabelAttribute::Subject), "%Y-%m-%d");
        assert_eq!(label.text.as_deref(), Some("Launch"));
        assert!(label.classes.contains(&NOT_EMPTY_CLASS));

        label.bind(&item, None, "%Y-%m-%d");
        assert!(label.is_empty());
        assert!(!label.classes.contains(&NOT_EMPTY_CLASS));
    }

    #[test]
    fn test_label_config_partial_json() {
        let cfg: LabelConfig = serde_json::from_str(r#"{"farRight":"status"}"#).unwrap();
        assert_eq!(cfg.left, Some(LabelAttribute::StartDate));
        assert_eq!(cfg.far_right, Some(LabelAttribute::Status));

        let cleared: LabelConfig = serde_json::from_str(r#"{"left":null}"#).unwrap();
        assert_eq!(cleared.left, None);
    }
}
