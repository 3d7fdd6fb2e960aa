//! Ranged cells: a bar from start date to due date with resize handles on
//! both edges.

use chrono::NaiveDate;
use egui::CursorIcon;
use tracing::debug;

use super::labels::{CellLabels, LabelSlot};
use super::milestone::PLACEHOLDER_COLOR;
use super::node::{CellNode, ElementBox, ShapeKind, BAR_CLASS, TIMELINE_ELEMENT_CLASS};
use super::{scale, CellRenderer, PointerEvent, RenderInfo, TimelineHost};
use crate::model::{ViewParams, WorkItem};

pub const BAR_HEIGHT: f32 = 20.0;
/// Width of the grab zone at each end of a bar.
pub const HANDLE_WIDTH: f32 = 7.0;
const MIN_BAR_WIDTH: f32 = 2.0;

/// Which part of a bar a drag acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarDirection {
    /// Start edge.
    Left,
    /// Due edge.
    Right,
    /// Whole bar.
    Both,
    /// New bar being dragged out from its start day.
    Create,
    /// Due edge of a bar that had no due date yet.
    DragRight,
}

/// Proposed dates while a bar is dragged. `None` leaves a date unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarMovement {
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

pub struct BarCellRenderer<'h> {
    host: &'h dyn TimelineHost,
}

impl<'h> BarCellRenderer<'h> {
    pub fn new(host: &'h dyn TimelineHost) -> Self {
        Self { host }
    }

    /// Visible day range; a bar with only one date spans that single day.
    fn day_range(item: &WorkItem) -> Option<(NaiveDate, NaiveDate)> {
        let start = item.start_date().or_else(|| item.due_date())?;
        let due = item.due_date().unwrap_or(start);
        Some((start, due.max(start)))
    }
}

impl CellRenderer for BarCellRenderer<'_> {
    type Direction = BarDirection;
    type Movement = BarMovement;

    fn host(&self) -> &dyn TimelineHost {
        self.host
    }

    fn kind(&self) -> &'static str {
        BAR_CLASS
    }

    fn is_empty(&self, item: &WorkItem) -> bool {
        item.start_date().is_none() && item.due_date().is_none()
    }

    fn render(&self, _info: &RenderInfo<'_>) -> CellNode {
        CellNode {
            root: ElementBox::new(&[TIMELINE_ELEMENT_CLASS, BAR_CLASS]),
            shape: ElementBox::new(&[BAR_CLASS]),
            kind: ShapeKind::Bar,
        }
    }

    fn update(
        &self,
        node: &mut CellNode,
        labels: Option<&mut CellLabels>,
        info: &RenderInfo<'_>,
    ) -> bool {
        let view = info.view_params;
        let Some((start, due)) = Self::day_range(info.item) else {
            return false;
        };

        let days = scale::days_between(due, start) + 1;
        let width = scale::offset_px(view, days).max(MIN_BAR_WIDTH);

        let offset_start = scale::days_between(start, view.date_display_start);
        node.root.left = scale::offset_px(view, offset_start);
        node.root.set_size(width, BAR_HEIGHT);
        node.shape.set_size(width, BAR_HEIGHT);
        node.shape.background = Some(self.host.type_color(info.item));

        if let Some(labels) = labels {
            self.update_labels(false, labels, info.item);
        }

        self.check_for_active_selection_mode(info, node);
        true
    }

    fn create_and_add_labels(&self, info: &RenderInfo<'_>) -> CellLabels {
        let mut labels = CellLabels::standard();
        self.update_labels(false, &mut labels, info.item);
        labels
    }

    fn display_placeholder_under_cursor(&self, pointer_x: f32, info: &RenderInfo<'_>) -> CellNode {
        let view = info.view_params;
        let days = scale::day_at_offset(view, pointer_x);

        let mut root = ElementBox::new(&[TIMELINE_ELEMENT_CLASS, BAR_CLASS]);
        root.pointer_events = false;
        root.left = scale::offset_px(view, days);
        root.set_size(view.pixels_per_day, BAR_HEIGHT);

        let mut shape = ElementBox::new(&[BAR_CLASS]);
        shape.pointer_events = false;
        shape.set_size(view.pixels_per_day, BAR_HEIGHT);
        shape.background = Some(PLACEHOLDER_COLOR);

        CellNode {
            root,
            shape,
            kind: ShapeKind::Bar,
        }
    }

    fn on_mouse_down(
        &self,
        ev: &mut PointerEvent,
        date_for_create: Option<NaiveDate>,
        item: &mut WorkItem,
        view: &ViewParams,
        labels: &mut CellLabels,
        node: Option<&CellNode>,
    ) -> BarDirection {
        if self.delegate_to_selection_mode(ev, item, view) {
            return BarDirection::Both;
        }

        if let Some(date) = date_for_create {
            self.host.force_cursor(CursorIcon::ResizeHorizontal);
            item.set_start_date(Some(date));
            item.set_due_date(Some(date));
            return BarDirection::Create;
        }

        let direction = match node.map(CellNode::shape_span) {
            Some((left, _)) if ev.x <= left + HANDLE_WIDTH => BarDirection::Left,
            Some((_, right)) if ev.x >= right - HANDLE_WIDTH => {
                if item.due_date().is_none() {
                    BarDirection::DragRight
                } else {
                    BarDirection::Right
                }
            }
            _ => BarDirection::Both,
        };

        self.host.force_cursor(match direction {
            BarDirection::Both => CursorIcon::Grabbing,
            _ => CursorIcon::ResizeHorizontal,
        });
        self.update_labels(true, labels, item);
        direction
    }

    fn on_days_moved(
        &self,
        item: &WorkItem,
        day_under_cursor: NaiveDate,
        delta: i64,
        direction: BarDirection,
    ) -> BarMovement {
        let shift = |d: NaiveDate| scale::shift_days(d, delta);
        let start = item.start_date();
        let due = item.due_date();

        match direction {
            BarDirection::Left => BarMovement {
                start_date: start
                    .and_then(shift)
                    .map(|moved| due.map_or(moved, |d| moved.min(d))),
                due_date: None,
            },
            BarDirection::Right => BarMovement {
                start_date: None,
                due_date: due
                    .and_then(shift)
                    .map(|moved| start.map_or(moved, |s| moved.max(s))),
            },
            // Both edges move together or not at all.
            BarDirection::Both => match (start.map(shift), due.map(shift)) {
                (Some(None), _) | (_, Some(None)) => BarMovement::default(),
                (start_date, due_date) => BarMovement {
                    start_date: start_date.flatten(),
                    due_date: due_date.flatten(),
                },
            },
            BarDirection::Create | BarDirection::DragRight => BarMovement {
                start_date: None,
                due_date: start.map(|s| day_under_cursor.max(s)),
            },
        }
    }

    fn assign_date_values(
        &self,
        item: &mut WorkItem,
        labels: Option<&mut CellLabels>,
        movement: &BarMovement,
    ) {
        if let Some(start) = movement.start_date {
            item.set_start_date(Some(start));
        }
        if let Some(due) = movement.due_date {
            item.set_due_date(Some(due));
        }
        debug!(item = %item.id, ?movement, "bar dates assigned");
        if let Some(labels) = labels {
            self.update_labels(false, labels, item);
        }
    }

    fn margin_left_of_left_side(&self, info: &RenderInfo<'_>) -> f32 {
        let view = info.view_params;
        let start = Self::day_range(info.item).map_or(view.date_display_start, |(s, _)| s);
        scale::offset_px(view, scale::days_between(start, view.date_display_start))
    }

    fn margin_left_of_right_side(&self, info: &RenderInfo<'_>) -> f32 {
        let view = info.view_params;
        let due = Self::day_range(info.item).map_or(view.date_display_start, |(_, d)| d);
        scale::offset_px(view, scale::days_between(due, view.date_display_start) + 1)
    }

    fn padding_left_for_incoming_relation_lines(&self, _info: &RenderInfo<'_>) -> f32 {
        0.0
    }

    fn padding_right_for_outgoing_relation_lines(&self, _info: &RenderInfo<'_>) -> f32 {
        0.0
    }

    fn update_labels(&self, _active_drag: bool, labels: &mut CellLabels, item: &WorkItem) {
        // Bars keep their labels while dragging so the changing dates stay visible.
        let config = self.host.normalized_labels(item);
        self.render_label(item, labels, LabelSlot::Left, config.left);
        self.render_label(item, labels, LabelSlot::Right, config.right);
        self.render_label(item, labels, LabelSlot::FarRight, config.far_right);
        self.render_hover_labels(labels, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::labels::{LabelAttribute, LabelConfig};
    use crate::timeline::test_support::{view, ymd, FakeHost};

    fn bar(start: Option<NaiveDate>, due: Option<NaiveDate>) -> WorkItem {
        WorkItem::new("Build", "Task", start, due)
    }

    #[test]
    fn test_is_empty_needs_one_date() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        assert!(r.is_empty(&bar(None, None)));
        assert!(!r.is_empty(&bar(Some(ymd(2024, 1, 1)), None)));
        assert!(!r.is_empty(&bar(None, Some(ymd(2024, 1, 1)))));
    }

    #[test]
    fn test_update_spans_inclusive_days() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let item = bar(Some(ymd(2024, 1, 3)), Some(ymd(2024, 1, 7)));
        let v = view();
        let info = RenderInfo::new(&item, &v);
        let mut node = r.render(&info);
        let mut labels = r.create_and_add_labels(&info);

        assert!(r.update(&mut node, Some(&mut labels), &info));
        assert_eq!(node.root.left, 20.0);
        assert_eq!(node.root.width, 50.0);
        assert_eq!(node.shape.background, Some(host.color));
        assert_eq!(labels.text(LabelSlot::Left), Some("03/01/2024"));
        assert_eq!(labels.text(LabelSlot::Right), Some("07/01/2024"));
        assert_eq!(labels.text(LabelSlot::FarRight), Some("Build"));
        assert_eq!(labels.text(LabelSlot::LeftHover), Some("03/01/2024"));
    }

    #[test]
    fn test_mouse_down_resolves_handles() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let mut item = bar(Some(ymd(2024, 1, 3)), Some(ymd(2024, 1, 7)));
        let v = view();
        let info = RenderInfo::new(&item, &v);
        let mut node = r.render(&info);
        r.update(&mut node, None, &info);
        let mut labels = r.create_and_add_labels(&info);

        let mut press = |x: f32, item: &mut WorkItem| {
            let mut ev = PointerEvent::at(x);
            r.on_mouse_down(&mut ev, None, item, &v, &mut labels, Some(&node))
        };
        assert_eq!(press(22.0, &mut item), BarDirection::Left);
        assert_eq!(press(45.0, &mut item), BarDirection::Both);
        assert_eq!(press(68.0, &mut item), BarDirection::Right);

        item.due_date = None;
        assert_eq!(press(68.0, &mut item), BarDirection::DragRight);
    }

    #[test]
    fn test_mouse_down_create_sets_both_dates() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let mut item = bar(None, None);
        let v = view();
        let mut labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        let mut ev = PointerEvent::at(0.0);

        let dir = r.on_mouse_down(&mut ev, Some(ymd(2024, 2, 1)), &mut item, &v, &mut labels, None);
        assert_eq!(dir, BarDirection::Create);
        assert_eq!(item.start_date(), Some(ymd(2024, 2, 1)));
        assert_eq!(item.due_date(), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn test_days_moved_clamps_edges() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let item = bar(Some(ymd(2024, 1, 3)), Some(ymd(2024, 1, 7)));
        let cursor = ymd(2024, 1, 1);

        let left = r.on_days_moved(&item, cursor, 10, BarDirection::Left);
        assert_eq!(left.start_date, Some(ymd(2024, 1, 7)));
        assert_eq!(left.due_date, None);

        let right = r.on_days_moved(&item, cursor, -10, BarDirection::Right);
        assert_eq!(right.due_date, Some(ymd(2024, 1, 3)));

        let both = r.on_days_moved(&item, cursor, 2, BarDirection::Both);
        assert_eq!(both.start_date, Some(ymd(2024, 1, 5)));
        assert_eq!(both.due_date, Some(ymd(2024, 1, 9)));

        let create = r.on_days_moved(&item, ymd(2024, 1, 12), 9, BarDirection::Create);
        assert_eq!(create.due_date, Some(ymd(2024, 1, 12)));
        let backwards = r.on_days_moved(&item, ymd(2023, 12, 1), -40, BarDirection::DragRight);
        assert_eq!(backwards.due_date, Some(ymd(2024, 1, 3)));
    }

    #[test]
    fn test_moves_past_date_range_leave_bar_unchanged() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let near_end = NaiveDate::MAX - chrono::Duration::days(2);
        let mut item = bar(Some(near_end), Some(NaiveDate::MAX));

        let both = r.on_days_moved(&item, NaiveDate::MAX, 5, BarDirection::Both);
        assert_eq!(both, BarMovement::default());
        let right = r.on_days_moved(&item, NaiveDate::MAX, 5, BarDirection::Right);
        assert_eq!(right.due_date, None);

        r.assign_date_values(&mut item, None, &both);
        assert_eq!(item.span(), Some((near_end, NaiveDate::MAX)));

        let left = r.on_days_moved(&item, NaiveDate::MAX, 1, BarDirection::Left);
        assert_eq!(left.start_date, near_end.succ_opt());
    }

    #[test]
    fn test_assign_leaves_unset_dates_alone() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let mut item = bar(Some(ymd(2024, 1, 3)), Some(ymd(2024, 1, 7)));
        let movement = BarMovement {
            start_date: None,
            due_date: Some(ymd(2024, 1, 9)),
        };
        r.assign_date_values(&mut item, None, &movement);
        assert_eq!(item.start_date(), Some(ymd(2024, 1, 3)));
        assert_eq!(item.due_date(), Some(ymd(2024, 1, 9)));
    }

    #[test]
    fn test_labels_are_not_rewritten_for_bars() {
        let host = FakeHost::new(LabelConfig {
            left: Some(LabelAttribute::Status),
            right: Some(LabelAttribute::DueDate),
            far_right: None,
        });
        let r = BarCellRenderer::new(&host);
        let item = bar(Some(ymd(2024, 1, 3)), Some(ymd(2024, 1, 7)));
        let v = view();
        let labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        assert_eq!(labels.text(LabelSlot::Left), Some("New"));
        assert_eq!(
            labels.right.as_ref().and_then(|l| l.attribute),
            Some(LabelAttribute::DueDate)
        );
        assert_eq!(labels.text(LabelSlot::FarRight), None);
    }

    #[test]
    fn test_relation_geometry() {
        let host = FakeHost::new(LabelConfig::default());
        let r = BarCellRenderer::new(&host);
        let item = bar(Some(ymd(2024, 1, 3)), Some(ymd(2024, 1, 7)));
        let v = view();
        let info = RenderInfo::new(&item, &v);
        assert_eq!(r.margin_left_of_left_side(&info), 20.0);
        assert_eq!(r.margin_left_of_right_side(&info), 70.0);
    }
}
