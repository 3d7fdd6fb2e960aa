//! Milestone cells: a single-day diamond that can be moved as a whole but
//! never resized.

use chrono::NaiveDate;
use egui::{Color32, CursorIcon};
use tracing::debug;

use super::labels::{
    CellLabels, Label, LabelAttribute, LabelSlot, FAR_RIGHT_LABEL_CLASS, HIDE_ON_HOVER_CLASS,
    HOVER_STYLE_CLASS, LEFT_LABEL_CLASS, RIGHT_HOVER_LABEL_CLASS, RIGHT_LABEL_CLASS,
    SHOW_ON_HOVER_CLASS,
};
use super::node::{CellNode, ElementBox, ShapeKind, DIAMOND_CLASS, TIMELINE_ELEMENT_CLASS};
use super::{scale, CellRenderer, PointerEvent, RenderInfo, TimelineHost};
use crate::model::{ViewParams, WorkItem};

/// Edge length of the diamond in pixels.
pub const MILESTONE_SIZE: f32 = 15.0;
pub const PLACEHOLDER_COLOR: Color32 = Color32::from_rgb(0xDD, 0xDD, 0xDD);

const MILESTONE_CLASS: &str = "milestone";

/// Drag directions a milestone can produce. Ranged bars use the wider
/// [`super::BarDirection`]; a milestone has no edges to resize, so it only
/// ever moves as a whole or is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneDirection {
    Both,
    Create,
}

/// Proposed target date while a milestone is dragged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MilestoneMovement {
    /// `None` while the item has no date yet; not an error.
    pub date: Option<NaiveDate>,
}

pub struct MilestoneCellRenderer<'h> {
    host: &'h dyn TimelineHost,
}

impl<'h> MilestoneCellRenderer<'h> {
    pub fn new(host: &'h dyn TimelineHost) -> Self {
        Self { host }
    }

    fn diamond_margin(view: &ViewParams) -> f32 {
        -(MILESTONE_SIZE / 2.0) + view.pixels_per_day / 2.0
    }
}

impl CellRenderer for MilestoneCellRenderer<'_> {
    type Direction = MilestoneDirection;
    type Movement = MilestoneMovement;

    fn host(&self) -> &dyn TimelineHost {
        self.host
    }

    fn kind(&self) -> &'static str {
        MILESTONE_CLASS
    }

    fn is_empty(&self, item: &WorkItem) -> bool {
        item.date().is_none()
    }

    fn render(&self, _info: &RenderInfo<'_>) -> CellNode {
        CellNode {
            root: ElementBox::new(&[TIMELINE_ELEMENT_CLASS, MILESTONE_CLASS]),
            shape: ElementBox::new(&[DIAMOND_CLASS]),
            kind: ShapeKind::Diamond,
        }
    }

    fn update(
        &self,
        node: &mut CellNode,
        labels: Option<&mut CellLabels>,
        info: &RenderInfo<'_>,
    ) -> bool {
        let view = info.view_params;
        let Some(date) = info.item.date() else {
            return false;
        };

        node.root.set_size(MILESTONE_SIZE, MILESTONE_SIZE);
        node.shape.set_size(MILESTONE_SIZE, MILESTONE_SIZE);
        node.shape.margin_left = Self::diamond_margin(view);
        node.shape.background = Some(self.host.type_color(info.item));

        let offset_start = scale::days_between(date, view.date_display_start);
        node.root.left = scale::offset_px(view, offset_start);

        if let Some(labels) = labels {
            self.update_labels(false, labels, info.item);
        }

        self.check_for_active_selection_mode(info, node);
        true
    }

    fn create_and_add_labels(&self, info: &RenderInfo<'_>) -> CellLabels {
        let mut labels = CellLabels {
            center: None,
            left: Some(Label::new(&[LEFT_LABEL_CLASS, HIDE_ON_HOVER_CLASS])),
            left_hover: None,
            right: Some(Label::new(&[RIGHT_LABEL_CLASS, HIDE_ON_HOVER_CLASS])),
            right_hover: Some(Label::new(&[
                RIGHT_HOVER_LABEL_CLASS,
                SHOW_ON_HOVER_CLASS,
                HOVER_STYLE_CLASS,
            ])),
            far_right: Some(Label::new(&[FAR_RIGHT_LABEL_CLASS, HIDE_ON_HOVER_CLASS])),
        };
        self.update_labels(false, &mut labels, info.item);
        labels
    }

    fn display_placeholder_under_cursor(&self, pointer_x: f32, info: &RenderInfo<'_>) -> CellNode {
        let view = info.view_params;
        let days = scale::day_at_offset(view, pointer_x);

        let mut root = ElementBox::new(&[TIMELINE_ELEMENT_CLASS, MILESTONE_CLASS]);
        root.pointer_events = false;
        root.set_size(MILESTONE_SIZE, MILESTONE_SIZE);
        root.left = scale::offset_px(view, days);

        let mut diamond = ElementBox::new(&[DIAMOND_CLASS]);
        diamond.pointer_events = false;
        diamond.set_size(MILESTONE_SIZE, MILESTONE_SIZE);
        diamond.margin_left = Self::diamond_margin(view);
        diamond.background = Some(PLACEHOLDER_COLOR);

        CellNode {
            root,
            shape: diamond,
            kind: ShapeKind::Diamond,
        }
    }

    fn on_mouse_down(
        &self,
        ev: &mut PointerEvent,
        date_for_create: Option<NaiveDate>,
        item: &mut WorkItem,
        view: &ViewParams,
        labels: &mut CellLabels,
        _node: Option<&CellNode>,
    ) -> MilestoneDirection {
        if self.delegate_to_selection_mode(ev, item, view) {
            // No drag starts; callers ignore the direction.
            return MilestoneDirection::Both;
        }

        self.host.force_cursor(CursorIcon::ResizeHorizontal);

        if let Some(date) = date_for_create {
            item.set_date(Some(date));
            return MilestoneDirection::Create;
        }

        self.update_labels(true, labels, item);
        MilestoneDirection::Both
    }

    fn on_days_moved(
        &self,
        item: &WorkItem,
        _day_under_cursor: NaiveDate,
        delta: i64,
        _direction: MilestoneDirection,
    ) -> MilestoneMovement {
        MilestoneMovement {
            date: item.date().and_then(|d| scale::shift_days(d, delta)),
        }
    }

    fn assign_date_values(
        &self,
        item: &mut WorkItem,
        labels: Option<&mut CellLabels>,
        movement: &MilestoneMovement,
    ) {
        if let Some(date) = movement.date {
            debug!(item = %item.id, %date, "milestone date assigned");
            item.set_date(Some(date));
        }
        if let Some(labels) = labels {
            self.update_labels(false, labels, item);
        }
    }

    fn margin_left_of_left_side(&self, info: &RenderInfo<'_>) -> f32 {
        let view = info.view_params;
        let start = info.item.date().unwrap_or(view.date_display_start);
        scale::offset_px(view, scale::days_between(start, view.date_display_start))
    }

    fn margin_left_of_right_side(&self, info: &RenderInfo<'_>) -> f32 {
        self.margin_left_of_left_side(info) + info.view_params.pixels_per_day
    }

    fn padding_left_for_incoming_relation_lines(&self, info: &RenderInfo<'_>) -> f32 {
        info.view_params.pixels_per_day / 2.0 - 1.0
    }

    fn padding_right_for_outgoing_relation_lines(&self, _info: &RenderInfo<'_>) -> f32 {
        MILESTONE_SIZE / 2.0
    }

    fn update_labels(&self, active_drag: bool, labels: &mut CellLabels, item: &WorkItem) {
        let config = self.host.normalized_labels(item);

        if active_drag {
            self.render_label(item, labels, LabelSlot::Left, None);
            self.render_label(item, labels, LabelSlot::Right, None);
            self.render_label(item, labels, LabelSlot::FarRight, None);
        } else {
            // A start/due pair collapses onto the single date, shown once.
            if config.left == Some(LabelAttribute::StartDate)
                && config.right == Some(LabelAttribute::DueDate)
            {
                self.render_label(item, labels, LabelSlot::Left, None);
                self.render_label(item, labels, LabelSlot::Right, Some(LabelAttribute::Date));
            } else {
                self.render_label(item, labels, LabelSlot::Left, config.left);
                self.render_label(item, labels, LabelSlot::Right, config.right);
            }
            self.render_label(item, labels, LabelSlot::FarRight, config.far_right);
        }

        self.render_hover_labels(labels, item);
    }

    fn render_label(
        &self,
        item: &WorkItem,
        labels: &mut CellLabels,
        slot: LabelSlot,
        attribute: Option<LabelAttribute>,
    ) {
        let attribute = attribute.map(|a| match a {
            LabelAttribute::StartDate | LabelAttribute::DueDate => LabelAttribute::Date,
            other => other,
        });
        if let Some(label) = labels.slot_mut(slot) {
            label.bind(item, attribute, self.host.date_format());
        }
    }

    fn render_hover_labels(&self, labels: &mut CellLabels, item: &WorkItem) {
        self.render_label(item, labels, LabelSlot::RightHover, Some(LabelAttribute::Date));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::model::SelectionMode;
    use crate::timeline::labels::LabelConfig;
    use crate::timeline::node::SELECTABLE_CLASS;
    use crate::timeline::test_support::{view, ymd, FakeHost};

    fn milestone(date: Option<&str>) -> WorkItem {
        let mut item = WorkItem::new_milestone("Launch", None);
        item.date = date.map(str::to_string);
        item
    }

    #[test]
    fn test_is_empty() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        assert!(r.is_empty(&milestone(None)));
        assert!(r.is_empty(&milestone(Some("garbage"))));
        assert!(r.is_empty(&milestone(Some(""))));
        let dated = milestone(Some("2024-03-01"));
        assert!(!r.is_empty(&dated));
        assert!(!r.is_empty(&dated));
        assert_eq!(dated.date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_render_builds_diamond() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-01-11"));
        let v = view();
        let node = r.render(&RenderInfo::new(&item, &v));
        assert!(node.root.has_class(TIMELINE_ELEMENT_CLASS));
        assert!(node.root.has_class("milestone"));
        assert!(node.shape.has_class(DIAMOND_CLASS));
        assert_eq!(node.kind, ShapeKind::Diamond);
    }

    #[test]
    fn test_update_positions_node() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-01-11"));
        let v = view();
        let info = RenderInfo::new(&item, &v);
        let mut node = r.render(&info);

        assert!(r.update(&mut node, None, &info));
        assert_eq!(node.root.left, 100.0);
        assert_eq!((node.root.width, node.root.height), (15.0, 15.0));
        assert_eq!((node.shape.width, node.shape.height), (15.0, 15.0));
        assert_eq!(node.shape.margin_left, -7.5 + 5.0);
        assert_eq!(node.shape.background, Some(host.color));
        assert!(!node.shape.has_class(SELECTABLE_CLASS));
    }

    #[test]
    fn test_update_before_view_start_is_negative() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2023-12-30"));
        let v = view();
        let info = RenderInfo::new(&item, &v);
        let mut node = r.render(&info);
        assert!(r.update(&mut node, None, &info));
        assert_eq!(node.root.left, -20.0);
    }

    #[test]
    fn test_update_rejects_invalid_date_and_keeps_node() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(Some("2024-01-11"));
        let v = view();
        let mut node = r.render(&RenderInfo::new(&item, &v));
        assert!(r.update(&mut node, None, &RenderInfo::new(&item, &v)));
        let before = node.clone();

        item.date = Some("31.02.2024".to_string());
        assert!(!r.update(&mut node, None, &RenderInfo::new(&item, &v)));
        assert_eq!(node, before);
    }

    #[test]
    fn test_update_marks_selectable_in_selection_mode() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-01-11"));
        let v = view().with_selection_mode(Some(SelectionMode::new(|_| {})));
        let info = RenderInfo::new(&item, &v);
        let mut node = r.render(&info);
        assert!(r.update(&mut node, None, &info));
        assert!(node.shape.has_class(SELECTABLE_CLASS));
    }

    #[test]
    fn test_placeholder_snaps_to_day() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        // The item is never consulted.
        let item = milestone(Some("not a date"));
        let v = view();
        let node = r.display_placeholder_under_cursor(37.0, &RenderInfo::new(&item, &v));
        assert_eq!(node.root.left, 30.0);
        assert!(!node.root.pointer_events);
        assert_eq!(node.shape.background, Some(PLACEHOLDER_COLOR));
    }

    #[test]
    fn test_start_due_config_collapses_to_single_date() {
        let host = FakeHost::new(LabelConfig {
            left: Some(LabelAttribute::StartDate),
            right: Some(LabelAttribute::DueDate),
            far_right: Some(LabelAttribute::Subject),
        });
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-03-01"));
        let v = view();
        let labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));

        assert_eq!(labels.text(LabelSlot::Left), None);
        assert_eq!(labels.text(LabelSlot::Right), Some("01/03/2024"));
        assert_eq!(
            labels.right.as_ref().and_then(|l| l.attribute),
            Some(LabelAttribute::Date)
        );
        assert_eq!(labels.text(LabelSlot::FarRight), Some("Launch"));
        assert_eq!(labels.text(LabelSlot::RightHover), Some("01/03/2024"));
        assert!(labels.left_hover.is_none());
        assert!(labels.center.is_none());
    }

    #[test]
    fn test_other_date_requests_rewrite_to_date() {
        let host = FakeHost::new(LabelConfig {
            left: Some(LabelAttribute::DueDate),
            right: Some(LabelAttribute::StartDate),
            far_right: Some(LabelAttribute::DueDate),
        });
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-03-01"));
        let v = view();
        let labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));

        for slot in [LabelSlot::Left, LabelSlot::Right, LabelSlot::FarRight] {
            assert_eq!(labels.text(slot), Some("01/03/2024"));
            assert_eq!(
                labels.slot(slot).and_then(|l| l.attribute),
                Some(LabelAttribute::Date)
            );
        }
    }

    #[test]
    fn test_active_drag_suppresses_static_labels() {
        let host = FakeHost::new(LabelConfig {
            left: Some(LabelAttribute::Subject),
            right: Some(LabelAttribute::Status),
            far_right: Some(LabelAttribute::Type),
        });
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-03-01"));
        let v = view();
        let mut labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        assert_eq!(labels.text(LabelSlot::Left), Some("Launch"));

        r.update_labels(true, &mut labels, &item);
        assert_eq!(labels.text(LabelSlot::Left), None);
        assert_eq!(labels.text(LabelSlot::Right), None);
        assert_eq!(labels.text(LabelSlot::FarRight), None);
        assert_eq!(labels.text(LabelSlot::RightHover), Some("01/03/2024"));
    }

    #[test]
    fn test_mouse_down_create_sets_date() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(None);
        let v = view();
        let mut labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        let mut ev = PointerEvent::at(0.0);

        let dir = r.on_mouse_down(&mut ev, Some(ymd(2024, 3, 1)), &mut item, &v, &mut labels, None);
        assert_eq!(dir, MilestoneDirection::Create);
        assert_eq!(item.date.as_deref(), Some("2024-03-01"));
        assert!(!ev.default_prevented);
    }

    #[test]
    fn test_mouse_down_move_forces_cursor() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(Some("2024-01-11"));
        let v = view();
        let mut labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        let mut ev = PointerEvent::at(100.0);

        let dir = r.on_mouse_down(&mut ev, None, &mut item, &v, &mut labels, None);
        assert_eq!(dir, MilestoneDirection::Both);
        assert_eq!(host.cursor.get(), Some(CursorIcon::ResizeHorizontal));
        assert_eq!(labels.text(LabelSlot::Right), None);
        assert_eq!(item.date.as_deref(), Some("2024-01-11"));
    }

    #[test]
    fn test_mouse_down_in_selection_mode_delegates_once() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(None);
        let hits = Rc::new(Cell::new(0));
        let picked = Rc::new(Cell::new(None));
        let (hits_cb, picked_cb) = (Rc::clone(&hits), Rc::clone(&picked));
        let v = view().with_selection_mode(Some(SelectionMode::new(move |wi| {
            hits_cb.set(hits_cb.get() + 1);
            picked_cb.set(Some(wi.id));
        })));
        let mut labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        let mut ev = PointerEvent::at(0.0);

        r.on_mouse_down(&mut ev, Some(ymd(2024, 3, 1)), &mut item, &v, &mut labels, None);
        assert_eq!(hits.get(), 1);
        assert_eq!(picked.get(), Some(item.id));
        assert!(ev.default_prevented);
        assert!(item.date.is_none());
        assert_eq!(host.cursor.get(), None);
    }

    #[test]
    fn test_days_moved_then_assign() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let base = ymd(2024, 3, 1);
        for k in [-30, -1, 0, 1, 30] {
            let mut item = milestone(Some("2024-03-01"));
            let movement = r.on_days_moved(&item, base, k, MilestoneDirection::Both);
            r.assign_date_values(&mut item, None, &movement);
            assert_eq!(item.date(), Some(base + chrono::Duration::days(k)));
        }
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-03-01"));
        let movement = r.on_days_moved(&item, ymd(2024, 3, 1), 0, MilestoneDirection::Both);
        assert_eq!(movement.date, Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn test_undated_item_yields_empty_movement_and_no_write() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(Some("bogus"));
        let movement = r.on_days_moved(&item, ymd(2024, 3, 1), 5, MilestoneDirection::Create);
        assert_eq!(movement, MilestoneMovement::default());

        r.assign_date_values(&mut item, None, &movement);
        assert_eq!(item.date.as_deref(), Some("bogus"));
    }

    #[test]
    fn test_move_past_date_range_yields_empty_movement() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(None);
        item.set_date(Some(NaiveDate::MAX));
        assert!(!r.is_empty(&item));

        let movement = r.on_days_moved(&item, NaiveDate::MAX, 1, MilestoneDirection::Both);
        assert_eq!(movement, MilestoneMovement::default());
        r.assign_date_values(&mut item, None, &movement);
        assert_eq!(item.date(), Some(NaiveDate::MAX));

        let back = r.on_days_moved(&item, NaiveDate::MAX, -1, MilestoneDirection::Both);
        assert_eq!(back.date, NaiveDate::MAX.pred_opt());
    }

    #[test]
    fn test_invalid_host_date_format_falls_back() {
        let mut host = FakeHost::new(LabelConfig::default());
        host.date_format = "%Q".to_string();
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-03-01"));
        let v = view();
        let labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        assert_eq!(labels.text(LabelSlot::Right), Some("01/03/2024"));
        assert_eq!(labels.text(LabelSlot::RightHover), Some("01/03/2024"));
    }

    #[test]
    fn test_assign_refreshes_labels() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let mut item = milestone(Some("2024-03-01"));
        let v = view();
        let mut labels = r.create_and_add_labels(&RenderInfo::new(&item, &v));
        r.update_labels(true, &mut labels, &item);

        let movement = MilestoneMovement {
            date: Some(ymd(2024, 3, 4)),
        };
        r.assign_date_values(&mut item, Some(&mut labels), &movement);
        assert_eq!(labels.text(LabelSlot::Right), Some("04/03/2024"));
        assert_eq!(labels.text(LabelSlot::RightHover), Some("04/03/2024"));
    }

    #[test]
    fn test_relation_geometry() {
        let host = FakeHost::new(LabelConfig::default());
        let r = MilestoneCellRenderer::new(&host);
        let item = milestone(Some("2024-01-04"));
        let v = view();
        let info = RenderInfo::new(&item, &v);
        assert_eq!(r.margin_left_of_left_side(&info), 30.0);
        assert_eq!(r.margin_left_of_right_side(&info), 40.0);
        assert_eq!(r.padding_left_for_incoming_relation_lines(&info), 4.0);
        assert_eq!(r.padding_right_for_outgoing_relation_lines(&info), 7.5);
    }
}
