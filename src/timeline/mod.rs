//! Timeline cell rendering and pointer interaction.
//!
//! A [`CellRenderer`] knows how to draw one shape of work item (milestone
//! diamond, ranged bar), which labels to show beside it, and how pointer
//! drags translate into date changes. The [`drag::DragController`] drives a
//! renderer through a press/move/release sequence.

pub mod bar;
pub mod drag;
pub mod labels;
pub mod milestone;
pub mod node;
pub mod scale;

use std::fmt;

use chrono::NaiveDate;
use egui::{Color32, CursorIcon};

use crate::model::{ViewParams, WorkItem};
use labels::{CellLabels, LabelAttribute, LabelConfig, LabelSlot};
use node::{CellNode, SELECTABLE_CLASS};

pub use bar::{BarCellRenderer, BarDirection, BarMovement};
pub use drag::{DragController, DragOutcome, PointerDown};
pub use milestone::{MilestoneCellRenderer, MilestoneDirection, MilestoneMovement};

/// Default display format for date labels.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// The item being drawn together with the current view parameters.
#[derive(Debug, Clone, Copy)]
pub struct RenderInfo<'a> {
    pub item: &'a WorkItem,
    pub view_params: &'a ViewParams,
}

impl<'a> RenderInfo<'a> {
    pub fn new(item: &'a WorkItem, view_params: &'a ViewParams) -> Self {
        Self { item, view_params }
    }
}

/// A pointer press delivered to a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Horizontal position relative to the timeline origin.
    pub x: f32,
    pub default_prevented: bool,
}

impl PointerEvent {
    pub fn at(x: f32) -> Self {
        Self {
            x,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Services the surrounding timeline provides to its cell renderers.
pub trait TimelineHost {
    /// Label configuration in effect for this item's type.
    fn normalized_labels(&self, item: &WorkItem) -> LabelConfig;

    /// Tint for this item's type.
    fn type_color(&self, item: &WorkItem) -> Color32;

    /// Override the pointer cursor for the rest of the current drag.
    fn force_cursor(&self, cursor: CursorIcon);

    fn date_format(&self) -> &str {
        DEFAULT_DATE_FORMAT
    }
}

/// Rendering and interaction behaviour for one shape of timeline cell.
pub trait CellRenderer {
    /// Which edge (or the whole cell) a drag acts on.
    type Direction: Copy + fmt::Debug + PartialEq;
    /// Proposed new dates produced while dragging.
    type Movement: Clone + fmt::Debug + Default + PartialEq;

    fn host(&self) -> &dyn TimelineHost;

    /// Short name of the shape, also used as CSS-like class on the root.
    fn kind(&self) -> &'static str;

    /// Whether the item lacks the dates needed to draw this shape.
    fn is_empty(&self, item: &WorkItem) -> bool;

    /// Build a fresh node for the item. Call [`CellRenderer::update`] to
    /// position it.
    fn render(&self, info: &RenderInfo<'_>) -> CellNode;

    /// Reposition and restyle `node` in place. Returns `false`, leaving the
    /// node untouched, when the item can no longer be drawn.
    fn update(
        &self,
        node: &mut CellNode,
        labels: Option<&mut CellLabels>,
        info: &RenderInfo<'_>,
    ) -> bool;

    /// Allocate the label slots for a cell and bind them.
    fn create_and_add_labels(&self, info: &RenderInfo<'_>) -> CellLabels;

    /// Non-interactive preview shown under the cursor before a create drag.
    fn display_placeholder_under_cursor(&self, pointer_x: f32, info: &RenderInfo<'_>) -> CellNode;

    /// Start an interaction. `date_for_create` is set when the user presses
    /// on the empty row of an undated item.
    fn on_mouse_down(
        &self,
        ev: &mut PointerEvent,
        date_for_create: Option<NaiveDate>,
        item: &mut WorkItem,
        view: &ViewParams,
        labels: &mut CellLabels,
        node: Option<&CellNode>,
    ) -> Self::Direction;

    /// Proposed dates after moving `delta` days in `direction`.
    fn on_days_moved(
        &self,
        item: &WorkItem,
        day_under_cursor: NaiveDate,
        delta: i64,
        direction: Self::Direction,
    ) -> Self::Movement;

    /// Write a movement into the item. The only place dates are committed.
    fn assign_date_values(
        &self,
        item: &mut WorkItem,
        labels: Option<&mut CellLabels>,
        movement: &Self::Movement,
    );

    fn margin_left_of_left_side(&self, info: &RenderInfo<'_>) -> f32;

    fn margin_left_of_right_side(&self, info: &RenderInfo<'_>) -> f32;

    fn padding_left_for_incoming_relation_lines(&self, info: &RenderInfo<'_>) -> f32;

    fn padding_right_for_outgoing_relation_lines(&self, info: &RenderInfo<'_>) -> f32;

    fn update_labels(&self, active_drag: bool, labels: &mut CellLabels, item: &WorkItem);

    /// Bind `attribute` into `slot`, if the cell has that slot.
    fn render_label(
        &self,
        item: &WorkItem,
        labels: &mut CellLabels,
        slot: LabelSlot,
        attribute: Option<LabelAttribute>,
    ) {
        if let Some(label) = labels.slot_mut(slot) {
            label.bind(item, attribute, self.host().date_format());
        }
    }

    fn render_hover_labels(&self, labels: &mut CellLabels, item: &WorkItem) {
        self.render_label(item, labels, LabelSlot::LeftHover, Some(LabelAttribute::StartDate));
        self.render_label(item, labels, LabelSlot::RightHover, Some(LabelAttribute::DueDate));
    }

    /// Hand the press to an active selection mode instead of dragging.
    /// Returns `true` when the press was consumed.
    fn delegate_to_selection_mode(
        &self,
        ev: &mut PointerEvent,
        item: &WorkItem,
        view: &ViewParams,
    ) -> bool {
        match &view.active_selection_mode {
            Some(mode) => {
                mode.select(item);
                ev.prevent_default();
                true
            }
            None => false,
        }
    }

    /// Mark the shape as pickable while a selection mode is active.
    fn check_for_active_selection_mode(&self, info: &RenderInfo<'_>, node: &mut CellNode) {
        node.shape
            .set_class(SELECTABLE_CLASS, info.view_params.active_selection_mode.is_some());
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::Cell;
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use egui::{Color32, CursorIcon};

    use super::labels::LabelConfig;
    use super::{TimelineHost, DEFAULT_DATE_FORMAT};
    use crate::model::{ViewParams, WorkItem};

    pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn view() -> ViewParams {
        ViewParams::new(ymd(2024, 1, 1), ymd(2024, 6, 30), 10.0)
    }

    /// In-memory host recording forced cursors.
    pub struct FakeHost {
        pub labels: LabelConfig,
        pub per_type: HashMap<String, LabelConfig>,
        pub color: Color32,
        pub cursor: Cell<Option<CursorIcon>>,
        pub date_format: String,
    }

    impl FakeHost {
        pub fn new(labels: LabelConfig) -> Self {
            Self {
                labels,
                per_type: HashMap::new(),
                color: Color32::from_rgb(255, 165, 0),
                cursor: Cell::new(None),
                date_format: DEFAULT_DATE_FORMAT.to_string(),
            }
        }
    }

    impl TimelineHost for FakeHost {
        fn normalized_labels(&self, item: &WorkItem) -> LabelConfig {
            self.per_type
                .get(&item.item_type)
                .copied()
                .unwrap_or(self.labels)
        }

        fn type_color(&self, _item: &WorkItem) -> Color32 {
            self.color
        }

        fn force_cursor(&self, cursor: CursorIcon) {
            self.cursor.set(Some(cursor));
        }

        fn date_format(&self) -> &str {
            &self.date_format
        }
    }
}
