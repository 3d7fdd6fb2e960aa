use std::cell::Cell;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use egui::{
    Align2, Color32, CursorIcon, Id, Painter, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2,
};
use uuid::Uuid;

use crate::config::TimelineSettings;
use crate::model::{
    Project, SelectionMode, TimelineScale, TimelineViewport, ViewParams, WorkItem,
};
use crate::timeline::labels::{
    format_date, CellLabels, Label, LabelConfig, LabelSlot, HOVER_STYLE_CLASS,
};
use crate::timeline::node::{CellNode, ShapeKind, SELECTABLE_CLASS};
use crate::timeline::{
    scale, BarCellRenderer, BarDirection, BarMovement, CellRenderer, DragController, DragOutcome,
    MilestoneCellRenderer, MilestoneDirection, MilestoneMovement, PointerDown, PointerEvent,
    RenderInfo, TimelineHost,
};
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Bridges the persisted settings to the cell renderers for one frame.
pub struct ChartHost<'s> {
    settings: &'s TimelineSettings,
    forced_cursor: Cell<Option<CursorIcon>>,
}

impl<'s> ChartHost<'s> {
    pub fn new(settings: &'s TimelineSettings) -> Self {
        Self {
            settings,
            forced_cursor: Cell::new(None),
        }
    }

    /// Cursor requested by a renderer since the last call.
    pub fn take_forced_cursor(&self) -> Option<CursorIcon> {
        self.forced_cursor.take()
    }
}

impl TimelineHost for ChartHost<'_> {
    fn normalized_labels(&self, item: &WorkItem) -> LabelConfig {
        self.settings.labels_for(&item.item_type)
    }

    fn type_color(&self, item: &WorkItem) -> Color32 {
        self.settings.color_for(&item.item_type)
    }

    fn force_cursor(&self, cursor: CursorIcon) {
        self.forced_cursor.set(Some(cursor));
    }

    fn date_format(&self) -> &str {
        &self.settings.date_format
    }
}

/// Result details from interactions in the timeline chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartInteraction {
    /// Item dates were written.
    pub changed: bool,
    pub status: Option<String>,
}

/// What a press on a row did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressResult {
    Ignored,
    /// Consumed by the active selection mode.
    Intercepted,
    Started,
}

struct TimelineCell {
    /// Drawn shape; `None` while the item lacks the dates to draw it.
    node: Option<CellNode>,
    labels: CellLabels,
    milestone: bool,
}

impl TimelineCell {
    fn new<R: CellRenderer>(renderer: &R, info: &RenderInfo<'_>) -> Self {
        let mut cell = Self {
            node: None,
            labels: renderer.create_and_add_labels(info),
            milestone: info.item.milestone,
        };
        cell.sync(renderer, info, true);
        cell
    }

    /// Build or reposition the node. Undated items never reach the
    /// renderer's `render`/`update` and keep no node.
    fn sync<R: CellRenderer>(&mut self, renderer: &R, info: &RenderInfo<'_>, with_labels: bool) {
        if renderer.is_empty(info.item) {
            self.node = None;
            return;
        }
        let node = self.node.get_or_insert_with(|| renderer.render(info));
        let labels = with_labels.then_some(&mut self.labels);
        if !renderer.update(node, labels, info) {
            self.node = None;
        }
    }
}

/// Retained chart state: one node per item plus the drag controllers, which
/// must survive between frames.
#[derive(Default)]
pub struct TimelineChart {
    cells: HashMap<Uuid, TimelineCell>,
    milestone_drag: DragController<MilestoneDirection, MilestoneMovement>,
    bar_drag: DragController<BarDirection, BarMovement>,
    drag_cursor: Option<CursorIcon>,
}

impl TimelineChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.milestone_drag.is_idle() && self.bar_drag.is_idle()
    }

    /// Item currently pressed or dragged.
    pub fn active_item(&self) -> Option<Uuid> {
        self.milestone_drag
            .active_item()
            .or_else(|| self.bar_drag.active_item())
    }

    /// Bring the cached node of `item` up to date. Returns the preview copy
    /// when the item is being dragged.
    fn refresh(
        &mut self,
        host: &dyn TimelineHost,
        item: &WorkItem,
        view: &ViewParams,
    ) -> Option<WorkItem> {
        if item.milestone {
            let renderer = MilestoneCellRenderer::new(host);
            refresh_cell(&renderer, &self.milestone_drag, &mut self.cells, item, view)
        } else {
            let renderer = BarCellRenderer::new(host);
            refresh_cell(&renderer, &self.bar_drag, &mut self.cells, item, view)
        }
    }

    fn placeholder(
        &self,
        host: &dyn TimelineHost,
        item: &WorkItem,
        pointer_x: f32,
        view: &ViewParams,
    ) -> CellNode {
        let info = RenderInfo::new(item, view);
        if item.milestone {
            MilestoneCellRenderer::new(host).display_placeholder_under_cursor(pointer_x, &info)
        } else {
            BarCellRenderer::new(host).display_placeholder_under_cursor(pointer_x, &info)
        }
    }

    /// Press on the row of `item_id` at `pointer_x` (timeline coordinates).
    /// Undated items are given a date under the pointer.
    pub fn begin_drag(
        &mut self,
        host: &ChartHost<'_>,
        project: &mut Project,
        item_id: Uuid,
        pointer_x: f32,
        view: &ViewParams,
    ) -> PressResult {
        if !self.is_idle() {
            return PressResult::Ignored;
        }
        let Some(item) = project.item_mut(item_id) else {
            return PressResult::Ignored;
        };

        let result = if item.milestone {
            let renderer = MilestoneCellRenderer::new(host);
            press(&renderer, &mut self.milestone_drag, &mut self.cells, item, pointer_x, view)
        } else {
            let renderer = BarCellRenderer::new(host);
            press(&renderer, &mut self.bar_drag, &mut self.cells, item, pointer_x, view)
        };

        if result == PressResult::Started {
            self.drag_cursor = host.take_forced_cursor();
        }
        result
    }

    /// Pointer moved to `pointer_x` while a drag is active. Returns `true`
    /// once the drag has a pending movement.
    pub fn drag_to(&mut self, host: &ChartHost<'_>, pointer_x: f32, view: &ViewParams) -> bool {
        if self.milestone_drag.active_item().is_some() {
            let renderer = MilestoneCellRenderer::new(host);
            self.milestone_drag
                .pointer_move(&renderer, pointer_x, view)
                .is_some()
        } else if self.bar_drag.active_item().is_some() {
            let renderer = BarCellRenderer::new(host);
            self.bar_drag.pointer_move(&renderer, pointer_x, view).is_some()
        } else {
            false
        }
    }

    /// Pointer released: commit the active drag.
    pub fn finish_drag(
        &mut self,
        host: &ChartHost<'_>,
        project: &mut Project,
        view: &ViewParams,
    ) -> ChartInteraction {
        self.drag_cursor = None;
        let Some(id) = self.active_item() else {
            return ChartInteraction::default();
        };
        let Some(item) = project.item_mut(id) else {
            self.milestone_drag.abort();
            self.bar_drag.abort();
            return ChartInteraction::default();
        };
        let labels = self.cells.get_mut(&id).map(|c| &mut c.labels);

        let interaction = if self.milestone_drag.active_item().is_some() {
            let renderer = MilestoneCellRenderer::new(host);
            let outcome = self.milestone_drag.pointer_up(&renderer, item, labels, view);
            describe(outcome, item, host.date_format())
        } else {
            let renderer = BarCellRenderer::new(host);
            let outcome = self.bar_drag.pointer_up(&renderer, item, labels, view);
            describe(outcome, item, host.date_format())
        };

        if interaction.changed {
            project.touch();
        }
        interaction
    }

    /// Abandon the active drag, restoring the item.
    pub fn cancel_drag(&mut self, host: &ChartHost<'_>, project: &mut Project) -> ChartInteraction {
        self.drag_cursor = None;
        let Some(id) = self.active_item() else {
            return ChartInteraction::default();
        };
        let Some(item) = project.item_mut(id) else {
            self.milestone_drag.abort();
            self.bar_drag.abort();
            return ChartInteraction::default();
        };
        let labels = self.cells.get_mut(&id).map(|c| &mut c.labels);

        if self.milestone_drag.active_item().is_some() {
            let renderer = MilestoneCellRenderer::new(host);
            let outcome = self.milestone_drag.cancel(&renderer, item, labels);
            describe(outcome, item, host.date_format())
        } else {
            let renderer = BarCellRenderer::new(host);
            let outcome = self.bar_drag.cancel(&renderer, item, labels);
            describe(outcome, item, host.date_format())
        }
    }

    /// A selection mode took over: an in-progress drag is cancelled and its
    /// item restored.
    pub fn yield_to_selection(
        &mut self,
        host: &ChartHost<'_>,
        project: &mut Project,
        view: &ViewParams,
    ) -> Option<ChartInteraction> {
        if view.active_selection_mode.is_none() || self.is_idle() {
            return None;
        }
        Some(self.cancel_drag(host, project))
    }

    /// Render the timeline chart area (central panel).
    pub fn show(
        &mut self,
        ui: &mut Ui,
        project: &mut Project,
        viewport: &mut TimelineViewport,
        settings: &TimelineSettings,
        selection: Option<SelectionMode>,
        selected_item: &mut Option<Uuid>,
    ) -> ChartInteraction {
        let host = ChartHost::new(settings);
        let linking = selection.is_some();
        let mut interaction = ChartInteraction::default();

        let available = ui.available_size();
        let chart_width = viewport.total_width().max(available.x);
        let mut view = viewport.view_params(selection);
        // The painted area can extend past the viewport end.
        view.date_display_end = scale::date_at_offset(&view, chart_width);
        let rows = project.items.len();
        let chart_height =
            (HEADER_HEIGHT + rows as f32 * (ROW_HEIGHT + ROW_PADDING) + 40.0).max(available.y);

        // Handle zoom with scroll wheel
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
            if scroll_delta.y > 0.0 {
                viewport.zoom_in();
            } else if scroll_delta.y < 0.0 {
                viewport.zoom_out();
            }
        }

        if !self.is_idle() && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            interaction = self.cancel_drag(&host, project);
        }
        if let Some(cancelled) = self.yield_to_selection(&host, project, &view) {
            interaction = cancelled;
        }

        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .drag_to_scroll(false)
            .show(ui, |ui| {
                let (response, painter) =
                    ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::click());
                let origin = response.rect.min;
                let pointer = ui.input(|i| i.pointer.latest_pos());

                // Continue or finish a drag started on an earlier frame
                if !self.is_idle() {
                    if let Some(pos) = pointer {
                        self.drag_to(&host, pos.x - origin.x, &view);
                    }
                    let released =
                        ui.input(|i| i.pointer.primary_released() || !i.pointer.primary_down());
                    if released {
                        interaction = self.finish_drag(&host, project, &view);
                    }
                }

                painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
                draw_timeline_header(&painter, origin, viewport, chart_width, chart_height);
                draw_row_backgrounds(&painter, origin, rows, chart_width);

                self.cells
                    .retain(|id, _| project.items.iter().any(|item| item.id == *id));

                let mut row_centers = HashMap::new();
                let mut previews = HashMap::new();
                let mut pressed: Option<(Uuid, f32)> = None;
                let mut consumed_click = false;
                let idle = self.is_idle();
                let primary_pressed = ui.input(|i| i.pointer.primary_pressed());

                for (row, item) in project.items.iter().enumerate() {
                    let row_top =
                        origin.y + HEADER_HEIGHT + row as f32 * (ROW_HEIGHT + ROW_PADDING);
                    let center_y = row_top + ROW_PADDING + ROW_HEIGHT / 2.0;
                    row_centers.insert(item.id, center_y - origin.y);

                    let preview = self.refresh(&host, item, &view);
                    let in_view = preview
                        .as_ref()
                        .unwrap_or(item)
                        .span()
                        .is_some_and(|(first, last)| view.overlaps(first, last));
                    if let Some(preview) = preview {
                        previews.insert(item.id, preview);
                    }
                    let Some(cell) = self.cells.get(&item.id) else {
                        continue;
                    };
                    let node = cell.node.as_ref();
                    let is_selected = *selected_item == Some(item.id);
                    let row_rect = Rect::from_min_size(
                        Pos2::new(origin.x, row_top),
                        Vec2::new(chart_width, ROW_HEIGHT + ROW_PADDING),
                    );

                    let hit_rect = match node {
                        Some(node) => shape_rect(node, origin.x, center_y).expand(4.0),
                        None => row_rect,
                    };
                    let cell_response = ui.interact(
                        hit_rect,
                        Id::new(("timeline-cell", item.id)),
                        Sense::click_and_drag(),
                    );
                    let hovered = cell_response.hovered();
                    let dragged_here = self.active_item() == Some(item.id);

                    if let Some(node) = node {
                        if in_view || dragged_here {
                            let highlight = hovered || dragged_here;
                            paint_cell(
                                &painter,
                                origin.x,
                                center_y,
                                node,
                                &cell.labels,
                                highlight,
                                is_selected,
                            );
                        }
                    } else if hovered && idle && !linking {
                        if let Some(pos) = pointer {
                            let node = self.placeholder(&host, item, pos.x - origin.x, &view);
                            paint_shape(&painter, origin.x, center_y, &node, None);
                        }
                    }

                    if hovered && idle {
                        let cursor = if linking {
                            CursorIcon::PointingHand
                        } else if node.is_some() {
                            CursorIcon::Grab
                        } else {
                            CursorIcon::Crosshair
                        };
                        ui.ctx().set_cursor_icon(cursor);

                        if node.is_some() {
                            show_item_tooltip(ui, item, &host);
                        }
                    }

                    if hovered && idle && primary_pressed {
                        if let Some(pos) = pointer {
                            pressed = Some((item.id, pos.x - origin.x));
                        }
                        consumed_click = true;
                    }
                    if cell_response.clicked() {
                        consumed_click = true;
                    }
                }

                draw_relations(&painter, origin, project, &previews, &row_centers, &host, &view);
                draw_today_line(&painter, origin, viewport, chart_height);

                if let Some((id, x)) = pressed {
                    match self.begin_drag(&host, project, id, x, &view) {
                        PressResult::Started => *selected_item = Some(id),
                        PressResult::Intercepted | PressResult::Ignored => {}
                    }
                }

                if !self.is_idle() {
                    ui.ctx()
                        .set_cursor_icon(self.drag_cursor.unwrap_or(CursorIcon::Grabbing));
                }

                // Empty click on background clears selection
                if response.clicked() && !consumed_click && !linking {
                    *selected_item = None;
                }
            });

        interaction
    }
}

fn refresh_cell<R: CellRenderer>(
    renderer: &R,
    drag: &DragController<R::Direction, R::Movement>,
    cells: &mut HashMap<Uuid, TimelineCell>,
    item: &WorkItem,
    view: &ViewParams,
) -> Option<WorkItem> {
    let active = drag.active_item() == Some(item.id);
    let preview = if active { drag.preview(renderer, item.id) } else { None };
    let shown = preview.as_ref().unwrap_or(item);
    let info = RenderInfo::new(shown, view);

    let cell = cells
        .entry(item.id)
        .or_insert_with(|| TimelineCell::new(renderer, &info));
    if cell.milestone != item.milestone {
        *cell = TimelineCell::new(renderer, &info);
    }

    // Labels of the pressed item belong to the drag until release.
    cell.sync(renderer, &info, !active);
    if active && preview.is_some() {
        renderer.update_labels(true, &mut cell.labels, shown);
    }
    preview
}

fn press<R: CellRenderer>(
    renderer: &R,
    drag: &mut DragController<R::Direction, R::Movement>,
    cells: &mut HashMap<Uuid, TimelineCell>,
    item: &mut WorkItem,
    pointer_x: f32,
    view: &ViewParams,
) -> PressResult {
    let date_for_create = renderer
        .is_empty(item)
        .then(|| scale::date_at_offset(view, pointer_x));

    let cell = cells
        .entry(item.id)
        .or_insert_with(|| TimelineCell::new(renderer, &RenderInfo::new(item, view)));
    let TimelineCell { node, labels, .. } = cell;

    let mut ev = PointerEvent::at(pointer_x);
    match drag.pointer_down(renderer, &mut ev, date_for_create, item, view, labels, node.as_ref()) {
        PointerDown::Intercepted => PressResult::Intercepted,
        PointerDown::Started(_) => PressResult::Started,
    }
}

fn describe<M>(outcome: DragOutcome<M>, item: &WorkItem, date_format: &str) -> ChartInteraction {
    match outcome {
        DragOutcome::Ignored => ChartInteraction::default(),
        DragOutcome::Committed { delta_days: 0, .. } => ChartInteraction::default(),
        DragOutcome::Committed { delta_days, .. } => ChartInteraction {
            changed: true,
            status: Some(format!(
                "Moved '{}' by {} day(s) ({})",
                item.subject,
                delta_days,
                span_text(item, date_format)
            )),
        },
        DragOutcome::Created { .. } => ChartInteraction {
            changed: true,
            status: Some(format!(
                "Scheduled '{}' on {}",
                item.subject,
                span_text(item, date_format)
            )),
        },
        DragOutcome::Cancelled { .. } => ChartInteraction {
            changed: false,
            status: Some(format!("Drag of '{}' cancelled", item.subject)),
        },
    }
}

/// Human readable date or date range of an item.
pub fn span_text(item: &WorkItem, date_format: &str) -> String {
    match item.span() {
        None => "no date".to_string(),
        Some((a, b)) if a == b => format_date(a, date_format),
        Some((a, b)) => format!(
            "{} → {}",
            format_date(a, date_format),
            format_date(b, date_format)
        ),
    }
}

/// Screen rect of the node's shape, vertically centred on `center_y`.
fn shape_rect(node: &CellNode, origin_x: f32, center_y: f32) -> Rect {
    let (left, _) = node.shape_span();
    let rect = Rect::from_min_size(
        Pos2::new(origin_x + left, center_y - node.shape.height / 2.0),
        Vec2::new(node.shape.width, node.shape.height),
    );
    match node.kind {
        // The square is drawn rotated by 45°.
        ShapeKind::Diamond => Rect::from_center_size(
            rect.center(),
            Vec2::splat(node.shape.width * std::f32::consts::SQRT_2),
        ),
        ShapeKind::Bar => rect,
    }
}

fn paint_shape(
    painter: &Painter,
    origin_x: f32,
    center_y: f32,
    node: &CellNode,
    outline: Option<Stroke>,
) -> Rect {
    let rect = shape_rect(node, origin_x, center_y);
    let fill = node.shape.background.unwrap_or(theme::ACCENT);
    match node.kind {
        ShapeKind::Diamond => {
            let c = rect.center();
            let r = rect.width() / 2.0;
            let points = vec![
                Pos2::new(c.x, c.y - r),
                Pos2::new(c.x + r, c.y),
                Pos2::new(c.x, c.y + r),
                Pos2::new(c.x - r, c.y),
            ];
            painter.add(Shape::convex_polygon(
                points,
                fill,
                outline.unwrap_or(Stroke::NONE),
            ));
        }
        ShapeKind::Bar => {
            let rounding = Rounding::same(theme::BAR_ROUNDING);
            painter.rect_filled(rect, rounding, fill);
            if let Some(stroke) = outline {
                painter.rect_stroke(rect.expand(1.5), rounding, stroke);
            }
        }
    }
    rect
}

#[allow(clippy::too_many_arguments)]
fn paint_cell(
    painter: &Painter,
    origin_x: f32,
    center_y: f32,
    node: &CellNode,
    labels: &CellLabels,
    hovered: bool,
    selected: bool,
) {
    let outline = if node.shape.has_class(SELECTABLE_CLASS) {
        Some(Stroke::new(2.0, theme::SELECTABLE_OUTLINE))
    } else if selected {
        Some(Stroke::new(2.0, theme::BORDER_ACCENT))
    } else {
        None
    };
    let rect = paint_shape(painter, origin_x, center_y, node, outline);

    let shown = |label: &Label| {
        !label.is_empty()
            && if hovered {
                !label.hides_on_hover()
            } else {
                !label.shows_on_hover()
            }
    };
    let gap = theme::LABEL_GAP;

    if let Some(center) = labels.slot(LabelSlot::Center).filter(|l| shown(l)) {
        paint_label(painter, center, Pos2::new(rect.left() + gap, center_y), Align2::LEFT_CENTER);
    }
    for slot in [LabelSlot::Left, LabelSlot::LeftHover] {
        if let Some(label) = labels.slot(slot).filter(|l| shown(l)) {
            let anchor = Pos2::new(rect.left() - gap, center_y);
            paint_label(painter, label, anchor, Align2::RIGHT_CENTER);
        }
    }
    let mut right_edge = rect.right();
    for slot in [LabelSlot::Right, LabelSlot::RightHover] {
        if let Some(label) = labels.slot(slot).filter(|l| shown(l)) {
            let anchor = Pos2::new(rect.right() + gap, center_y);
            let r = paint_label(painter, label, anchor, Align2::LEFT_CENTER);
            right_edge = right_edge.max(r.right());
        }
    }
    if let Some(label) = labels.slot(LabelSlot::FarRight).filter(|l| shown(l)) {
        let anchor = Pos2::new(right_edge + gap * 2.0, center_y);
        paint_label(painter, label, anchor, Align2::LEFT_CENTER);
    }
}

fn paint_label(painter: &Painter, label: &Label, anchor: Pos2, align: Align2) -> Rect {
    let Some(text) = label.text.as_deref() else {
        return Rect::from_min_size(anchor, Vec2::ZERO);
    };
    let hover_style = label.classes.contains(&HOVER_STYLE_CLASS);
    let color = if hover_style {
        theme::TEXT_PRIMARY
    } else {
        theme::TEXT_SECONDARY
    };
    let galley = painter.layout_no_wrap(text.to_string(), theme::font_label(), color);
    let rect = align.anchor_size(anchor, galley.size());
    if hover_style {
        painter.rect_filled(
            rect.expand2(Vec2::new(4.0, 1.0)),
            Rounding::same(3.0),
            theme::LABEL_HOVER_BG,
        );
    }
    painter.galley(rect.min, galley, color);
    rect
}

fn show_item_tooltip(ui: &Ui, item: &WorkItem, host: &ChartHost<'_>) {
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        Id::new(("timeline-tip", item.id)),
        |ui| {
            ui.strong(&item.subject);
            ui.label(format!("{} · {}", item.item_type, item.status));
            ui.label(span_text(item, host.date_format()));
        },
    );
}

/// Polyline of a relation arrow in timeline coordinates. Leaves the source
/// horizontally at `out_x` and enters the target vertically at `in_x`.
pub fn relation_path(out_x: f32, from_y: f32, in_x: f32, to_y: f32) -> Vec<Pos2> {
    let down = to_y > from_y;
    let edge = if down {
        to_y - ROW_HEIGHT / 2.0 + 4.0
    } else {
        to_y + ROW_HEIGHT / 2.0 - 4.0
    };
    if in_x >= out_x {
        vec![
            Pos2::new(out_x, from_y),
            Pos2::new(in_x, from_y),
            Pos2::new(in_x, edge),
        ]
    } else {
        // Target lies behind the source: detour through the row gap.
        let half = (ROW_HEIGHT + ROW_PADDING) / 2.0;
        let mid = if down { from_y + half } else { from_y - half };
        vec![
            Pos2::new(out_x, from_y),
            Pos2::new(out_x, mid),
            Pos2::new(in_x, mid),
            Pos2::new(in_x, edge),
        ]
    }
}

fn relation_anchors<R: CellRenderer>(renderer: &R, info: &RenderInfo<'_>) -> (f32, f32) {
    (
        renderer.margin_left_of_left_side(info)
            + renderer.padding_left_for_incoming_relation_lines(info),
        renderer.margin_left_of_right_side(info)
            + renderer.padding_right_for_outgoing_relation_lines(info),
    )
}

fn anchors(host: &dyn TimelineHost, item: &WorkItem, view: &ViewParams) -> Option<(f32, f32)> {
    let info = RenderInfo::new(item, view);
    if item.milestone {
        let renderer = MilestoneCellRenderer::new(host);
        (!renderer.is_empty(item)).then(|| relation_anchors(&renderer, &info))
    } else {
        let renderer = BarCellRenderer::new(host);
        (!renderer.is_empty(item)).then(|| relation_anchors(&renderer, &info))
    }
}

fn draw_relations(
    painter: &Painter,
    origin: Pos2,
    project: &Project,
    previews: &HashMap<Uuid, WorkItem>,
    row_centers: &HashMap<Uuid, f32>,
    host: &ChartHost<'_>,
    view: &ViewParams,
) {
    let shown = |id: Uuid| previews.get(&id).or_else(|| project.item(id));
    let stroke = Stroke::new(1.2, theme::RELATION_LINE);

    for relation in &project.relations {
        let (Some(from), Some(to)) = (shown(relation.from), shown(relation.to)) else {
            continue;
        };
        let (Some(&from_y), Some(&to_y)) = (row_centers.get(&from.id), row_centers.get(&to.id))
        else {
            continue;
        };
        let (Some((_, out_x)), Some((in_x, _))) =
            (anchors(host, from, view), anchors(host, to, view))
        else {
            continue;
        };

        let points: Vec<Pos2> = relation_path(out_x, from_y, in_x, to_y)
            .into_iter()
            .map(|p| origin + p.to_vec2())
            .collect();
        if let (Some(&tip), Some(&before)) = (points.last(), points.iter().rev().nth(1)) {
            let dir = if tip.y > before.y { 1.0 } else { -1.0 };
            painter.add(Shape::convex_polygon(
                vec![
                    tip,
                    Pos2::new(tip.x - 4.0, tip.y - 6.0 * dir),
                    Pos2::new(tip.x + 4.0, tip.y - 6.0 * dir),
                ],
                theme::RELATION_LINE,
                Stroke::NONE,
            ));
        }
        painter.add(Shape::line(points, stroke));
    }
}

fn draw_row_backgrounds(painter: &Painter, origin: Pos2, rows: usize, width: f32) {
    for i in 0..rows {
        let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING);
        let row_bg = if i % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, ROW_HEIGHT + ROW_PADDING)),
            0.0,
            row_bg,
        );
        painter.line_segment(
            [
                Pos2::new(origin.x, y + ROW_HEIGHT + ROW_PADDING),
                Pos2::new(origin.x + width, y + ROW_HEIGHT + ROW_PADDING),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_timeline_header(
    painter: &Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let grid = |x: f32| {
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    };
    let month_label = |x: f32, date: NaiveDate, y: f32| {
        painter.text(
            Pos2::new(x + 3.0, origin.y + y),
            Align2::LEFT_CENTER,
            date.format("%b %Y").to_string(),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    };

    let mut date = viewport.start;
    let end = viewport.end;

    match viewport.scale {
        TimelineScale::Days => {
            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid(x);
                if viewport.pixels_per_day >= 20.0 {
                    let is_weekend = date.weekday().num_days_from_monday() >= 5;
                    let day_color = if is_weekend {
                        theme::TEXT_DIM
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 28.0),
                        Align2::LEFT_CENTER,
                        date.format("%d").to_string(),
                        theme::font_sub(),
                        day_color,
                    );
                }
                if date.day() == 1 {
                    month_label(x, date, 12.0);
                }
                let Some(next) = date.succ_opt() else {
                    break;
                };
                date = next;
            }
        }
        TimelineScale::Weeks => {
            let weekday = date.weekday().num_days_from_monday() as i64;
            date = scale::shift_days(date, -weekday).unwrap_or(date);
            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid(x);
                painter.text(
                    Pos2::new(x + 3.0, origin.y + 28.0),
                    Align2::LEFT_CENTER,
                    date.format("W%V").to_string(),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );
                if date.day() <= 7 {
                    month_label(x, date, 12.0);
                }
                let Some(next) = scale::shift_days(date, 7) else {
                    break;
                };
                date = next;
            }
        }
        TimelineScale::Months => {
            date = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
            while date <= end {
                let x = origin.x + viewport.date_to_x(date);
                grid(x);
                month_label(x + 2.0, date, 18.0);
                let Some(next) = date.checked_add_months(chrono::Months::new(1)) else {
                    break;
                };
                date = next;
            }
        }
    }
}

fn draw_today_line(painter: &Painter, origin: Pos2, viewport: &TimelineViewport, height: f32) {
    let today = chrono::Local::now().date_naive();
    if today < viewport.start || today > viewport.end {
        return;
    }
    let x = origin.x + viewport.date_to_x(today);

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}
