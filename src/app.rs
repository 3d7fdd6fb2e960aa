use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use crate::config::SettingsStore;
use crate::io::PROJECT_EXTENSION;
use crate::model::{Project, Relation, SelectionMode, TimelineViewport, WorkItem};
use crate::ui;
use crate::ui::timeline_chart::TimelineChart;

/// Fields of the "Add Item" dialog.
#[derive(Debug, Clone)]
pub struct NewItemForm {
    pub subject: String,
    pub item_type: String,
    pub milestone: bool,
    /// Create without dates, to be placed on the chart later.
    pub undated: bool,
    pub start: NaiveDate,
    pub due: NaiveDate,
}

impl Default for NewItemForm {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            subject: String::new(),
            item_type: "Milestone".to_string(),
            milestone: true,
            undated: false,
            start: today,
            due: today + chrono::Duration::days(7),
        }
    }
}

impl NewItemForm {
    pub fn build(&self) -> WorkItem {
        let subject = if self.subject.trim().is_empty() {
            if self.milestone { "New Milestone" } else { "New Item" }.to_string()
        } else {
            self.subject.trim().to_string()
        };

        let mut item = if self.milestone {
            WorkItem::new_milestone(subject, (!self.undated).then_some(self.start))
        } else if self.undated {
            WorkItem::new(subject, self.item_type.clone(), None, None)
        } else {
            let due = self.due.max(self.start);
            WorkItem::new(subject, self.item_type.clone(), Some(self.start), Some(due))
        };
        item.item_type = self.item_type.clone();
        item
    }
}

/// Main application state.
pub struct TimelineApp {
    pub project: Project,
    pub viewport: TimelineViewport,
    pub file_path: Option<PathBuf>,
    pub selected_item: Option<Uuid>,
    pub settings: SettingsStore,
    pub chart: TimelineChart,

    // Dialog state
    pub show_add_item: bool,
    pub show_about: bool,
    pub new_item: NewItemForm,

    pub status_message: String,

    /// Item whose successor is being picked on the chart.
    pub link_source: Option<Uuid>,
    link_target: Rc<RefCell<Option<Uuid>>>,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        ui::theme::apply_theme(&cc.egui_ctx);
        Self::with_settings(SettingsStore::load())
    }

    pub fn with_settings(settings: SettingsStore) -> Self {
        let project = Self::sample_project();
        let today = chrono::Local::now().date_naive();
        let (first, last) = project.date_range().unwrap_or((today, today));
        let pixels_per_day = settings.settings.default_pixels_per_day;
        let mut viewport = TimelineViewport::new(today, today, pixels_per_day);
        viewport.fit(first, last);

        Self {
            project,
            viewport,
            file_path: None,
            selected_item: None,
            settings,
            chart: TimelineChart::new(),
            show_add_item: false,
            show_about: false,
            new_item: NewItemForm::default(),
            status_message: "Ready".to_string(),
            link_source: None,
            link_target: Rc::new(RefCell::new(None)),
        }
    }

    /// Generate a sample project for demonstration.
    fn sample_project() -> Project {
        let today = chrono::Local::now().date_naive();
        let day = |n: i64| today + chrono::Duration::days(n);
        let mut project = Project::new("Sample Release");

        let planning = WorkItem::new("Planning", "Phase", Some(day(-5)), Some(day(8)));
        let mut kickoff = WorkItem::new_milestone("Kickoff", Some(day(-5)));
        kickoff.status = "Closed".to_string();
        let design = WorkItem::new("UI Design", "Task", Some(day(6)), Some(day(18)));
        let backend = WorkItem::new("Backend", "Feature", Some(day(6)), Some(day(28)));
        let freeze = WorkItem::new_milestone("Feature Freeze", Some(day(28)));
        let launch = WorkItem::new_milestone("Launch", Some(day(32)));
        let retro = WorkItem::new_milestone("Retrospective", None);

        for (from, to) in [
            (kickoff.id, planning.id),
            (planning.id, design.id),
            (backend.id, freeze.id),
            (freeze.id, launch.id),
        ] {
            project.add_relation(Relation { from, to });
        }
        project.items = vec![kickoff, planning, design, backend, freeze, launch, retro];
        project
    }

    // --- File operations ---

    pub fn new_project(&mut self) {
        self.project = Project::default();
        self.file_path = None;
        self.selected_item = None;
        self.link_source = None;
        self.chart = TimelineChart::new();
        self.status_message = "New project created".to_string();
    }

    pub fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Project", &[PROJECT_EXTENSION, "json"])
            .pick_file()
        {
            match crate::io::load_project(&path) {
                Ok(project) => {
                    self.project = project;
                    self.file_path = Some(path);
                    self.selected_item = None;
                    self.link_source = None;
                    self.chart = TimelineChart::new();
                    self.recalculate_viewport();
                    self.status_message = "Project loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_project(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.write_project(path);
        } else {
            self.save_project_as();
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Project", &[PROJECT_EXTENSION, "json"])
            .set_file_name(format!("{}.{}", self.project.name, PROJECT_EXTENSION))
            .save_file()
        {
            self.file_path = Some(path.clone());
            self.write_project(path);
        }
    }

    fn write_project(&mut self, path: PathBuf) {
        self.project.touch();
        match crate::io::save_project(&self.project, &path) {
            Ok(()) => self.status_message = "Project saved".to_string(),
            Err(e) => self.status_message = format!("Error saving: {}", e),
        }
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "failed to save settings");
            self.status_message = format!("Could not save settings: {}", e);
        }
    }

    // --- Item operations ---

    pub fn create_item_from_dialog(&mut self) {
        let item = self.new_item.build();
        self.status_message = if item.span().is_some() {
            format!("Added '{}'", item.subject)
        } else {
            format!("Added '{}'. Drag on its row to place it", item.subject)
        };
        self.selected_item = Some(item.id);
        self.project.items.push(item);
        self.project.touch();
        self.new_item = NewItemForm::default();
    }

    pub fn delete_item(&mut self, id: Uuid) {
        if self.chart.active_item() == Some(id) {
            return;
        }
        self.project.remove_item(id);
        if self.selected_item == Some(id) {
            self.selected_item = None;
        }
        if self.link_source == Some(id) {
            self.link_source = None;
        }
        self.project.touch();
        self.status_message = "Item deleted".to_string();
    }

    pub fn start_link(&mut self, source: Uuid) {
        self.link_source = Some(source);
        self.link_target.borrow_mut().take();
        self.status_message = "Pick the following item on the timeline".to_string();
    }

    pub fn cancel_link(&mut self) {
        if self.link_source.take().is_some() {
            self.status_message = "Linking cancelled".to_string();
        }
    }

    /// Selection mode handed to the chart while linking.
    fn selection_mode(&self) -> Option<SelectionMode> {
        self.link_source?;
        let target = Rc::clone(&self.link_target);
        Some(SelectionMode::new(move |item: &WorkItem| {
            *target.borrow_mut() = Some(item.id);
        }))
    }

    /// Finish linking once the chart reported a pick.
    fn apply_pending_link(&mut self) {
        let Some(target) = self.link_target.borrow_mut().take() else {
            return;
        };
        let Some(source) = self.link_source.take() else {
            return;
        };
        let name = |id: Uuid| {
            self.project
                .item(id)
                .map(|i| i.subject.clone())
                .unwrap_or_default()
        };
        let (from_name, to_name) = (name(source), name(target));

        self.status_message = if self.project.add_relation(Relation { from: source, to: target }) {
            self.project.touch();
            format!("Linked '{}' → '{}'", from_name, to_name)
        } else if source == target {
            "An item cannot follow itself".to_string()
        } else {
            format!("'{}' already precedes '{}'", from_name, to_name)
        };
    }

    fn recalculate_viewport(&mut self) {
        if let Some((first, last)) = self.project.date_range() {
            self.viewport.fit(first, last);
        }
    }

    pub fn fit_to_project(&mut self) {
        self.recalculate_viewport();
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.save_project();
        }
        // A running drag owns Escape; the chart cancels it.
        if self.chart.is_idle() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.cancel_link();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Items: {} · {:.0} px/day",
                                self.project.items.len(),
                                self.viewport.pixels_per_day
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        let mut table_action = ui::item_table::ItemTableAction::None;
        let mut editor_action = ui::item_editor::EditorAction::None;
        egui::SidePanel::left("item_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(240.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                if let Some(sel_id) = self.selected_item {
                    let items_snapshot = self.project.items.clone();
                    let relations = self.project.relations.clone();
                    let type_names = self.settings.settings.type_names();
                    let linking = self.link_source.is_some();
                    if let Some(item) = self.project.item_mut(sel_id) {
                        editor_action = ui::item_editor::show_item_editor(
                            item,
                            &items_snapshot,
                            &relations,
                            &type_names,
                            linking,
                            ui,
                        );
                    }
                    ui.add_space(4.0);
                    ui.separator();
                    ui.add_space(2.0);
                }

                table_action = ui::item_table::show_item_table(
                    &self.project.items,
                    self.selected_item,
                    &self.settings.settings,
                    ui,
                );
            });

        match table_action {
            ui::item_table::ItemTableAction::Select(id) => self.selected_item = Some(id),
            ui::item_table::ItemTableAction::Delete(id) => self.delete_item(id),
            ui::item_table::ItemTableAction::Add => self.show_add_item = true,
            ui::item_table::ItemTableAction::None => {}
        }

        match editor_action {
            ui::item_editor::EditorAction::Changed => {
                self.project.touch();
                self.status_message = "Item updated".to_string();
            }
            ui::item_editor::EditorAction::StartLink(id) => self.start_link(id),
            ui::item_editor::EditorAction::CancelLink => self.cancel_link(),
            ui::item_editor::EditorAction::RemoveRelation(relation) => {
                self.project.relations.retain(|r| *r != relation);
                self.project.touch();
                self.status_message = "Relation removed".to_string();
            }
            ui::item_editor::EditorAction::None => {}
        }

        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let selection = self.selection_mode();
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let interaction = self.chart.show(
                ui,
                &mut self.project,
                &mut self.viewport,
                &self.settings.settings,
                selection,
                &mut self.selected_item,
            );
            if let Some(status) = interaction.status {
                self.status_message = status;
            }
        });
        self.apply_pending_link();

        if self.show_add_item {
            ui::dialogs::show_add_item_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app() -> TimelineApp {
        let path = std::env::temp_dir()
            .join(format!("milestone-timeline-{}", Uuid::new_v4()))
            .join("settings.json");
        TimelineApp::with_settings(SettingsStore::open(path))
    }

    #[test]
    fn test_form_builds_milestone() {
        let form = NewItemForm {
            subject: "  Gate ".into(),
            start: ymd(2024, 3, 1),
            ..Default::default()
        };
        let item = form.build();
        assert!(item.milestone);
        assert_eq!(item.subject, "Gate");
        assert_eq!(item.date(), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn test_form_builds_undated_and_ranged_items() {
        let undated = NewItemForm {
            undated: true,
            ..Default::default()
        }
        .build();
        assert_eq!(undated.subject, "New Milestone");
        assert_eq!(undated.date(), None);

        let ranged = NewItemForm {
            milestone: false,
            item_type: "Task".into(),
            start: ymd(2024, 3, 5),
            due: ymd(2024, 3, 1),
            ..Default::default()
        }
        .build();
        assert!(!ranged.milestone);
        assert_eq!(ranged.item_type, "Task");
        assert_eq!(ranged.span(), Some((ymd(2024, 3, 5), ymd(2024, 3, 5))));
    }

    #[test]
    fn test_sample_project_has_an_undated_milestone() {
        let app = app();
        assert!(app
            .project
            .items
            .iter()
            .any(|i| i.milestone && i.date().is_none()));
        assert!(!app.project.relations.is_empty());
    }

    #[test]
    fn test_link_via_selection_mode() {
        let mut app = app();
        let (a, b) = (app.project.items[0].id, app.project.items[6].id);
        assert!(app.selection_mode().is_none());

        app.start_link(a);
        let mode = app.selection_mode().unwrap();
        let target = app.project.items[6].clone();
        mode.select(&target);
        app.apply_pending_link();

        assert!(app.link_source.is_none());
        assert!(app.project.relations.contains(&Relation { from: a, to: b }));
        assert!(app.status_message.starts_with("Linked"));
    }

    #[test]
    fn test_link_to_self_is_rejected() {
        let mut app = app();
        let a = app.project.items[0].id;
        let before = app.project.relations.len();
        app.start_link(a);
        let item = app.project.items[0].clone();
        app.selection_mode().unwrap().select(&item);
        app.apply_pending_link();
        assert_eq!(app.project.relations.len(), before);
        assert_eq!(app.status_message, "An item cannot follow itself");
    }

    #[test]
    fn test_delete_item_clears_selection_and_link() {
        let mut app = app();
        let id = app.project.items[1].id;
        app.selected_item = Some(id);
        app.start_link(id);
        app.delete_item(id);
        assert!(app.project.item(id).is_none());
        assert!(app.selected_item.is_none());
        assert!(app.link_source.is_none());
        assert!(app.project.relations.iter().all(|r| r.from != id && r.to != id));
    }

    #[test]
    fn test_create_item_from_dialog_selects_it() {
        let mut app = app();
        app.new_item.subject = "Beta".into();
        app.new_item.undated = true;
        app.create_item_from_dialog();
        let id = app.selected_item.unwrap();
        assert_eq!(app.project.item(id).unwrap().subject, "Beta");
        assert!(app.status_message.contains("Drag on its row"));
        assert!(app.new_item.subject.is_empty());
    }
}
