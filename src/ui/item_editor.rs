use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::model::{Relation, WorkItem};
use crate::ui::theme;

pub const STATUSES: &[&str] = &["New", "In progress", "On hold", "Closed", "Rejected"];

/// Actions the editor can request.
pub enum EditorAction {
    None,
    Changed,
    /// Pick the successor of this item on the chart.
    StartLink(Uuid),
    CancelLink,
    RemoveRelation(Relation),
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Date picker for an optional date. Returns the new value when the user
/// picked or cleared a date.
fn optional_date(ui: &mut Ui, value: Option<NaiveDate>, salt: &str) -> Option<Option<NaiveDate>> {
    let mut result = None;
    ui.horizontal(|ui| {
        let mut date = value.unwrap_or_else(|| chrono::Local::now().date_naive());
        let resp = ui.add(egui_extras::DatePickerButton::new(&mut date).id_salt(salt));
        if resp.changed() {
            result = Some(Some(date));
        }
        if value.is_some() {
            let glyph = RichText::new("✕").size(10.0).color(theme::TEXT_DIM);
            let clear = ui.add(egui::Button::new(glyph).frame(false));
            if clear.on_hover_text("Clear date").clicked() {
                result = Some(None);
            }
        } else {
            ui.label(RichText::new("not set").size(10.0).color(theme::TEXT_DIM));
        }
    });
    result
}

/// Switch an item between milestone and ranged form, carrying its dates over.
pub fn set_milestone(item: &mut WorkItem, milestone: bool) {
    if item.milestone == milestone {
        return;
    }
    if milestone {
        let date = item.date().or(item.start_date()).or(item.due_date());
        item.set_date(date);
        item.set_start_date(None);
        item.set_due_date(None);
    } else {
        let date = item.date();
        item.set_start_date(date);
        item.set_due_date(date);
        item.set_date(None);
    }
    item.milestone = milestone;
}

/// Render an inline editor for the selected item, including its relations.
pub fn show_item_editor(
    item: &mut WorkItem,
    all_items: &[WorkItem],
    relations: &[Relation],
    type_names: &[String],
    linking: bool,
    ui: &mut Ui,
) -> EditorAction {
    let mut action = EditorAction::None;
    let item_id = item.id;

    ui.add_space(6.0);
    ui.label(
        RichText::new(if item.milestone { "Edit Milestone" } else { "Edit Item" })
            .strong()
            .size(13.0)
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;

        field_label(ui, "Subject");
        let subject = ui.add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut item.subject).font(egui::FontId::proportional(12.0)),
        );
        if subject.changed() {
            action = EditorAction::Changed;
        }

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                field_label(ui, "Type");
                egui::ComboBox::from_id_salt("item_type_combo")
                    .selected_text(RichText::new(&item.item_type).size(11.0))
                    .width(120.0)
                    .show_ui(ui, |ui| {
                        for name in type_names {
                            let current = item.item_type == *name;
                            if ui.selectable_label(current, name.as_str()).clicked() {
                                item.item_type = name.clone();
                                action = EditorAction::Changed;
                            }
                        }
                    });
            });
            ui.vertical(|ui| {
                field_label(ui, "Status");
                egui::ComboBox::from_id_salt("item_status_combo")
                    .selected_text(RichText::new(&item.status).size(11.0))
                    .width(120.0)
                    .show_ui(ui, |ui| {
                        for status in STATUSES {
                            if ui.selectable_label(item.status == *status, *status).clicked() {
                                item.status = status.to_string();
                                action = EditorAction::Changed;
                            }
                        }
                    });
            });
        });

        let mut milestone = item.milestone;
        if ui.checkbox(&mut milestone, "Milestone").changed() {
            set_milestone(item, milestone);
            action = EditorAction::Changed;
        }

        if item.milestone {
            field_label(ui, "Date");
            if let Some(date) = optional_date(ui, item.date(), "dp_milestone") {
                item.set_date(date);
                action = EditorAction::Changed;
            }
        } else {
            field_label(ui, "Start");
            if let Some(date) = optional_date(ui, item.start_date(), "dp_start") {
                item.set_start_date(date);
                if let (Some(s), Some(d)) = (item.start_date(), item.due_date()) {
                    if s > d {
                        item.set_due_date(Some(s));
                    }
                }
                action = EditorAction::Changed;
            }
            field_label(ui, "Due");
            if let Some(date) = optional_date(ui, item.due_date(), "dp_due") {
                item.set_due_date(date);
                if let (Some(s), Some(d)) = (item.start_date(), item.due_date()) {
                    if d < s {
                        item.set_start_date(Some(d));
                    }
                }
                action = EditorAction::Changed;
            }
        }

        ui.separator();
        field_label(ui, "Relations");

        let linked: Vec<&Relation> = relations
            .iter()
            .filter(|r| r.from == item_id || r.to == item_id)
            .collect();
        if linked.is_empty() {
            ui.label(RichText::new("No relations yet").size(9.5).color(theme::TEXT_DIM));
        }
        for relation in linked {
            let outgoing = relation.from == item_id;
            let other = if outgoing { relation.to } else { relation.from };
            let other_name = all_items
                .iter()
                .find(|i| i.id == other)
                .map(|i| i.subject.as_str())
                .unwrap_or("?");
            let text = if outgoing {
                format!("precedes {}", other_name)
            } else {
                format!("follows {}", other_name)
            };
            ui.horizontal(|ui| {
                ui.label(RichText::new(text).size(11.0).color(theme::TEXT_SECONDARY));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let del = ui.add(
                        egui::Button::new(RichText::new("✕").size(9.0).color(theme::TEXT_DIM))
                            .frame(false),
                    );
                    if del.on_hover_text("Remove relation").clicked() {
                        action = EditorAction::RemoveRelation(*relation);
                    }
                });
            });
        }

        ui.add_space(2.0);
        if linking {
            ui.label(
                RichText::new("Click an item on the timeline (Esc to cancel)")
                    .size(9.5)
                    .color(theme::SELECTABLE_OUTLINE),
            );
            if ui.button("Cancel linking").clicked() {
                action = EditorAction::CancelLink;
            }
        } else {
            let text = RichText::new("Link to…").color(Color32::WHITE).size(12.0);
            let btn = egui::Button::new(text)
                .fill(theme::ACCENT)
                .rounding(egui::Rounding::same(4.0));
            if ui.add_sized([ui.available_width(), 26.0], btn).clicked() {
                action = EditorAction::StartLink(item_id);
            }
        }
    });

    action
}
