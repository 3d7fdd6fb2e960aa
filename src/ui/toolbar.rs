use egui::{menu, RichText, Ui};

use crate::app::TimelineApp;
use crate::model::TimelineScale;
use crate::timeline::labels::LabelAttribute;
use crate::ui::theme;

/// Radio list of label attributes for one slot. Returns `true` on change.
fn label_slot_menu(ui: &mut Ui, title: &str, current: &mut Option<LabelAttribute>) -> bool {
    let mut changed = false;
    ui.menu_button(title, |ui| {
        if ui.radio(current.is_none(), "(none)").clicked() {
            *current = None;
            changed = true;
            ui.close_menu();
        }
        for attribute in LabelAttribute::ALL {
            if ui.radio(*current == Some(attribute), attribute.name()).clicked() {
                *current = Some(attribute);
                changed = true;
                ui.close_menu();
            }
        }
    });
    changed
}

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New Project").clicked() {
                app.new_project();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_project();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_project();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.viewport.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.viewport.zoom_out();
                ui.close_menu();
            }
            if ui.button("  Fit to Project").clicked() {
                app.fit_to_project();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            for (scale, name) in [
                (TimelineScale::Days, "Days"),
                (TimelineScale::Weeks, "Weeks"),
                (TimelineScale::Months, "Months"),
            ] {
                if ui.radio_value(&mut app.viewport.scale, scale, name).clicked() {
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Labels  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Shown beside each item").small().weak());
            let labels = &mut app.settings.settings.labels;
            let mut changed = label_slot_menu(ui, "Left", &mut labels.left);
            changed |= label_slot_menu(ui, "Right", &mut labels.right);
            changed |= label_slot_menu(ui, "Far right", &mut labels.far_right);
            if changed {
                app.save_settings();
                app.status_message = "Label configuration saved".to_string();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned project name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.project.name, modified))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
