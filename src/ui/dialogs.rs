use egui::{Color32, Context, RichText, Window};

use crate::app::TimelineApp;
use crate::ui::theme;

/// Render the "Add Item" dialog.
pub fn show_add_item_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    let type_names = app.settings.settings.type_names();

    Window::new(RichText::new("Add Item").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([340.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            let form = &mut app.new_item;
            egui::Grid::new("add_item_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Subject").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.subject).hint_text("Subject..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Type").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("dlg_type")
                        .selected_text(form.item_type.as_str())
                        .show_ui(ui, |ui| {
                            for name in &type_names {
                                ui.selectable_value(
                                    &mut form.item_type,
                                    name.clone(),
                                    name.as_str(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut form.milestone, "Milestone");
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut form.undated, "Leave undated");
                    ui.end_row();

                    if !form.undated {
                        let first = if form.milestone { "Date" } else { "Start" };
                        ui.label(RichText::new(first).color(theme::TEXT_SECONDARY));
                        ui.add(
                            egui_extras::DatePickerButton::new(&mut form.start)
                                .id_salt("dlg_dp_start"),
                        );
                        ui.end_row();

                        if !form.milestone {
                            ui.label(RichText::new("Due").color(theme::TEXT_SECONDARY));
                            ui.add(
                                egui_extras::DatePickerButton::new(&mut form.due)
                                    .id_salt("dlg_dp_due"),
                            );
                            ui.end_row();
                        }
                    }
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let create_btn = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], create_btn).clicked() {
                    app.create_item_from_dialog();
                    should_close = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_add_item = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Milestone Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag milestones to reschedule them,");
                ui.label("or drag on an empty row to place one.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
