use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::config::TimelineSettings;
use crate::model::WorkItem;
use crate::ui::theme;

/// Actions that the item table can request.
pub enum ItemTableAction {
    None,
    Select(Uuid),
    Delete(Uuid),
    Add,
}

/// Compact date column text.
fn date_column(item: &WorkItem) -> String {
    match item.span() {
        None => "—".to_string(),
        Some((a, b)) if a == b => a.format("%d/%m").to_string(),
        Some((a, b)) => format!("{} → {}", a.format("%d/%m"), b.format("%d/%m")),
    }
}

/// Render the left-side item table panel.
pub fn show_item_table(
    items: &[WorkItem],
    selected_item: Option<Uuid>,
    settings: &TimelineSettings,
    ui: &mut Ui,
) -> ItemTableAction {
    let mut action = ItemTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Work items").strong().size(15.0).color(theme::TEXT_PRIMARY));
        ui.add_space(4.0);
        ui.label(RichText::new(format!("({})", items.len())).size(11.0).color(theme::TEXT_DIM));
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(RichText::new("＋  Add Item").color(Color32::WHITE).size(12.0))
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = ItemTableAction::Add;
    }

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(2.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, item) in items.iter().enumerate() {
                let is_selected = selected_item == Some(item.id);
                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin::ZERO,
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;

                        let (dot_rect, _) =
                            ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        let dot_color = settings.color_for(&item.item_type);
                        ui.painter().circle_filled(dot_rect.center(), 3.0, dot_color);

                        let name = if item.milestone {
                            format!("◆ {}", item.subject)
                        } else {
                            item.subject.clone()
                        };
                        let name_text = RichText::new(name).size(12.0).color(if is_selected {
                            Color32::WHITE
                        } else {
                            theme::TEXT_PRIMARY
                        });
                        ui.add(egui::Label::new(name_text).truncate());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;

                            let glyph = RichText::new("✕").size(10.0).color(theme::TEXT_DIM);
                            let del_btn = ui.add(egui::Button::new(glyph).frame(false));
                            if del_btn.on_hover_text("Delete item").clicked() {
                                action = ItemTableAction::Delete(item.id);
                            }

                            ui.label(
                                RichText::new(date_column(item))
                                    .size(10.0)
                                    .color(theme::TEXT_SECONDARY),
                            );
                            ui.label(RichText::new(&item.status).size(10.0).color(theme::TEXT_DIM));
                        });
                    });
                });

                // Make entire row clickable
                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("item-row", item.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() {
                    action = ItemTableAction::Select(item.id);
                }

                ui.add_space(1.0);
            }
        });

    action
}
