#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use milestone_timeline::app::TimelineApp;

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Milestone Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Milestone Timeline",
        options,
        Box::new(|cc| Ok(Box::new(TimelineApp::new(cc)))),
    )
}
