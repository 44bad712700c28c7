mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 760.0])
            .with_title("RoomScan"),
        ..Default::default()
    };

    eframe::run_native(
        "RoomScan",
        options,
        Box::new(|cc| Ok(Box::new(presentation::app::RoomScanApp::new(cc)))),
    )
}
