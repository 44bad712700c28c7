use crate::domain::models::{ScanCommand, ScanState};
use crate::presentation::app::RoomScanApp;
use crate::presentation::components::Components;
use crate::presentation::viewport;
use eframe::egui;

pub fn render(app: &mut RoomScanApp, ui: &mut egui::Ui) {
    Components::heading(ui, "RoomScan");
    ui.add_space(16.0);

    ui_session_panel(app, ui);
    ui.add_space(12.0);

    ui_viewport_panel(app, ui);
}

fn ui_session_panel(app: &mut RoomScanApp, ui: &mut egui::Ui) {
    Components::section_card(ui, "Scan Session", |ui| {
        let (banner_text, bg_color, text_color) = match app.session_state {
            ScanState::Idle => (
                "IDLE",
                egui::Color32::from_gray(100),
                egui::Color32::WHITE,
            ),
            ScanState::Requesting => (
                "INITIALIZING...",
                egui::Color32::from_rgb(230, 180, 60),
                egui::Color32::BLACK,
            ),
            ScanState::Scanning => (
                "SCANNING",
                egui::Color32::from_rgb(60, 200, 120),
                egui::Color32::BLACK,
            ),
            ScanState::Stopped => (
                "STOPPED",
                egui::Color32::from_rgb(80, 170, 255),
                egui::Color32::BLACK,
            ),
        };
        Components::state_banner(ui, banner_text, bg_color, text_color);

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let start_enabled =
                matches!(app.session_state, ScanState::Idle | ScanState::Stopped);
            if ui
                .add_enabled(start_enabled, egui::Button::new("Start Scan"))
                .clicked()
            {
                let _ = app.scan_tx.send(ScanCommand::StartScan);
            }

            let stop_enabled = app.session_state == ScanState::Scanning;
            if ui
                .add_enabled(stop_enabled, egui::Button::new("Stop Scan"))
                .clicked()
            {
                let _ = app.scan_tx.send(ScanCommand::StopScan);
            }

            let download_enabled = app.session_state == ScanState::Stopped;
            if ui
                .add_enabled(download_enabled, egui::Button::new("Download Model"))
                .clicked()
            {
                let _ = app.scan_tx.send(ScanCommand::ExportModel);
            }

            if app.session_state == ScanState::Requesting {
                ui.spinner();
            }
        });

        if let Some(msg) = app.status_message.clone() {
            ui.add_space(4.0);
            Components::status_line(ui, &msg, app.is_dark_mode);
        }

        ui.add_space(4.0);
        egui::Grid::new("session_grid")
            .spacing([40.0, 6.0])
            .show(ui, |ui| {
                ui.label("Device:");
                match &app.paired_device {
                    Some(device) => {
                        ui.label(format!("{} ({}%)", device.name, device.battery_level))
                    }
                    None => ui.label("-"),
                };
                ui.end_row();

                ui.label("Points:");
                let count = app.scene.lock().map(|s| s.len()).unwrap_or(0);
                ui.label(format!("{count}"));
                ui.end_row();
            });
    });
}

fn ui_viewport_panel(app: &mut RoomScanApp, ui: &mut egui::Ui) {
    Components::section_card(ui, "Point Cloud", |ui| {
        ui.label(
            egui::RichText::new("drag to orbit, scroll to zoom")
                .size(12.0)
                .weak(),
        );
        viewport::render(ui, &mut app.orbit, &app.scene);
    });
}
