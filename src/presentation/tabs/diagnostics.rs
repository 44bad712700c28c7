use crate::domain::models::{ScanCommand, ScanState};
use crate::presentation::app::RoomScanApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut RoomScanApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Diagnostics");
    ui.add_space(16.0);

    Components::section_card(ui, "Session Internals", |ui| {
        egui::Grid::new("diag_grid")
            .spacing([30.0, 5.0])
            .show(ui, |ui| {
                ui.label("State:");
                let (text, color) = match app.session_state {
                    ScanState::Idle => ("IDLE", egui::Color32::from_gray(150)),
                    ScanState::Requesting => {
                        ("ACQUIRING", egui::Color32::from_rgb(230, 180, 60))
                    }
                    ScanState::Scanning => ("SCANNING", egui::Color32::from_rgb(60, 200, 120)),
                    ScanState::Stopped => ("STOPPED", egui::Color32::from_rgb(80, 170, 255)),
                };
                ui.label(egui::RichText::new(text).color(color).strong());
                ui.end_row();

                ui.label("Scene points:");
                let count = app.scene.lock().map(|s| s.len()).unwrap_or(0);
                ui.label(format!("{count}"));
                ui.end_row();

                ui.label("Endpoint:");
                ui.label(match &app.paired_device {
                    Some(device) => format!("{:#X}", device.address),
                    None => "-".to_string(),
                });
                ui.end_row();

                ui.label("Battery:");
                ui.label(match &app.paired_device {
                    Some(device) => format!("{}%", device.battery_level),
                    None => "-".to_string(),
                });
                ui.end_row();
            });
    });

    ui.add_space(12.0);

    Components::section_card(ui, "Fault Injection", |ui| {
        ui.horizontal(|ui| {
            let can_drop = app.session_state == ScanState::Scanning;
            if ui
                .add_enabled(can_drop, egui::Button::new("Sever Link"))
                .clicked()
            {
                let _ = app.scan_tx.send(ScanCommand::InjectDropout);
            }
        });

        if let Ok(mut service) = app.settings.lock() {
            let settings = service.get_mut();
            ui.checkbox(&mut settings.surface_detected, "Surface detected");
            ui.checkbox(&mut settings.simulate_user_cancel, "Dismiss pairing prompt");
            ui.checkbox(&mut settings.simulate_camera_denied, "Deny camera permission");
            ui.checkbox(&mut settings.simulate_camera_absent, "Detach camera hardware");
        }
    });

    ui.add_space(12.0);

    Components::section_card(ui, "Status Log", |ui| {
        egui::ScrollArea::vertical()
            .id_salt("status_log")
            .max_height(220.0)
            .show(ui, |ui| {
                for msg in app.status_log.iter().rev() {
                    Components::status_line(ui, msg, app.is_dark_mode);
                }
                if app.status_log.is_empty() {
                    ui.label(egui::RichText::new("no messages yet").weak());
                }
            });
    });
}
