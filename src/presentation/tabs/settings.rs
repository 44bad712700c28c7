use crate::domain::models::CameraFacing;
use crate::presentation::app::RoomScanApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut RoomScanApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(16.0);

    if let Ok(mut service) = app.settings.lock() {
        let mut save_requested = false;
        let settings = service.get_mut();

        Components::section_card(ui, "Device Filter", |ui| {
            ui.horizontal(|ui| {
                ui.label("Name prefix:");
                ui.text_edit_singleline(&mut settings.device_name_prefix);
            });
            ui.horizontal(|ui| {
                ui.label("Required service:");
                ui.text_edit_singleline(&mut settings.device_service);
            });
        });

        ui.add_space(12.0);

        Components::section_card(ui, "Scan", |ui| {
            ui.add(
                egui::Slider::new(&mut settings.scan_delay_ms, 500..=15000)
                    .text("Scan delay (ms)"),
            );
            ui.add(
                egui::Slider::new(&mut settings.point_count, 10..=500).text("Point count"),
            );
            ui.add(
                egui::Slider::new(&mut settings.point_span, 5.0..=100.0).text("Point span"),
            );
        });

        ui.add_space(12.0);

        Components::section_card(ui, "Camera", |ui| {
            ui.horizontal(|ui| {
                ui.label("Resolution hint:");
                ui.add(egui::DragValue::new(&mut settings.camera_width).range(320..=3840));
                ui.label("x");
                ui.add(egui::DragValue::new(&mut settings.camera_height).range(240..=2160));
            });
            ui.horizontal(|ui| {
                ui.label("Facing:");
                ui.selectable_value(
                    &mut settings.camera_facing,
                    CameraFacing::Environment,
                    "Rear",
                );
                ui.selectable_value(&mut settings.camera_facing, CameraFacing::User, "Front");
            });
        });

        ui.add_space(12.0);

        Components::section_card(ui, "Export", |ui| {
            let mut dir = settings.export_dir.clone().unwrap_or_default();
            ui.horizontal(|ui| {
                ui.label("Directory:");
                if ui.text_edit_singleline(&mut dir).changed() {
                    settings.export_dir = if dir.is_empty() { None } else { Some(dir) };
                }
            });
            ui.label(
                egui::RichText::new("empty uses the platform download directory")
                    .size(12.0)
                    .weak(),
            );
        });

        ui.add_space(12.0);

        if ui.button("Save Settings").clicked() {
            save_requested = true;
        }

        if save_requested {
            if let Err(e) = service.save() {
                tracing::error!("failed to save settings: {e:#}");
            }
        }
    }
}
