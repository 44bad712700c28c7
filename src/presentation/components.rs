use eframe::egui;

use crate::domain::models::{MessageSeverity, StatusMessage};
use crate::presentation::theme::Palette;

pub struct Components;

impl Components {
    pub fn heading(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).heading().strong());
    }

    pub fn section_card<R>(
        ui: &mut egui::Ui,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> R {
        let stroke = ui.style().visuals.widgets.noninteractive.bg_stroke;

        egui::Frame::none()
            .inner_margin(egui::Margin::same(12.0))
            .stroke(stroke)
            .rounding(egui::Rounding::same(6.0))
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(16.0));
                    ui.add_space(6.0);
                    add_contents(ui)
                })
                .inner
            })
            .inner
    }

    pub fn state_banner(
        ui: &mut egui::Ui,
        text: &str,
        bg_color: egui::Color32,
        text_color: egui::Color32,
    ) {
        ui.add_sized(
            [ui.available_width(), 32.0],
            egui::Label::new(
                egui::RichText::new(text)
                    .color(text_color)
                    .background_color(bg_color)
                    .size(15.0)
                    .strong(),
            )
            .wrap_mode(egui::TextWrapMode::Extend),
        );
    }

    pub fn status_line(ui: &mut egui::Ui, msg: &StatusMessage, is_dark: bool) {
        let palette = Palette::new(is_dark);
        let color = match msg.severity {
            MessageSeverity::Info => palette.accent,
            MessageSeverity::Success => palette.ok,
            MessageSeverity::Warning => palette.warn,
            MessageSeverity::Error => palette.err,
        };
        ui.label(egui::RichText::new(&msg.message).color(color).strong());
    }
}
