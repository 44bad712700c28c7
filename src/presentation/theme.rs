use eframe::egui;

pub struct Palette {
    pub bg: egui::Color32,
    pub fg: egui::Color32,
    pub stroke: egui::Color32,
    pub accent: egui::Color32,
    pub ok: egui::Color32,
    pub warn: egui::Color32,
    pub err: egui::Color32,
}

impl Palette {
    pub fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg: egui::Color32::from_rgb(22, 26, 30),
                fg: egui::Color32::from_gray(230),
                stroke: egui::Color32::from_gray(70),
                accent: egui::Color32::from_rgb(80, 170, 255),
                ok: egui::Color32::from_rgb(60, 200, 120),
                warn: egui::Color32::from_rgb(230, 180, 60),
                err: egui::Color32::from_rgb(235, 90, 90),
            }
        } else {
            Self {
                bg: egui::Color32::from_rgb(248, 249, 250),
                fg: egui::Color32::from_gray(25),
                stroke: egui::Color32::from_gray(190),
                accent: egui::Color32::from_rgb(30, 110, 210),
                ok: egui::Color32::from_rgb(20, 150, 80),
                warn: egui::Color32::from_rgb(180, 130, 20),
                err: egui::Color32::from_rgb(200, 50, 50),
            }
        }
    }
}

pub fn configure_style(ctx: &egui::Context, is_dark: bool) {
    let mut style = (*ctx.style()).clone();
    let palette = Palette::new(is_dark);

    style
        .text_styles
        .iter_mut()
        .for_each(|(text_style, font_id)| {
            font_id.size = match text_style {
                egui::TextStyle::Heading => 24.0,
                egui::TextStyle::Body => 14.5,
                egui::TextStyle::Button => 14.5,
                _ => font_id.size,
            };
        });

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 7.0);

    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, palette.stroke);
    style.visuals.widgets.noninteractive.rounding = egui::Rounding::same(6.0);
    style.visuals.widgets.noninteractive.bg_fill = palette.bg;
    style.visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);
    style.visuals.widgets.hovered.rounding = egui::Rounding::same(6.0);
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.5, palette.accent);
    style.visuals.widgets.active.rounding = egui::Rounding::same(6.0);
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.5, palette.accent);

    style.visuals.selection.bg_fill = palette.accent.linear_multiply(0.4);
    style.visuals.window_rounding = egui::Rounding::same(8.0);
    style.visuals.panel_fill = palette.bg;
    style.visuals.override_text_color = Some(palette.fg);

    ctx.set_style(style);
}
