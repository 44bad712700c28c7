//! Painter-projected view of the point cloud. Deliberately thin: a fixed
//! pinhole projection with a drag orbit and scroll zoom, no GPU pipeline.

use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::domain::models::ScenePoint;
use crate::domain::scene::SceneModel;

const CAMERA_DISTANCE: f32 = 45.0;
const FOCAL_LENGTH: f32 = 9.0;

pub struct OrbitState {
    yaw: f32,
    pitch: f32,
    zoom: f32,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.35,
            zoom: 1.0,
        }
    }
}

pub fn render(ui: &mut egui::Ui, orbit: &mut OrbitState, scene: &Arc<Mutex<SceneModel>>) {
    let size = egui::vec2(ui.available_width(), 340.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());

    let drag = response.drag_delta();
    orbit.yaw += drag.x * 0.01;
    orbit.pitch = (orbit.pitch + drag.y * 0.01).clamp(-1.4, 1.4);
    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        orbit.zoom = (orbit.zoom * (1.0 + scroll * 0.001)).clamp(0.3, 4.0);
    }

    let rect = response.rect;
    painter.rect_filled(rect, 6.0, egui::Color32::from_rgb(12, 14, 18));

    // Copy out under the lock so drawing never holds it.
    let points: Vec<ScenePoint> = match scene.lock() {
        Ok(s) if !s.is_empty() => s.points().to_vec(),
        _ => Vec::new(),
    };

    if points.is_empty() {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "no point data - start a scan",
            egui::FontId::proportional(14.0),
            egui::Color32::from_gray(120),
        );
        return;
    }

    let (sin_yaw, cos_yaw) = orbit.yaw.sin_cos();
    let (sin_pitch, cos_pitch) = orbit.pitch.sin_cos();
    let center = rect.center();
    let focal = FOCAL_LENGTH * orbit.zoom * rect.height() / 20.0;

    let mut projected: Vec<(f32, egui::Pos2)> = points
        .iter()
        .filter_map(|point| {
            let p = point.position;
            // Yaw around Y, then pitch around X
            let x = p.x * cos_yaw + p.z * sin_yaw;
            let z1 = -p.x * sin_yaw + p.z * cos_yaw;
            let y = p.y * cos_pitch - z1 * sin_pitch;
            let z = p.y * sin_pitch + z1 * cos_pitch;

            let depth = z + CAMERA_DISTANCE;
            if depth <= 1.0 {
                return None;
            }
            let scale = focal / depth;
            Some((
                depth,
                egui::pos2(center.x + x * scale, center.y - y * scale),
            ))
        })
        .collect();

    // Far points first so near ones paint over them
    projected.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (depth, pos) in projected {
        let near = (1.0 - (depth - CAMERA_DISTANCE + 15.0) / 30.0).clamp(0.0, 1.0);
        let shade = 90 + (150.0 * near) as u8;
        let radius = 1.5 + 2.0 * near;
        painter.circle_filled(pos, radius, egui::Color32::from_rgb(60, shade, 220));
    }
}
