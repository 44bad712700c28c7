use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::domain::models::CameraFacing;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_log_prefix(),
            ansi_colors: default_true(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_log_prefix() -> String {
    "roomscan".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Device filter
    #[serde(default = "default_name_prefix")]
    pub device_name_prefix: String,
    #[serde(default = "default_device_service")]
    pub device_service: String,

    // Simulation profile
    #[serde(default = "default_pairing_delay_ms")]
    pub pairing_delay_ms: u64,
    #[serde(default = "default_permission_delay_ms")]
    pub permission_delay_ms: u64,
    #[serde(default = "default_false")]
    pub simulate_user_cancel: bool,
    #[serde(default = "default_false")]
    pub simulate_camera_denied: bool,
    #[serde(default = "default_false")]
    pub simulate_camera_absent: bool,
    #[serde(default = "default_true")]
    pub surface_detected: bool,

    // Camera constraints hint
    #[serde(default = "default_camera_width")]
    pub camera_width: u32,
    #[serde(default = "default_camera_height")]
    pub camera_height: u32,
    #[serde(default = "default_camera_facing")]
    pub camera_facing: CameraFacing,

    // Scan behavior
    #[serde(default = "default_scan_delay_ms")]
    pub scan_delay_ms: u64,
    #[serde(default = "default_point_count")]
    pub point_count: usize,
    #[serde(default = "default_point_span")]
    pub point_span: f32,
    /// Fixed seed for the point generator; None draws from entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    // Export
    #[serde(default)]
    pub export_dir: Option<String>,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name_prefix: default_name_prefix(),
            device_service: default_device_service(),
            pairing_delay_ms: default_pairing_delay_ms(),
            permission_delay_ms: default_permission_delay_ms(),
            simulate_user_cancel: false,
            simulate_camera_denied: false,
            simulate_camera_absent: false,
            surface_detected: true,
            camera_width: default_camera_width(),
            camera_height: default_camera_height(),
            camera_facing: default_camera_facing(),
            scan_delay_ms: default_scan_delay_ms(),
            point_count: default_point_count(),
            point_span: default_point_span(),
            rng_seed: None,
            export_dir: None,
            log_settings: LogSettings::default(),
        }
    }
}

fn default_name_prefix() -> String {
    "BLE".to_string()
}
fn default_device_service() -> String {
    "battery_service".to_string()
}
fn default_pairing_delay_ms() -> u64 {
    600
}
fn default_permission_delay_ms() -> u64 {
    400
}
fn default_camera_width() -> u32 {
    1280
}
fn default_camera_height() -> u32 {
    720
}
fn default_camera_facing() -> CameraFacing {
    CameraFacing::Environment
}
fn default_scan_delay_ms() -> u64 {
    5000
}
fn default_point_count() -> usize {
    crate::domain::points::DEFAULT_POINT_COUNT
}
fn default_point_span() -> f32 {
    crate::domain::points::DEFAULT_SPAN
}

pub struct SettingsService {
    settings: Settings,
    settings_path: Option<PathBuf>,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self {
            settings,
            settings_path: Some(settings_path),
        })
    }

    /// A service that never touches disk. Used by tests and as a fallback
    /// when the platform config directory is unavailable.
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            settings_path: None,
        }
    }

    fn settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("RoomScan");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.settings_path {
            let json = serde_json::to_string_pretty(&self.settings)?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.device_name_prefix, "BLE");
        assert_eq!(settings.device_service, "battery_service");
        assert_eq!(settings.scan_delay_ms, 5000);
        assert_eq!(settings.point_count, 50);
        assert_eq!(settings.point_span, 30.0);
        assert!(settings.surface_detected);
    }

    #[test]
    fn in_memory_service_saves_nowhere() {
        let service = SettingsService::from_settings(Settings::default());
        assert!(service.save().is_ok());
    }
}
