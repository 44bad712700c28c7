//! Environmental precondition gate.

use std::sync::{Arc, Mutex};

use crate::domain::settings::SettingsService;

/// Coarse "is this room scannable" check, simulated by a settings flag that
/// stands in for a real sensor gate (ambient light, plane detection).
///
/// Failure carries no error value: the gate answers false and the caller
/// surfaces a status message to the user.
pub struct SurfaceGate {
    settings: Arc<Mutex<SettingsService>>,
}

impl SurfaceGate {
    pub fn new(settings: Arc<Mutex<SettingsService>>) -> Self {
        Self { settings }
    }

    pub fn check_ready(&self) -> bool {
        self.settings
            .lock()
            .map(|s| s.get().surface_detected)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::Settings;

    fn gate_with(surface_detected: bool) -> SurfaceGate {
        let settings = Settings {
            surface_detected,
            ..Settings::default()
        };
        SurfaceGate::new(Arc::new(Mutex::new(SettingsService::from_settings(
            settings,
        ))))
    }

    #[test]
    fn ready_when_a_surface_is_detected() {
        assert!(gate_with(true).check_ready());
    }

    #[test]
    fn refuses_when_no_surface_is_detected() {
        assert!(!gate_with(false).check_ready());
    }
}
