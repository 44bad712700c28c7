//! Device Session Module
//!
//! Coordinates acquisition of the scan's two scoped resources.

use std::sync::{Arc, Mutex as StdMutex};

use crate::domain::models::ScanError;
use crate::domain::settings::SettingsService;
use crate::infrastructure::device::ble::{DeviceFilter, DeviceHandle, SimulatedBle};
use crate::infrastructure::device::camera::{CameraConstraints, CameraStream, SimulatedCamera};

/// Owns the simulated radio and media stack and acquires both resources for
/// a scan. Exactly one device handle and one camera stream exist per scan;
/// the controller holds them for the session's lifetime.
pub struct DeviceSession {
    ble: Arc<SimulatedBle>,
    camera: SimulatedCamera,
    settings: Arc<StdMutex<SettingsService>>,
}

impl DeviceSession {
    pub fn new(settings: Arc<StdMutex<SettingsService>>) -> Self {
        Self {
            ble: Arc::new(SimulatedBle::new(settings.clone())),
            camera: SimulatedCamera::new(settings.clone()),
            settings,
        }
    }

    /// The simulated radio, exposed for fault injection.
    pub fn ble(&self) -> &Arc<SimulatedBle> {
        &self.ble
    }

    pub fn device_filter(&self) -> DeviceFilter {
        self.settings
            .lock()
            .map(|s| DeviceFilter {
                name_prefix: s.get().device_name_prefix.clone(),
                service: s.get().device_service.clone(),
            })
            .unwrap_or_default()
    }

    pub fn camera_constraints(&self) -> CameraConstraints {
        self.settings
            .lock()
            .map(|s| CameraConstraints {
                width: s.get().camera_width,
                height: s.get().camera_height,
                facing: s.get().camera_facing,
            })
            .unwrap_or_default()
    }

    pub async fn acquire_device(&self) -> Result<DeviceHandle, ScanError> {
        self.ble.request_device(&self.device_filter()).await
    }

    pub async fn acquire_camera(&self) -> Result<CameraStream, ScanError> {
        self.camera.open(self.camera_constraints()).await
    }

    /// Acquire device and camera concurrently. If only one side is granted,
    /// it is released before the other side's error is returned, so a failed
    /// start never leaks a handle.
    pub async fn acquire(&self) -> Result<(DeviceHandle, CameraStream), ScanError> {
        let (device, camera) = tokio::join!(self.acquire_device(), self.acquire_camera());
        match (device, camera) {
            (Ok(device), Ok(camera)) => {
                debug_assert!(camera.is_live());
                Ok((device, camera))
            }
            (Ok(_device), Err(error)) => Err(error),
            (Err(error), Ok(mut camera)) => {
                camera.release();
                Err(error)
            }
            (Err(error), Err(_)) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::Settings;

    fn session_with(settings: Settings) -> DeviceSession {
        DeviceSession::new(Arc::new(StdMutex::new(SettingsService::from_settings(
            settings,
        ))))
    }

    fn fast_settings() -> Settings {
        Settings {
            pairing_delay_ms: 1,
            permission_delay_ms: 1,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn acquires_both_resources() {
        let session = session_with(fast_settings());
        let (device, camera) = session.acquire().await.unwrap();
        assert_eq!(device.name(), "BLE Room Beacon");
        assert!(camera.is_live());
    }

    #[tokio::test]
    async fn device_failure_wins_and_no_camera_leaks() {
        let session = session_with(Settings {
            simulate_user_cancel: true,
            ..fast_settings()
        });
        let err = session.acquire().await.unwrap_err();
        assert!(matches!(err, ScanError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn camera_failure_surfaces_when_the_device_was_granted() {
        let session = session_with(Settings {
            simulate_camera_denied: true,
            ..fast_settings()
        });
        let err = session.acquire().await.unwrap_err();
        assert!(matches!(err, ScanError::CameraUnavailable(_)));
    }

    #[tokio::test]
    async fn filter_follows_settings() {
        let session = session_with(Settings {
            device_name_prefix: "Tag".to_string(),
            ..fast_settings()
        });
        assert_eq!(session.device_filter().name_prefix, "Tag");
        assert_eq!(session.device_filter().service, "battery_service");
    }
}
