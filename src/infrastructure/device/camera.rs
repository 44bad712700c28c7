//! Simulated Camera Module
//!
//! Stands in for the platform media stack: a permission prompt with
//! configurable latency and a stream whose tracks can be stopped.

use std::sync::{Arc, Mutex as StdMutex};

use tracing::{info, warn};

use crate::domain::models::{CameraFacing, ScanError};
use crate::domain::settings::SettingsService;

/// Fixed-resolution hint plus facing preference a capture request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: CameraFacing,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing: CameraFacing::Environment,
        }
    }
}

#[derive(Debug, Clone)]
struct StreamTrack {
    label: String,
    live: bool,
}

/// A granted capture stream. `release` stops every track and is safe to call
/// any number of times.
#[derive(Debug)]
pub struct CameraStream {
    label: String,
    constraints: CameraConstraints,
    tracks: Vec<StreamTrack>,
}

impl CameraStream {
    fn live(constraints: CameraConstraints) -> Self {
        let label = match constraints.facing {
            CameraFacing::User => "simulated front camera",
            CameraFacing::Environment => "simulated rear camera",
        };
        Self {
            label: label.to_string(),
            constraints,
            tracks: vec![StreamTrack {
                label: "video0".to_string(),
                live: true,
            }],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn constraints(&self) -> CameraConstraints {
        self.constraints
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.live)
    }

    /// Stop every track. Idempotent.
    pub fn release(&mut self) {
        for track in &mut self.tracks {
            if track.live {
                track.live = false;
                info!(track = %track.label, "camera track stopped");
            }
        }
    }
}

/// Simulated media stack.
pub struct SimulatedCamera {
    settings: Arc<StdMutex<SettingsService>>,
}

impl SimulatedCamera {
    pub fn new(settings: Arc<StdMutex<SettingsService>>) -> Self {
        Self { settings }
    }

    /// Request a live stream, suspending for the simulated permission
    /// prompt. Callers must not assume bounded latency.
    pub async fn open(&self, constraints: CameraConstraints) -> Result<CameraStream, ScanError> {
        let (delay_ms, denied, absent) = self
            .settings
            .lock()
            .map(|s| {
                let s = s.get();
                (
                    s.permission_delay_ms,
                    s.simulate_camera_denied,
                    s.simulate_camera_absent,
                )
            })
            .unwrap_or((0, false, false));

        info!(
            width = constraints.width,
            height = constraints.height,
            "camera permission prompt shown"
        );
        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;

        if absent {
            warn!("no capture hardware present");
            return Err(ScanError::CameraUnavailable(
                "no capture device present".to_string(),
            ));
        }
        if denied {
            warn!("camera permission denied");
            return Err(ScanError::CameraUnavailable(
                "permission denied".to_string(),
            ));
        }

        info!("camera stream granted");
        Ok(CameraStream::live(constraints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::Settings;

    fn camera_with(settings: Settings) -> SimulatedCamera {
        SimulatedCamera::new(Arc::new(StdMutex::new(SettingsService::from_settings(
            settings,
        ))))
    }

    fn fast_settings() -> Settings {
        Settings {
            permission_delay_ms: 1,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn grants_a_live_stream() {
        let camera = camera_with(fast_settings());
        let stream = camera.open(CameraConstraints::default()).await.unwrap();
        assert!(stream.is_live());
        assert_eq!(stream.constraints().facing, CameraFacing::Environment);
    }

    #[tokio::test]
    async fn denial_surfaces_as_camera_unavailable() {
        let camera = camera_with(Settings {
            simulate_camera_denied: true,
            ..fast_settings()
        });
        let err = camera
            .open(CameraConstraints::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn missing_hardware_surfaces_as_camera_unavailable() {
        let camera = camera_with(Settings {
            simulate_camera_absent: true,
            ..fast_settings()
        });
        let err = camera
            .open(CameraConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::CameraUnavailable(_)));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let camera = camera_with(fast_settings());
        let mut stream = camera.open(CameraConstraints::default()).await.unwrap();
        stream.release();
        assert!(!stream.is_live());
        stream.release();
        assert!(!stream.is_live());
    }
}
