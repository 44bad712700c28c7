//! Scan session lifecycle controller.
//!
//! The session is a four-state machine:
//!
//! ```text
//!           start (gated)              both acquired
//!   Idle ──────────────────► Requesting ────────────► Scanning ──┐ timer:
//!    ▲                           │                     │   ▲     │ publish
//!    │   either acquisition      │                     │   └─────┘ points
//!    │   fails                   │              stop   │
//!    ├───────────────────────────┘                     ▼
//!    │                 disconnect                   Stopped
//!    └────────────────────────────────────────────────┘ (start again)
//! ```
//!
//! Every external completion - user request, settled acquisition, elapsed
//! timer, dropped link - is fed through [`ScanController::dispatch`] as a
//! [`SessionEvent`]. Work that needs the async runtime comes back to the
//! caller as [`SessionAction`]s, which keeps the transition logic synchronous
//! and lets tests replay event orderings exactly.
//!
//! Each scan is stamped with a monotonically increasing id when it enters
//! Scanning. Timers and disconnect watchers carry the id of the scan that
//! armed them, and `dispatch` drops any completion whose id is stale, so a
//! stop inside the timer window suppresses point generation and nothing from
//! a previous scan can leak into the next one.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::capability::SurfaceGate;
use crate::domain::models::{
    AppEvent, MessageSeverity, PairedDevice, ScanError, ScanState, StatusMessage,
};
use crate::domain::points::PointGenerator;
use crate::domain::scene::SceneModel;
use crate::domain::settings::SettingsService;
use crate::infrastructure::device::{CameraStream, DeviceHandle};

/// External completions and user requests, fed to the controller in the
/// order they were observed.
#[derive(Debug)]
pub enum SessionEvent {
    StartRequested,
    StopRequested,
    AcquireSucceeded {
        device: DeviceHandle,
        camera: CameraStream,
    },
    AcquireFailed {
        error: ScanError,
    },
    TimerFired {
        scan_id: u64,
    },
    DeviceDisconnected {
        scan_id: u64,
    },
}

/// Work the controller needs its async driver to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Begin concurrent device + camera acquisition.
    AcquireResources,
    /// Arm the one-shot scan timer for the given scan.
    ArmScanTimer { scan_id: u64 },
    /// Watch the held device for an unsolicited disconnect.
    WatchDisconnect { scan_id: u64 },
}

/// The mutable session record. Handles live here and nowhere else.
pub struct ScanSession {
    state: ScanState,
    device: Option<DeviceHandle>,
    camera: Option<CameraStream>,
    status_message: String,
}

impl ScanSession {
    fn new() -> Self {
        Self {
            state: ScanState::Idle,
            device: None,
            camera: None,
            status_message: "idle".to_string(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn device(&self) -> Option<&DeviceHandle> {
        self.device.as_ref()
    }

    pub fn camera(&self) -> Option<&CameraStream> {
        self.camera.as_ref()
    }
}

pub struct ScanController {
    session: ScanSession,
    scan_id: u64,
    gate: SurfaceGate,
    scene: Arc<Mutex<SceneModel>>,
    settings: Arc<Mutex<SettingsService>>,
    events: mpsc::UnboundedSender<AppEvent>,
    rng: StdRng,
}

impl ScanController {
    pub fn new(
        settings: Arc<Mutex<SettingsService>>,
        scene: Arc<Mutex<SceneModel>>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let seed = settings.lock().ok().and_then(|s| s.get().rng_seed);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            session: ScanSession::new(),
            scan_id: 0,
            gate: SurfaceGate::new(settings.clone()),
            scene,
            settings,
            events,
            rng,
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// The single entry point: apply one event, return the follow-up work.
    pub fn dispatch(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::StartRequested => self.on_start(),
            SessionEvent::StopRequested => self.on_stop(),
            SessionEvent::AcquireSucceeded { device, camera } => self.on_acquired(device, camera),
            SessionEvent::AcquireFailed { error } => self.on_acquire_failed(error),
            SessionEvent::TimerFired { scan_id } => self.on_timer(scan_id),
            SessionEvent::DeviceDisconnected { scan_id } => self.on_disconnect(scan_id),
        }
    }

    fn on_start(&mut self) -> Vec<SessionAction> {
        match self.session.state {
            ScanState::Requesting | ScanState::Scanning => {
                warn!(state = ?self.session.state, "start requested while a scan is active");
                self.notify("scan already in progress", MessageSeverity::Warning);
                return Vec::new();
            }
            ScanState::Idle | ScanState::Stopped => {}
        }

        if !self.gate.check_ready() {
            let error =
                ScanError::PreconditionFailed("low light or no flat surface detected".to_string());
            warn!(%error, "capability gate refused the scan");
            self.notify(&error.to_string(), MessageSeverity::Error);
            return Vec::new();
        }

        // A new scan starts from an empty model.
        if let Ok(mut scene) = self.scene.lock() {
            scene.clear();
        }
        self.enter(ScanState::Requesting, "initializing", MessageSeverity::Info);
        vec![SessionAction::AcquireResources]
    }

    fn on_acquired(&mut self, device: DeviceHandle, mut camera: CameraStream) -> Vec<SessionAction> {
        if self.session.state != ScanState::Requesting {
            warn!(state = ?self.session.state, "acquisition settled outside Requesting; releasing");
            camera.release();
            return Vec::new();
        }

        let constraints = camera.constraints();
        info!(
            device = %device.name(),
            battery = device.battery_level(),
            camera = %camera.label(),
            width = constraints.width,
            height = constraints.height,
            "device paired and camera granted"
        );
        let _ = self.events.send(AppEvent::DevicePaired(PairedDevice {
            name: device.name().to_string(),
            address: device.address(),
            battery_level: device.battery_level(),
        }));

        self.session.device = Some(device);
        self.session.camera = Some(camera);
        self.scan_id += 1;
        let scan_id = self.scan_id;

        self.enter(
            ScanState::Scanning,
            "scanning, please scan a flat surface",
            MessageSeverity::Info,
        );
        vec![
            SessionAction::ArmScanTimer { scan_id },
            SessionAction::WatchDisconnect { scan_id },
        ]
    }

    fn on_acquire_failed(&mut self, error: ScanError) -> Vec<SessionAction> {
        if self.session.state != ScanState::Requesting {
            debug!(%error, "stale acquisition failure ignored");
            return Vec::new();
        }

        warn!(%error, "resource acquisition failed");
        self.release_handles();
        self.enter(ScanState::Idle, &error.to_string(), MessageSeverity::Error);
        Vec::new()
    }

    fn on_timer(&mut self, scan_id: u64) -> Vec<SessionAction> {
        if self.session.state != ScanState::Scanning || scan_id != self.scan_id {
            debug!(scan_id, current = self.scan_id, "stale scan timer ignored");
            return Vec::new();
        }

        let (count, span) = self
            .settings
            .lock()
            .map(|s| (s.get().point_count, s.get().point_span))
            .unwrap_or((
                crate::domain::points::DEFAULT_POINT_COUNT,
                crate::domain::points::DEFAULT_SPAN,
            ));

        let points = PointGenerator::new(span).generate(&mut self.rng, count);
        if let Ok(mut scene) = self.scene.lock() {
            scene.replace_all(points);
        }

        info!(count, "synthetic reconstruction published");
        self.set_status("3D modeling started", MessageSeverity::Success);
        Vec::new()
    }

    fn on_stop(&mut self) -> Vec<SessionAction> {
        match self.session.state {
            ScanState::Scanning => {
                self.release_handles();
                self.enter(ScanState::Stopped, "scan stopped", MessageSeverity::Info);
            }
            ScanState::Requesting => {
                // Acquisition prompts cannot be cancelled; the stop is
                // dropped and the session settles on its own.
                warn!("stop requested while acquisition is pending; ignored");
                self.notify("still initializing, stop ignored", MessageSeverity::Warning);
            }
            ScanState::Idle | ScanState::Stopped => {
                debug!("stop requested with no active scan");
            }
        }
        Vec::new()
    }

    fn on_disconnect(&mut self, scan_id: u64) -> Vec<SessionAction> {
        if scan_id != self.scan_id || self.session.device.is_none() {
            debug!(scan_id, "stale disconnect notification ignored");
            return Vec::new();
        }

        warn!("device dropped the connection");
        self.release_handles();
        if let Ok(mut scene) = self.scene.lock() {
            scene.clear();
        }
        self.enter(
            ScanState::Idle,
            "device disconnected",
            MessageSeverity::Warning,
        );
        Vec::new()
    }

    fn release_handles(&mut self) {
        if let Some(mut camera) = self.session.camera.take() {
            camera.release();
        }
        self.session.device = None;
    }

    /// Transition to `state` and record the new status line.
    fn enter(&mut self, state: ScanState, status: &str, severity: MessageSeverity) {
        info!(from = ?self.session.state, to = ?state, "session transition");
        self.session.state = state;
        self.session.status_message = status.to_string();
        let _ = self.events.send(AppEvent::SessionState(state));
        self.send_log(status, severity);
    }

    /// Update the status line without a state change.
    fn set_status(&mut self, status: &str, severity: MessageSeverity) {
        self.session.status_message = status.to_string();
        self.send_log(status, severity);
    }

    /// Surface a transient message without touching the recorded status.
    fn notify(&self, message: &str, severity: MessageSeverity) {
        self.send_log(message, severity);
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self.events.send(AppEvent::LogMessage(StatusMessage {
            message: message.to_string(),
            severity,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::Settings;
    use crate::infrastructure::device::ble::simulated_pair;
    use crate::infrastructure::device::{CameraConstraints, SimulatedCamera};
    use tokio::sync::watch;

    struct Harness {
        controller: ScanController,
        scene: Arc<Mutex<SceneModel>>,
        events: mpsc::UnboundedReceiver<AppEvent>,
    }

    fn harness() -> Harness {
        harness_with(Settings {
            rng_seed: Some(7),
            ..Settings::default()
        })
    }

    fn harness_with(settings: Settings) -> Harness {
        let settings = Arc::new(Mutex::new(SettingsService::from_settings(settings)));
        let scene = Arc::new(Mutex::new(SceneModel::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        Harness {
            controller: ScanController::new(settings, scene.clone(), tx),
            scene,
            events: rx,
        }
    }

    async fn open_camera() -> CameraStream {
        let settings = Arc::new(Mutex::new(SettingsService::from_settings(Settings {
            permission_delay_ms: 0,
            ..Settings::default()
        })));
        SimulatedCamera::new(settings)
            .open(CameraConstraints::default())
            .await
            .unwrap()
    }

    /// Drive Idle -> Requesting -> Scanning, returning the armed scan id and
    /// the remote end of the device link.
    async fn start_scanning(h: &mut Harness) -> (u64, watch::Sender<bool>) {
        let actions = h.controller.dispatch(SessionEvent::StartRequested);
        assert_eq!(actions, vec![SessionAction::AcquireResources]);
        assert_eq!(h.controller.session().state(), ScanState::Requesting);

        let (device, remote) = simulated_pair("BLE Room Beacon", 85);
        let camera = open_camera().await;
        let actions = h
            .controller
            .dispatch(SessionEvent::AcquireSucceeded { device, camera });

        let scan_id = match actions.as_slice() {
            [SessionAction::ArmScanTimer { scan_id }, SessionAction::WatchDisconnect { scan_id: watch_id }] =>
            {
                assert_eq!(scan_id, watch_id);
                *scan_id
            }
            other => panic!("unexpected actions: {other:?}"),
        };
        assert_eq!(h.controller.session().state(), ScanState::Scanning);
        (scan_id, remote)
    }

    fn drain_states(h: &mut Harness) -> Vec<ScanState> {
        let mut states = Vec::new();
        while let Ok(event) = h.events.try_recv() {
            if let AppEvent::SessionState(state) = event {
                states.push(state);
            }
        }
        states
    }

    fn scene_len(h: &Harness) -> usize {
        h.scene.lock().unwrap().len()
    }

    #[tokio::test]
    async fn successful_start_walks_idle_requesting_scanning() {
        let mut h = harness();
        start_scanning(&mut h).await;

        assert!(h.controller.session().camera().is_some());
        assert!(h.controller.session().device().is_some());
        assert_eq!(
            drain_states(&mut h),
            vec![ScanState::Requesting, ScanState::Scanning]
        );
    }

    #[tokio::test]
    async fn timer_publishes_the_configured_point_count() {
        let mut h = harness();
        let (scan_id, _remote) = start_scanning(&mut h).await;

        h.controller.dispatch(SessionEvent::TimerFired { scan_id });

        assert_eq!(h.controller.session().state(), ScanState::Scanning);
        assert_eq!(h.controller.session().status_message(), "3D modeling started");
        let scene = h.scene.lock().unwrap();
        assert_eq!(scene.len(), 50);
        for point in scene.points() {
            for coord in point.position.to_array() {
                assert!((-15.0..=15.0).contains(&coord));
            }
        }
    }

    #[tokio::test]
    async fn stop_before_the_timer_leaves_the_scene_empty() {
        let mut h = harness();
        let (scan_id, _remote) = start_scanning(&mut h).await;

        h.controller.dispatch(SessionEvent::StopRequested);
        assert_eq!(h.controller.session().state(), ScanState::Stopped);

        // The pending timer still fires; the state guard must suppress it.
        h.controller.dispatch(SessionEvent::TimerFired { scan_id });
        assert_eq!(scene_len(&h), 0);
        assert_eq!(h.controller.session().state(), ScanState::Stopped);
    }

    #[tokio::test]
    async fn stop_after_the_timer_keeps_the_points() {
        let mut h = harness();
        let (scan_id, _remote) = start_scanning(&mut h).await;

        h.controller.dispatch(SessionEvent::TimerFired { scan_id });
        h.controller.dispatch(SessionEvent::StopRequested);

        assert_eq!(h.controller.session().state(), ScanState::Stopped);
        assert_eq!(scene_len(&h), 50);
        assert!(h.controller.session().camera().is_none());
        assert!(h.controller.session().device().is_none());
    }

    #[tokio::test]
    async fn disconnect_during_scanning_forces_idle() {
        let mut h = harness();
        let (scan_id, _remote) = start_scanning(&mut h).await;
        h.controller.dispatch(SessionEvent::TimerFired { scan_id });

        h.controller
            .dispatch(SessionEvent::DeviceDisconnected { scan_id });

        assert_eq!(h.controller.session().state(), ScanState::Idle);
        assert!(h.controller.session().device().is_none());
        assert!(h.controller.session().camera().is_none());
        assert_eq!(scene_len(&h), 0);
    }

    #[tokio::test]
    async fn stale_disconnect_from_a_previous_scan_is_ignored() {
        let mut h = harness();
        let (old_scan, _old_remote) = start_scanning(&mut h).await;
        h.controller.dispatch(SessionEvent::StopRequested);

        // Second scan; the first scan's watcher fires afterwards.
        let (new_scan, _new_remote) = start_scanning(&mut h).await;
        assert_ne!(old_scan, new_scan);
        h.controller
            .dispatch(SessionEvent::DeviceDisconnected { scan_id: old_scan });

        assert_eq!(h.controller.session().state(), ScanState::Scanning);
        assert!(h.controller.session().device().is_some());
    }

    #[tokio::test]
    async fn stale_timer_from_a_previous_scan_never_generates() {
        let mut h = harness();
        let (old_scan, _old_remote) = start_scanning(&mut h).await;
        h.controller.dispatch(SessionEvent::StopRequested);

        let (_new_scan, _new_remote) = start_scanning(&mut h).await;
        h.controller
            .dispatch(SessionEvent::TimerFired { scan_id: old_scan });

        assert_eq!(scene_len(&h), 0);
    }

    #[tokio::test]
    async fn reentrant_start_is_rejected() {
        let mut h = harness();
        h.controller.dispatch(SessionEvent::StartRequested);
        assert_eq!(h.controller.session().state(), ScanState::Requesting);

        let actions = h.controller.dispatch(SessionEvent::StartRequested);
        assert!(actions.is_empty());
        assert_eq!(h.controller.session().state(), ScanState::Requesting);

        let (_scan_id, _remote) = {
            let (device, remote) = simulated_pair("BLE Room Beacon", 60);
            let camera = open_camera().await;
            h.controller
                .dispatch(SessionEvent::AcquireSucceeded { device, camera });
            (h.controller.scan_id, remote)
        };
        let actions = h.controller.dispatch(SessionEvent::StartRequested);
        assert!(actions.is_empty());
        assert_eq!(h.controller.session().state(), ScanState::Scanning);
    }

    #[tokio::test]
    async fn gate_failure_keeps_the_session_where_it_was() {
        let mut h = harness_with(Settings {
            surface_detected: false,
            rng_seed: Some(7),
            ..Settings::default()
        });

        let actions = h.controller.dispatch(SessionEvent::StartRequested);
        assert!(actions.is_empty());
        assert_eq!(h.controller.session().state(), ScanState::Idle);

        let failure = h.events.try_recv();
        match failure {
            Ok(AppEvent::LogMessage(msg)) => {
                assert_eq!(msg.severity, MessageSeverity::Error);
                assert!(msg.message.contains("no flat surface"));
            }
            other => panic!("expected a precondition message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn acquisition_failure_returns_to_idle_with_no_camera() {
        let mut h = harness();
        h.controller.dispatch(SessionEvent::StartRequested);

        h.controller.dispatch(SessionEvent::AcquireFailed {
            error: ScanError::DeviceUnavailable("pairing request dismissed".to_string()),
        });

        assert_eq!(h.controller.session().state(), ScanState::Idle);
        assert!(h.controller.session().camera().is_none());
        assert!(h.controller.session().device().is_none());
        assert!(h
            .controller
            .session()
            .status_message()
            .contains("pairing request dismissed"));
    }

    #[tokio::test]
    async fn stop_while_requesting_is_deferred() {
        let mut h = harness();
        h.controller.dispatch(SessionEvent::StartRequested);

        h.controller.dispatch(SessionEvent::StopRequested);
        assert_eq!(h.controller.session().state(), ScanState::Requesting);

        // Acquisition settles normally afterwards.
        let (device, _remote) = simulated_pair("BLE Room Beacon", 42);
        let camera = open_camera().await;
        h.controller
            .dispatch(SessionEvent::AcquireSucceeded { device, camera });
        assert_eq!(h.controller.session().state(), ScanState::Scanning);
    }

    #[tokio::test]
    async fn restart_from_stopped_clears_the_previous_cloud() {
        let mut h = harness();
        let (scan_id, _remote) = start_scanning(&mut h).await;
        h.controller.dispatch(SessionEvent::TimerFired { scan_id });
        h.controller.dispatch(SessionEvent::StopRequested);
        assert_eq!(scene_len(&h), 50);

        let (_new_scan, _new_remote) = start_scanning(&mut h).await;
        assert_eq!(scene_len(&h), 0);
    }

    #[tokio::test]
    async fn seeded_sessions_reproduce_the_same_cloud() {
        let run = || async {
            let mut h = harness();
            let (scan_id, _remote) = start_scanning(&mut h).await;
            h.controller.dispatch(SessionEvent::TimerFired { scan_id });
            let scene = h.scene.lock().unwrap();
            scene.points().to_vec()
        };
        assert_eq!(run().await, run().await);
    }

    #[tokio::test]
    async fn pairing_summary_is_published_on_acquisition() {
        let mut h = harness();
        let _ = start_scanning(&mut h).await;

        let mut paired = None;
        while let Ok(event) = h.events.try_recv() {
            if let AppEvent::DevicePaired(device) = event {
                paired = Some(device);
            }
        }
        let paired = paired.expect("no pairing summary published");
        assert_eq!(paired.name, "BLE Room Beacon");
        assert_eq!(paired.battery_level, 85);
    }
}
