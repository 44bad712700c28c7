//! Scan Service Module
//!
//! The async driver around the session controller: receives UI commands,
//! turns settled acquisitions, elapsed timers and dropped links into session
//! events, and executes the actions the controller hands back. Everything is
//! serialized through one `select!` loop, so events reach the controller one
//! at a time in observation order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::models::{
    AppEvent, MessageSeverity, ScanCommand, ScanError, StatusMessage,
};
use crate::domain::scene::SceneModel;
use crate::domain::session::{ScanController, SessionAction, SessionEvent};
use crate::domain::settings::SettingsService;
use crate::infrastructure::device::{CameraStream, DeviceHandle, DeviceSession};
use crate::infrastructure::export::ObjExporter;

/// Completions produced by spawned tasks, funneled back into the loop.
#[derive(Debug)]
enum InternalEvent {
    AcquireSettled(Result<(DeviceHandle, CameraStream), ScanError>),
    ScanTimerElapsed { scan_id: u64 },
    DeviceDropped { scan_id: u64 },
}

pub struct ScanService {
    controller: ScanController,
    devices: Arc<DeviceSession>,
    scene: Arc<Mutex<SceneModel>>,
    settings: Arc<Mutex<SettingsService>>,
    events: mpsc::UnboundedSender<AppEvent>,
    commands: mpsc::UnboundedReceiver<ScanCommand>,
    internal_tx: mpsc::UnboundedSender<InternalEvent>,
    internal_rx: mpsc::UnboundedReceiver<InternalEvent>,
}

impl ScanService {
    pub fn new(
        settings: Arc<Mutex<SettingsService>>,
        scene: Arc<Mutex<SceneModel>>,
        events: mpsc::UnboundedSender<AppEvent>,
        commands: mpsc::UnboundedReceiver<ScanCommand>,
    ) -> Self {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        Self {
            controller: ScanController::new(settings.clone(), scene.clone(), events.clone()),
            devices: Arc::new(DeviceSession::new(settings.clone())),
            scene,
            settings,
            events,
            commands,
            internal_tx,
            internal_rx,
        }
    }

    /// Run until the command channel closes (the UI went away).
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(event) = self.internal_rx.recv() => self.handle_internal(event),
            }
        }
    }

    fn handle_command(&mut self, cmd: ScanCommand) {
        match cmd {
            ScanCommand::StartScan => {
                let actions = self.controller.dispatch(SessionEvent::StartRequested);
                self.apply(actions);
            }
            ScanCommand::StopScan => {
                let actions = self.controller.dispatch(SessionEvent::StopRequested);
                self.apply(actions);
            }
            ScanCommand::ExportModel => self.export_model(),
            ScanCommand::InjectDropout => {
                warn!("diagnostics: severing the simulated link");
                self.devices.ble().drop_connection();
            }
        }
    }

    fn handle_internal(&mut self, event: InternalEvent) {
        let session_event = match event {
            InternalEvent::AcquireSettled(Ok((device, camera))) => {
                SessionEvent::AcquireSucceeded { device, camera }
            }
            InternalEvent::AcquireSettled(Err(error)) => SessionEvent::AcquireFailed { error },
            InternalEvent::ScanTimerElapsed { scan_id } => SessionEvent::TimerFired { scan_id },
            InternalEvent::DeviceDropped { scan_id } => {
                SessionEvent::DeviceDisconnected { scan_id }
            }
        };
        let actions = self.controller.dispatch(session_event);
        self.apply(actions);
    }

    fn apply(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::AcquireResources => {
                    let devices = self.devices.clone();
                    let tx = self.internal_tx.clone();
                    tokio::spawn(async move {
                        let result = devices.acquire().await;
                        let _ = tx.send(InternalEvent::AcquireSettled(result));
                    });
                }
                SessionAction::ArmScanTimer { scan_id } => {
                    let delay_ms = self
                        .settings
                        .lock()
                        .map(|s| s.get().scan_delay_ms)
                        .unwrap_or(5000);
                    let tx = self.internal_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        let _ = tx.send(InternalEvent::ScanTimerElapsed { scan_id });
                    });
                }
                SessionAction::WatchDisconnect { scan_id } => {
                    if let Some(link) = self.controller.session().device().map(|d| d.link()) {
                        let tx = self.internal_tx.clone();
                        tokio::spawn(async move {
                            if link.dropped().await {
                                let _ = tx.send(InternalEvent::DeviceDropped { scan_id });
                            }
                        });
                    }
                }
            }
        }
    }

    /// Export whatever the model holds. The UI only offers this in Stopped,
    /// but an empty model still yields a valid file.
    fn export_model(&mut self) {
        let session = self.controller.session();
        debug!(
            state = ?session.state(),
            status = %session.status_message(),
            camera_held = session.camera().is_some(),
            "export requested"
        );

        let dir = {
            let configured = self
                .settings
                .lock()
                .ok()
                .and_then(|s| s.get().export_dir.clone());
            ObjExporter::resolve_dir(configured.as_deref())
        };

        let result = self
            .scene
            .lock()
            .map_err(|_| anyhow::anyhow!("scene model lock poisoned"))
            .and_then(|scene| ObjExporter::write(&scene, &dir));

        match result {
            Ok(path) => self.send_log(
                &format!("model exported to {}", path.display()),
                MessageSeverity::Success,
            ),
            Err(e) => {
                error!("export failed: {e:#}");
                self.send_log(&format!("export failed: {e}"), MessageSeverity::Error);
            }
        }
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self.events.send(AppEvent::LogMessage(StatusMessage {
            message: message.to_string(),
            severity,
        }));
    }
}
