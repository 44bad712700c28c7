use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four resting and transitional states of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Requesting,
    Scanning,
    Stopped,
}

/// One synthetic sample of the "reconstructed" room.
///
/// Points are owned exclusively by the scene model: created in bulk by the
/// generator, destroyed in bulk by a clear, never mutated individually.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePoint {
    pub id: u32,
    pub position: Vec3,
}

/// Every failure a scan can run into. All variants are recovered locally:
/// logged, translated into a status message, and the session returns to Idle.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// The user dismissed the pairing prompt or no matching peripheral is in
    /// range.
    #[error("bluetooth device unavailable: {0}")]
    DeviceUnavailable(String),
    /// Camera permission denied or no capture hardware present.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// The capability gate refused to start a scan.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
}

/// Summary of the peripheral a scan paired with, including the battery
/// service read performed at connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedDevice {
    pub name: String,
    pub address: u64,
    pub battery_level: u8,
}

/// Events published by the scan service for the UI to mirror.
#[derive(Debug, Clone)]
pub enum AppEvent {
    SessionState(ScanState),
    LogMessage(StatusMessage),
    DevicePaired(PairedDevice),
}

/// Commands the UI sends to the scan service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    StartScan,
    StopScan,
    ExportModel,
    /// Diagnostics: sever the simulated link as if the peripheral walked out
    /// of range.
    InjectDropout,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Which camera the capture request prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    User,
    /// Rear-facing, the default for room scanning.
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Scan,
    Settings,
    Diagnostics,
}
