//! Device Module
//!
//! Simulated acquisition of the two scoped resources a scan holds: one
//! BLE-like peripheral handle and one camera stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     DeviceSession                       │
//! │   (coordinator - acquires both resources concurrently)  │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//!              ┌───────────┴────────────┐
//!              ▼                        ▼
//!      ┌──────────────┐        ┌─────────────────┐
//!      │ SimulatedBle │        │ SimulatedCamera │
//!      │              │        │                 │
//!      │ - pairing    │        │ - permission    │
//!      │ - battery    │        │   prompt        │
//!      │ - dropouts   │        │ - stream tracks │
//!      └──────────────┘        └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ble`] - Simulated peripheral roster, pairing, and disconnect links
//! - [`camera`] - Simulated capture stream with idempotent release
//! - [`session`] - Concurrent acquisition of both resources

pub mod ble;
pub mod camera;
pub mod session;

pub use ble::{DeviceFilter, DeviceHandle, DeviceLink, SimulatedBle};
pub use camera::{CameraConstraints, CameraStream, SimulatedCamera};
pub use session::DeviceSession;
