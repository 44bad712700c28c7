//! Simulated BLE Module
//!
//! Plays the part of the platform Bluetooth stack: a fixed roster of
//! advertised peripherals, a pairing prompt with configurable latency, and
//! connection links that can be severed from the remote side.

use std::sync::{Arc, Mutex as StdMutex};

use rand::Rng;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::models::ScanError;
use crate::domain::settings::SettingsService;

/// Name-prefix + required-service filter a pairing request carries.
#[derive(Debug, Clone)]
pub struct DeviceFilter {
    pub name_prefix: String,
    pub service: String,
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            name_prefix: "BLE".to_string(),
            service: "battery_service".to_string(),
        }
    }
}

/// One peripheral the simulated radio can see.
#[derive(Debug, Clone)]
pub struct AdvertisedPeripheral {
    pub name: String,
    pub address: u64,
    pub services: Vec<String>,
}

/// Opaque handle to a paired peripheral. Dropping the handle is the local
/// side of a disconnect; the remote side arrives through [`DeviceLink`].
#[derive(Debug)]
pub struct DeviceHandle {
    name: String,
    address: u64,
    battery_level: u8,
    link: watch::Receiver<bool>,
}

impl DeviceHandle {
    pub(crate) fn new(
        name: String,
        address: u64,
        battery_level: u8,
        link: watch::Receiver<bool>,
    ) -> Self {
        Self {
            name,
            address,
            battery_level,
            link,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    /// Battery service read performed at connect time.
    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    /// A watchable view of the connection, independent of the handle's
    /// lifetime.
    pub fn link(&self) -> DeviceLink {
        DeviceLink(self.link.clone())
    }
}

/// One-shot disconnect notification for a paired peripheral.
#[derive(Debug, Clone)]
pub struct DeviceLink(watch::Receiver<bool>);

impl DeviceLink {
    /// Resolves `true` when the remote side drops the connection, `false`
    /// if the simulator went away without ever dropping it.
    pub async fn dropped(mut self) -> bool {
        loop {
            if !*self.0.borrow() {
                return true;
            }
            if self.0.changed().await.is_err() {
                return false;
            }
        }
    }
}

/// Simulated radio. Holds the advertised roster and the live links so
/// diagnostics and tests can sever them.
pub struct SimulatedBle {
    settings: Arc<StdMutex<SettingsService>>,
    advertised: Vec<AdvertisedPeripheral>,
    links: StdMutex<Vec<watch::Sender<bool>>>,
}

impl SimulatedBle {
    pub fn new(settings: Arc<StdMutex<SettingsService>>) -> Self {
        Self::with_roster(settings, default_roster())
    }

    pub fn with_roster(
        settings: Arc<StdMutex<SettingsService>>,
        advertised: Vec<AdvertisedPeripheral>,
    ) -> Self {
        Self {
            settings,
            advertised,
            links: StdMutex::new(Vec::new()),
        }
    }

    /// Request a peripheral matching `filter`, suspending for the simulated
    /// pairing prompt. May suspend for as long as the profile says a user
    /// takes to answer; callers must not assume bounded latency.
    pub async fn request_device(&self, filter: &DeviceFilter) -> Result<DeviceHandle, ScanError> {
        let (delay_ms, user_cancels) = self
            .settings
            .lock()
            .map(|s| (s.get().pairing_delay_ms, s.get().simulate_user_cancel))
            .unwrap_or((0, false));

        info!(prefix = %filter.name_prefix, service = %filter.service, "pairing prompt shown");
        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;

        if user_cancels {
            warn!("pairing prompt dismissed");
            return Err(ScanError::DeviceUnavailable(
                "pairing request dismissed".to_string(),
            ));
        }

        let peripheral = self
            .advertised
            .iter()
            .find(|p| {
                p.name.starts_with(&filter.name_prefix)
                    && p.services.iter().any(|s| s == &filter.service)
            })
            .ok_or_else(|| {
                ScanError::DeviceUnavailable(format!(
                    "no device matching prefix {:?} in range",
                    filter.name_prefix
                ))
            })?;

        let battery_level = rand::thread_rng().gen_range(20..=100);
        let (tx, rx) = watch::channel(true);
        if let Ok(mut links) = self.links.lock() {
            links.push(tx);
        }

        info!(name = %peripheral.name, address = %format!("{:#X}", peripheral.address), battery_level, "device paired");
        Ok(DeviceHandle::new(
            peripheral.name.clone(),
            peripheral.address,
            battery_level,
            rx,
        ))
    }

    /// Sever every live link, as if the peripheral walked out of range. The
    /// notification reaches watchers asynchronously.
    pub fn drop_connection(&self) {
        if let Ok(links) = self.links.lock() {
            for link in links.iter() {
                let _ = link.send(false);
            }
        }
    }
}

fn default_roster() -> Vec<AdvertisedPeripheral> {
    vec![
        AdvertisedPeripheral {
            name: "BLE Room Beacon".to_string(),
            address: 0xD4_3A_2B_10_7F_E1,
            services: vec!["battery_service".to_string()],
        },
        AdvertisedPeripheral {
            name: "Fitness Band".to_string(),
            address: 0x5C_91_00_AA_34_08,
            services: vec!["heart_rate".to_string()],
        },
    ]
}

#[cfg(test)]
pub(crate) fn simulated_pair(name: &str, battery_level: u8) -> (DeviceHandle, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(true);
    (
        DeviceHandle::new(name.to_string(), 0xC0_FF_EE, battery_level, rx),
        tx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::Settings;

    fn service(settings: Settings) -> Arc<StdMutex<SettingsService>> {
        Arc::new(StdMutex::new(SettingsService::from_settings(settings)))
    }

    fn fast_settings() -> Settings {
        Settings {
            pairing_delay_ms: 1,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn pairs_with_the_first_matching_peripheral() {
        let ble = SimulatedBle::new(service(fast_settings()));
        let device = ble.request_device(&DeviceFilter::default()).await.unwrap();
        assert_eq!(device.name(), "BLE Room Beacon");
        assert!((20..=100).contains(&device.battery_level()));
    }

    #[tokio::test]
    async fn rejects_when_no_peripheral_matches_the_prefix() {
        let ble = SimulatedBle::new(service(fast_settings()));
        let filter = DeviceFilter {
            name_prefix: "Printer".to_string(),
            ..DeviceFilter::default()
        };
        let err = ble.request_device(&filter).await.unwrap_err();
        assert!(matches!(err, ScanError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn rejects_when_the_service_is_missing() {
        let ble = SimulatedBle::new(service(fast_settings()));
        let filter = DeviceFilter {
            name_prefix: "Fitness".to_string(),
            service: "battery_service".to_string(),
        };
        let err = ble.request_device(&filter).await.unwrap_err();
        assert!(matches!(err, ScanError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn user_cancel_surfaces_as_device_unavailable() {
        let settings = Settings {
            simulate_user_cancel: true,
            ..fast_settings()
        };
        let ble = SimulatedBle::new(service(settings));
        let err = ble
            .request_device(&DeviceFilter::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("pairing request dismissed"));
    }

    #[tokio::test]
    async fn dropping_the_connection_resolves_the_link() {
        let ble = SimulatedBle::new(service(fast_settings()));
        let device = ble.request_device(&DeviceFilter::default()).await.unwrap();
        let link = device.link();
        ble.drop_connection();
        assert!(link.dropped().await);
    }

    #[tokio::test]
    async fn link_reports_no_drop_when_the_simulator_goes_away() {
        let (device, tx) = simulated_pair("BLE Test", 80);
        let link = device.link();
        drop(tx);
        assert!(!link.dropped().await);
    }
}
