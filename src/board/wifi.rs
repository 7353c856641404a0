//! Wi-Fi station link.
//!
//! Configured and started during boot; the consumer thread blocks in
//! [`NetworkLink::wait_connected`] until the station has an IP address.

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use btn2slack::NetworkLink;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

/// Pause between association attempts.
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl WifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> Result<Self> {
        let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| anyhow!("WIFI_SSID is longer than 32 bytes"))?,
            password: password
                .try_into()
                .map_err(|_| anyhow!("WIFI_PASSWORD is longer than 64 bytes"))?,
            auth_method,
            ..Default::default()
        }))?;
        wifi.start()?;
        info!("Wi-Fi started, SSID {}", ssid);

        Ok(Self { wifi })
    }
}

impl NetworkLink for WifiLink {
    fn wait_connected(&mut self) {
        loop {
            match self.wifi.connect().and_then(|()| self.wifi.wait_netif_up()) {
                Ok(()) => {
                    info!("Wi-Fi connected");
                    return;
                }
                Err(e) => {
                    warn!("Wi-Fi connect failed: {}, retrying", e);
                    let _ = self.wifi.disconnect();
                    thread::sleep(RETRY_DELAY);
                }
            }
        }
    }
}
