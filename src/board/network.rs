//! Network helpers: WiFi station connect with a fixed poll budget, and the
//! Ethernet placeholder.
//!
//! ## Connect policy
//!
//! One association attempt, then up to `attempts` status polls spaced
//! `interval_ms` apart.  There is no monotonic deadline and no retry of the
//! association itself.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::error::NetworkError;
use crate::ports::WifiPort;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

/// Validated station credentials in fixed-capacity buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, NetworkError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds.ssid.push_str(ssid).map_err(|_| NetworkError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| NetworkError::InvalidPassword)?;
        Ok(creds)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), NetworkError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(NetworkError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), NetworkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(NetworkError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Connect
// ───────────────────────────────────────────────────────────────

/// Start association and poll until connected or `attempts` polls elapse.
pub fn connect(
    wifi: &mut impl WifiPort,
    delay: &mut impl DelayNs,
    creds: &WifiCredentials,
    attempts: u8,
    interval_ms: u32,
) -> Result<(), NetworkError> {
    info!("WiFi: connecting to '{}'", creds.ssid());
    wifi.begin(creds.ssid(), creds.password())?;

    let mut remaining = attempts;
    while !wifi.is_connected() && remaining > 0 {
        delay.delay_ms(interval_ms);
        remaining -= 1;
    }

    if wifi.is_connected() {
        info!("WiFi: connected after {} poll(s)", attempts - remaining);
        Ok(())
    } else {
        warn!("WiFi: not connected after {} polls", attempts);
        Err(NetworkError::Timeout)
    }
}

/// Placeholder for the on-board LAN8720A PHY.  The EMAC bring-up lives in
/// the platform's Ethernet stack; nothing is configured here yet.
pub fn begin_ethernet() -> Result<(), NetworkError> {
    info!("Ethernet: bring-up left to the platform stack");
    Ok(())
}
