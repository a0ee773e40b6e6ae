//! Port traits: the boundary between the board controller and the platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ Board (controller)
//! ```
//!
//! The I²C bus is not a port of its own: [`Board`](crate::board::Board)
//! takes any `embedded_hal::i2c::I2c` directly.  Everything `embedded-hal`
//! has no trait for (the ADC, pin allocation for sensor headers, WiFi) is
//! modelled here, so the controller can run against mocks on the host.

use crate::drivers::dht::DhtKind;
use crate::error::{NetworkError, Result, SensorError};

// ───────────────────────────────────────────────────────────────
// ADC port
// ───────────────────────────────────────────────────────────────

/// One-shot ADC sampling by GPIO number.
pub trait AnalogPort {
    /// Configure the sample width for every analog input.
    fn set_resolution(&mut self, bits: u8) -> Result<()>;

    /// Take one raw sample from `gpio`.
    fn read_raw(&mut self, gpio: i32) -> Result<u16>;
}

// ───────────────────────────────────────────────────────────────
// Sensor probes (driven by the sensor slots)
// ───────────────────────────────────────────────────────────────

/// Blocking temperature read in °C.
pub trait TemperatureProbe {
    fn read_temperature(&mut self) -> core::result::Result<f32, SensorError>;
}

/// Blocking relative-humidity read in %.
pub trait HumidityProbe: TemperatureProbe {
    fn read_humidity(&mut self) -> core::result::Result<f32, SensorError>;
}

/// Builds sensor drivers bound to a header's data pin.
///
/// The board drops a slot's previous driver before calling `open_*`, so an
/// implementation may hand out exclusive ownership of the pin each time.
pub trait SensorBus {
    type Ds18b20: TemperatureProbe;
    type Dht: HumidityProbe;

    fn open_ds18b20(&mut self, gpio: i32) -> core::result::Result<Self::Ds18b20, SensorError>;

    fn open_dht(&mut self, gpio: i32, kind: DhtKind)
    -> core::result::Result<Self::Dht, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// WiFi port
// ───────────────────────────────────────────────────────────────

/// Station-mode WiFi.  `begin` only starts association; the board polls
/// `is_connected` until it succeeds or the attempt budget runs out.
pub trait WifiPort {
    fn begin(&mut self, ssid: &str, password: &str) -> core::result::Result<(), NetworkError>;

    fn is_connected(&mut self) -> bool;
}
