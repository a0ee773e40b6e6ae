//! Unified error types for the KC-Link board crate.
//!
//! A single `Error` enum that every subsystem converts into, so the embedder's
//! main loop handles failures uniformly.  All variants are `Copy` so they can
//! be returned from polling paths without allocation.

use core::fmt;

use embedded_hal::i2c::ErrorKind as I2cErrorKind;

// ---------------------------------------------------------------------------
// Top-level board error
// ---------------------------------------------------------------------------

/// Every fallible board operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A 1-based channel number was outside the range for its kind.
    InvalidChannel { kind: ChannelKind, number: u8 },
    /// An I2C transaction with one of the expanders failed.
    Bus(I2cErrorKind),
    /// The ADC rejected a read or configuration request.
    Adc,
    /// A temperature / humidity sensor could not be read.
    Sensor(SensorError),
    /// A network helper failed.
    Network(NetworkError),
    /// Board bring-up failed; the instance must not be used further.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel { kind, number } => {
                write!(f, "{kind} {number} out of range 1-{}", kind.count())
            }
            Self::Bus(kind) => write!(f, "i2c: {kind}"),
            Self::Adc => write!(f, "ADC read failed"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Channel kinds
// ---------------------------------------------------------------------------

/// The four independently numbered channel families on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Relay,
    DigitalInput,
    AnalogInput,
    SensorSlot,
}

impl ChannelKind {
    /// Number of channels of this kind; valid numbers are `1..=count()`.
    pub const fn count(self) -> u8 {
        match self {
            Self::Relay | Self::DigitalInput => 8,
            Self::AnalogInput => 2,
            Self::SensorSlot => 4,
        }
    }

    /// Validate a 1-based channel number and return its 0-based index.
    pub fn index(self, number: u8) -> Result<usize> {
        if number == 0 || number > self.count() {
            return Err(Error::InvalidChannel { kind: self, number });
        }
        Ok(usize::from(number - 1))
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relay => write!(f, "relay"),
            Self::DigitalInput => write!(f, "digital input"),
            Self::AnalogInput => write!(f, "analog input"),
            Self::SensorSlot => write!(f, "sensor slot"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The slot has no sensor configured.
    NotConfigured,
    /// The requested sensor type is not supported on a slot.
    Unsupported,
    /// The slot's sensor does not measure humidity.
    NoHumidity,
    /// No DHT answered the start pulse.
    NoResponse,
    /// The device stopped toggling the line mid-frame.
    Timeout,
    /// Frame checksum or CRC mismatch.
    Checksum,
    /// No DS18B20 answered the reset pulse, or its scratchpad read back blank.
    Disconnected,
    /// The data pin could not be driven or sampled.
    Pin,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "slot not configured"),
            Self::Unsupported => write!(f, "unsupported sensor type"),
            Self::NoHumidity => write!(f, "sensor has no humidity channel"),
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::Timeout => write!(f, "sensor timed out"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Disconnected => write!(f, "sensor disconnected"),
            Self::Pin => write!(f, "data pin error"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open network) or 8-64 bytes.
    InvalidPassword,
    /// The platform refused to start the association attempt.
    StartFailed,
    /// Still not associated after the last status poll.
    Timeout,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::StartFailed => write!(f, "WiFi start failed"),
            Self::Timeout => write!(f, "WiFi connect timed out"),
        }
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
