//! Board configuration parameters
//!
//! Everything the controller needs to know about the physical board that is
//! not fixed by the silicon.  Defaults describe a stock V1.4 board; a JSON
//! document (e.g. baked into the firmware image) can override them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins::{self, BoardVersion};

/// Core board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Board revision; selects the analog and sensor pin map
    pub version: BoardVersion,

    // --- I2C expanders ---
    /// 7-bit address of the relay PCF8574
    pub relay_address: u8,
    /// 7-bit address of the digital input PCF8574
    pub input_address: u8,

    // --- Analog ---
    /// ADC sample width in bits
    pub adc_resolution_bits: u8,
    /// Input voltage that maps to the maximum ADC code
    pub analog_full_scale_volts: f32,

    // --- WiFi ---
    /// Number of status polls before giving up on association
    pub wifi_connect_attempts: u8,
    /// Sleep between status polls (milliseconds)
    pub wifi_retry_interval_ms: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            version: BoardVersion::V1_4,

            relay_address: pins::RELAY_EXPANDER_ADDR,
            input_address: pins::INPUT_EXPANDER_ADDR,

            adc_resolution_bits: pins::ADC_RESOLUTION_BITS,
            analog_full_scale_volts: pins::ANALOG_FULL_SCALE_VOLTS,

            wifi_connect_attempts: 20,    // 20 s total
            wifi_retry_interval_ms: 1000, // 1 s per poll
        }
    }
}

impl BoardConfig {
    /// Parse a JSON document; missing fields fall back to the defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot operate with.
    pub fn validate(&self) -> Result<()> {
        let valid_addr = |a: u8| (0x08..=0x77).contains(&a);
        if !valid_addr(self.relay_address) || !valid_addr(self.input_address) {
            return Err(Error::Config("expander address outside 0x08-0x77"));
        }
        if self.relay_address == self.input_address {
            return Err(Error::Config("relay and input expanders share an address"));
        }
        if !(9..=12).contains(&self.adc_resolution_bits) {
            return Err(Error::Config("ADC resolution must be 9-12 bits"));
        }
        if self.analog_full_scale_volts.is_nan() || self.analog_full_scale_volts <= 0.0 {
            return Err(Error::Config("analog full scale must be positive"));
        }
        if self.wifi_connect_attempts == 0 {
            return Err(Error::Config("WiFi connect attempts must be non-zero"));
        }
        Ok(())
    }

    /// Highest raw code the ADC produces at the configured resolution.
    pub fn adc_max_code(&self) -> u16 {
        (1u16 << self.adc_resolution_bits) - 1
    }
}
