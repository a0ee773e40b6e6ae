//! GPIO / peripheral pin assignments for the KC-Link PRO A8.
//!
//! Single source of truth: every driver and adapter references this module
//! rather than hard-coding pin numbers.  The analog inputs and two of the
//! four sensor headers moved between board revisions, so those are selected
//! at runtime from [`BoardVersion`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// I²C bus (both PCF8574 expanders)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 4;
pub const I2C_SCL_GPIO: i32 = 15;
/// Standard-mode clock; the PCF8574 tops out at 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// Relay expander address (A2..A0 = 000).
pub const RELAY_EXPANDER_ADDR: u8 = 0x20;
/// Digital input expander address (A2..A0 = 010).
pub const INPUT_EXPANDER_ADDR: u8 = 0x22;

// ---------------------------------------------------------------------------
// ADC
// ---------------------------------------------------------------------------

/// ADC sample width configured at bring-up (0 – 4095).
pub const ADC_RESOLUTION_BITS: u8 = 12;
/// The analog front end divides 0 – 5 V down into the ADC range.
pub const ANALOG_FULL_SCALE_VOLTS: f32 = 5.0;

// ---------------------------------------------------------------------------
// Board revisions
// ---------------------------------------------------------------------------

/// Hardware revision of the board, which decides the analog/sensor pin map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoardVersion {
    /// V1.4 and later.
    #[default]
    V1_4,
    /// Revisions before V1.4.
    Legacy,
}

/// Resolved pin numbers for one board revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    /// ADC pins for analog inputs 1 and 2.
    pub analog: [i32; 2],
    /// Data pins for sensor headers 1 – 4.
    pub sensors: [i32; 4],
}

const PINS_V1_4: PinMap = PinMap {
    analog: [34, 35],
    sensors: [14, 13, 32, 33],
};

const PINS_LEGACY: PinMap = PinMap {
    analog: [32, 33],
    sensors: [14, 13, 34, 35],
};

impl BoardVersion {
    pub const fn pins(self) -> PinMap {
        match self {
            Self::V1_4 => PINS_V1_4,
            Self::Legacy => PINS_LEGACY,
        }
    }
}
