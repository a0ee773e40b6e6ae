//! DS18B20 digital thermometer on a dedicated 1-Wire header.
//!
//! Each sensor header on the board carries one probe, so the driver addresses
//! it with SKIP ROM instead of enumerating ROM codes.  A read is a
//! convert-T followed by a scratchpad read; the conversion blocks for up to
//! 750 ms at the default 12-bit resolution.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::onewire::{OneWire, crc8};
use crate::error::SensorError;
use crate::ports::TemperatureProbe;

const CMD_SKIP_ROM: u8 = 0xCC;
const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Worst-case conversion time at 12-bit resolution.
const CONVERSION_TIMEOUT_MS: u32 = 750;
const CONVERSION_POLL_MS: u32 = 10;

pub const SCRATCHPAD_LEN: usize = 9;

pub struct Ds18b20<P, D> {
    bus: OneWire<P, D>,
}

impl<P, D> Ds18b20<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Result<Self, SensorError> {
        Ok(Self {
            bus: OneWire::new(pin, delay)?,
        })
    }

    /// Start a conversion and wait until the probe signals completion.
    pub fn request_temperature(&mut self) -> Result<(), SensorError> {
        self.select()?;
        self.bus.write_byte(CMD_CONVERT_T)?;

        // The probe holds read slots at 0 while converting.
        let mut waited = 0;
        while !self.bus.read_bit()? {
            if waited >= CONVERSION_TIMEOUT_MS {
                return Err(SensorError::Timeout);
            }
            self.bus.delay_ms(CONVERSION_POLL_MS);
            waited += CONVERSION_POLL_MS;
        }
        Ok(())
    }

    pub fn read_scratchpad(&mut self) -> Result<[u8; SCRATCHPAD_LEN], SensorError> {
        self.select()?;
        self.bus.write_byte(CMD_READ_SCRATCHPAD)?;
        let mut sp = [0u8; SCRATCHPAD_LEN];
        self.bus.read_bytes(&mut sp)?;
        Ok(sp)
    }

    /// Convert and read back, in °C.
    pub fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.request_temperature()?;
        let sp = self.read_scratchpad()?;
        decode_scratchpad(&sp)
    }

    fn select(&mut self) -> Result<(), SensorError> {
        // An unplugged header leaves the line pulled up: no presence pulse.
        if !self.bus.reset()? {
            return Err(SensorError::Disconnected);
        }
        self.bus.write_byte(CMD_SKIP_ROM)
    }
}

impl<P, D> TemperatureProbe for Ds18b20<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.read_celsius()
    }
}

/// Decode a scratchpad into °C.
///
/// An all-zero scratchpad passes the CRC but means nobody drove the line;
/// it is reported as [`SensorError::Disconnected`].
pub fn decode_scratchpad(sp: &[u8; SCRATCHPAD_LEN]) -> Result<f32, SensorError> {
    if sp.iter().all(|&b| b == 0) {
        return Err(SensorError::Disconnected);
    }
    if crc8(&sp[..8]) != sp[8] {
        return Err(SensorError::Checksum);
    }

    let raw = i16::from_le_bytes([sp[0], sp[1]]);
    // Low bits are undefined below 12-bit resolution (config byte R1:R0).
    let raw = match (sp[4] >> 5) & 0x03 {
        0 => raw & !0x07,
        1 => raw & !0x03,
        2 => raw & !0x01,
        _ => raw,
    };
    Ok(f32::from(raw) / 16.0)
}
