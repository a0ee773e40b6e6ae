//! Bit-banged 1-Wire bus master.
//!
//! The data pin must be open-drain with an external 4.7 kΩ pull-up: driving
//! it high only releases the line.  Timings are the standard-speed slot
//! values from Maxim AN126.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

const RESET_LOW_US: u32 = 480;
const PRESENCE_SAMPLE_US: u32 = 70;
const RESET_RECOVERY_US: u32 = 410;

const WRITE_ONE_LOW_US: u32 = 6;
const WRITE_ONE_RELEASE_US: u32 = 64;
const WRITE_ZERO_LOW_US: u32 = 60;
const WRITE_ZERO_RELEASE_US: u32 = 10;

const READ_LOW_US: u32 = 6;
const READ_SAMPLE_US: u32 = 9;
const READ_RELEASE_US: u32 = 55;

pub struct OneWire<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> OneWire<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Take ownership of the data pin and release the line.
    pub fn new(mut pin: P, delay: D) -> Result<Self, SensorError> {
        pin.set_high().map_err(|_| SensorError::Pin)?;
        Ok(Self { pin, delay })
    }

    /// Issue a reset pulse.  Returns `true` if at least one device answered
    /// with a presence pulse.
    pub fn reset(&mut self) -> Result<bool, SensorError> {
        self.low()?;
        self.delay.delay_us(RESET_LOW_US);
        self.release_line()?;
        self.delay.delay_us(PRESENCE_SAMPLE_US);
        let present = self.pin.is_low().map_err(|_| SensorError::Pin)?;
        self.delay.delay_us(RESET_RECOVERY_US);
        Ok(present)
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), SensorError> {
        let (low_us, release_us) = if bit {
            (WRITE_ONE_LOW_US, WRITE_ONE_RELEASE_US)
        } else {
            (WRITE_ZERO_LOW_US, WRITE_ZERO_RELEASE_US)
        };
        self.low()?;
        self.delay.delay_us(low_us);
        self.release_line()?;
        self.delay.delay_us(release_us);
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool, SensorError> {
        self.low()?;
        self.delay.delay_us(READ_LOW_US);
        self.release_line()?;
        self.delay.delay_us(READ_SAMPLE_US);
        let bit = self.pin.is_high().map_err(|_| SensorError::Pin)?;
        self.delay.delay_us(READ_RELEASE_US);
        Ok(bit)
    }

    /// Bytes go out LSB first.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), SensorError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8, SensorError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn low(&mut self) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::Pin)
    }

    fn release_line(&mut self) -> Result<(), SensorError> {
        self.pin.set_high().map_err(|_| SensorError::Pin)
    }
}

/// Dallas/Maxim CRC-8 (x⁸ + x⁵ + x⁴ + 1, reflected).  Running it over a
/// block that ends with its own CRC yields zero.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}
