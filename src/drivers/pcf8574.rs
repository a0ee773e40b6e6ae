//! PCF8574 8-bit quasi-bidirectional I/O expander.
//!
//! The chip has no direction register: one written byte sets the output
//! latch, and a pin latched high is only weakly pulled up, so it doubles as an
//! input.  One read byte returns the live pin levels.
//!
//! The driver does not own the bus.  Both expanders on the board share one
//! I²C peripheral, so every call borrows it from the caller.

use embedded_hal::i2c::I2c;

/// Latch value after power-on reset: every pin released high.
pub const POWER_ON_LATCH: u8 = 0xFF;

pub struct Pcf8574 {
    address: u8,
    latch: u8,
}

impl Pcf8574 {
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            latch: POWER_ON_LATCH,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Last byte successfully written to the output latch.
    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Probe the device by writing `initial` to its latch.  A missing device
    /// NACKs its address and the bus error is returned.
    pub fn init<I: I2c>(&mut self, bus: &mut I, initial: u8) -> Result<(), I::Error> {
        self.write(bus, initial)
    }

    /// Replace the whole output latch in one transaction.
    pub fn write<I: I2c>(&mut self, bus: &mut I, value: u8) -> Result<(), I::Error> {
        bus.write(self.address, &[value])?;
        self.latch = value;
        Ok(())
    }

    /// Drive a single pin, leaving the other seven latch bits untouched.
    ///
    /// Read-modify-write works on the driver's latch copy, never on the pin
    /// levels: an input pin pulled low externally must stay released.
    pub fn set_pin<I: I2c>(&mut self, bus: &mut I, pin: u8, high: bool) -> Result<(), I::Error> {
        let mask = 1u8 << (pin & 7);
        let value = if high {
            self.latch | mask
        } else {
            self.latch & !mask
        };
        self.write(bus, value)
    }

    /// Sample all eight pin levels.
    pub fn read<I: I2c>(&mut self, bus: &mut I) -> Result<u8, I::Error> {
        let mut buf = [0u8; 1];
        bus.read(self.address, &mut buf)?;
        Ok(buf[0])
    }

    /// Sample one pin level.
    pub fn read_pin<I: I2c>(&mut self, bus: &mut I, pin: u8) -> Result<bool, I::Error> {
        Ok(self.read(bus)? & (1u8 << (pin & 7)) != 0)
    }
}
