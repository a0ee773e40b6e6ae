//! DHT11 / DHT21 / DHT22 temperature + humidity sensors.
//!
//! Single-wire proprietary protocol: the host pulls the line low for the
//! start pulse, releases it, and the sensor answers with an 80 µs low / 80 µs
//! high handshake followed by 40 data bits.  Each bit is a 50 µs low
//! followed by a high pulse: ~26 µs for a 0, ~70 µs for a 1.  The fifth byte
//! is the 8-bit sum of the first four.
//!
//! The sensors refuse to be sampled faster than once per second (DHT11) or
//! every two seconds (DHT21/22).  Given a millisecond clock the driver serves
//! reads inside that window from the last good frame.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use serde::{Deserialize, Serialize};

use crate::error::SensorError;
use crate::ports::{HumidityProbe, TemperatureProbe};

/// Host holds the line released this long before looking for the answer.
const HOST_RELEASE_US: u32 = 40;
/// Longest any single level of the answer may last.
const LEVEL_TIMEOUT_US: u32 = 100;
/// Sample point after a data bit's rising edge; between the 0 and 1 widths.
const BIT_SAMPLE_US: u32 = 35;

pub const FRAME_LEN: usize = 5;

/// Monotonic milliseconds since boot.
pub type MillisClock = fn() -> u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DhtKind {
    Dht11,
    Dht21,
    Dht22,
}

impl DhtKind {
    pub const fn start_pulse_us(self) -> u32 {
        match self {
            Self::Dht11 => 18_000,
            Self::Dht21 | Self::Dht22 => 1_100,
        }
    }

    pub const fn min_interval_ms(self) -> u32 {
        match self {
            Self::Dht11 => 1_000,
            Self::Dht21 | Self::Dht22 => 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Dht<P, D> {
    pin: P,
    delay: D,
    kind: DhtKind,
    clock: Option<MillisClock>,
    last: Option<(u32, DhtReading)>,
}

impl<P, D> Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(mut pin: P, delay: D, kind: DhtKind) -> Result<Self, SensorError> {
        pin.set_high().map_err(|_| SensorError::Pin)?;
        Ok(Self {
            pin,
            delay,
            kind,
            clock: None,
            last: None,
        })
    }

    /// Enable the minimum-interval cache.
    #[must_use]
    pub fn with_clock(mut self, clock: MillisClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sample the sensor, or return the cached frame if the previous good
    /// sample is younger than the sensor's minimum interval.
    pub fn read(&mut self) -> Result<DhtReading, SensorError> {
        if let (Some(clock), Some((at, reading))) = (self.clock, self.last) {
            if clock().wrapping_sub(at) < self.kind.min_interval_ms() {
                return Ok(reading);
            }
        }

        let frame = self.read_frame()?;
        let reading = decode(self.kind, &frame)?;
        if let Some(clock) = self.clock {
            self.last = Some((clock(), reading));
        }
        Ok(reading)
    }

    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::Pin)?;
        self.delay.delay_us(self.kind.start_pulse_us());
        self.pin.set_high().map_err(|_| SensorError::Pin)?;
        self.delay.delay_us(HOST_RELEASE_US);

        self.wait_for(false).map_err(|_| SensorError::NoResponse)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; FRAME_LEN];
        for byte in &mut frame {
            for _ in 0..8 {
                self.wait_for(true)?;
                self.delay.delay_us(BIT_SAMPLE_US);
                let bit = self.pin.is_high().map_err(|_| SensorError::Pin)?;
                *byte = (*byte << 1) | u8::from(bit);
                if bit {
                    self.wait_for(false)?;
                }
            }
        }
        Ok(frame)
    }

    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        for _ in 0..LEVEL_TIMEOUT_US {
            if self.pin.is_high().map_err(|_| SensorError::Pin)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

impl<P, D> TemperatureProbe for Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.read()?.temperature_c)
    }
}

impl<P, D> HumidityProbe for Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.read()?.humidity_pct)
    }
}

/// Verify the checksum and decode a raw frame.
pub fn decode(kind: DhtKind, frame: &[u8; FRAME_LEN]) -> Result<DhtReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let reading = match kind {
        DhtKind::Dht11 => {
            let humidity_pct = f32::from(frame[0]) + f32::from(frame[1]) * 0.1;
            let mut temperature_c = f32::from(frame[2]);
            if frame[3] & 0x80 != 0 {
                temperature_c = -1.0 - temperature_c;
            }
            temperature_c += f32::from(frame[3] & 0x0F) * 0.1;
            DhtReading { temperature_c, humidity_pct }
        }
        DhtKind::Dht21 | DhtKind::Dht22 => {
            let humidity_pct = f32::from(u16::from_be_bytes([frame[0], frame[1]])) * 0.1;
            let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) * 0.1;
            let temperature_c = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };
            DhtReading { temperature_c, humidity_pct }
        }
    };
    Ok(reading)
}
