//! Sensor header slots.
//!
//! Each of the four headers owns at most one driver, and the slot's variant
//! is its type tag.  Replacing the variant drops the previous driver and
//! with it the data pin.

use serde::{Deserialize, Serialize};

use crate::drivers::dht::DhtKind;
use crate::error::SensorError;
use crate::ports::{HumidityProbe, TemperatureProbe};

/// Sensor type requested for a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorKind {
    #[default]
    None,
    Ds18b20,
    Dht11,
    Dht22,
    Dht21,
}

impl SensorKind {
    pub const fn dht_kind(self) -> Option<DhtKind> {
        match self {
            Self::Dht11 => Some(DhtKind::Dht11),
            Self::Dht22 => Some(DhtKind::Dht22),
            Self::Dht21 => Some(DhtKind::Dht21),
            Self::None | Self::Ds18b20 => None,
        }
    }
}

impl From<DhtKind> for SensorKind {
    fn from(kind: DhtKind) -> Self {
        match kind {
            DhtKind::Dht11 => Self::Dht11,
            DhtKind::Dht22 => Self::Dht22,
            DhtKind::Dht21 => Self::Dht21,
        }
    }
}

/// One header and the driver it owns.
pub enum SensorSlot<T, H> {
    Empty,
    Ds18b20(T),
    Dht(H, DhtKind),
}

impl<T, H> Default for SensorSlot<T, H> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T, H> SensorSlot<T, H>
where
    T: TemperatureProbe,
    H: HumidityProbe,
{
    pub fn kind(&self) -> SensorKind {
        match self {
            Self::Empty => SensorKind::None,
            Self::Ds18b20(_) => SensorKind::Ds18b20,
            Self::Dht(_, kind) => SensorKind::from(*kind),
        }
    }

    pub fn temperature(&mut self) -> Result<f32, SensorError> {
        match self {
            Self::Empty => Err(SensorError::NotConfigured),
            Self::Ds18b20(probe) => probe.read_temperature(),
            Self::Dht(probe, _) => probe.read_temperature(),
        }
    }

    pub fn humidity(&mut self) -> Result<f32, SensorError> {
        match self {
            Self::Empty => Err(SensorError::NotConfigured),
            Self::Ds18b20(_) => Err(SensorError::NoHumidity),
            Self::Dht(probe, _) => probe.read_humidity(),
        }
    }
}
