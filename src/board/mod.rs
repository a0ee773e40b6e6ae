//! Board controller: the one component the embedder talks to.
//!
//! [`Board`] owns the I²C bus with both PCF8574 expanders, the ADC port and
//! the sensor header factory.  Every public operation validates its 1-based
//! channel number first and leaves all state untouched on failure.
//!
//! ```text
//!  I2c ───────────▶ ┌──────────────────────────────┐
//!  AnalogPort ────▶ │            Board             │ ──▶ input / threshold
//!  SensorBus ─────▶ │ relays · inputs · analog ·   │     callbacks
//!                   │ sensor slots                 │
//!                   └──────────────────────────────┘
//! ```
//!
//! Nothing runs in the background: the embedder calls
//! [`check_input_changes`](Board::check_input_changes) and
//! [`check_analog_thresholds`](Board::check_analog_thresholds) from its own
//! loop.

pub mod analog;
pub mod inputs;
pub mod network;
pub mod relays;
pub mod sensors;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{error, info, warn};
use serde::Serialize;

use crate::config::BoardConfig;
use crate::drivers::pcf8574::Pcf8574;
use crate::error::{ChannelKind, Error, Result, SensorError};
use crate::pins::PinMap;
use crate::ports::{AnalogPort, SensorBus, WifiPort};

use analog::{AnalogChannel, raw_to_volts};
use inputs::InputWatcher;
use network::WifiCredentials;
use relays::RelayBank;
use sensors::{SensorKind, SensorSlot};

pub use analog::ThresholdCallback;
pub use inputs::InputCallback;

/// Flat value for a failed temperature / humidity read.
pub const NO_READING: f32 = -999.0;
/// Flat value for a failed analog voltage read.
pub const NO_VOLTAGE: f32 = -1.0;

/// Every input pin released high: the PCF8574's input mode.
const ALL_INPUTS: u8 = 0xFF;

/// Point-in-time view of the whole board, with failed reads flattened to
/// [`NO_VOLTAGE`] / [`NO_READING`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardStatus {
    pub relays: u8,
    pub inputs: u8,
    pub analog_volts: [f32; 2],
    pub temperatures_c: [f32; 4],
    pub humidity_pct: [f32; 4],
}

type Slot<S> = SensorSlot<<S as SensorBus>::Ds18b20, <S as SensorBus>::Dht>;

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> Error {
    Error::Bus(e.kind())
}

// ───────────────────────────────────────────────────────────────
// Board
// ───────────────────────────────────────────────────────────────

pub struct Board<I2C, ADC, S: SensorBus> {
    config: BoardConfig,
    pins: PinMap,
    bus: I2C,
    adc: ADC,
    sensor_bus: S,
    relay_expander: Pcf8574,
    input_expander: Pcf8574,
    relays: RelayBank,
    inputs: InputWatcher,
    analog: [AnalogChannel; 2],
    slots: [Slot<S>; 4],
}

impl<I2C, ADC, S> Board<I2C, ADC, S>
where
    I2C: I2c,
    ADC: AnalogPort,
    S: SensorBus,
{
    /// Wire the controller to its collaborators.  No I/O happens until
    /// [`begin`](Self::begin).
    ///
    /// Fails with [`Error::Config`] if `config` does not validate.
    pub fn new(config: BoardConfig, bus: I2C, adc: ADC, sensor_bus: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pins: config.version.pins(),
            relay_expander: Pcf8574::new(config.relay_address),
            input_expander: Pcf8574::new(config.input_address),
            config,
            bus,
            adc,
            sensor_bus,
            relays: RelayBank::new(),
            inputs: InputWatcher::new(),
            analog: Default::default(),
            slots: Default::default(),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring up both expanders and the ADC.
    ///
    /// All relays are switched off and all input pins released before the
    /// first input snapshot is taken.  There is no rollback on failure;
    /// the instance must not be used afterwards.
    pub fn begin(&mut self) -> Result<()> {
        let off = RelayBank::latch_for(0);
        if let Err(e) = self.relay_expander.init(&mut self.bus, off) {
            error!(
                "relay expander not found at 0x{:02X}: {}",
                self.relay_expander.address(),
                e.kind()
            );
            return Err(Error::Init("relay expander not found"));
        }
        self.relays.replace(0);

        if let Err(e) = self.input_expander.init(&mut self.bus, ALL_INPUTS) {
            error!(
                "input expander not found at 0x{:02X}: {}",
                self.input_expander.address(),
                e.kind()
            );
            return Err(Error::Init("input expander not found"));
        }
        let initial = self.input_expander.read(&mut self.bus).map_err(bus_error)?;
        self.inputs.capture(initial);

        self.adc.set_resolution(self.config.adc_resolution_bits)?;

        info!(
            "board up ({:?}): relays 0x{:02X}, inputs 0x{:02X} = 0b{:08b}",
            self.config.version,
            self.relay_expander.address(),
            self.input_expander.address(),
            initial
        );
        Ok(())
    }

    // ── Relays ────────────────────────────────────────────────

    /// Switch relay `number` (1-8).  The shadow bit changes only once the
    /// expander accepted the write.
    pub fn set_relay(&mut self, number: u8, on: bool) -> Result<()> {
        let index = ChannelKind::Relay.index(number)?;
        self.relay_expander
            .set_pin(&mut self.bus, index as u8, RelayBank::level(on))
            .map_err(bus_error)?;
        self.relays.set(index, on);
        Ok(())
    }

    pub fn toggle_relay(&mut self, number: u8) -> Result<()> {
        let on = self.relay_state(number)?;
        self.set_relay(number, !on)
    }

    /// Shadow state of relay `number`; the hardware is not read.
    pub fn relay_state(&self, number: u8) -> Result<bool> {
        let index = ChannelKind::Relay.index(number)?;
        Ok(self.relays.is_on(index))
    }

    /// Drive all eight relays in one transaction; bit n is relay n + 1.
    pub fn set_all_relays(&mut self, mask: u8) -> Result<()> {
        self.relay_expander
            .write(&mut self.bus, RelayBank::latch_for(mask))
            .map_err(bus_error)?;
        self.relays.replace(mask);
        Ok(())
    }

    pub fn relay_mask(&self) -> u8 {
        self.relays.mask()
    }

    // ── Digital inputs ────────────────────────────────────────

    /// Live level of input `number` (1-8).  Bypasses the change snapshot.
    pub fn digital_input(&mut self, number: u8) -> Result<bool> {
        let index = ChannelKind::DigitalInput.index(number)?;
        self.input_expander
            .read_pin(&mut self.bus, index as u8)
            .map_err(bus_error)
    }

    /// Live levels of all eight inputs.  Bypasses the change snapshot.
    pub fn all_digital_inputs(&mut self) -> Result<u8> {
        self.input_expander.read(&mut self.bus).map_err(bus_error)
    }

    /// Install the change callback, replacing any previous one.
    pub fn on_input_change(&mut self, callback: impl FnMut(u8, bool) + 'static) {
        self.inputs.set_callback(Box::new(callback));
    }

    /// Poll the inputs once and report every edge since the last poll.
    /// Returns the number of edges dispatched.
    ///
    /// Without a registered callback this neither reads the bus nor
    /// advances the snapshot.
    pub fn check_input_changes(&mut self) -> Result<usize> {
        if !self.inputs.is_armed() {
            return Ok(0);
        }
        let current = self.input_expander.read(&mut self.bus).map_err(bus_error)?;
        Ok(self.inputs.dispatch(current))
    }

    // ── Analog inputs ─────────────────────────────────────────

    /// Raw ADC code of analog input `number` (1-2).
    pub fn analog_input(&mut self, number: u8) -> Result<u16> {
        let index = ChannelKind::AnalogInput.index(number)?;
        self.adc.read_raw(self.pins.analog[index])
    }

    /// Voltage on analog input `number`, scaled to the 0-5 V front end.
    pub fn analog_voltage(&mut self, number: u8) -> Result<f32> {
        let raw = self.analog_input(number)?;
        Ok(raw_to_volts(
            raw,
            self.config.adc_max_code(),
            self.config.analog_full_scale_volts,
        ))
    }

    /// Arm the threshold latch of analog input `number` (1-2).  The latch
    /// restarts in the below-threshold state.
    pub fn set_analog_threshold(
        &mut self,
        number: u8,
        threshold: f32,
        callback: impl FnMut(u8, f32) + 'static,
    ) -> Result<()> {
        let index = ChannelKind::AnalogInput.index(number)?;
        self.analog[index].configure(threshold, Box::new(callback));
        Ok(())
    }

    pub fn clear_analog_threshold(&mut self, number: u8) -> Result<()> {
        let index = ChannelKind::AnalogInput.index(number)?;
        self.analog[index].clear();
        Ok(())
    }

    /// Sample every armed channel once and fire callbacks on crossings.
    /// Returns the number of callbacks fired.
    ///
    /// A channel whose read fails is skipped for this poll and keeps its
    /// latch.
    pub fn check_analog_thresholds(&mut self) -> usize {
        let mut fired = 0;
        for index in 0..self.analog.len() {
            if !self.analog[index].is_armed() {
                continue;
            }
            let number = index as u8 + 1;
            match self.analog_voltage(number) {
                Ok(volts) => {
                    if self.analog[index].evaluate(number, volts) {
                        fired += 1;
                    }
                }
                Err(e) => warn!("analog {}: read failed: {}", number, e),
            }
        }
        fired
    }

    // ── Sensor headers ────────────────────────────────────────

    /// Attach a sensor of `kind` to header `slot` (1-4).
    ///
    /// The slot's previous driver is dropped first.  `SensorKind::None`
    /// leaves the slot empty and reports [`SensorError::Unsupported`]; so
    /// does a driver that fails to open.
    pub fn begin_temperature_sensor(&mut self, slot: u8, kind: SensorKind) -> Result<()> {
        let index = ChannelKind::SensorSlot.index(slot)?;
        let gpio = self.pins.sensors[index];

        self.slots[index] = SensorSlot::Empty;
        let opened = match (kind, kind.dht_kind()) {
            (SensorKind::Ds18b20, _) => self.sensor_bus.open_ds18b20(gpio).map(SensorSlot::Ds18b20),
            (_, Some(dht)) => self
                .sensor_bus
                .open_dht(gpio, dht)
                .map(|probe| SensorSlot::Dht(probe, dht)),
            _ => Err(SensorError::Unsupported),
        };

        match opened {
            Ok(driver) => {
                self.slots[index] = driver;
                info!("sensor {}: {:?} on GPIO{}", slot, kind, gpio);
                Ok(())
            }
            Err(e) => {
                warn!("sensor {}: {:?} on GPIO{} unavailable: {}", slot, kind, gpio, e);
                Err(e.into())
            }
        }
    }

    pub fn sensor_kind(&self, slot: u8) -> Result<SensorKind> {
        let index = ChannelKind::SensorSlot.index(slot)?;
        Ok(self.slots[index].kind())
    }

    /// Blocking temperature read from header `slot`, in °C.
    pub fn temperature(&mut self, slot: u8) -> Result<f32> {
        let index = ChannelKind::SensorSlot.index(slot)?;
        Ok(self.slots[index].temperature()?)
    }

    /// Blocking relative-humidity read from header `slot`; DHT sensors only.
    pub fn humidity(&mut self, slot: u8) -> Result<f32> {
        let index = ChannelKind::SensorSlot.index(slot)?;
        Ok(self.slots[index].humidity()?)
    }

    /// Read everything once.  Only an input-expander failure is an error;
    /// analog and sensor failures become sentinels.
    pub fn status(&mut self) -> Result<BoardStatus> {
        let inputs = self.all_digital_inputs()?;
        let mut analog_volts = [NO_VOLTAGE; 2];
        for (i, v) in analog_volts.iter_mut().enumerate() {
            *v = self.analog_voltage(i as u8 + 1).unwrap_or(NO_VOLTAGE);
        }
        let mut temperatures_c = [NO_READING; 4];
        let mut humidity_pct = [NO_READING; 4];
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if matches!(slot, SensorSlot::Empty) {
                continue;
            }
            temperatures_c[i] = slot.temperature().unwrap_or(NO_READING);
            humidity_pct[i] = slot.humidity().unwrap_or(NO_READING);
        }
        Ok(BoardStatus {
            relays: self.relays.mask(),
            inputs,
            analog_volts,
            temperatures_c,
            humidity_pct,
        })
    }

    // ── Network ───────────────────────────────────────────────

    /// Join a WiFi network, polling the link up to the configured number of
    /// times with the configured sleep in between.
    pub fn connect_wifi(
        &self,
        wifi: &mut impl WifiPort,
        delay: &mut impl DelayNs,
        ssid: &str,
        password: &str,
    ) -> Result<()> {
        let creds = WifiCredentials::new(ssid, password)?;
        network::connect(
            wifi,
            delay,
            &creds,
            self.config.wifi_connect_attempts,
            self.config.wifi_retry_interval_ms,
        )?;
        Ok(())
    }

    pub fn begin_ethernet(&self) -> Result<()> {
        network::begin_ethernet()?;
        Ok(())
    }
}
