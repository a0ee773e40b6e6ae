//! Mock hardware for integration tests.
//!
//! Every mock keeps its state behind an `Rc<RefCell<_>>` handle, so a test
//! can hand the mock to the [`Board`] and still inspect or script it
//! afterwards.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use kclink::drivers::dht::DhtKind;
use kclink::error::{Error, NetworkError, Result, SensorError};
use kclink::ports::{AnalogPort, HumidityProbe, SensorBus, TemperatureProbe, WifiPort};
use kclink::{Board, BoardConfig};

pub const RELAY_ADDR: u8 = 0x20;
pub const INPUT_ADDR: u8 = 0x22;

// ── I²C bus with both expanders ───────────────────────────────

#[derive(Debug)]
pub struct BusState {
    /// Every byte written to the relay expander, in order.
    pub relay_writes: Vec<u8>,
    /// Every byte written to the input expander, in order.
    pub input_writes: Vec<u8>,
    /// Pin levels the input expander presents.
    pub inputs: u8,
    pub input_reads: usize,
    pub relay_missing: bool,
    pub input_missing: bool,
    pub fail_writes: bool,
}

#[derive(Clone)]
pub struct MockBus(pub Rc<RefCell<BusState>>);

impl MockBus {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(BusState {
            relay_writes: Vec::new(),
            input_writes: Vec::new(),
            inputs: 0xFF,
            input_reads: 0,
            relay_missing: false,
            input_missing: false,
            fail_writes: false,
        })))
    }

    pub fn last_relay_latch(&self) -> Option<u8> {
        self.0.borrow().relay_writes.last().copied()
    }

    pub fn set_inputs(&self, levels: u8) {
        self.0.borrow_mut().inputs = levels;
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    fn transaction(&mut self, address: u8, ops: &mut [Operation<'_>]) -> core::result::Result<(), ErrorKind> {
        let mut s = self.0.borrow_mut();
        let present = match address {
            RELAY_ADDR => !s.relay_missing,
            INPUT_ADDR => !s.input_missing,
            _ => false,
        };
        if !present {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in ops {
            match op {
                Operation::Write(bytes) => {
                    if s.fail_writes {
                        return Err(ErrorKind::Bus);
                    }
                    if address == RELAY_ADDR {
                        s.relay_writes.extend_from_slice(bytes);
                    } else {
                        s.input_writes.extend_from_slice(bytes);
                    }
                }
                Operation::Read(buf) => {
                    let value = if address == INPUT_ADDR {
                        s.input_reads += 1;
                        s.inputs
                    } else {
                        s.relay_writes.last().copied().unwrap_or(0xFF)
                    };
                    buf.fill(value);
                }
            }
        }
        Ok(())
    }
}

// ── ADC ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AdcState {
    pub resolution: Option<u8>,
    /// Scripted samples per GPIO; the last one repeats.
    pub samples: HashMap<i32, VecDeque<u16>>,
    pub failing: HashSet<i32>,
    pub reads: Vec<i32>,
}

#[derive(Clone, Default)]
pub struct MockAdc(pub Rc<RefCell<AdcState>>);

impl MockAdc {
    pub fn script(&self, gpio: i32, samples: &[u16]) {
        self.0.borrow_mut().samples.insert(gpio, samples.iter().copied().collect());
    }

    pub fn set_failing(&self, gpio: i32, failing: bool) {
        let mut s = self.0.borrow_mut();
        if failing {
            s.failing.insert(gpio);
        } else {
            s.failing.remove(&gpio);
        }
    }
}

impl AnalogPort for MockAdc {
    fn set_resolution(&mut self, bits: u8) -> Result<()> {
        self.0.borrow_mut().resolution = Some(bits);
        Ok(())
    }

    fn read_raw(&mut self, gpio: i32) -> Result<u16> {
        let mut s = self.0.borrow_mut();
        s.reads.push(gpio);
        if s.failing.contains(&gpio) {
            return Err(Error::Adc);
        }
        let queue = s.samples.entry(gpio).or_default();
        let value = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        };
        Ok(value.unwrap_or(0))
    }
}

// ── Sensor headers ────────────────────────────────────────────

/// Fixed-value probe that logs its own drop.
pub struct MockProbe {
    gpio: i32,
    temperature: f32,
    humidity: f32,
    log: Rc<RefCell<Vec<String>>>,
}

impl TemperatureProbe for MockProbe {
    fn read_temperature(&mut self) -> core::result::Result<f32, SensorError> {
        Ok(self.temperature)
    }
}

impl HumidityProbe for MockProbe {
    fn read_humidity(&mut self) -> core::result::Result<f32, SensorError> {
        Ok(self.humidity)
    }
}

impl Drop for MockProbe {
    fn drop(&mut self) {
        self.log.borrow_mut().push(format!("drop {}", self.gpio));
    }
}

#[derive(Clone, Default)]
pub struct MockSensorBus {
    /// "open <kind> <gpio>" / "drop <gpio>" in call order.
    pub log: Rc<RefCell<Vec<String>>>,
    pub failing: Rc<RefCell<HashSet<i32>>>,
}

impl MockSensorBus {
    pub fn events(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn open(&mut self, gpio: i32, label: &str, temperature: f32, humidity: f32) -> core::result::Result<MockProbe, SensorError> {
        if self.failing.borrow().contains(&gpio) {
            return Err(SensorError::Pin);
        }
        self.log.borrow_mut().push(format!("open {label} {gpio}"));
        Ok(MockProbe {
            gpio,
            temperature,
            humidity,
            log: Rc::clone(&self.log),
        })
    }
}

impl SensorBus for MockSensorBus {
    type Ds18b20 = MockProbe;
    type Dht = MockProbe;

    fn open_ds18b20(&mut self, gpio: i32) -> core::result::Result<MockProbe, SensorError> {
        self.open(gpio, "ds18b20", 21.5, f32::NAN)
    }

    fn open_dht(&mut self, gpio: i32, kind: DhtKind) -> core::result::Result<MockProbe, SensorError> {
        let label = match kind {
            DhtKind::Dht11 => "dht11",
            DhtKind::Dht21 => "dht21",
            DhtKind::Dht22 => "dht22",
        };
        self.open(gpio, label, 24.0, 55.0)
    }
}

// ── WiFi + delay ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockWifi {
    /// `is_connected` turns true on this poll (1-based); `None` never.
    pub connect_on_poll: Option<usize>,
    pub polls: usize,
    pub begun: Option<(String, String)>,
}

impl WifiPort for MockWifi {
    fn begin(&mut self, ssid: &str, password: &str) -> core::result::Result<(), NetworkError> {
        self.begun = Some((ssid.to_owned(), password.to_owned()));
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.polls += 1;
        self.connect_on_poll.is_some_and(|n| self.polls >= n)
    }
}

/// Records each millisecond sleep instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub sleeps_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestBoard = Board<MockBus, MockAdc, MockSensorBus>;

pub struct Rig {
    pub board: TestBoard,
    pub bus: MockBus,
    pub adc: MockAdc,
    pub sensors: MockSensorBus,
}

/// A board that has not been through `begin` yet.
pub fn rig_with(config: BoardConfig) -> Rig {
    let bus = MockBus::new();
    let adc = MockAdc::default();
    let sensors = MockSensorBus::default();
    let board = Board::new(config, bus.clone(), adc.clone(), sensors.clone())
        .expect("valid board config");
    Rig {
        board,
        bus,
        adc,
        sensors,
    }
}

/// A default board, already brought up.
pub fn started() -> Rig {
    let mut rig = rig_with(BoardConfig::default());
    rig.board.begin().expect("begin against healthy mocks");
    rig
}
