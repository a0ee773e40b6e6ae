//! KC-Link PRO A8 firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │  I2cDriver    EspAdc       EspSensorBus   EspWifiAdapter │
//! │  (I2c)        (AnalogPort) (SensorBus)    (WifiPort)     │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Board: relays · inputs · analog · sensor slots    │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │  Poll loop: edges → relay toggles, thresholds, STATUS    │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info, warn};

use kclink::adapters::esp::{EspAdc, EspSensorBus, EspWifiAdapter};
use kclink::adapters::log_sink::{log_input_change, log_status, log_threshold_crossing};
use kclink::{Board, BoardConfig, SensorKind, pins};

const LOOP_INTERVAL_MS: u32 = 50;
/// Status line every 5 s.
const STATUS_EVERY: u32 = 5_000 / LOOP_INTERVAL_MS;
const ANALOG_ALARM_VOLTS: f32 = 2.5;

fn load_config() -> BoardConfig {
    match option_env!("KCLINK_BOARD_CONFIG") {
        Some(json) => match BoardConfig::from_json(json.as_bytes()) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("KCLINK_BOARD_CONFIG rejected ({}), using defaults", e);
                BoardConfig::default()
            }
        },
        None => BoardConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("KC-Link PRO A8 v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Config + peripherals ───────────────────────────────
    let config = load_config();
    // Pin drivers are typed per GPIO, so the numbers in `pins` are checked here.
    const _: () = assert!(pins::I2C_SDA_GPIO == 4 && pins::I2C_SCL_GPIO == 15);
    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_HZ
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio4,
        peripherals.pins.gpio15,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz().into()),
    )?;
    let adc = EspAdc::new(config.version.pins().analog)?;

    // ── 3. Board ──────────────────────────────────────────────
    let mut board = Board::new(config, i2c, adc, EspSensorBus)?;
    if let Err(e) = board.begin() {
        // Without the expanders nothing on the board is reachable.
        error!("board init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // Each falling input edge toggles the relay with the same number.
    let pending_toggles = Rc::new(Cell::new(0u8));
    let toggles = Rc::clone(&pending_toggles);
    board.on_input_change(move |number, level| {
        log_input_change(number, level);
        if !level {
            toggles.set(toggles.get() | 1 << (number - 1));
        }
    });
    for number in 1..=2 {
        board.set_analog_threshold(number, ANALOG_ALARM_VOLTS, log_threshold_crossing)?;
    }
    if let Err(e) = board.begin_temperature_sensor(1, SensorKind::Ds18b20) {
        warn!("sensor 1: {}", e);
    }
    if let Err(e) = board.begin_temperature_sensor(2, SensorKind::Dht22) {
        warn!("sensor 2: {}", e);
    }

    // ── 4. Network (optional) ─────────────────────────────────
    // Kept alive for the whole loop; dropping it stops the station.
    let _wifi = match option_env!("KCLINK_WIFI_SSID") {
        Some(ssid) => {
            let password = option_env!("KCLINK_WIFI_PASS").unwrap_or("");
            let mut wifi =
                EspWifiAdapter::new(EspWifi::new(peripherals.modem, sysloop, Some(nvs))?);
            match board.connect_wifi(&mut wifi, &mut FreeRtos, ssid, password) {
                Ok(()) => info!("WiFi: connected to '{}'", ssid),
                Err(e) => warn!("WiFi: {}", e),
            }
            Some(wifi)
        }
        None => {
            info!("WiFi: no SSID configured");
            None
        }
    };

    info!("System ready. Entering poll loop.");

    // ── 5. Poll loop ──────────────────────────────────────────
    let mut ticks: u32 = 0;
    loop {
        if let Err(e) = board.check_input_changes() {
            warn!("inputs: {}", e);
        }
        board.check_analog_thresholds();

        let mask = pending_toggles.replace(0);
        for bit in 0..8u8 {
            if mask & (1 << bit) != 0 {
                if let Err(e) = board.toggle_relay(bit + 1) {
                    warn!("relay {}: {}", bit + 1, e);
                }
            }
        }

        ticks += 1;
        if ticks >= STATUS_EVERY {
            ticks = 0;
            match board.status() {
                Ok(t) => log_status(&t),
                Err(e) => warn!("status: {}", e),
            }
        }

        FreeRtos::delay_ms(LOOP_INTERVAL_MS);
    }
}
