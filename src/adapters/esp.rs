//! ESP-IDF adapters for the board's port traits.
//!
//! | Adapter          | Implements   | Connects to                    |
//! |------------------|--------------|--------------------------------|
//! | `EspAdc`         | AnalogPort   | ADC1 oneshot driver (sys API)  |
//! | `EspSensorBus`   | SensorBus    | open-drain GPIO + `Ets` delays |
//! | `EspWifiAdapter` | WifiPort     | `esp_idf_svc::wifi::EspWifi`   |

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::*;
use log::{info, warn};

use crate::drivers::dht::{Dht, DhtKind};
use crate::drivers::ds18b20::Ds18b20;
use crate::error::{Error, NetworkError, Result, SensorError};
use crate::ports::{AnalogPort, SensorBus, WifiPort};

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 channel wired to an ESP32 GPIO.  ADC2 is unusable while WiFi runs.
fn adc1_channel(gpio: i32) -> Option<adc_channel_t> {
    match gpio {
        36 => Some(adc_channel_t_ADC_CHANNEL_0),
        39 => Some(adc_channel_t_ADC_CHANNEL_3),
        32 => Some(adc_channel_t_ADC_CHANNEL_4),
        33 => Some(adc_channel_t_ADC_CHANNEL_5),
        34 => Some(adc_channel_t_ADC_CHANNEL_6),
        35 => Some(adc_channel_t_ADC_CHANNEL_7),
        _ => None,
    }
}

pub struct EspAdc {
    handle: adc_oneshot_unit_handle_t,
    gpios: [i32; 2],
}

impl EspAdc {
    /// Claim ADC1.  Only `gpios` are switched to analog mode, so sensor
    /// headers sharing the bank keep their digital function.
    pub fn new(gpios: [i32; 2]) -> Result<Self> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: `handle` outlives the call; ADC1 is claimed exactly once.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("ADC1 unit"));
        }
        Ok(Self { handle, gpios })
    }
}

impl AnalogPort for EspAdc {
    fn set_resolution(&mut self, bits: u8) -> Result<()> {
        let bitwidth = match bits {
            9 => adc_bitwidth_t_ADC_BITWIDTH_9,
            10 => adc_bitwidth_t_ADC_BITWIDTH_10,
            11 => adc_bitwidth_t_ADC_BITWIDTH_11,
            12 => adc_bitwidth_t_ADC_BITWIDTH_12,
            _ => return Err(Error::Adc),
        };
        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth,
        };
        for gpio in self.gpios {
            let channel = adc1_channel(gpio).ok_or(Error::Adc)?;
            // SAFETY: handle is valid for the lifetime of `self`.
            let ret = unsafe { adc_oneshot_config_channel(self.handle, channel, &chan_cfg) };
            if ret != ESP_OK as i32 {
                return Err(Error::Adc);
            }
        }
        info!("adc: ADC1 {}-bit on GPIO{}/GPIO{}", bits, self.gpios[0], self.gpios[1]);
        Ok(())
    }

    fn read_raw(&mut self, gpio: i32) -> Result<u16> {
        let channel = adc1_channel(gpio).ok_or(Error::Adc)?;
        let mut raw: i32 = 0;
        // SAFETY: handle is valid for the lifetime of `self`.
        let ret = unsafe { adc_oneshot_read(self.handle, channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(Error::Adc);
        }
        Ok(raw.max(0) as u16)
    }
}

impl Drop for EspAdc {
    fn drop(&mut self) {
        // SAFETY: handle came from adc_oneshot_new_unit and is released once.
        unsafe {
            adc_oneshot_del_unit(self.handle);
        }
    }
}

// ── Sensor headers ────────────────────────────────────────────

pub type EspPin = PinDriver<'static, AnyIOPin, InputOutput>;

fn millis() -> u32 {
    // SAFETY: esp_timer is running from boot.
    (unsafe { esp_timer_get_time() } / 1000) as u32
}

fn open_pin(gpio: i32) -> core::result::Result<EspPin, SensorError> {
    // SAFETY: a header GPIO is owned by at most one live driver; the board
    // drops a slot's previous driver before reopening its pin.
    let pin = unsafe { AnyIOPin::new(gpio) };
    let mut driver = PinDriver::input_output_od(pin).map_err(|e| {
        warn!("sensor: GPIO{} cannot be open-drain: {}", gpio, e);
        SensorError::Pin
    })?;
    driver.set_pull(Pull::Up).map_err(|_| SensorError::Pin)?;
    Ok(driver)
}

/// Hands out open-drain pins for the sensor headers.
pub struct EspSensorBus;

impl SensorBus for EspSensorBus {
    type Ds18b20 = Ds18b20<EspPin, Ets>;
    type Dht = Dht<EspPin, Ets>;

    fn open_ds18b20(&mut self, gpio: i32) -> core::result::Result<Self::Ds18b20, SensorError> {
        Ds18b20::new(open_pin(gpio)?, Ets)
    }

    fn open_dht(
        &mut self,
        gpio: i32,
        kind: DhtKind,
    ) -> core::result::Result<Self::Dht, SensorError> {
        Ok(Dht::new(open_pin(gpio)?, Ets, kind)?.with_clock(millis))
    }
}

// ── WiFi ──────────────────────────────────────────────────────

pub struct EspWifiAdapter {
    wifi: EspWifi<'static>,
}

impl EspWifiAdapter {
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self { wifi }
    }
}

impl WifiPort for EspWifiAdapter {
    fn begin(&mut self, ssid: &str, password: &str) -> core::result::Result<(), NetworkError> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| NetworkError::InvalidSsid)?,
            password: password.try_into().map_err(|_| NetworkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let start = |e: EspError| {
            warn!("WiFi(espidf): {}", e);
            NetworkError::StartFailed
        };
        self.wifi.set_configuration(&config).map_err(start)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(start)?;
        }
        self.wifi.connect().map_err(start)
    }

    fn is_connected(&mut self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}
