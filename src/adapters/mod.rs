//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements                      | Connects to            |
//! |------------|---------------------------------|------------------------|
//! | `esp`      | AnalogPort, SensorBus, WifiPort | ESP-IDF ADC/GPIO/WiFi  |
//! | `log_sink` | board callbacks                 | Serial log output      |

#[cfg(feature = "espidf")]
pub mod esp;
pub mod log_sink;
