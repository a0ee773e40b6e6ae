//! Peripheral drivers, portable over `embedded-hal` 1.0.

pub mod dht;
pub mod ds18b20;
pub mod onewire;
pub mod pcf8574;
