//! KC-Link PRO A8 board support.
//!
//! Relay control, digital / analog input polling with change callbacks,
//! temperature and humidity headers, and WiFi helpers for the KC-Link PRO A8
//! relay board.  Everything above the `ports` boundary runs on the host for
//! testing; the ESP-IDF adapters are behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod board;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod ports;

pub use board::sensors::SensorKind;
pub use board::{Board, BoardStatus, NO_READING, NO_VOLTAGE};
pub use config::BoardConfig;
pub use error::{Error, Result};
