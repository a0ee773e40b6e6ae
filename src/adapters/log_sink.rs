//! Log-based callback adapters.
//!
//! Ready-made callbacks for [`Board::on_input_change`] and
//! [`Board::set_analog_threshold`], plus a one-line status formatter.
//! They write to the `log` facade (UART / USB-CDC in production).
//!
//! [`Board::on_input_change`]: crate::board::Board::on_input_change
//! [`Board::set_analog_threshold`]: crate::board::Board::set_analog_threshold

use log::info;

use crate::board::BoardStatus;

pub fn log_input_change(number: u8, level: bool) {
    info!("INPUT | {} -> {}", number, if level { "HIGH" } else { "LOW" });
}

pub fn log_threshold_crossing(number: u8, volts: f32) {
    info!("ANALOG | {} crossed at {:.2} V", number, volts);
}

/// One `STATUS` line: relay/input masks, analog volts, and the four
/// sensor headers.  Sentinels are printed as-is.
pub fn format_status(t: &BoardStatus) -> String {
    format!(
        "STATUS | relays=0b{:08b} inputs=0b{:08b} | A1={:.2}V A2={:.2}V | \
         T={:.1}/{:.1}/{:.1}/{:.1}\u{00b0}C | RH={:.1}/{:.1}/{:.1}/{:.1}%",
        t.relays,
        t.inputs,
        t.analog_volts[0],
        t.analog_volts[1],
        t.temperatures_c[0],
        t.temperatures_c[1],
        t.temperatures_c[2],
        t.temperatures_c[3],
        t.humidity_pct[0],
        t.humidity_pct[1],
        t.humidity_pct[2],
        t.humidity_pct[3],
    )
}

pub fn log_status(t: &BoardStatus) {
    info!("{}", format_status(t));
}
