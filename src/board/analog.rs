//! Analog inputs: raw-code scaling and the threshold latch.
//!
//! Each of the two channels may carry a threshold and a callback.  The latch
//! remembers whether the last evaluated voltage was at or above the
//! threshold; the callback fires only when that flips, in either direction.

use log::debug;

/// Called with (1-based channel number, voltage that caused the crossing).
pub type ThresholdCallback = Box<dyn FnMut(u8, f32)>;

/// Scale a raw ADC code linearly onto `0.0..=full_scale`.
pub fn raw_to_volts(raw: u16, max_code: u16, full_scale: f32) -> f32 {
    f32::from(raw) * full_scale / f32::from(max_code)
}

#[derive(Default)]
pub struct AnalogChannel {
    threshold: f32,
    exceeded: bool,
    callback: Option<ThresholdCallback>,
}

impl AnalogChannel {
    pub fn is_armed(&self) -> bool {
        self.callback.is_some()
    }

    /// (Re)arm with a new threshold; the latch restarts below threshold.
    pub fn configure(&mut self, threshold: f32, callback: ThresholdCallback) {
        self.threshold = threshold;
        self.callback = Some(callback);
        self.exceeded = false;
    }

    pub fn clear(&mut self) {
        self.callback = None;
        self.exceeded = false;
    }

    /// Feed one voltage sample.  Returns `true` if the callback fired.
    pub fn evaluate(&mut self, channel: u8, voltage: f32) -> bool {
        let Some(callback) = self.callback.as_mut() else {
            return false;
        };

        let exceeded = voltage >= self.threshold;
        if exceeded == self.exceeded {
            return false;
        }

        self.exceeded = exceeded;
        debug!(
            "analog {} {} {:.3} V at {:.3} V",
            channel,
            if exceeded { "rose above" } else { "fell below" },
            self.threshold,
            voltage
        );
        callback(channel, voltage);
        true
    }
}
