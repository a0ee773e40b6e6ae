//! Digital input edge latch.
//!
//! Holds the last observed input byte and the single change callback.  A
//! poll compares a fresh read against the snapshot and reports every
//! differing bit, lowest channel first, before the snapshot advances.

use log::debug;

/// Called with (1-based input number, new level).
pub type InputCallback = Box<dyn FnMut(u8, bool)>;

#[derive(Default)]
pub struct InputWatcher {
    snapshot: u8,
    callback: Option<InputCallback>,
}

impl InputWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the baseline without dispatching anything.
    pub fn capture(&mut self, state: u8) {
        self.snapshot = state;
    }

    /// Install the callback, replacing any previous one.
    pub fn set_callback(&mut self, callback: InputCallback) {
        self.callback = Some(callback);
    }

    pub fn is_armed(&self) -> bool {
        self.callback.is_some()
    }

    /// Dispatch one callback per changed bit and advance the snapshot.
    /// Returns the number of edges reported.
    ///
    /// Without a callback nothing is dispatched and the snapshot is kept.
    pub fn dispatch(&mut self, current: u8) -> usize {
        let Some(callback) = self.callback.as_mut() else {
            return 0;
        };

        let changed = current ^ self.snapshot;
        if changed == 0 {
            return 0;
        }

        for i in 0..8u8 {
            if changed & (1 << i) != 0 {
                let level = current & (1 << i) != 0;
                debug!("input {} -> {}", i + 1, level);
                callback(i + 1, level);
            }
        }
        self.snapshot = current;
        changed.count_ones() as usize
    }
}
