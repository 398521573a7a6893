//! Low-battery supervision.
//!
//! Every polled sample below the active threshold bumps a counter, any sample at or above it
//! clears the counter. Once the counter reaches the configured limit the light first drops to
//! the floor mode, and if it is already there, shuts off for good. The threshold itself drops
//! from `low` to `critical` while running at the floor.

use crate::config::Config;
#[cfg(feature = "defmt")]
use defmt::warn;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Hold,
    StepDown,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct Supervisor {
    low: u8,
    critical: u8,
    limit: u8,
    low_count: u8,
}

impl Supervisor {
    pub fn new(config: &Config) -> Self {
        Self {
            low: config.voltage.low,
            critical: config.voltage.critical,
            limit: config.low_sample_limit.max(1),
            low_count: 0,
        }
    }

    /// Consecutive under-threshold samples seen so far.
    pub fn low_count(&self) -> u8 {
        self.low_count
    }

    pub fn threshold(&self, at_floor: bool) -> u8 {
        if at_floor { self.critical } else { self.low }
    }

    pub fn observe(&mut self, sample: u8, at_floor: bool) -> Verdict {
        if sample < self.threshold(at_floor) {
            self.low_count = self.low_count.saturating_add(1);
        } else {
            self.low_count = 0;
        }

        if self.low_count < self.limit {
            return Verdict::Hold;
        }

        self.low_count = 0;

        #[cfg(feature = "defmt")]
        warn!("battery low ({}), at floor: {}", sample, at_floor);

        #[cfg(feature = "debug-logs")]
        println!("  supervisor: battery low ({sample}), at floor: {at_floor}");

        if at_floor {
            Verdict::Shutdown
        } else {
            Verdict::StepDown
        }
    }
}
