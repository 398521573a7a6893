use crate::config::{CapThresholds, Config};
use crate::mode::Selector;
use crate::platform::Mcu;
#[cfg(feature = "defmt")]
use defmt::debug;

/// How long the switch was off, judged by the charge left on the off-time capacitor.
#[derive(strum::Display, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    /// Capacitor still well charged: advance one mode
    Short,
    /// Partially discharged: step back, or walk the shortcut dial
    Medium,
    /// Drained, or a cold boot
    Long,
}

impl Press {
    pub fn classify(sample: u8, thresholds: &CapThresholds) -> Press {
        if sample > thresholds.short {
            Press::Short
        } else if sample > thresholds.medium {
            Press::Medium
        } else {
            Press::Long
        }
    }

    /// Samples the capacitor. The first conversion after the channel is configured is
    /// unreliable and gets thrown away.
    pub fn sense<M: Mcu>(mcu: &mut M, thresholds: &CapThresholds) -> Press {
        let _ = mcu.convert_offtime_cap();
        let sample = mcu.convert_offtime_cap();

        let press = Press::classify(sample, thresholds);

        #[cfg(feature = "defmt")]
        debug!("off-time cap: {} -> {}", sample, press);

        #[cfg(feature = "debug-logs")]
        println!("  press: cap sample {sample} -> {press}");

        press
    }

    /// Applies this press to the stored selector.
    pub fn navigate(self, selector: Selector, config: &Config) -> Selector {
        match self {
            Press::Short => selector.next(),
            Press::Medium => selector.prev(),
            Press::Long if config.mode_memory => selector,
            Press::Long => Selector::default(),
        }
    }
}
