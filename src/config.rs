/// Capacitor thresholds in 8-bit ADC counts (1.1 V reference).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapThresholds {
    /// Above this the capacitor is still well charged: short press
    pub short: u8,
    /// Above this it has partially discharged: medium press
    pub medium: u8,
}

impl Default for CapThresholds {
    fn default() -> Self {
        Self {
            short: 130,
            medium: 90,
        }
    }
}

/// Battery thresholds in 8-bit ADC counts, for a 4700 / 23800 divider against 1.1 V.
///
/// `value = (V * 4700 * 255) / (23800 * 1.1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageThresholds {
    /// 4.20 V, five blinks
    pub full_42: u8,
    /// 3.9 V
    pub full: u8,
    /// 3.6 V
    pub green: u8,
    /// 3.3 V
    pub yellow: u8,
    /// 3.0 V, start stepping down
    pub low: u8,
    /// 2.75 V, shut off once at the floor mode
    pub critical: u8,
}

impl Default for VoltageThresholds {
    fn default() -> Self {
        Self {
            full_42: 185,
            full: 169,
            green: 154,
            yellow: 139,
            low: 123,
            critical: 113,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub cap: CapThresholds,
    pub voltage: VoltageThresholds,
    /// Consecutive under-threshold samples before the supervisor acts
    pub low_sample_limit: u8,
    /// Disables battery polling and step-down entirely when false
    pub voltage_monitor: bool,
    /// Keep the stored mode after a long press instead of restarting at moon
    pub mode_memory: bool,
    /// Drop from turbo to high after this many ticks. `None` keeps turbo indefinitely.
    pub turbo_timeout_ticks: Option<u8>,
    /// Longest stretch of pattern time between two supervisor polls
    pub poll_interval_ms: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cap: CapThresholds::default(),
            voltage: VoltageThresholds::default(),
            low_sample_limit: 3,
            voltage_monitor: true,
            mode_memory: false,
            turbo_timeout_ticks: None,
            poll_interval_ms: 500,
        }
    }
}
