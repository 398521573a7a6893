//! Light output of the blinking modes, expressed as a sequence of `(level, duration)` segments.
//!
//! One [`Pattern`] covers exactly one period of its mode. The executor plays the segments and
//! gets a chance to poll the supervisor between any two of them.

use crate::config::VoltageThresholds;
use crate::mode::{MODE_MED, MODE_TURBO, Mode, ModeGroup, SOLID_MODES};

/// Fixed strobes with an off-time below this get a sub-millisecond flash.
const FAST_STROBE_MS: u8 = 50;

/// Hold `level` on the LED for `ms` milliseconds. Zero means "as short as possible".
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    pub level: u8,
    pub ms: u16,
}

impl Segment {
    pub const fn new(level: u8, ms: u16) -> Self {
        Self { level, ms }
    }

    const fn off(ms: u16) -> Self {
        Self { level: 0, ms }
    }
}

#[derive(Debug, Clone)]
enum Kind {
    DualBeacon { flash: u8, base: u8 },
    Heartbeat,
    Strobe { pulse: u16, off: u16 },
    BatteryCheck { blinks: u8 },
}

/// One period of a blinking mode.
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: Kind,
    step: u8,
}

impl Pattern {
    /// Returns `None` for solid modes, which hold a constant level and have no period.
    ///
    /// The battery check reads `voltage` once, up front, and turns it into a blink count.
    pub fn for_mode(
        mode: Mode,
        voltage: impl FnOnce() -> u8,
        thresholds: &VoltageThresholds,
    ) -> Option<Pattern> {
        let kind = match mode.group() {
            ModeGroup::Solid => return None,
            ModeGroup::DualBeacon => {
                let flash = mode.index() - SOLID_MODES + 2;
                Kind::DualBeacon {
                    flash: Mode::from_repr(flash).map_or(MODE_TURBO, Mode::level),
                    base: mode.level(),
                }
            }
            ModeGroup::Heartbeat => Kind::Heartbeat,
            ModeGroup::FixedStrobe => {
                let off = mode.level();
                Kind::Strobe {
                    pulse: if off < FAST_STROBE_MS { 0 } else { 1 },
                    off: off as u16,
                }
            }
            ModeGroup::BatteryCheck => Kind::BatteryCheck {
                blinks: blinks_for(voltage(), thresholds),
            },
        };

        Some(Pattern { kind, step: 0 })
    }

    /// Total time of one period in milliseconds.
    pub fn period_ms(&self) -> u32 {
        self.clone().map(|segment| segment.ms as u32).sum()
    }
}

impl Iterator for Pattern {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let step = self.step;
        let segment = match self.kind {
            // Four short flashes over the base level, then a long stretch of base level.
            Kind::DualBeacon { flash, base } => match step {
                0..8 if step % 2 == 0 => Segment::new(flash, 5),
                0..8 => Segment::new(base, 65),
                8 => Segment::new(base, 720),
                _ => return None,
            },
            Kind::Heartbeat => match step {
                0 | 2 => Segment::new(MODE_TURBO, 1),
                1 => Segment::off(249),
                3 => Segment::off(749),
                _ => return None,
            },
            Kind::Strobe { pulse, off } => match step {
                0 => Segment::new(MODE_TURBO, pulse),
                1 => Segment::off(off),
                _ => return None,
            },
            // Dark for a second, one medium blink per band, dark for another second.
            Kind::BatteryCheck { blinks } => {
                let last = 2 * blinks + 1;
                match step {
                    0 => Segment::off(1000),
                    s if s == last => Segment::off(1000),
                    s if s > last => return None,
                    s if s % 2 == 1 => Segment::new(MODE_MED, 100),
                    _ => Segment::off(400),
                }
            }
        };

        self.step += 1;
        Some(segment)
    }
}

/// Maps a battery sample onto the 0..=5 blinks shown by the battery check.
pub fn blinks_for(voltage: u8, thresholds: &VoltageThresholds) -> u8 {
    if voltage >= thresholds.full_42 {
        5
    } else if voltage > thresholds.full {
        4
    } else if voltage > thresholds.green {
        3
    } else if voltage > thresholds.yellow {
        2
    } else if voltage > thresholds.low {
        1
    } else {
        0
    }
}
