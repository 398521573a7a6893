//! The fixed mode table, the shortcut dial and the single byte that is persisted for them.

use strum::EnumCount;

pub const MODE_MOON: u8 = 1;
pub const MODE_LOW: u8 = 8;
pub const MODE_MED: u8 = 39;
pub const MODE_HIGH: u8 = 120;
pub const MODE_TURBO: u8 = 255;

/// Number of regular modes, all of which are reachable by short presses.
pub const TOTAL_MODES: u8 = Mode::COUNT as u8;

/// Number of solid modes at the start of the table. The dual beacons borrow the level two
/// steps above their own from this range.
pub const SOLID_MODES: u8 = 5;

/// Duty byte per mode. Strobes store their off-time in milliseconds instead of a level.
pub(crate) const LEVELS: [u8; Mode::COUNT] = [
    MODE_MOON, MODE_LOW, MODE_MED, MODE_HIGH, MODE_TURBO, // solid
    MODE_MOON, MODE_LOW, MODE_MED, // dual beacon: this level plus the level two above
    MODE_TURBO, // heartbeat
    99, 41, 15, // fixed strobe: 10 Hz, 24 Hz, 60 Hz
    MODE_MED, // battery check
];

/// Destinations of the medium-press dial, in the order they are visited from moon.
pub const SHORTCUTS: [Mode; 3] = [Mode::Turbo, Mode::Strobe24Hz, Mode::BatteryCheck];

/// Bit 6 of the persisted byte marks a shortcut slot.
pub const SHORTCUT_FLAG: u8 = 0x40;
const SLOT_MASK: u8 = 0x3F;

/// The erased state of a storage cell. Never a valid mode.
pub const ERASED: u8 = 0xFF;

#[derive(
    strum::FromRepr,
    strum::Display,
    strum::EnumString,
    strum::EnumCount,
    strum::EnumIter,
    Debug,
    PartialEq,
    Eq,
    Copy,
    Clone,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum Mode {
    Moon = 0,
    Low,
    Med,
    High,
    Turbo,
    BeaconMoon,
    BeaconLow,
    BeaconMed,
    Heartbeat,
    #[strum(serialize = "strobe-10hz")]
    Strobe10Hz,
    #[strum(serialize = "strobe-24hz")]
    Strobe24Hz,
    #[strum(serialize = "strobe-60hz")]
    Strobe60Hz,
    BatteryCheck,
}

#[derive(strum::Display, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeGroup {
    Solid,
    DualBeacon,
    Heartbeat,
    FixedStrobe,
    BatteryCheck,
}

impl Mode {
    /// The lowest solid level, also the target of every low-battery step-down.
    pub const FLOOR: Mode = Mode::Moon;

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Raw duty byte from the mode table.
    pub const fn level(self) -> u8 {
        LEVELS[self as usize]
    }

    pub const fn group(self) -> ModeGroup {
        match self {
            Mode::Moon | Mode::Low | Mode::Med | Mode::High | Mode::Turbo => ModeGroup::Solid,
            Mode::BeaconMoon | Mode::BeaconLow | Mode::BeaconMed => ModeGroup::DualBeacon,
            Mode::Heartbeat => ModeGroup::Heartbeat,
            Mode::Strobe10Hz | Mode::Strobe24Hz | Mode::Strobe60Hz => ModeGroup::FixedStrobe,
            Mode::BatteryCheck => ModeGroup::BatteryCheck,
        }
    }

    /// Next mode in table order, wrapping from the battery check back to moon.
    pub fn next(self) -> Mode {
        Mode::from_repr((self.index() + 1) % TOTAL_MODES).unwrap_or(Mode::FLOOR)
    }

    /// Previous mode in table order. Moon has no predecessor here, the dial takes over.
    pub fn prev(self) -> Option<Mode> {
        self.index().checked_sub(1).and_then(Mode::from_repr)
    }
}

/// What the persisted byte selects: either a regular mode or a slot of the shortcut dial.
///
/// The shortcut form only exists between the press classifier and the executor. It is resolved
/// once per boot, so the executor only ever sees a [`Mode`].
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selector {
    Regular(Mode),
    /// Zero-based index into [`SHORTCUTS`]
    Shortcut(u8),
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Regular(Mode::FLOOR)
    }
}

/// Result of decoding a storage cell.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    Erased,
    Valid(Selector),
    Corrupt(u8),
}

impl Selector {
    /// Byte layout: `0..TOTAL_MODES` for regular modes, `0x40 | (slot + 1)` for shortcuts.
    pub const fn to_byte(self) -> u8 {
        match self {
            Selector::Regular(mode) => mode.index(),
            Selector::Shortcut(slot) => SHORTCUT_FLAG | (slot.wrapping_add(1) & SLOT_MASK),
        }
    }

    pub fn decode(byte: u8) -> Decoded {
        if byte == ERASED {
            return Decoded::Erased;
        }

        if byte & !(SHORTCUT_FLAG | SLOT_MASK) != 0 {
            return Decoded::Corrupt(byte);
        }

        if byte & SHORTCUT_FLAG != 0 {
            let marker = byte & SLOT_MASK;
            if marker == 0 || marker as usize > SHORTCUTS.len() {
                return Decoded::Corrupt(byte);
            }
            return Decoded::Valid(Selector::Shortcut(marker - 1));
        }

        match Mode::from_repr(byte) {
            Some(mode) => Decoded::Valid(Selector::Regular(mode)),
            None => Decoded::Corrupt(byte),
        }
    }

    /// Lenient decode used at boot: anything unusable falls back to the floor mode.
    pub fn from_byte(byte: u8) -> Selector {
        match Selector::decode(byte) {
            Decoded::Valid(selector) => selector,
            Decoded::Erased | Decoded::Corrupt(_) => Selector::default(),
        }
    }

    /// Short press. A shortcut selector overflows the table and wraps to moon.
    pub fn next(self) -> Selector {
        match self {
            Selector::Regular(mode) => Selector::Regular(mode.next()),
            Selector::Shortcut(_) => Selector::default(),
        }
    }

    /// Medium press. Steps down through the regular modes until moon, then walks the shortcut
    /// dial and finally returns to moon.
    pub fn prev(self) -> Selector {
        match self {
            Selector::Regular(mode) => match mode.prev() {
                Some(lower) => Selector::Regular(lower),
                None => Selector::Shortcut(0),
            },
            Selector::Shortcut(slot) if slot as usize + 1 < SHORTCUTS.len() => {
                Selector::Shortcut(slot + 1)
            }
            Selector::Shortcut(_) => Selector::default(),
        }
    }

    /// The mode the executor will run.
    pub fn resolve(self) -> Mode {
        match self {
            Selector::Regular(mode) => mode,
            Selector::Shortcut(slot) => SHORTCUTS
                .get(slot as usize)
                .copied()
                .unwrap_or(Mode::FLOOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn table_layout() {
        assert_eq!(TOTAL_MODES, 13);
        assert_eq!(Mode::Turbo.index(), SOLID_MODES - 1);
        assert_eq!(Mode::Strobe24Hz.level(), 41);
        assert_eq!(Mode::BatteryCheck.index(), 12);
        assert_eq!(Mode::BeaconMed.group(), ModeGroup::DualBeacon);
    }

    #[test]
    fn next_cycles_through_every_mode() {
        let mut selector = Selector::Regular(Mode::High);
        for _ in 0..TOTAL_MODES {
            selector = selector.next();
        }
        assert_eq!(selector, Selector::Regular(Mode::High));
        assert_eq!(Mode::BatteryCheck.next(), Mode::Moon);
    }

    #[test]
    fn prev_from_moon_walks_the_dial() {
        let mut selector = Selector::default();
        let mut visited = [Mode::Moon; 3];
        for slot in visited.iter_mut() {
            selector = selector.prev();
            *slot = selector.resolve();
        }
        assert_eq!(visited, SHORTCUTS);
        assert_eq!(selector.prev(), Selector::default());
    }

    #[test]
    fn prev_steps_down_regular_modes() {
        assert_eq!(
            Selector::Regular(Mode::Med).prev(),
            Selector::Regular(Mode::Low)
        );
    }

    #[test]
    fn shortcut_encoding() {
        assert_eq!(Selector::Shortcut(0).to_byte(), 0x41);
        assert_eq!(Selector::decode(0x43), Decoded::Valid(Selector::Shortcut(2)));
        assert_eq!(Selector::Shortcut(1).resolve(), Mode::Strobe24Hz);
    }

    #[test]
    fn invalid_bytes() {
        assert_eq!(Selector::decode(0xFF), Decoded::Erased);
        assert_eq!(Selector::decode(13), Decoded::Corrupt(13));
        assert_eq!(Selector::decode(0x40), Decoded::Corrupt(0x40));
        assert_eq!(Selector::decode(0x44), Decoded::Corrupt(0x44));
        assert_eq!(Selector::decode(0x81), Decoded::Corrupt(0x81));
        assert_eq!(Selector::from_byte(0x20), Selector::default());
    }

    #[test]
    fn names() {
        assert_eq!(Mode::from_str("strobe-24hz"), Ok(Mode::Strobe24Hz));
        assert_eq!(Mode::from_str("battery-check"), Ok(Mode::BatteryCheck));
    }
}
