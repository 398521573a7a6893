//! Generator and inspector for the EEPROM mode ring of `offtime-driver`.
//!
//! An image is the raw content of the 32 ring cells. A healthy image holds exactly one
//! committed byte, everything else erased. Images read back from a board that lost power
//! between programming and erasing carry one or more stale cells as well.

pub mod error;

mod dump;
mod report;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

pub use error::Error;
pub use offtime_driver::mode::{Decoded, Mode, Selector, SHORTCUTS};
pub use offtime_driver::store::RING_CELLS;
pub use report::{CellState, Report};

use offtime_driver::mode::ERASED;

/// Raw content of the mode ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EepromImage {
    pub cells: [u8; RING_CELLS],
}

impl Default for EepromImage {
    fn default() -> Self {
        Self {
            cells: [ERASED; RING_CELLS],
        }
    }
}

impl EepromImage {
    /// Builds an image that boots into `selector`, committed at ring cell `position`.
    pub fn generate(selector: Selector, position: usize) -> Result<Self, Error> {
        if position >= RING_CELLS {
            return Err(Error::InvalidPosition(position));
        }
        if let Selector::Shortcut(slot) = selector {
            if slot as usize >= SHORTCUTS.len() {
                return Err(Error::InvalidMode(format!("shortcut:{slot}")));
            }
        }

        let mut image = Self::default();
        image.cells[position] = selector.to_byte();
        Ok(image)
    }

    /// Wraps a raw dump. `data` must be exactly one ring long.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let cells = data
            .try_into()
            .map_err(|_| Error::InvalidImageSize(data.len()))?;
        Ok(Self { cells })
    }

    /// Reads a raw dump from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Parses a hex dump, as printed by most programmers. Whitespace is ignored.
    pub fn from_hex(text: &str) -> Result<Self, Error> {
        let digits: String = text.split_whitespace().collect();
        Self::from_bytes(&hex::decode(digits)?)
    }

    /// Upper case hex rendering of the whole ring.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.cells)
    }

    /// Writes the raw image to `path`.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::File::create(path)?.write_all(&self.cells)?;
        Ok(())
    }

    /// Decodes the image the same way the driver does at boot.
    pub fn parse(&self) -> Report {
        report::parse_cells(&self.cells)
    }

    /// One CSV row per cell: `cell,raw,state`.
    pub fn to_csv(&self) -> Result<String, Error> {
        dump::write_csv_content(self)
    }

    /// Writes the CSV cell dump to `path`.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        dump::write_csv(self, path)
    }
}

/// Accepts a mode name (`strobe-24hz`), a table index (`10`) or a dial slot (`shortcut:1`).
pub fn parse_selector(s: &str) -> Result<Selector, Error> {
    let invalid = || Error::InvalidMode(s.to_string());

    if let Some(slot) = s.strip_prefix("shortcut:") {
        let slot: u8 = slot.parse().map_err(|_| invalid())?;
        if slot as usize >= SHORTCUTS.len() {
            return Err(invalid());
        }
        return Ok(Selector::Shortcut(slot));
    }

    if let Ok(index) = s.parse::<u8>() {
        return Mode::from_repr(index).map(Selector::Regular).ok_or_else(invalid);
    }

    Mode::from_str(s).map(Selector::Regular).map_err(|_| invalid())
}

/// Inverse of [`parse_selector`], with the resolved mode for shortcuts.
pub fn selector_name(selector: Selector) -> String {
    match selector {
        Selector::Regular(mode) => mode.to_string(),
        Selector::Shortcut(slot) => format!("shortcut:{slot} ({})", selector.resolve()),
    }
}
