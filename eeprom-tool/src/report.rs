use std::fmt;

use offtime_driver::mode::{Decoded, Mode, Selector, ERASED};
use offtime_driver::store::RING_CELLS;
use serde::Serialize;

use crate::selector_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    Erased,
    /// The cell the driver reads at boot
    Committed,
    /// Left behind by an interrupted store, erased by the driver on the next boot
    Stale,
}

/// What the driver makes of an image at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Lowest non-erased cell, `None` for a blank ring
    pub position: Option<usize>,
    pub raw: Option<u8>,
    pub decoded: Decoded,
    pub stale: Vec<usize>,
}

impl Report {
    pub fn selector(&self) -> Option<Selector> {
        match self.decoded {
            Decoded::Valid(selector) => Some(selector),
            Decoded::Erased | Decoded::Corrupt(_) => None,
        }
    }

    /// The mode stored in the image. Blank and corrupt images fall back to the floor mode,
    /// just like the driver does.
    pub fn mode(&self) -> Mode {
        self.selector().unwrap_or_default().resolve()
    }

    pub fn state(&self, cell: usize) -> CellState {
        if self.position == Some(cell) {
            CellState::Committed
        } else if self.stale.contains(&cell) {
            CellState::Stale
        } else {
            CellState::Erased
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.position, self.raw) {
            (Some(position), Some(raw)) => writeln!(f, "cell:     {position} (0x{raw:02X})")?,
            _ => writeln!(f, "cell:     none, ring is blank")?,
        }
        match self.decoded {
            Decoded::Valid(selector) => writeln!(f, "selector: {}", selector_name(selector))?,
            Decoded::Corrupt(byte) => writeln!(f, "selector: corrupt (0x{byte:02X})")?,
            Decoded::Erased => writeln!(f, "selector: none")?,
        }
        writeln!(f, "mode:     {}", self.mode())?;
        if !self.stale.is_empty() {
            writeln!(f, "stale:    {:?}", self.stale)?;
        }
        Ok(())
    }
}

pub(crate) fn parse_cells(cells: &[u8; RING_CELLS]) -> Report {
    let mut programmed = cells
        .iter()
        .enumerate()
        .filter(|(_, &raw)| raw != ERASED)
        .map(|(cell, _)| cell);

    let position = programmed.next();
    let raw = position.map(|cell| cells[cell]);

    Report {
        position,
        raw,
        decoded: raw.map_or(Decoded::Erased, Selector::decode),
        stale: programmed.collect(),
    }
}
