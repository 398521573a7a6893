//! Wear-levelled persistence of a single byte.
//!
//! The value lives in exactly one cell of a ring of [`RING_CELLS`] bytes, every other cell is
//! erased (`0xFF`). A store programs the next cell first and only then erases the previous one,
//! so a power loss in between leaves two committed cells instead of none. The lower-indexed
//! one wins on the next load and the other one is erased.

use crate::error::Error;
use crate::mode::ERASED;
use crate::platform::{ByteOps, Platform};
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

/// Number of cells in the ring. Each cell sees roughly `writes / RING_CELLS` program cycles.
pub const RING_CELLS: usize = 32;

/// A persisted single byte slot.
pub trait ByteSlot {
    /// Returns the last committed value, or `None` if nothing has been stored yet.
    fn load(&mut self) -> Result<Option<u8>, Error>;

    /// Commits `value`. `0xFF` is reserved for erased cells and rejected.
    fn store(&mut self, value: u8) -> Result<(), Error>;
}

impl<S: ByteSlot> ByteSlot for &mut S {
    fn load(&mut self) -> Result<Option<u8>, Error> {
        (*self).load()
    }

    fn store(&mut self, value: u8) -> Result<(), Error> {
        (*self).store(value)
    }
}

pub struct WearLevelledSlot<T: Platform> {
    pub(crate) hal: T,
    pub(crate) base_address: u32,
    /// Cell holding the committed value, or the first cell to program on a blank ring
    pub(crate) position: u8,
    pub(crate) committed: bool,
    pub(crate) mounted: bool,
    pub(crate) faulted: bool,
}

impl<T: Platform> WearLevelledSlot<T> {
    /// Claims `RING_CELLS` bytes starting at `base_address`. Nothing is read until the first
    /// [`ByteSlot::load`].
    pub fn new(base_address: usize, hal: T) -> Result<WearLevelledSlot<T>, Error> {
        if !T::is_byte_granular() {
            return Err(Error::UnsupportedGeometry);
        }

        match base_address.checked_add(RING_CELLS) {
            Some(end) if end <= hal.capacity() && end <= u32::MAX as usize => {}
            _ => return Err(Error::InvalidSlotOffset),
        }

        Ok(Self {
            hal,
            base_address: base_address as u32,
            position: 0,
            committed: false,
            mounted: false,
            faulted: false,
        })
    }

    /// Index of the cell the next load will report, relative to the base address.
    pub fn position(&self) -> u8 {
        self.position
    }

    fn next_position(&self) -> u8 {
        ((self.position as usize + 1) % RING_CELLS) as u8
    }

    fn address(&self, cell: u8) -> u32 {
        self.base_address + cell as u32
    }

    /// Program-only: bits can only be cleared, so the target must be erased beforehand.
    fn write_cell(&mut self, cell: u8, value: u8) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("write_cell: [{}] = {:#04x}", cell, value);

        #[cfg(feature = "debug-logs")]
        println!("  store: write cell {cell:>2} = 0x{value:02x}");

        let address = self.address(cell);
        self.hal.write(address, &[value]).map_err(|_| Error::FlashError)
    }

    /// Erase-only, back to `0xFF`.
    fn erase_cell(&mut self, cell: u8) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("erase_cell: [{}]", cell);

        #[cfg(feature = "debug-logs")]
        println!("  store: erase cell {cell:>2}");

        let address = self.address(cell);
        self.hal
            .erase(address, address + 1)
            .map_err(|_| Error::FlashError)
    }

    fn scan(&mut self) -> Result<Option<u8>, Error> {
        let mut cells = [ERASED; RING_CELLS];
        self.hal
            .read(self.base_address, &mut cells)
            .map_err(|_| Error::FlashError)?;

        self.mounted = true;

        let Some(position) = cells.iter().position(|&cell| cell != ERASED) else {
            self.position = 0;
            self.committed = false;
            return Ok(None);
        };

        self.position = position as u8;
        self.committed = true;

        // Leftovers of a store that lost power between programming and erasing.
        for stale in (position + 1..RING_CELLS).filter(|&cell| cells[cell] != ERASED) {
            #[cfg(feature = "defmt")]
            warn!("erasing stale mode cell {}", stale);

            self.erase_cell(stale as u8)?;
        }

        Ok(Some(cells[position]))
    }
}

impl<T: Platform> ByteSlot for WearLevelledSlot<T> {
    fn load(&mut self) -> Result<Option<u8>, Error> {
        match self.scan() {
            Err(Error::FlashError) => {
                self.faulted = true;
                Err(Error::FlashError)
            }
            other => other,
        }
    }

    fn store(&mut self, value: u8) -> Result<(), Error> {
        if value == ERASED {
            return Err(Error::ErasedValue);
        }

        if !self.mounted {
            self.load()?;
        }

        if self.faulted {
            return Err(Error::FlashError);
        }

        let previous = self.committed.then_some(self.position);
        let target = match previous {
            Some(_) => self.next_position(),
            None => self.position,
        };

        let result = self.write_cell(target, value).and_then(|()| {
            self.position = target;
            self.committed = true;
            match previous {
                Some(old) => self.erase_cell(old),
                None => Ok(()),
            }
        });

        if result.is_err() {
            self.faulted = true;
        }
        result
    }
}
