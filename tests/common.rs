#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use offtime_driver::platform::Mcu;

pub const RING_BASE: usize = 16;
pub const EEPROM_SIZE: usize = 64;

/// Byte-addressed EEPROM: a write can only clear bits, an erase sets bytes back to 0xFF.
#[derive(Default)]
pub struct Flash {
    pub buf: Vec<u8>,
    pub fail_after_operation: usize,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Read { offset: u32, len: usize },
    Write { offset: u32, value: u8 },
    Erase { offset: u32 },
}

impl Flash {
    pub fn new() -> Self {
        Self {
            buf: vec![0xffu8; EEPROM_SIZE],
            fail_after_operation: usize::MAX,
            ..Default::default()
        }
    }

    pub fn new_with_fault(fail_after_operation: usize) -> Self {
        Self {
            fail_after_operation,
            ..Self::new()
        }
    }

    /// Fresh EEPROM with `value` in ring cell `cell`.
    pub fn with_cell(cell: usize, value: u8) -> Self {
        let mut flash = Self::new();
        flash.buf[RING_BASE + cell] = value;
        flash
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
    }

    pub fn cell(&self, cell: usize) -> u8 {
        self.buf[RING_BASE + cell]
    }

    pub fn ring(&self) -> &[u8] {
        &self.buf[RING_BASE..RING_BASE + 32]
    }

    /// Ring cells that are not erased, as (cell, value).
    pub fn committed(&self) -> Vec<(usize, u8)> {
        self.ring()
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0xff)
            .map(|(cell, value)| (cell, *value))
            .collect()
    }

    pub fn erases(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Erase { .. }))
            .count()
    }

    fn fault(&self) -> bool {
        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub struct FlashError;

impl NorFlashError for FlashError {
    fn kind(&self) -> NorFlashErrorKind {
        NorFlashErrorKind::Other
    }
}

impl ErrorType for Flash {
    type Error = FlashError;
}

impl ReadNorFlash for Flash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        println!(
            "    flash: read:  0x{offset:02X}[{}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        if self.fault() {
            return Err(FlashError);
        }
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl NorFlash for Flash {
    const WRITE_SIZE: usize = 1;

    const ERASE_SIZE: usize = 1;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        println!("    flash: erase: 0x{from:02X} - 0x{to:02X} #{:>2}", self.operations.len());
        if self.fault() {
            return Err(FlashError);
        }

        for addr in from..to {
            self.operations.push(Operation::Erase { offset: addr });
            self.buf[addr as usize] = 0xff;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        println!(
            "    flash: write: 0x{offset:02X}[{}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        if self.fault() {
            return Err(FlashError);
        }
        assert!(!bytes.is_empty());

        for (i, &value) in bytes.iter().enumerate() {
            self.operations.push(Operation::Write {
                offset: offset + i as u32,
                value,
            });
            // write-only programming can only flip bits from 1 to 0
            self.buf[offset as usize + i] &= value;
        }
        Ok(())
    }
}

/// Everything the driver does to the outside world, in order.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Event {
    Level(u8),
    DelayMs(u32),
    DelayUs(u32),
    CapConversion,
    Recharge,
    VoltageMonitor,
    PollVoltage(Option<u8>),
    MeasureVoltage(u8),
    TickOn,
    TickOff,
    Idle,
    PowerDown,
}

pub type Timeline = Rc<RefCell<Vec<Event>>>;

#[derive(Default)]
pub struct Bench {
    pub timeline: Timeline,
}

impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn led(&self) -> Led {
        Led {
            timeline: self.timeline.clone(),
            broken: false,
        }
    }

    pub fn delay(&self) -> Delay {
        Delay {
            timeline: self.timeline.clone(),
        }
    }

    /// `cap` is what the second conversion returns. The first one, which has to be ignored,
    /// returns the inverted value so a wrong classification shows up.
    pub fn mcu(&self, cap: u8) -> Board {
        Board {
            timeline: self.timeline.clone(),
            cap: VecDeque::from([!cap, cap]),
            voltages: VecDeque::new(),
            battery: 160,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.timeline.borrow().clone()
    }

    pub fn clear(&self) {
        self.timeline.borrow_mut().clear();
    }

    pub fn levels(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Level(level) => Some(level),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: Event) -> usize {
        self.events().into_iter().filter(|event| *event == wanted).count()
    }
}

pub struct Led {
    timeline: Timeline,
    pub broken: bool,
}

#[derive(Debug)]
pub struct LedFault;

impl pwm::Error for LedFault {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

impl pwm::ErrorType for Led {
    type Error = LedFault;
}

impl SetDutyCycle for Led {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if self.broken {
            return Err(LedFault);
        }
        self.timeline.borrow_mut().push(Event::Level(duty as u8));
        Ok(())
    }
}

pub struct Delay {
    timeline: Timeline,
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.timeline.borrow_mut().push(Event::DelayUs(ns / 1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.timeline.borrow_mut().push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.timeline.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub struct Board {
    timeline: Timeline,
    pub cap: VecDeque<u8>,
    /// Samples handed out by `poll_voltage`, one per poll. Empty means no conversion is ready.
    pub voltages: VecDeque<u8>,
    /// What a blocking conversion on the battery channel returns
    pub battery: u8,
}

impl Board {
    pub fn with_voltages(mut self, samples: &[u8]) -> Self {
        self.voltages.extend(samples);
        self
    }

    pub fn with_battery(mut self, battery: u8) -> Self {
        self.battery = battery;
        self
    }

    fn push(&self, event: Event) {
        self.timeline.borrow_mut().push(event);
    }
}

impl Mcu for Board {
    fn convert_offtime_cap(&mut self) -> u8 {
        self.push(Event::CapConversion);
        self.cap.pop_front().unwrap_or(0)
    }

    fn recharge_offtime_cap(&mut self) {
        self.push(Event::Recharge);
    }

    fn start_voltage_monitor(&mut self) {
        self.push(Event::VoltageMonitor);
    }

    fn poll_voltage(&mut self) -> Option<u8> {
        let sample = self.voltages.pop_front();
        self.push(Event::PollVoltage(sample));
        sample
    }

    fn measure_voltage(&mut self) -> u8 {
        self.push(Event::MeasureVoltage(self.battery));
        self.battery
    }

    fn enable_tick(&mut self) {
        self.push(Event::TickOn);
    }

    fn disable_tick(&mut self) {
        self.push(Event::TickOff);
    }

    fn idle(&mut self) {
        self.push(Event::Idle);
    }

    fn power_down(&mut self) {
        self.push(Event::PowerDown);
    }
}
