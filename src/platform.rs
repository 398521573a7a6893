use embedded_storage::nor_flash::NorFlash;

/// Storage holding the mode ring. On AVR parts this is the on-chip EEPROM, where a write only
/// clears bits and an erase sets a single byte back to `0xFF`.
///
/// See README.md for an example implementation.
pub trait Platform: NorFlash {}

impl<T: NorFlash> Platform for T {}

pub trait ByteOps: Platform {
    /// Wear levelling relies on programming and erasing single cells independently.
    fn is_byte_granular() -> bool {
        Self::READ_SIZE == 1 && Self::WRITE_SIZE == 1 && Self::ERASE_SIZE == 1
    }
}

impl<T: Platform> ByteOps for T {}

/// The parts of the microcontroller the core drives directly, apart from the LED channel and
/// the busy-wait delay. Peripheral bootstrap (clock, PWM timer, ADC prescaler) happens before
/// any of these are called.
pub trait Mcu {
    /// Runs one blocking conversion on the off-time capacitor channel and returns the
    /// left-adjusted 8-bit result.
    fn convert_offtime_cap(&mut self) -> u8;

    /// Drives the capacitor pin high so it is charged for the next power cycle.
    fn recharge_offtime_cap(&mut self);

    /// Switches the ADC over to the battery divider and starts a conversion.
    fn start_voltage_monitor(&mut self);

    /// Returns the latest battery sample if a conversion has completed since the last poll,
    /// retriggering the next conversion.
    fn poll_voltage(&mut self) -> Option<u8>;

    /// Runs one blocking conversion on the battery channel.
    fn measure_voltage(&mut self) -> u8;

    /// Arms the interrupt-only watchdog tick (about 500 ms).
    fn enable_tick(&mut self);

    fn disable_tick(&mut self);

    /// Idle sleep until the next interrupt.
    fn idle(&mut self);

    /// Enters the deepest sleep mode. On hardware this only returns after a power cycle.
    fn power_down(&mut self);
}

impl<T: Mcu> Mcu for &mut T {
    fn convert_offtime_cap(&mut self) -> u8 {
        T::convert_offtime_cap(self)
    }

    fn recharge_offtime_cap(&mut self) {
        T::recharge_offtime_cap(self)
    }

    fn start_voltage_monitor(&mut self) {
        T::start_voltage_monitor(self)
    }

    fn poll_voltage(&mut self) -> Option<u8> {
        T::poll_voltage(self)
    }

    fn measure_voltage(&mut self) -> u8 {
        T::measure_voltage(self)
    }

    fn enable_tick(&mut self) {
        T::enable_tick(self)
    }

    fn disable_tick(&mut self) {
        T::disable_tick(self)
    }

    fn idle(&mut self) {
        T::idle(self)
    }

    fn power_down(&mut self) {
        T::power_down(self)
    }
}
