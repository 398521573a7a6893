#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod config;
pub mod error;
pub mod mode;
pub mod pattern;
pub mod platform;
pub mod press;
pub mod store;
pub mod supervisor;
pub mod tick;

pub use config::Config;
pub use mode::{Mode, Selector};
pub use press::Press;
pub use store::{ByteSlot, WearLevelledSlot};
pub use tick::TickCounter;

use crate::error::Error;
use crate::mode::{Decoded, ModeGroup};
use crate::pattern::Pattern;
use crate::platform::Mcu;
use crate::supervisor::{Supervisor, Verdict};
#[cfg(feature = "defmt")]
use defmt::{info, warn};
use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;

/// Pause after a step-down before the next sample may lower the level again.
const STEP_DOWN_PAUSE_MS: u32 = 1000;

/// Length of the "zero millisecond" flash of the fast strobes.
const SHORTEST_FLASH_US: u32 = 250;

/// Outcome of one executor iteration.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Running,
    /// The battery is exhausted at the floor mode. Nothing but a power cycle brings the light
    /// back.
    PoweredDown,
}

/// The whole driver state, owned by `main`. The tick interrupt only gets the [`TickCounter`].
pub struct Driver<'a, S, L, D, M>
where
    S: ByteSlot,
    L: SetDutyCycle,
    D: DelayNs,
    M: Mcu,
{
    pub(crate) slot: S,
    pub(crate) led: L,
    pub(crate) delay: D,
    pub(crate) mcu: M,
    pub(crate) ticks: &'a TickCounter,
    pub(crate) config: Config,
    pub(crate) supervisor: Supervisor,

    // set during boot
    pub(crate) selector: Selector,
    pub(crate) mode: Mode,
    pub(crate) level: u8,
    pub(crate) powered_down: bool,
}

impl<'a, S, L, D, M> Driver<'a, S, L, D, M>
where
    S: ByteSlot,
    L: SetDutyCycle,
    D: DelayNs,
    M: Mcu,
{
    /// Runs the power-on sequence, strictly in this order:
    /// 1. Load the stored selector
    /// 2. Classify the off-time and navigate
    /// 3. Persist the new selector
    /// 4. Recharge the capacitor, arm the voltage monitor and the tick
    /// 5. Resolve shortcuts and light up
    ///
    /// Storage failures are logged and otherwise ignored: the light still starts, at moon if
    /// nothing could be read. Only a failing LED channel is reported.
    pub fn boot(
        slot: S,
        led: L,
        delay: D,
        mcu: M,
        ticks: &'a TickCounter,
        config: Config,
    ) -> Result<Self, Error> {
        let mut driver = Self {
            slot,
            led,
            delay,
            mcu,
            ticks,
            supervisor: Supervisor::new(&config),
            config,
            selector: Selector::default(),
            mode: Mode::FLOOR,
            level: 0,
            powered_down: false,
        };

        let stored = driver.load_selector();
        let press = Press::sense(&mut driver.mcu, &driver.config.cap);
        let selector = press.navigate(stored, &driver.config);

        #[cfg(feature = "defmt")]
        info!("{} press: {} -> {}", press, stored, selector);

        #[cfg(feature = "debug-logs")]
        println!("driver: {press} press: {stored:?} -> {selector:?}");

        driver.persist(selector);
        driver.mcu.recharge_offtime_cap();

        if driver.config.voltage_monitor {
            driver.mcu.start_voltage_monitor();
        }
        driver.ticks.reset();
        driver.mcu.enable_tick();

        driver.selector = selector;
        driver.enter(selector.resolve())?;

        Ok(driver)
    }

    /// The selector persisted during boot, possibly a shortcut.
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// The mode the executor is running.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The last level written to the LED channel.
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Runs the executor until the battery gives out.
    pub fn run(&mut self) -> Result<(), Error> {
        while self.step()? == Step::Running {}
        Ok(())
    }

    /// One executor iteration: a tick-long idle for solid modes or one period of a blinking
    /// mode, with supervisor polls in between.
    pub fn step(&mut self) -> Result<Step, Error> {
        if self.powered_down {
            return Ok(Step::PoweredDown);
        }

        let pattern = Pattern::for_mode(
            self.mode,
            || self.mcu.measure_voltage(),
            &self.config.voltage,
        );

        match pattern {
            None => self.hold(),
            Some(pattern) => self.play(pattern),
        }
    }

    fn load_selector(&mut self) -> Selector {
        match self.slot.load() {
            Ok(Some(byte)) => match Selector::decode(byte) {
                Decoded::Valid(selector) => selector,
                Decoded::Erased | Decoded::Corrupt(_) => {
                    #[cfg(feature = "defmt")]
                    warn!("stored mode {:#04x} is invalid, starting at the floor", byte);

                    #[cfg(feature = "debug-logs")]
                    println!("driver: stored mode 0x{byte:02x} is invalid");

                    Selector::default()
                }
            },
            Ok(None) => Selector::default(),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                warn!("unable to load mode: {}", _e);

                Selector::default()
            }
        }
    }

    fn persist(&mut self, selector: Selector) {
        if let Err(_e) = self.slot.store(selector.to_byte()) {
            #[cfg(feature = "defmt")]
            warn!("unable to store mode: {}", _e);

            #[cfg(feature = "debug-logs")]
            println!("driver: unable to store mode: {_e}");
        }
    }

    fn enter(&mut self, mode: Mode) -> Result<(), Error> {
        self.mode = mode;
        // blinking modes set their own levels segment by segment
        match mode.group() {
            ModeGroup::Solid => self.set_level(mode.level()),
            _ => Ok(()),
        }
    }

    fn set_level(&mut self, level: u8) -> Result<(), Error> {
        self.led
            .set_duty_cycle_fraction(level as u16, u8::MAX as u16)
            .map_err(|_| Error::LedError)?;
        self.level = level;
        Ok(())
    }

    fn wait(&mut self, ms: u16) {
        match ms {
            0 => self.delay.delay_us(SHORTEST_FLASH_US),
            ms => self.delay.delay_ms(ms as u32),
        }
    }

    fn hold(&mut self) -> Result<Step, Error> {
        if let Some(limit) = self.config.turbo_timeout_ticks {
            if self.mode == Mode::Turbo && self.ticks.get() >= limit {
                #[cfg(feature = "defmt")]
                info!("turbo timeout after {} ticks", limit);

                self.enter(Mode::High)?;
            }
        }

        self.mcu.idle();
        self.supervise()
    }

    fn play(&mut self, pattern: Pattern) -> Result<Step, Error> {
        let mode = self.mode;
        let interval = self.config.poll_interval_ms as u32;
        let mut since_poll = 0u32;

        for segment in pattern {
            self.set_level(segment.level)?;
            self.wait(segment.ms);

            since_poll += segment.ms as u32;
            if since_poll >= interval {
                since_poll = 0;
                match self.supervise()? {
                    Step::Running if self.mode == mode => {}
                    // stepped down or shut off, drop the rest of this period
                    step => return Ok(step),
                }
            }
        }

        if since_poll == 0 {
            return Ok(Step::Running);
        }
        self.supervise()
    }

    fn supervise(&mut self) -> Result<Step, Error> {
        if !self.config.voltage_monitor {
            return Ok(Step::Running);
        }

        let Some(sample) = self.mcu.poll_voltage() else {
            return Ok(Step::Running);
        };

        match self.supervisor.observe(sample, self.mode == Mode::FLOOR) {
            Verdict::Hold => Ok(Step::Running),
            Verdict::StepDown => {
                self.enter(Mode::FLOOR)?;
                self.delay.delay_ms(STEP_DOWN_PAUSE_MS);
                Ok(Step::Running)
            }
            Verdict::Shutdown => self.shut_down(),
        }
    }

    fn shut_down(&mut self) -> Result<Step, Error> {
        #[cfg(feature = "defmt")]
        warn!("battery exhausted, powering down");

        #[cfg(feature = "debug-logs")]
        println!("driver: battery exhausted, powering down");

        self.set_level(0)?;
        self.mcu.disable_tick();
        self.powered_down = true;
        self.mcu.power_down();
        Ok(Step::PoweredDown)
    }
}
