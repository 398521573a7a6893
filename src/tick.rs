use portable_atomic::{AtomicU8, Ordering};

/// Saturating count of watchdog ticks, shared between the tick interrupt and the main loop.
///
/// The interrupt only ever calls [`TickCounter::on_tick`], the driver only reads and resets.
pub struct TickCounter(AtomicU8);

impl TickCounter {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    /// Call from the watchdog interrupt handler.
    pub fn on_tick(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ticks| {
                ticks.checked_add(1)
            });
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
