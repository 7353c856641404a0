//! Monotonic time source.
//!
//! Timestamps are microseconds since the counter started, held in a `u64`
//! (the width of `esp_timer_get_time`). At 1 MHz that range never wraps
//! in practice, so intervals are plain subtraction.

use core::fmt;

/// A point on the monotonic timeline, in microseconds since start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_micros(us: u64) -> Self {
        Self(us)
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Microseconds from `earlier` to `self`, `None` if `earlier` is later.
    pub const fn micros_since(self, earlier: Timestamp) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

/// Hardware counter providing elapsed time since start.
///
/// The counter counts up at 1 MHz (one tick per microsecond: an 80 MHz APB
/// clock with divisor 80) and is never reset while the firmware runs.
/// `now` must be callable from interrupt context: no blocking, no
/// allocation.
pub trait MonotonicClock {
    /// Put the counter into the state above: counting up, 1 µs per tick,
    /// running. Called once, before the first edge is filtered.
    /// Implementations whose counter is already running that way at boot
    /// have nothing to do here.
    fn start(&mut self);

    /// Current time.
    fn now(&self) -> Timestamp;
}
