//! Edge events handed from the GPIO interrupt to the consumer task.

use core::fmt;

use crate::clock::Timestamp;

/// One accepted button transition.
///
/// Created by the debounce filter in interrupt context and moved through
/// the event channel to the consumer. Never mutated after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    /// GPIO number that fired.
    pub pin: u32,
    /// Time the edge was observed by the interrupt handler.
    pub observed_at: Timestamp,
}

impl EdgeEvent {
    pub const fn new(pin: u32, observed_at: Timestamp) -> Self {
        Self { pin, observed_at }
    }
}

impl fmt::Display for EdgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO[{}] @ {}", self.pin, self.observed_at)
    }
}
