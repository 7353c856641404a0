//! Monotonic clock backed by `esp_timer`.

use btn2slack::{MonotonicClock, Timestamp};
use esp_idf_svc::sys;

/// The ESP-IDF high-resolution timer: a 64-bit up-counter at 1 MHz
/// (APB clock divided by 80), running since boot.
///
/// `esp_timer_get_time` is safe to call from an ISR.
#[derive(Clone, Copy, Debug, Default)]
pub struct EspTimerClock;

impl MonotonicClock for EspTimerClock {
    fn start(&mut self) {
        // The IDF startup code leaves esp_timer up-counting at 1 MHz before
        // `main`, which is exactly the `MonotonicClock` contract.
    }

    fn now(&self) -> Timestamp {
        let us = unsafe { sys::esp_timer_get_time() };
        Timestamp::from_micros(us as u64)
    }
}
