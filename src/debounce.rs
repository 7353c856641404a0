//! Leading-edge debounce filter for the GPIO interrupt.
//!
//! The first edge of a burst is accepted; every edge within the
//! threshold window after the last *accepted* edge is suppressed,
//! however many arrive.
//!
//! The filter runs in interrupt context. It never blocks, allocates or
//! logs. Its state is a 64-bit microsecond timestamp, wider than the
//! ESP32's atomics, so it lives in a `critical_section::Mutex` and every
//! read-decide-write happens inside one short critical section. Other
//! contexts may only take a [`DebounceFilter::snapshot`].

use core::cell::Cell;

use critical_section::Mutex;

use crate::channel::EdgeProducer;
use crate::clock::Timestamp;
use crate::config::DEFAULT_DEBOUNCE_MS;
use crate::event::EdgeEvent;

#[derive(Clone, Copy)]
struct FilterState {
    /// Last accepted (or seeded) edge; `None` until either happens.
    last_accepted: Option<Timestamp>,
    accepted: u32,
}

pub struct DebounceFilter {
    threshold_ms: u32,
    state: Mutex<Cell<FilterState>>,
}

impl DebounceFilter {
    /// An unprimed filter: the first edge it sees is always accepted.
    pub const fn new(threshold_ms: u32) -> Self {
        Self {
            threshold_ms,
            state: Mutex::new(Cell::new(FilterState {
                last_accepted: None,
                accepted: 0,
            })),
        }
    }

    /// Prime the window at task start, so presses within one threshold of
    /// boot are treated as power-on noise.
    pub fn seed(&self, now: Timestamp) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            cell.set(FilterState {
                last_accepted: Some(now),
                ..cell.get()
            });
        });
    }

    /// Decide whether an edge observed at `now` is genuine.
    ///
    /// Accepts iff `now - last_accepted > threshold`, compared at
    /// microsecond resolution. A timestamp earlier than the last accepted
    /// one is rejected so the state never moves backwards.
    pub fn accept(&self, now: Timestamp) -> bool {
        let window_us = u64::from(self.threshold_ms) * 1_000;

        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();

            if let Some(last) = state.last_accepted {
                match now.micros_since(last) {
                    Some(dt) if dt > window_us => {}
                    _ => return false,
                }
            }

            state.last_accepted = Some(now);
            state.accepted = state.accepted.wrapping_add(1);
            cell.set(state);
            true
        })
    }

    /// Last accepted (or seeded) timestamp, `None` before either happened.
    pub fn snapshot(&self) -> Option<Timestamp> {
        critical_section::with(|cs| self.state.borrow(cs).get().last_accepted)
    }

    /// Edges accepted since boot.
    pub fn accepted(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow(cs).get().accepted)
    }

    pub const fn threshold_ms(&self) -> u32 {
        self.threshold_ms
    }
}

impl Default for DebounceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

/// What happened to a raw edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Inside the debounce window; nothing emitted.
    Suppressed,
    /// Accepted and enqueued for the consumer.
    Queued,
    /// Accepted, but the queue was full and the event was lost.
    Dropped,
}

/// Interrupt entry point: debounce filter plus the channel's producer side.
#[derive(Clone, Copy)]
pub struct EdgeHandler<'a, const N: usize> {
    filter: &'a DebounceFilter,
    events: EdgeProducer<'a, N>,
}

impl<'a, const N: usize> EdgeHandler<'a, N> {
    pub const fn new(filter: &'a DebounceFilter, events: EdgeProducer<'a, N>) -> Self {
        Self { filter, events }
    }

    /// Handle one raw edge on `pin` observed at `now`.
    ///
    /// The ISR discards the outcome: acceptance and delivery are
    /// independent, and a full queue is never retried.
    pub fn on_edge(&self, pin: u32, now: Timestamp) -> EdgeOutcome {
        if !self.filter.accept(now) {
            return EdgeOutcome::Suppressed;
        }

        match self.events.try_publish(EdgeEvent::new(pin, now)) {
            Ok(()) => EdgeOutcome::Queued,
            Err(_) => EdgeOutcome::Dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::EdgeChannel;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn us(v: u64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    /// Reference model: accept t_i iff it is the first, or it is more than
    /// `threshold` after the last accepted one.
    fn leading_edge_model(times: &[u64], threshold_us: u64) -> Vec<u64> {
        let mut out: Vec<u64> = Vec::new();
        for &t in times {
            match out.last() {
                Some(&last) if t - last <= threshold_us => {}
                _ => out.push(t),
            }
        }
        out
    }

    fn run_filter(times: &[u64], threshold_ms: u32) -> Vec<u64> {
        let filter = DebounceFilter::new(threshold_ms);
        times
            .iter()
            .copied()
            .filter(|&t| filter.accept(us(t)))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Filter
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn first_edge_always_accepted() {
        let filter = DebounceFilter::new(100);
        assert_eq!(filter.snapshot(), None);
        assert!(filter.accept(ms(0)));
        assert_eq!(filter.snapshot(), Some(ms(0)));
    }

    #[test]
    fn burst_keeps_leading_edges() {
        // 0.00, 0.02, 0.05, 0.15, 0.30 s
        let accepted = run_filter(&[0, 20_000, 50_000, 150_000, 300_000], 100);
        assert_eq!(accepted, [0, 150_000, 300_000]);
    }

    #[test]
    fn edge_exactly_on_threshold_is_suppressed() {
        let filter = DebounceFilter::new(100);
        assert!(filter.accept(ms(1_000)));
        assert!(!filter.accept(ms(1_100)));
        assert!(filter.accept(us(1_100_001)));
    }

    #[test]
    fn window_is_compared_at_microsecond_resolution() {
        let filter = DebounceFilter::new(100);
        assert!(filter.accept(us(0)));
        assert!(!filter.accept(us(99_999)));
        assert!(filter.accept(us(100_500)));
        assert_eq!(filter.snapshot(), Some(us(100_500)));
    }

    #[test]
    fn window_is_measured_from_last_accepted_edge() {
        // Chatter every 60 ms never extends the window.
        let accepted = run_filter(&[0, 60_000, 120_000, 180_000, 240_000], 100);
        assert_eq!(accepted, [0, 120_000, 240_000]);
    }

    #[test]
    fn matches_reference_model_on_irregular_sequences() {
        let mut t = 0u64;
        let mut seed = 0x2545_f491u32;
        let mut times = Vec::new();
        for _ in 0..500 {
            // xorshift32 gaps in 1..=180_000 µs
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            t += 1 + u64::from(seed % 180_000);
            times.push(t);
        }

        for threshold in [1, 50, 100, 150] {
            assert_eq!(
                run_filter(&times, threshold),
                leading_edge_model(&times, u64::from(threshold) * 1_000),
                "threshold {threshold}"
            );
        }
    }

    #[test]
    fn threshold_is_configurable() {
        let filter = DebounceFilter::new(250);
        assert_eq!(filter.threshold_ms(), 250);
        assert!(filter.accept(ms(0)));
        assert!(!filter.accept(ms(200)));
        assert!(filter.accept(ms(251)));
    }

    #[test]
    fn seeded_filter_suppresses_presses_right_after_start() {
        let filter = DebounceFilter::default();
        filter.seed(ms(5));
        assert!(!filter.accept(ms(50)));
        assert!(filter.accept(ms(106)));
        assert_eq!(filter.accepted(), 1);
    }

    #[test]
    fn timestamp_before_last_accepted_is_rejected() {
        let filter = DebounceFilter::new(100);
        assert!(filter.accept(ms(5_000)));
        assert!(!filter.accept(ms(1_000)));
        assert_eq!(filter.snapshot(), Some(ms(5_000)));
    }

    #[test]
    fn presses_after_seven_weeks_uptime_are_all_accepted() {
        let filter = DebounceFilter::new(100);
        assert!(filter.accept(us(0)));

        // Past 2^32 ms of uptime, presses 10 s apart.
        let start = ((1u64 << 32) - 30_000) * 1_000;
        let accepted = (0..5)
            .filter(|i| filter.accept(us(start + i * 10_000_000)))
            .count();
        assert_eq!(accepted, 5);
        assert_eq!(filter.accepted(), 6);
    }

    // ═══════════════════════════════════════════════════════════════════
    // ISR entry point
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn handler_queues_only_accepted_edges() {
        let filter = DebounceFilter::new(100);
        let channel: EdgeChannel<10> = EdgeChannel::new();
        let handler = EdgeHandler::new(&filter, channel.producer());

        let outcomes: Vec<_> = [0, 20, 50, 150, 300]
            .iter()
            .map(|&t| handler.on_edge(4, ms(t)))
            .collect();

        assert_eq!(
            outcomes,
            [
                EdgeOutcome::Queued,
                EdgeOutcome::Suppressed,
                EdgeOutcome::Suppressed,
                EdgeOutcome::Queued,
                EdgeOutcome::Queued,
            ]
        );

        let mut consumer = channel.consumer().unwrap();
        assert_eq!(consumer.try_receive(), Some(EdgeEvent::new(4, ms(0))));
        assert_eq!(consumer.try_receive(), Some(EdgeEvent::new(4, ms(150))));
        assert_eq!(consumer.try_receive(), Some(EdgeEvent::new(4, ms(300))));
        assert_eq!(consumer.try_receive(), None);
    }

    #[test]
    fn full_queue_drops_but_still_accepts() {
        let filter = DebounceFilter::new(100);
        let channel: EdgeChannel<1> = EdgeChannel::new();
        let handler = EdgeHandler::new(&filter, channel.producer());

        assert_eq!(handler.on_edge(4, ms(0)), EdgeOutcome::Queued);
        assert_eq!(handler.on_edge(4, ms(200)), EdgeOutcome::Dropped);

        // The dropped edge still moved the window.
        assert_eq!(filter.snapshot(), Some(ms(200)));
        assert_eq!(handler.on_edge(4, ms(250)), EdgeOutcome::Suppressed);
        assert_eq!(filter.accepted(), 2);
        assert_eq!(channel.dropped(), 1);
    }
}
