//! Interrupt-safe event channel between the GPIO ISR and the consumer task.
//!
//! A fixed-capacity FIFO built on `embassy_sync::channel::Channel` with a
//! `CriticalSectionRawMutex`, so the enqueue never allocates and is safe to
//! call from interrupt context. Access is split into two handle types:
//!
//! - [`EdgeProducer`] - `try_publish` only. Never waits; a full queue is
//!   reported as [`Error::ChannelFull`] and the event is lost.
//! - [`EdgeConsumer`] - `receive` only. Waits indefinitely for the next
//!   event. Exactly one consumer can be claimed per channel.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::error::Error;
use crate::event::EdgeEvent;

/// Bounded FIFO of [`EdgeEvent`]s with capacity `N`.
pub struct EdgeChannel<const N: usize> {
    queue: Channel<CriticalSectionRawMutex, EdgeEvent, N>,
    consumer_claimed: AtomicBool,
    /// Events rejected because the queue was full.
    dropped: AtomicU32,
}

impl<const N: usize> EdgeChannel<N> {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            consumer_claimed: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
        }
    }

    /// Handle for the interrupt side. Any number may exist.
    pub const fn producer(&self) -> EdgeProducer<'_, N> {
        EdgeProducer { channel: self }
    }

    /// Claim the task side. Succeeds once per channel.
    pub fn consumer(&self) -> Result<EdgeConsumer<'_, N>, Error> {
        if self.consumer_claimed.swap(true, Ordering::AcqRel) {
            return Err(Error::ConsumerClaimed);
        }
        Ok(EdgeConsumer { channel: self })
    }

    /// Number of events lost to a full queue since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Events currently buffered.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for EdgeChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking, allocation-free producer usable from interrupt context.
#[derive(Clone, Copy)]
pub struct EdgeProducer<'a, const N: usize> {
    channel: &'a EdgeChannel<N>,
}

impl<const N: usize> EdgeProducer<'_, N> {
    /// Enqueue `event` without waiting.
    ///
    /// On a full queue the event is discarded and the drop counter is
    /// bumped. There is no backpressure.
    pub fn try_publish(&self, event: EdgeEvent) -> Result<(), Error> {
        self.channel.queue.try_send(event).map_err(|_| {
            self.channel.dropped.fetch_add(1, Ordering::Relaxed);
            Error::ChannelFull
        })
    }
}

/// The single task-side consumer.
pub struct EdgeConsumer<'a, const N: usize> {
    channel: &'a EdgeChannel<N>,
}

impl<const N: usize> EdgeConsumer<'_, N> {
    /// Wait for the next event, in the order they were published.
    pub async fn receive(&mut self) -> EdgeEvent {
        self.channel.queue.receive().await
    }

    /// Take the next event if one is buffered.
    pub fn try_receive(&mut self) -> Option<EdgeEvent> {
        self.channel.queue.try_receive().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use embassy_futures::block_on;

    fn edge(ms: u64) -> EdgeEvent {
        EdgeEvent::new(4, Timestamp::from_millis(ms))
    }

    #[test]
    fn eleventh_publish_fails_without_blocking() {
        let channel: EdgeChannel<10> = EdgeChannel::new();
        let producer = channel.producer();

        for i in 0..10 {
            assert_eq!(producer.try_publish(edge(i * 200)), Ok(()));
        }
        assert_eq!(producer.try_publish(edge(2_000)), Err(Error::ChannelFull));
        assert_eq!(channel.dropped(), 1);
        assert_eq!(channel.len(), 10);

        let mut consumer = channel.consumer().unwrap();
        let mut delivered = 0;
        while let Some(event) = consumer.try_receive() {
            assert_eq!(event, edge(delivered * 200));
            delivered += 1;
        }
        assert_eq!(delivered, 10);
    }

    #[test]
    fn delivers_in_publish_order() {
        let channel: EdgeChannel<4> = EdgeChannel::new();
        let producer = channel.producer();
        let mut consumer = channel.consumer().unwrap();

        producer.try_publish(edge(100)).unwrap();
        producer.try_publish(edge(300)).unwrap();
        producer.try_publish(edge(500)).unwrap();

        assert_eq!(block_on(consumer.receive()), edge(100));
        assert_eq!(block_on(consumer.receive()), edge(300));
        assert_eq!(block_on(consumer.receive()), edge(500));
        assert!(channel.is_empty());
    }

    #[test]
    fn space_frees_up_after_receive() {
        let channel: EdgeChannel<1> = EdgeChannel::new();
        let producer = channel.producer();
        let mut consumer = channel.consumer().unwrap();

        producer.try_publish(edge(0)).unwrap();
        assert!(producer.try_publish(edge(1)).is_err());

        assert_eq!(consumer.try_receive(), Some(edge(0)));
        assert!(producer.try_publish(edge(2)).is_ok());
    }

    #[test]
    fn consumer_can_be_claimed_once() {
        let channel: EdgeChannel<2> = EdgeChannel::new();
        let _first = channel.consumer().unwrap();
        assert!(matches!(channel.consumer(), Err(Error::ConsumerClaimed)));
    }

    #[test]
    fn capacity_matches_const_parameter() {
        let channel: EdgeChannel<10> = EdgeChannel::default();
        assert_eq!(channel.capacity(), 10);
        assert!(channel.is_empty());
        assert_eq!(channel.dropped(), 0);
    }
}
