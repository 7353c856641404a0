//! Event consumer task.
//!
//! Waits once for the network, then drains the event channel one press at
//! a time. Each press is posted before the next one is received, so a slow
//! POST holds later presses in the queue (up to its capacity) instead of
//! running notifications concurrently.

use log::{info, warn};

use crate::channel::EdgeConsumer;
use crate::error::Error;
use crate::notifier::Notifier;
use crate::transport::{Response, Transport};

/// Network collaborator: blocks until the station has an IP address.
pub trait NetworkLink {
    fn wait_connected(&mut self);
}

pub struct EventConsumer<'a, T, const N: usize> {
    events: EdgeConsumer<'a, N>,
    notifier: Notifier<'a, T>,
    handled: u32,
}

impl<'a, T: Transport, const N: usize> EventConsumer<'a, T, N> {
    pub fn new(events: EdgeConsumer<'a, N>, notifier: Notifier<'a, T>) -> Self {
        Self {
            events,
            notifier,
            handled: 0,
        }
    }

    /// Receive the next press and post it. Waits indefinitely for a press.
    pub async fn process_next(&mut self) -> Result<Response, Error> {
        let event = self.events.receive().await;
        self.handled = self.handled.wrapping_add(1);
        self.notifier.notify(&event).await
    }

    /// The task body. Never returns.
    pub async fn run(mut self, link: &mut impl NetworkLink) -> ! {
        link.wait_connected();
        info!("Connected to AP, waiting for button presses");

        loop {
            if self.process_next().await.is_err() {
                let stats = self.notifier.stats();
                warn!(
                    "Notification dropped ({} sent, {} failed so far)",
                    stats.sent, stats.failed
                );
            }
        }
    }

    /// Presses taken off the queue so far.
    pub fn handled(&self) -> u32 {
        self.handled
    }

    pub fn notifier(&self) -> &Notifier<'a, T> {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::RootCertificate;
    use crate::channel::EdgeChannel;
    use crate::clock::Timestamp;
    use crate::event::EdgeEvent;
    use crate::notifier::SlackConfig;
    use crate::transport::{HttpEvent, Request, TransportError};
    use core::cell::RefCell;
    use embassy_futures::select::{select, Either};
    use embassy_futures::{block_on, yield_now};

    const PEM: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

    const SLACK: SlackConfig<'static> = SlackConfig {
        endpoint: "https://slack.com/api/chat.postMessage",
        token: "xoxb-1",
        channel: "general",
        text: "ding",
    };

    /// Fails every call whose index is listed in `fail_on`.
    #[derive(Default)]
    struct FlakyTransport {
        calls: usize,
        fail_on: &'static [usize],
    }

    impl Transport for FlakyTransport {
        async fn perform(
            &mut self,
            _request: &Request<'_>,
            _on_event: &mut dyn FnMut(HttpEvent<'_>),
        ) -> Result<Response, TransportError> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on.contains(&call) {
                return Err(TransportError::new(0x8001, "ESP_ERR_ESP_TLS_CANNOT_RESOLVE_HOSTNAME"));
            }
            Ok(Response {
                status: 200,
                content_length: Some(0),
            })
        }
    }

    /// Shared trace of link and transport calls, in order.
    type Trace = RefCell<Vec<&'static str>>;

    struct TracingLink<'t> {
        trace: &'t Trace,
    }

    impl NetworkLink for TracingLink<'_> {
        fn wait_connected(&mut self) {
            self.trace.borrow_mut().push("wait_connected");
        }
    }

    struct TracingTransport<'t> {
        trace: &'t Trace,
        inner: FlakyTransport,
    }

    impl Transport for TracingTransport<'_> {
        async fn perform(
            &mut self,
            request: &Request<'_>,
            on_event: &mut dyn FnMut(HttpEvent<'_>),
        ) -> Result<Response, TransportError> {
            self.trace.borrow_mut().push("post");
            self.inner.perform(request, on_event).await
        }
    }

    fn edge(ms: u64) -> EdgeEvent {
        EdgeEvent::new(0, Timestamp::from_millis(ms))
    }

    #[test]
    fn failed_post_does_not_stop_the_queue() {
        let channel: EdgeChannel<10> = EdgeChannel::new();
        let producer = channel.producer();
        for t in [0, 500, 1_000] {
            producer.try_publish(edge(t)).unwrap();
        }

        let transport = FlakyTransport {
            fail_on: &[1],
            ..Default::default()
        };
        let notifier = Notifier::new(SLACK, RootCertificate::from_pem(PEM).unwrap(), transport);
        let mut consumer = EventConsumer::new(channel.consumer().unwrap(), notifier);

        assert!(block_on(consumer.process_next()).is_ok());
        assert!(matches!(
            block_on(consumer.process_next()),
            Err(Error::Transport(_))
        ));
        assert!(block_on(consumer.process_next()).is_ok());

        assert_eq!(consumer.handled(), 3);
        assert_eq!(consumer.notifier().stats().sent, 2);
        assert_eq!(consumer.notifier().stats().failed, 1);
        assert!(channel.is_empty());
    }

    #[test]
    fn presses_buffered_during_a_post_are_handled_in_order() {
        let channel: EdgeChannel<10> = EdgeChannel::new();
        let producer = channel.producer();
        let notifier = Notifier::new(
            SLACK,
            RootCertificate::from_pem(PEM).unwrap(),
            FlakyTransport::default(),
        );
        let mut consumer = EventConsumer::new(channel.consumer().unwrap(), notifier);

        producer.try_publish(edge(0)).unwrap();
        block_on(consumer.process_next()).unwrap();

        // Two more presses arrive while nothing is draining.
        producer.try_publish(edge(400)).unwrap();
        producer.try_publish(edge(800)).unwrap();
        assert_eq!(channel.len(), 2);

        block_on(consumer.process_next()).unwrap();
        block_on(consumer.process_next()).unwrap();
        assert_eq!(consumer.handled(), 3);
        assert!(channel.is_empty());
    }

    #[test]
    fn run_connects_once_then_keeps_posting_after_a_failure() {
        let trace = Trace::default();
        let channel: EdgeChannel<10> = EdgeChannel::new();
        let producer = channel.producer();

        let transport = TracingTransport {
            trace: &trace,
            inner: FlakyTransport {
                fail_on: &[1],
                ..Default::default()
            },
        };
        let notifier = Notifier::new(SLACK, RootCertificate::from_pem(PEM).unwrap(), transport);
        let consumer = EventConsumer::new(channel.consumer().unwrap(), notifier);
        let mut link = TracingLink { trace: &trace };

        let presses = async {
            for t in [0, 500, 1_000] {
                producer.try_publish(edge(t)).unwrap();
                yield_now().await;
            }
            while trace.borrow().iter().filter(|&&c| c == "post").count() < 3 {
                yield_now().await;
            }
        };

        let finished = block_on(select(consumer.run(&mut link), presses));
        assert!(matches!(finished, Either::Second(())));

        assert_eq!(*trace.borrow(), ["wait_connected", "post", "post", "post"]);
        assert!(channel.is_empty());
    }
}
