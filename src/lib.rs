//! Host-testable core of btn2slack.
//!
//! Everything between the GPIO interrupt and the HTTPS client lives here
//! as plain `no_std` logic with no ESP-IDF dependency:
//!
//! ```text
//! GPIO edge ─► EdgeHandler (ISR) ─► EdgeChannel ─► EventConsumer ─► Notifier ─► Transport
//!               DebounceFilter                                       urlencode
//! ```
//!
//! Usage: `cargo test`
//!
//! Note: The firmware binary (`src/main.rs`, feature `embedded`) wires
//! these types to the ESP-IDF timer, GPIO interrupt, Wi-Fi and
//! `esp_http_client` through the adapters in `src/board/`.

#![cfg_attr(not(test), no_std)]

pub mod cert;
pub mod channel;
pub mod clock;
pub mod config;
pub mod consumer;
pub mod debounce;
pub mod error;
pub mod event;
pub mod notifier;
pub mod transport;
pub mod urlencode;

pub use channel::{EdgeChannel, EdgeConsumer, EdgeProducer};
pub use clock::{MonotonicClock, Timestamp};
pub use consumer::{EventConsumer, NetworkLink};
pub use debounce::{DebounceFilter, EdgeHandler, EdgeOutcome};
pub use error::Error;
pub use event::EdgeEvent;
pub use notifier::{Notifier, SlackConfig};
