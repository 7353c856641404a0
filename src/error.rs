//! Unified error type for btn2slack.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data, so
//! the type can cross from the notifier into the consumer loop without a
//! heap.

use core::fmt;

use crate::transport::TransportError;

/// Top-level error type used across the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Event channel
    /// The event queue was full; the edge was dropped.
    ChannelFull,

    /// The single consumer handle of the event channel is already taken.
    ConsumerClaimed,

    // Notifier
    /// The form-encoded body does not fit the fixed body buffer.
    PayloadTooLarge { required: usize, capacity: usize },

    /// The pinned root certificate is not PEM-armoured.
    InvalidCertificate,

    /// The HTTPS call failed at the transport/TLS level.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChannelFull => f.write_str("event queue full"),
            Error::ConsumerClaimed => f.write_str("event consumer already claimed"),
            Error::PayloadTooLarge { required, capacity } => {
                write!(f, "payload needs {required} bytes, buffer holds {capacity}")
            }
            Error::InvalidCertificate => f.write_str("root certificate is not PEM"),
            Error::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// Convenience conversions

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}
