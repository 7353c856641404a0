//! Pinned root certificate for the Slack API host.
//!
//! The PEM bytes are embedded in the firmware image at build time and
//! handed to the [`Notifier`](crate::notifier::Notifier) once, at
//! construction. Every HTTPS call validates the server chain against this
//! anchor only, never against a system trust store.

use crate::error::Error;

const BEGIN: &[u8] = b"-----BEGIN CERTIFICATE-----";
const END: &[u8] = b"-----END CERTIFICATE-----";

/// Immutable, process-lifetime trust anchor (PEM).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootCertificate<'a> {
    pem: &'a [u8],
}

impl<'a> RootCertificate<'a> {
    /// Wrap PEM bytes after a structural check of the armour.
    ///
    /// A trailing NUL (as produced by C-style embedding) is tolerated and
    /// stripped.
    pub fn from_pem(pem: &'a [u8]) -> Result<Self, Error> {
        let pem = pem.strip_suffix(&[0]).unwrap_or(pem);
        let trimmed = trim_ascii(pem);

        if !trimmed.starts_with(BEGIN) || !trimmed.ends_with(END) {
            return Err(Error::InvalidCertificate);
        }
        if trimmed.len() <= BEGIN.len() + END.len() {
            return Err(Error::InvalidCertificate);
        }
        Ok(Self { pem })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.pem
    }

    pub fn len(&self) -> usize {
        self.pem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pem.is_empty()
    }
}

fn trim_ascii(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}
