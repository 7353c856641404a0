//! Slack notifier - turns one accepted button press into one HTTPS POST.
//!
//! The request is a `chat.postMessage` form post:
//!
//! ```text
//! token=<token>&channel=<channel>&text=<message>&as_user=true
//! ```
//!
//! Each value goes through the two-phase percent-encoder into a fixed
//! [`BODY_CAPACITY`] buffer, so composing the body never allocates. Only
//! the transport-level outcome is checked; the JSON reply from Slack is
//! not parsed. Failures are logged and counted, never retried.

use heapless::Vec;
use log::{error, info};

use crate::cert::RootCertificate;
use crate::config::{BODY_CAPACITY, POST_AS_USER};
use crate::error::Error;
use crate::event::EdgeEvent;
use crate::transport::{log_http_event, HttpEvent, Request, Response, Transport};
use crate::urlencode::{encoded_len, urlencode};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Static Slack settings (see `config::slack`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlackConfig<'a> {
    /// e.g. `https://slack.com/api/chat.postMessage`
    pub endpoint: &'a str,
    /// Bot or user OAuth token.
    pub token: &'a str,
    pub channel: &'a str,
    pub text: &'a str,
}

/// Fixed-capacity `application/x-www-form-urlencoded` body.
///
/// One byte of the capacity is reserved for the encoder's NUL terminator,
/// so at most `N - 1` body bytes are usable.
#[derive(Clone, Debug, Default)]
pub struct FormBody<const N: usize> {
    buf: Vec<u8, N>,
}

impl<const N: usize> FormBody<N> {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append `name=value`, escaping `value`.
    ///
    /// Sizes the value with a query pass first; nothing is appended when the
    /// field would not fit.
    pub fn push_field(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let start = self.buf.len();
        let separator = usize::from(start > 0);
        let encoded = encoded_len(value);
        let required = start + separator + name.len() + 1 + encoded;
        let too_large = Error::PayloadTooLarge {
            required,
            capacity: N,
        };

        if required >= N {
            return Err(too_large);
        }

        if separator == 1 {
            self.buf.push(b'&').map_err(|_| too_large)?;
        }
        self.buf
            .extend_from_slice(name.as_bytes())
            .map_err(|_| too_large)?;
        self.buf.push(b'=').map_err(|_| too_large)?;

        let at = self.buf.len();
        self.buf.resize(at + encoded + 1, 0).map_err(|_| too_large)?;
        let written = urlencode(value, &mut self.buf[at..]);
        debug_assert_eq!(written, encoded);
        self.buf.truncate(at + encoded);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Delivery counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotifierStats {
    /// POSTs the transport completed (any HTTP status).
    pub sent: u32,
    /// POSTs that never completed: oversized body or transport error.
    pub failed: u32,
}

/// Posts one Slack message per button press.
pub struct Notifier<'a, T> {
    config: SlackConfig<'a>,
    root_cert: RootCertificate<'a>,
    transport: T,
    stats: NotifierStats,
}

impl<'a, T: Transport> Notifier<'a, T> {
    pub fn new(config: SlackConfig<'a>, root_cert: RootCertificate<'a>, transport: T) -> Self {
        Self {
            config,
            root_cert,
            transport,
            stats: NotifierStats::default(),
        }
    }

    /// Build the form body for the configured message.
    pub fn compose(&self) -> Result<FormBody<BODY_CAPACITY>, Error> {
        let mut body = FormBody::new();
        body.push_field("token", self.config.token)?;
        body.push_field("channel", self.config.channel)?;
        body.push_field("text", self.config.text)?;
        body.push_field("as_user", POST_AS_USER)?;
        Ok(body)
    }

    /// Perform one best-effort POST for `event`.
    ///
    /// Returns the transport outcome; the caller is not expected to act on
    /// it beyond moving on to the next event.
    pub async fn notify(&mut self, event: &EdgeEvent) -> Result<Response, Error> {
        let body = match self.compose() {
            Ok(body) => body,
            Err(e) => {
                error!("{}: cannot build Slack request: {}", event, e);
                self.stats.failed = self.stats.failed.wrapping_add(1);
                return Err(e);
            }
        };

        let request = Request {
            url: self.config.endpoint,
            content_type: FORM_CONTENT_TYPE,
            body: body.as_bytes(),
            root_cert: self.root_cert,
        };

        info!("{}: posting to channel {}", event, self.config.channel);
        let mut on_event = |e: HttpEvent<'_>| log_http_event(e);

        match self.transport.perform(&request, &mut on_event).await {
            Ok(response) => {
                info!(
                    "HTTPS POST Status = {}, content_length = {}",
                    response.status,
                    response.content_length.unwrap_or(0)
                );
                self.stats.sent = self.stats.sent.wrapping_add(1);
                Ok(response)
            }
            Err(e) => {
                // No retry: the press is lost.
                error!(
                    "HTTPS POST request failed: {} (code {})",
                    e.description(),
                    e.code()
                );
                self.stats.failed = self.stats.failed.wrapping_add(1);
                Err(e.into())
            }
        }
    }

    pub fn stats(&self) -> NotifierStats {
        self.stats
    }

}
