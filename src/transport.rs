//! HTTPS transport interface consumed by the notifier.
//!
//! The TLS handshake and the HTTP client itself live outside the library;
//! the firmware plugs in an `esp_http_client` adapter, the tests plug in a
//! recording fake. One [`Transport::perform`] call is one connection: it is
//! opened with the pinned certificate, used for a single request and
//! released before the call returns, on success and on failure alike.

use core::fmt;

use crate::cert::RootCertificate;

/// Everything the transport needs for one POST.
#[derive(Clone, Copy, Debug)]
pub struct Request<'a> {
    pub url: &'a str,
    pub content_type: &'a str,
    pub body: &'a [u8],
    /// Trust anchor the server chain must validate against.
    pub root_cert: RootCertificate<'a>,
}

/// Transport-level result. The response body is not inspected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// `None` when the server did not announce a length (chunked).
    pub content_length: Option<u64>,
}

/// Diagnostic callbacks emitted while a request is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpEvent<'a> {
    Error,
    Connected,
    HeadersSent,
    Header { key: &'a str, value: &'a str },
    Data { len: usize },
    Finished,
    Disconnected,
}

/// Transport or TLS failure: a numeric code plus a static description
/// (e.g. `esp_err_to_name`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportError {
    code: i32,
    description: &'static str,
}

impl TransportError {
    pub const fn new(code: i32, description: &'static str) -> Self {
        Self { code, description }
    }

    pub const fn code(&self) -> i32 {
        self.code
    }

    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.description, self.code)
    }
}

impl core::error::Error for TransportError {}

/// HTTPS client performing one POST per call.
///
/// Implementations must release the connection before returning, whatever
/// the outcome, and report progress through `on_event`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn perform(
        &mut self,
        request: &Request<'_>,
        on_event: &mut dyn FnMut(HttpEvent<'_>),
    ) -> Result<Response, TransportError>;
}

impl<T: Transport> Transport for &mut T {
    async fn perform(
        &mut self,
        request: &Request<'_>,
        on_event: &mut dyn FnMut(HttpEvent<'_>),
    ) -> Result<Response, TransportError> {
        (**self).perform(request, on_event).await
    }
}

/// Default diagnostic sink: one debug line per event.
pub fn log_http_event(event: HttpEvent<'_>) {
    match event {
        HttpEvent::Error => log::debug!("HTTP_EVENT_ERROR"),
        HttpEvent::Connected => log::debug!("HTTP_EVENT_ON_CONNECTED"),
        HttpEvent::HeadersSent => log::debug!("HTTP_EVENT_HEADER_SENT"),
        HttpEvent::Header { key, value } => {
            log::debug!("HTTP_EVENT_ON_HEADER, key={}, value={}", key, value)
        }
        HttpEvent::Data { len } => log::debug!("HTTP_EVENT_ON_DATA, len={}", len),
        HttpEvent::Finished => log::debug!("HTTP_EVENT_ON_FINISH"),
        HttpEvent::Disconnected => log::debug!("HTTP_EVENT_DISCONNECTED"),
    }
}
