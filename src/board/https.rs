//! [`Transport`] over `esp_http_client` with a pinned root certificate.
//!
//! Each call builds a fresh client from the request (URL, event handler,
//! `cert_pem`), performs one request and cleans the client up when the
//! [`Client`] guard drops, on every exit path.

use core::ffi::{c_char, c_void, CStr};
use std::ffi::CString;

use btn2slack::transport::{HttpEvent, Request, Response, Transport, TransportError};
use esp_idf_svc::sys;

type EventSink<'a> = &'a mut dyn FnMut(HttpEvent<'_>);

#[derive(Clone, Copy, Debug, Default)]
pub struct EspHttpsTransport;

impl Transport for EspHttpsTransport {
    async fn perform(
        &mut self,
        request: &Request<'_>,
        on_event: &mut dyn FnMut(HttpEvent<'_>),
    ) -> Result<Response, TransportError> {
        let url = c_string(request.url.as_bytes())?;
        let cert_pem = c_string(request.root_cert.as_bytes())?;
        let content_type = c_string(request.content_type.as_bytes())?;

        // Outlives `client`: the event handler dereferences it until cleanup.
        let mut sink: EventSink<'_> = on_event;

        let config = sys::esp_http_client_config_t {
            url: url.as_ptr(),
            cert_pem: cert_pem.as_ptr(),
            event_handler: Some(dispatch_event),
            user_data: &mut sink as *mut EventSink<'_> as *mut c_void,
            ..Default::default()
        };

        let client = Client::init(&config)?;
        client.set_method(sys::esp_http_client_method_t_HTTP_METHOD_POST)?;
        client.set_header(c"Content-Type", &content_type)?;
        client.set_post_field(request.body)?;
        client.perform()?;

        Ok(Response {
            status: client.status_code(),
            content_length: client.content_length(),
        })
    }
}

/// Owned `esp_http_client_handle_t`.
struct Client(sys::esp_http_client_handle_t);

impl Client {
    fn init(config: &sys::esp_http_client_config_t) -> Result<Self, TransportError> {
        let handle = unsafe { sys::esp_http_client_init(config) };
        if handle.is_null() {
            return Err(TransportError::new(
                sys::ESP_FAIL as sys::esp_err_t,
                "esp_http_client_init failed",
            ));
        }
        Ok(Self(handle))
    }

    fn set_method(&self, method: sys::esp_http_client_method_t) -> Result<(), TransportError> {
        check(unsafe { sys::esp_http_client_set_method(self.0, method) })
    }

    fn set_header(&self, key: &CStr, value: &CStr) -> Result<(), TransportError> {
        check(unsafe { sys::esp_http_client_set_header(self.0, key.as_ptr(), value.as_ptr()) })
    }

    /// The body is not copied; it must outlive `perform`.
    fn set_post_field(&self, body: &[u8]) -> Result<(), TransportError> {
        check(unsafe {
            sys::esp_http_client_set_post_field(
                self.0,
                body.as_ptr() as *const c_char,
                body.len() as _,
            )
        })
    }

    fn perform(&self) -> Result<(), TransportError> {
        check(unsafe { sys::esp_http_client_perform(self.0) })
    }

    fn status_code(&self) -> u16 {
        unsafe { sys::esp_http_client_get_status_code(self.0) as u16 }
    }

    fn content_length(&self) -> Option<u64> {
        let len = unsafe { sys::esp_http_client_get_content_length(self.0) } as i64;
        (len >= 0).then_some(len as u64)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        unsafe {
            sys::esp_http_client_cleanup(self.0);
        }
    }
}

fn check(code: sys::esp_err_t) -> Result<(), TransportError> {
    if code == sys::ESP_OK as sys::esp_err_t {
        Ok(())
    } else {
        Err(TransportError::new(code, err_name(code)))
    }
}

fn err_name(code: sys::esp_err_t) -> &'static str {
    // SAFETY: esp_err_to_name returns a pointer into a static table.
    unsafe { CStr::from_ptr(sys::esp_err_to_name(code)) }
        .to_str()
        .unwrap_or("ESP_FAIL")
}

fn c_string(bytes: &[u8]) -> Result<CString, TransportError> {
    CString::new(bytes).map_err(|_| {
        TransportError::new(sys::ESP_ERR_INVALID_ARG as sys::esp_err_t, "interior NUL in request")
    })
}

unsafe fn c_str_or_empty<'a>(p: *const c_char) -> &'a str {
    if p.is_null() {
        return "";
    }
    unsafe { CStr::from_ptr(p) }.to_str().unwrap_or("")
}

unsafe extern "C" fn dispatch_event(evt: *mut sys::esp_http_client_event_t) -> sys::esp_err_t {
    // SAFETY: esp_http_client passes a valid event whose `user_data` is the
    // `EventSink` set up in `perform`, alive until the client is cleaned up.
    let evt = unsafe { &*evt };
    let sink = unsafe { &mut *(evt.user_data as *mut EventSink<'_>) };

    let event = match evt.event_id {
        sys::esp_http_client_event_id_t_HTTP_EVENT_ERROR => HttpEvent::Error,
        sys::esp_http_client_event_id_t_HTTP_EVENT_ON_CONNECTED => HttpEvent::Connected,
        sys::esp_http_client_event_id_t_HTTP_EVENT_HEADER_SENT => HttpEvent::HeadersSent,
        sys::esp_http_client_event_id_t_HTTP_EVENT_ON_HEADER => HttpEvent::Header {
            key: unsafe { c_str_or_empty(evt.header_key) },
            value: unsafe { c_str_or_empty(evt.header_value) },
        },
        sys::esp_http_client_event_id_t_HTTP_EVENT_ON_DATA => HttpEvent::Data {
            len: evt.data_len.max(0) as usize,
        },
        sys::esp_http_client_event_id_t_HTTP_EVENT_ON_FINISH => HttpEvent::Finished,
        sys::esp_http_client_event_id_t_HTTP_EVENT_DISCONNECTED => HttpEvent::Disconnected,
        _ => return sys::ESP_OK as sys::esp_err_t,
    };

    sink(event);
    sys::ESP_OK as sys::esp_err_t
}
