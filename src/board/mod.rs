//! ESP-IDF adapters for the collaborators the library talks to through
//! traits: timer, GPIO interrupt, Wi-Fi link and HTTPS client.
//!
//! Pin assignment (ESP32-DevKitC defaults, override with `BUTTON_GPIO`):
//!
//!   Button → GPIO0 (BOOT), input with internal pull-up, rising edge

pub mod button;
pub mod clock;
pub mod https;
pub mod wifi;
