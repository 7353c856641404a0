//! Application-wide constants and compile-time configuration.
//!
//! Timing parameters, buffer sizes and the Slack settings live here so
//! they can be tuned in one place. The Slack and Wi-Fi values come from
//! the build environment (see `build.rs`) and are fixed for the lifetime
//! of the firmware image.

use crate::notifier::SlackConfig;

// Generated by build.rs:
//   BUTTON_GPIO, DEBOUNCE_MS,
//   SLACK_API_ENDPOINT, SLACK_API_TOKEN, SLACK_CHANNEL_NAME, SLACK_MESSAGE,
//   WIFI_SSID, WIFI_PASSWORD
include!(concat!(env!("OUT_DIR"), "/build_config.rs"));

// Button

/// Debounce window used when `DEBOUNCE_MS` is not set at build time.
pub const DEFAULT_DEBOUNCE_MS: u32 = 100;

/// Depth of the ISR → consumer event queue.
pub const EVENT_QUEUE_DEPTH: usize = 10;

// Notification

/// Capacity of the form-encoded POST body (bytes).
///
/// Token (~60) + channel + message, worst case tripled by escaping.
pub const BODY_CAPACITY: usize = 512;

/// Value of the `as_user` form field.
pub const POST_AS_USER: &str = "true";

/// Slack settings baked into this build.
pub const fn slack() -> SlackConfig<'static> {
    SlackConfig {
        endpoint: SLACK_API_ENDPOINT,
        token: SLACK_API_TOKEN,
        channel: SLACK_CHANNEL_NAME,
        text: SLACK_MESSAGE,
    }
}
