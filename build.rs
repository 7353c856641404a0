//! Build script - turns the build-time environment into `build_config.rs`
//! and, for firmware builds, stages the pinned root certificate and the
//! ESP-IDF link arguments.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// String settings: (env var, const name, default).
const STRING_SETTINGS: &[(&str, &str, &str)] = &[
    (
        "SLACK_API_ENDPOINT",
        "SLACK_API_ENDPOINT",
        "https://slack.com/api/chat.postMessage",
    ),
    ("SLACK_API_TOKEN", "SLACK_API_TOKEN", ""),
    ("SLACK_CHANNEL_NAME", "SLACK_CHANNEL_NAME", "general"),
    ("SLACK_MESSAGE", "SLACK_MESSAGE", "Button pressed"),
    ("WIFI_SSID", "WIFI_SSID", ""),
    ("WIFI_PASSWORD", "WIFI_PASSWORD", ""),
];

/// Numeric settings: (env var, const name, default).
const U32_SETTINGS: &[(&str, &str, u32)] = &[
    ("BUTTON_GPIO", "BUTTON_GPIO", 0),
    ("DEBOUNCE_MS", "DEBOUNCE_MS", 100),
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut generated = String::new();
    for (var, name, default) in STRING_SETTINGS {
        println!("cargo:rerun-if-env-changed={var}");
        let value = env::var(var).unwrap_or_else(|_| (*default).to_string());
        writeln!(generated, "pub const {name}: &str = {value:?};").unwrap();
    }
    for (var, name, default) in U32_SETTINGS {
        println!("cargo:rerun-if-env-changed={var}");
        let value = match env::var(var) {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .unwrap_or_else(|_| panic!("{var} must be an unsigned integer, got {raw:?}")),
            Err(_) => *default,
        };
        writeln!(generated, "pub const {name}: u32 = {value};").unwrap();
    }
    fs::write(out_dir.join("build_config.rs"), generated).unwrap();

    #[cfg(feature = "embedded")]
    stage_firmware(&out_dir);

    println!("cargo:rerun-if-changed=build.rs");
}

/// Copy the root certificate next to the generated config so `main.rs`
/// can embed it, then hand the ESP-IDF environment to the linker.
#[cfg(feature = "embedded")]
fn stage_firmware(out_dir: &std::path::Path) {
    println!("cargo:rerun-if-env-changed=SLACK_ROOT_CERT");
    let cert = env::var("SLACK_ROOT_CERT")
        .unwrap_or_else(|_| "certs/slack_com_root_cert.pem".to_string());

    // `openssl s_client -showcerts -connect slack.com:443`, last cert in the chain.
    fs::copy(&cert, out_dir.join("root_cert.pem"))
        .unwrap_or_else(|e| panic!("cannot read root certificate {cert}: {e}"));
    println!("cargo:rerun-if-changed={cert}");

    embuild::espidf::sysenv::output();
}
