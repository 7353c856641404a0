//! btn2slack firmware - ESP32 + ESP-IDF.
//!
//! Boot sequence:
//! 1. NVS, system event loop, peripherals (any failure aborts start-up).
//! 2. Wi-Fi station configured and started; the link comes up in the
//!    background.
//! 3. Timer started, debounce window seeded, GPIO interrupt installed.
//! 4. Consumer thread: waits for the link, then posts one Slack message
//!    per accepted press.

use anyhow::{Context, Result};
use btn2slack::cert::RootCertificate;
use btn2slack::config::{self, EVENT_QUEUE_DEPTH};
use btn2slack::{
    DebounceFilter, EdgeChannel, EdgeHandler, EventConsumer, MonotonicClock, Notifier,
};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::task::block_on;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::info;

mod board;

use board::clock::EspTimerClock;
use board::https::EspHttpsTransport;
use board::wifi::WifiLink;

/// Root CA of slack.com, staged into OUT_DIR by build.rs.
static ROOT_CERT_PEM: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/root_cert.pem"));

static EDGES: EdgeChannel<EVENT_QUEUE_DEPTH> = EdgeChannel::new();
static DEBOUNCE: DebounceFilter = DebounceFilter::new(config::DEBOUNCE_MS);
static BUTTON_ISR: EdgeHandler<'static, EVENT_QUEUE_DEPTH> =
    EdgeHandler::new(&DEBOUNCE, EDGES.producer());

/// The TLS handshake needs a deep stack.
const CONSUMER_STACK_SIZE: usize = 8192;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let nvs = EspDefaultNvsPartition::take().context("NVS flash init failed")?;
    let sysloop = EspSystemEventLoop::take()?;
    let peripherals = Peripherals::take()?;

    let root_cert =
        RootCertificate::from_pem(ROOT_CERT_PEM).context("embedded root certificate")?;
    let mut link = WifiLink::new(
        peripherals.modem,
        sysloop,
        nvs,
        config::WIFI_SSID,
        config::WIFI_PASSWORD,
    )?;

    let mut clock = EspTimerClock;
    clock.start();
    DEBOUNCE.seed(clock.now());
    info!("start time: {}", clock.now());

    board::button::install(config::BUTTON_GPIO, &BUTTON_ISR)
        .context("GPIO interrupt setup failed")?;
    info!(
        "GPIO[{}] armed, debounce {} ms",
        config::BUTTON_GPIO,
        DEBOUNCE.threshold_ms()
    );

    let notifier = Notifier::new(config::slack(), root_cert, EspHttpsTransport);
    let consumer = EventConsumer::new(EDGES.consumer()?, notifier);

    std::thread::Builder::new()
        .name("slack_notifier".into())
        .stack_size(CONSUMER_STACK_SIZE)
        .spawn(move || block_on(consumer.run(&mut link)))?;

    Ok(())
}
