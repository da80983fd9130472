//! TankWatch Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative driver loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   EspClockAdapter   WifiAdapter               │
//! │  (LevelSense+Delay)(ClockPort)       (ConnectivityPort)        │
//! │  HttpTransport     HttpOtaAdapter    LogEventSink              │
//! │  (TransportPort)   (OtaPort)         (EventSink)               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             MonitorService (pure logic)                │    │
//! │  │  Clock facade · Level engine · Update session          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each loop iteration runs strictly sequentially: drain inbound events,
//! WiFi housekeeping, clock resync + sensor poll + backfill (inside
//! `tick`), watchdog feed. Network calls block the loop by design — there
//! is nothing else competing for the processor.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use tankwatch::adapters::clock::EspClockAdapter;
use tankwatch::adapters::hardware::HardwareAdapter;
use tankwatch::adapters::http::HttpTransport;
use tankwatch::adapters::log_sink::LogEventSink;
use tankwatch::adapters::ota::{self, HttpOtaAdapter};
use tankwatch::adapters::wifi::WifiAdapter;
use tankwatch::app::commands::AppCommand;
use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::{ConnectivityPort, EventSink};
use tankwatch::app::service::MonitorService;
use tankwatch::config::SystemConfig;
use tankwatch::drivers::watchdog::Watchdog;
use tankwatch::events::{self, push_event, Event};
use tankwatch::{drivers, level};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TankWatch v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1b. OTA rollback check ────────────────────────────────
    ota::check_rollback();

    // ── 1c. Initialise hardware peripherals ───────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::new();

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();

    // ── 3. Construct adapters ─────────────────────────────────
    let mut clock = EspClockAdapter::new();
    let mut hw = HardwareAdapter::new();
    let mut sink = LogEventSink::new();
    let mut transport = HttpTransport::new(config.allow_insecure_tls);
    let mut ota = HttpOtaAdapter::new(config.allow_insecure_tls);

    // WiFi credentials are baked in at build time; captive-portal
    // provisioning lives outside this firmware.
    let mut wifi = WifiAdapter::new();
    match (
        option_env!("TANKWATCH_WIFI_SSID"),
        option_env!("TANKWATCH_WIFI_PASS"),
    ) {
        (Some(ssid), Some(pass)) => {
            if let Err(e) = wifi.set_credentials(ssid, pass) {
                warn!("WiFi: invalid build-time credentials — {}", e);
            } else if let Err(e) = wifi.connect() {
                warn!("WiFi: initial connect failed ({}), backoff engaged", e);
            }
        }
        _ => warn!("WiFi: no build-time credentials, running offline"),
    }

    // ── 4. Construct app service ──────────────────────────────
    let mut app = MonitorService::new(config.clone());
    app.start(&mut clock, &mut sink);

    info!("System ready. Entering driver loop.");

    // ── 5. Driver loop ────────────────────────────────────────
    let status_interval_ticks =
        (u64::from(config.status_interval_secs) * 1000 / u64::from(config.poll_interval_ms)).max(1);
    let mut status_counter: u64 = 0;

    loop {
        // Pace the loop; on ESP-IDF this sleep yields to FreeRTOS.
        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.poll_interval_ms,
        )));
        push_event(Event::ControlTick);

        status_counter += 1;
        if status_counter >= status_interval_ticks {
            push_event(Event::StatusTick);
            status_counter = 0;
        }

        // Process all pending events strictly sequentially.
        events::drain_events(|event| match event {
            Event::ControlTick => {
                app.tick(&mut hw, &mut clock, &mut sink);
            }

            Event::StatusTick => {
                let report = app.build_status(&clock, wifi.rssi());
                sink.emit(&AppEvent::Status(report));
                for channel in 0..level::snapshot::CHANNEL_COUNT {
                    info!(
                        "  channel {}: {} since {}",
                        channel,
                        if app.snapshot().wet[channel] { "wet" } else { "dry" },
                        app.transition_time_display(channel, &clock),
                    );
                }
            }

            Event::CheckUpdateRequested => {
                app.handle_command(
                    AppCommand::CheckUpdate,
                    &wifi,
                    &mut transport,
                    &mut ota,
                    &mut sink,
                );
            }

            Event::InstallUpdateRequested => {
                app.handle_command(
                    AppCommand::InstallUpdate,
                    &wifi,
                    &mut transport,
                    &mut ota,
                    &mut sink,
                );
            }
        });

        // WiFi reconnection poll (exponential backoff).
        wifi.poll();

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
