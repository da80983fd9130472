//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future status-page push adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | monitor running");
            }
            AppEvent::Status(s) => {
                info!(
                    "STATUS | fill={}% wet={:?} ({} ch) | clock={} | fw={} ({}) | update: {}{}",
                    s.fill_percent,
                    s.wet,
                    s.wet_count,
                    if s.clock_trusted { "synced" } else { "unsynced" },
                    s.firmware_version_name,
                    s.firmware_version_code,
                    s.update_status,
                    match s.wifi_rssi {
                        Some(rssi) => format!(" | rssi={}dBm", rssi),
                        None => String::new(),
                    },
                );
            }
            AppEvent::LevelChanged { channel, wet } => {
                info!(
                    "LEVEL | channel {} -> {}",
                    channel,
                    if *wet { "wet" } else { "dry" }
                );
            }
            AppEvent::FillChanged { from, to } => {
                info!("FILL | {}% -> {}%", from, to);
            }
            AppEvent::ClockTrusted { epoch } => {
                info!("CLOCK | wall clock trusted (epoch {})", epoch);
            }
            AppEvent::TransitionBackfilled { channel, epoch } => {
                info!("CLOCK | channel {} transition backfilled to epoch {}", channel, epoch);
            }
            AppEvent::UpdateCheckCompleted { available } => {
                info!(
                    "UPDATE | check complete, {}",
                    if *available { "update available" } else { "no update" }
                );
            }
            AppEvent::UpdateInstallFailed { code } => {
                warn!("UPDATE | install failed (code {})", code);
            }
        }
    }
}
