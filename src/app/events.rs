//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, push to
//! the status page, etc.

use serde::Serialize;

use crate::level::snapshot::CHANNEL_COUNT;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The monitor has started (initial sync attempt made).
    Started,

    /// Periodic status snapshot.
    Status(StatusReport),

    /// A channel's debounced state flipped.
    LevelChanged { channel: usize, wet: bool },

    /// The aggregate fill percentage moved.
    FillChanged { from: u8, to: u8 },

    /// The wall clock transitioned from untrusted to trusted.
    ClockTrusted { epoch: u32 },

    /// A pre-sync transition record received its epoch stamp.
    TransitionBackfilled { channel: usize, epoch: u32 },

    /// An update check finished (successfully or not).
    UpdateCheckCompleted { available: bool },

    /// An install attempt failed with a device-specific code.
    UpdateInstallFailed { code: i32 },
}

/// A point-in-time status snapshot suitable for logging or the status page.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub wet: [bool; CHANNEL_COUNT],
    pub wet_count: u8,
    pub fill_percent: u8,
    pub uptime_ms: u32,
    pub clock_trusted: bool,
    pub firmware_version_code: u32,
    pub firmware_version_name: &'static str,
    pub update_available: bool,
    pub update_status: String,
    pub wifi_rssi: Option<i8>,
}
