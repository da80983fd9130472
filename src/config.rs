//! System configuration parameters
//!
//! All tunable parameters for the TankWatch monitor. The firmware runs
//! entirely from these in-memory values; there is no persistent store.

use serde::{Deserialize, Serialize};

use crate::level::snapshot::CHANNEL_COUNT;

/// Version code of the firmware currently running. Compared against the
/// `version_code` field of a fetched update manifest; strictly increasing
/// across releases.
pub const FIRMWARE_VERSION_CODE: u32 = 7;

/// Human-readable version string of the running firmware.
pub const FIRMWARE_VERSION_NAME: &str = env!("CARGO_PKG_VERSION");

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Sensor poll interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Status report interval (seconds)
    pub status_interval_secs: u32,

    // --- Clock ---
    /// Resync attempt interval while the wall clock is untrusted (seconds)
    pub clock_resync_untrusted_secs: u32,
    /// Resync attempt interval once the wall clock is trusted (seconds)
    pub clock_resync_trusted_secs: u32,

    // --- Update ---
    /// URL of the update manifest (plain text, key=value lines)
    pub manifest_url: String,
    /// Accept any server certificate on https transports. The update
    /// server is trusted by URL, not by certificate chain.
    pub allow_insecure_tls: bool,

    // --- Sensors ---
    /// Per-channel polarity inversion (true = sensor reads LOW when wet)
    pub channel_inverted: [bool; CHANNEL_COUNT],
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            poll_interval_ms: 1000,   // 1 Hz
            status_interval_secs: 60, // 1/min

            // Clock: retry quickly until first sync, then drift-correct hourly
            clock_resync_untrusted_secs: 30,
            clock_resync_trusted_secs: 3600,

            // Update
            manifest_url: String::from("http://updates.tankwatch.io/fw/manifest.txt"),
            allow_insecure_tls: true,

            // Sensors
            channel_inverted: [false; CHANNEL_COUNT],
        }
    }
}
