//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`] for the TankWatch monitor.
//!
//! - **`target_os = "espidf"`** — uptime from `esp_timer_get_time()`
//!   (monotonic), wall clock from `gettimeofday()`, sync attempts via
//!   the ESP-IDF SNTP service (started lazily, restarted thereafter).
//! - **`not(target_os = "espidf")`** — `std::time::Instant` uptime plus
//!   a process-global scriptable epoch for host-side testing.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::ClockPort;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_EPOCH: AtomicU32 = AtomicU32::new(0);

/// Script the wall-clock reading for host-side simulation.
/// A value at or above [`MIN_VALID_EPOCH`](crate::clock::MIN_VALID_EPOCH)
/// simulates a completed SNTP sync.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_epoch(epoch: u32) {
    SIM_EPOCH.store(epoch, Ordering::Relaxed);
}

/// Clock adapter for the ESP32-S3 platform.
pub struct EspClockAdapter {
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for EspClockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl EspClockAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            sntp: None,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl ClockPort for EspClockAdapter {
    /// Milliseconds since boot (monotonic, wraps every ~49.7 days).
    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since boot (monotonic, wraps every ~49.7 days).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    /// Current wall-clock reading as Unix seconds. Near 0 until synced.
    #[cfg(target_os = "espidf")]
    fn epoch_secs(&self) -> u32 {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec.max(0) as u32
    }

    /// Current wall-clock reading as Unix seconds. Near 0 until synced.
    #[cfg(not(target_os = "espidf"))]
    fn epoch_secs(&self) -> u32 {
        SIM_EPOCH.load(Ordering::Relaxed)
    }

    /// Best-effort, non-blocking SNTP kick. The first call starts the
    /// service; later calls restart the poll cycle. Failure only logs —
    /// the clock simply stays untrusted until an attempt lands.
    #[cfg(target_os = "espidf")]
    fn request_sync(&mut self) {
        if self.sntp.is_none() {
            match esp_idf_svc::sntp::EspSntp::new_default() {
                Ok(sntp) => {
                    info!("clock: SNTP service started");
                    self.sntp = Some(sntp);
                }
                Err(e) => warn!("clock: SNTP start failed: {e}"),
            }
            return;
        }
        // SAFETY: esp_sntp_restart only re-triggers the already-initialised
        // SNTP service; the EspSntp handle above keeps it alive.
        unsafe { esp_idf_svc::sys::esp_sntp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn request_sync(&mut self) {
        info!("clock(sim): sync requested");
    }
}
