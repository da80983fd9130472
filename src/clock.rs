//! Wall-clock trust and resynchronization pacing.
//!
//! The device boots with no idea what time it is: the system wall clock
//! reads some value near the epoch until SNTP completes. Rather than carry
//! a "synced" flag that can go stale, trust is derived on every query —
//! any reading before [`MIN_VALID_EPOCH`] cannot be a synchronized clock.
//!
//! [`ClockFacade`] also paces sync attempts: aggressively while untrusted
//! (so time appears soon after connectivity does), lazily once trusted
//! (drift correction only). The attempts themselves are fire-and-forget
//! through [`ClockPort::request_sync`]; a failed attempt just leaves the
//! next trust check false.

use log::debug;

use crate::app::ports::ClockPort;
use crate::config::SystemConfig;

/// 2020-01-01T00:00:00Z. Any wall-clock reading before this predates the
/// product and therefore means "never synchronized".
pub const MIN_VALID_EPOCH: u32 = 1_577_836_800;

/// Resync pacing state. Trust itself is stateless — see [`Self::is_trusted`].
pub struct ClockFacade {
    /// Uptime of the most recent sync attempt (valid once `started`).
    last_sync_attempt_ms: u32,
    /// False until the initial attempt has been made.
    started: bool,
    resync_untrusted_ms: u32,
    resync_trusted_ms: u32,
}

impl ClockFacade {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            last_sync_attempt_ms: 0,
            started: false,
            resync_untrusted_ms: config.clock_resync_untrusted_secs.saturating_mul(1000),
            resync_trusted_ms: config.clock_resync_trusted_secs.saturating_mul(1000),
        }
    }

    /// True iff the current wall-clock reading is plausible calendar time.
    pub fn is_trusted(&self, clock: &impl ClockPort) -> bool {
        clock.epoch_secs() >= MIN_VALID_EPOCH
    }

    /// Periodic resync check. Requests a sync on the very first call and
    /// thereafter whenever the applicable interval has elapsed.
    ///
    /// Returns `true` if a sync attempt was requested this call.
    /// Interval arithmetic uses `wrapping_sub` so pacing stays correct
    /// across a rollover of the millisecond uptime counter.
    pub fn maintain(&mut self, clock: &mut impl ClockPort) -> bool {
        let now_ms = clock.uptime_ms();
        let interval = if self.is_trusted(clock) {
            self.resync_trusted_ms
        } else {
            self.resync_untrusted_ms
        };

        if self.started && now_ms.wrapping_sub(self.last_sync_attempt_ms) < interval {
            return false;
        }

        debug!("clock: requesting time sync (trusted={})", self.is_trusted(clock));
        clock.request_sync();
        self.last_sync_attempt_ms = now_ms;
        self.started = true;
        true
    }

    /// Uptime of the last sync attempt, if any attempt has been made.
    pub fn last_sync_attempt_ms(&self) -> Option<u32> {
        self.started.then_some(self.last_sync_attempt_ms)
    }
}
