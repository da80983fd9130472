//! Application service — the hexagonal core.
//!
//! [`MonitorService`] owns the clock facade, the level engine, and the
//! update session.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  LevelSensePort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  ClockPort      ──▶ │       MonitorService       │
//!  TransportPort  ──▶ │  Clock · Levels · Update   │ ──▶ OtaPort
//!                     └────────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::info;

use crate::clock::ClockFacade;
use crate::config::{SystemConfig, FIRMWARE_VERSION_CODE, FIRMWARE_VERSION_NAME};
use crate::level::backfill;
use crate::level::snapshot::{LevelEngine, LevelSnapshot, TransitionRecord};
use crate::update::session::{UpdatePhase, UpdateSession};

use super::commands::AppCommand;
use super::events::{AppEvent, StatusReport};
use super::ports::{
    ClockPort, ConnectivityPort, EventSink, LevelSensePort, OtaOutcome, OtaPort, TransportPort,
};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    config: SystemConfig,
    clock: ClockFacade,
    levels: LevelEngine,
    update: UpdateSession,
    /// Previous trust state, for edge detection on sync.
    clock_was_trusted: bool,
    tick_count: u64,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** make the initial sync attempt — call [`start`] next.
    ///
    /// [`start`]: MonitorService::start
    pub fn new(config: SystemConfig) -> Self {
        let clock = ClockFacade::new(&config);
        let levels = LevelEngine::new(config.channel_inverted);
        let update = UpdateSession::new(FIRMWARE_VERSION_CODE);

        Self {
            config,
            clock,
            levels,
            update,
            clock_was_trusted: false,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Make the initial time-sync attempt and announce startup.
    pub fn start(&mut self, clock: &mut impl ClockPort, sink: &mut impl EventSink) {
        self.clock.maintain(clock);
        self.clock_was_trusted = self.clock.is_trusted(clock);
        sink.emit(&AppEvent::Started);
        info!(
            "MonitorService started (fw {} code {})",
            FIRMWARE_VERSION_NAME, FIRMWARE_VERSION_CODE
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one driver-loop iteration: clock resync pacing → sensor poll →
    /// timestamp backfill.  Strictly sequential, never fails.
    ///
    /// The `hw` parameter satisfies **both** [`LevelSensePort`] and
    /// [`DelayNs`] — this keeps the debouncer's sampling and its settle
    /// delay on the same adapter without a double mutable borrow.
    pub fn tick(
        &mut self,
        hw: &mut (impl LevelSensePort + DelayNs),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Clock maintenance (short interval untrusted, long trusted).
        self.clock.maintain(clock);
        let trusted = self.clock.is_trusted(clock);
        if trusted && !self.clock_was_trusted {
            info!("clock: wall clock is now trusted (epoch {})", clock.epoch_secs());
            sink.emit(&AppEvent::ClockTrusted {
                epoch: clock.epoch_secs(),
            });
        }
        self.clock_was_trusted = trusted;

        // 2. Sensor poll — debounce, stamp transitions, rebuild snapshot.
        self.levels.poll(hw, clock, trusted, sink);

        // 3. Backfill pre-sync transition stamps (no-op until trusted).
        backfill::backfill(self.levels.transitions_mut(), clock, trusted, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the status page, serial, etc.).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        net: &impl ConnectivityPort,
        transport: &mut impl TransportPort,
        ota: &mut impl OtaPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::CheckUpdate => {
                let available = self
                    .update
                    .check(&self.config.manifest_url, net, transport);
                sink.emit(&AppEvent::UpdateCheckCompleted { available });
            }
            AppCommand::InstallUpdate => {
                if let Some(OtaOutcome::Failed { code, .. }) = self.update.install(net, ota) {
                    sink.emit(&AppEvent::UpdateInstallFailed { code });
                }
            }
        }
    }

    // ── Queries (read-only presentation surface) ──────────────

    /// Current level snapshot.
    pub fn snapshot(&self) -> &LevelSnapshot {
        self.levels.snapshot()
    }

    /// Transition record for one channel (0 = top .. 3 = bottom).
    pub fn transition(&self, channel: usize) -> &TransitionRecord {
        self.levels.transition(channel)
    }

    /// Formatted last-transition time for one channel.
    ///
    /// Calendar time when the stamp has been backfilled and the clock is
    /// currently trusted; otherwise the uptime-relative form `t+<secs>s`;
    /// `never` before the channel's first sample.
    pub fn transition_time_display(&self, channel: usize, clock: &impl ClockPort) -> String {
        let record = self.levels.transition(channel);
        if !record.initialized || record.changed_at_uptime_ms == 0 {
            return String::from("never");
        }
        if record.has_trusted_epoch() && self.clock.is_trusted(clock) {
            if let Some(dt) = chrono::DateTime::from_timestamp(record.changed_at_epoch as i64, 0) {
                return dt.format("%Y-%m-%d %H:%M:%S UTC").to_string();
            }
        }
        format!("t+{}s", record.changed_at_uptime_ms / 1000)
    }

    /// Whether the wall clock is currently trustworthy.
    pub fn clock_trusted(&self, clock: &impl ClockPort) -> bool {
        self.clock.is_trusted(clock)
    }

    /// Whether an update is pending installation.
    pub fn update_available(&self) -> bool {
        self.update.update_available()
    }

    /// Current update phase.
    pub fn update_phase(&self) -> UpdatePhase {
        self.update.phase()
    }

    /// Human-readable outcome of the last update action.
    pub fn update_status(&self) -> &str {
        self.update.status()
    }

    /// Running firmware identity: (version code, version name).
    pub fn firmware_version(&self) -> (u32, &'static str) {
        (FIRMWARE_VERSION_CODE, FIRMWARE_VERSION_NAME)
    }

    /// Total driver-loop ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Build a status snapshot for logging or the status page.
    /// `wifi_rssi`: signal strength in dBm when connected; `None` otherwise.
    pub fn build_status(&self, clock: &impl ClockPort, wifi_rssi: Option<i8>) -> StatusReport {
        let snapshot = self.levels.snapshot();
        StatusReport {
            wet: snapshot.wet,
            wet_count: snapshot.wet_count,
            fill_percent: snapshot.fill_percent,
            uptime_ms: clock.uptime_ms(),
            clock_trusted: self.clock.is_trusted(clock),
            firmware_version_code: FIRMWARE_VERSION_CODE,
            firmware_version_name: FIRMWARE_VERSION_NAME,
            update_available: self.update.update_available(),
            update_status: self.update.status().to_string(),
            wifi_rssi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MIN_VALID_EPOCH;

    struct FakeClock {
        uptime_ms: u32,
        epoch: u32,
    }

    impl ClockPort for FakeClock {
        fn uptime_ms(&self) -> u32 {
            self.uptime_ms
        }
        fn epoch_secs(&self) -> u32 {
            self.epoch
        }
        fn request_sync(&mut self) {}
    }

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    struct DrySense;
    impl LevelSensePort for DrySense {
        fn sample_raw(&mut self, _channel: usize) -> bool {
            false
        }
    }
    impl DelayNs for DrySense {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn status_report_reflects_firmware_identity() {
        let app = MonitorService::new(SystemConfig::default());
        let clock = FakeClock {
            uptime_ms: 1234,
            epoch: 0,
        };
        let report = app.build_status(&clock, Some(-51));
        assert_eq!(report.firmware_version_code, FIRMWARE_VERSION_CODE);
        assert_eq!(report.uptime_ms, 1234);
        assert!(!report.clock_trusted);
        assert_eq!(report.wifi_rssi, Some(-51));
    }

    #[test]
    fn transition_display_before_first_sample_is_never() {
        let mut app = MonitorService::new(SystemConfig::default());
        let mut clock = FakeClock {
            uptime_ms: 0,
            epoch: 0,
        };
        app.start(&mut clock, &mut NullSink);
        assert_eq!(app.transition_time_display(0, &clock), "never");
    }

    #[test]
    fn transition_display_uses_uptime_form_until_trusted() {
        let mut app = MonitorService::new(SystemConfig::default());
        let mut clock = FakeClock {
            uptime_ms: 5000,
            epoch: 0,
        };
        app.start(&mut clock, &mut NullSink);
        app.tick(&mut DrySense, &mut clock, &mut NullSink);

        assert_eq!(app.transition_time_display(0, &clock), "t+5s");
    }

    #[test]
    fn transition_display_formats_epoch_once_trusted() {
        let mut app = MonitorService::new(SystemConfig::default());
        let mut clock = FakeClock {
            uptime_ms: 5000,
            // 2020-01-01 00:00:00 UTC exactly.
            epoch: MIN_VALID_EPOCH,
        };
        app.start(&mut clock, &mut NullSink);
        app.tick(&mut DrySense, &mut clock, &mut NullSink);

        assert_eq!(
            app.transition_time_display(3, &clock),
            "2020-01-01 00:00:00 UTC"
        );
    }
}
