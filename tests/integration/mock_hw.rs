//! Mock port adapters for integration tests.
//!
//! Records every interaction so tests can assert on the full history
//! without touching real GPIO, SNTP, or network stacks.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::{
    ClockPort, ConnectivityPort, EventSink, FetchResponse, LevelSensePort, OtaOutcome, OtaPort,
    TransportError, TransportPort,
};
use tankwatch::level::snapshot::CHANNEL_COUNT;

// ── MockHardware ──────────────────────────────────────────────

/// Level-sense mock: each channel reads a fixed raw level.
pub struct MockHardware {
    pub levels: [bool; CHANNEL_COUNT],
    pub samples_taken: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            levels: [false; CHANNEL_COUNT],
            samples_taken: 0,
        }
    }

    pub fn all_dry() -> Self {
        Self::new()
    }

    pub fn with_levels(levels: [bool; CHANNEL_COUNT]) -> Self {
        Self {
            levels,
            samples_taken: 0,
        }
    }
}

impl LevelSensePort for MockHardware {
    fn sample_raw(&mut self, channel: usize) -> bool {
        self.samples_taken += 1;
        self.levels[channel]
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── MockClock ─────────────────────────────────────────────────

/// Scriptable clock: tests move uptime and epoch by hand and observe
/// sync requests.
pub struct MockClock {
    pub uptime_ms: u32,
    pub epoch: u32,
    pub sync_requests: Vec<u32>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self {
            uptime_ms: 0,
            epoch: 0,
            sync_requests: Vec::new(),
        }
    }

    pub fn advance_ms(&mut self, ms: u32) {
        self.uptime_ms = self.uptime_ms.wrapping_add(ms);
    }
}

impl ClockPort for MockClock {
    fn uptime_ms(&self) -> u32 {
        self.uptime_ms
    }

    fn epoch_secs(&self) -> u32 {
        self.epoch
    }

    fn request_sync(&mut self) {
        self.sync_requests.push(self.uptime_ms);
    }
}

// ── MockNet ───────────────────────────────────────────────────

pub struct MockNet {
    pub connected: bool,
}

#[allow(dead_code)]
impl MockNet {
    pub fn online() -> Self {
        Self { connected: true }
    }

    pub fn offline() -> Self {
        Self { connected: false }
    }
}

impl ConnectivityPort for MockNet {
    fn is_connected(&self) -> bool {
        self.connected
    }
    fn poll(&mut self) {}
    fn rssi(&self) -> Option<i8> {
        self.connected.then_some(-55)
    }
}

// ── MockTransport ─────────────────────────────────────────────

/// Replays a queue of scripted fetch results; records every URL fetched.
pub struct MockTransport {
    pub responses: VecDeque<Result<FetchResponse, TransportError>>,
    pub fetched_urls: Vec<String>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            fetched_urls: Vec::new(),
        }
    }

    pub fn respond_ok(mut self, status: u16, body: &str) -> Self {
        self.responses.push_back(Ok(FetchResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn respond_err(mut self, err: TransportError) -> Self {
        self.responses.push_back(Err(err));
        self
    }
}

impl TransportPort for MockTransport {
    fn fetch(&mut self, url: &str) -> Result<FetchResponse, TransportError> {
        self.fetched_urls.push(url.to_string());
        self.responses
            .pop_front()
            .unwrap_or(Err(TransportError::Connect))
    }
}

// ── MockOta ───────────────────────────────────────────────────

pub struct MockOta {
    pub outcome: OtaOutcome,
    pub applied_urls: Vec<String>,
}

#[allow(dead_code)]
impl MockOta {
    pub fn succeeding() -> Self {
        Self {
            outcome: OtaOutcome::Success,
            applied_urls: Vec::new(),
        }
    }

    pub fn failing(code: i32, message: &str) -> Self {
        Self {
            outcome: OtaOutcome::Failed {
                code,
                message: message.to_string(),
            },
            applied_urls: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            outcome: OtaOutcome::NoUpdate,
            applied_urls: Vec::new(),
        }
    }
}

impl OtaPort for MockOta {
    fn apply(&mut self, url: &str) -> OtaOutcome {
        self.applied_urls.push(url.to_string());
        self.outcome.clone()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Stores every emitted event for later assertions.
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, pred: impl Fn(&AppEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
