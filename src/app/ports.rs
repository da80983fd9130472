//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (GPIO sampling, system clock, WiFi, HTTP transport, OTA
//! engine, event sinks) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Level sense port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one raw, un-debounced sample of a level channel.
///
/// The debouncer calls this repeatedly with a short settle delay between
/// samples; implementations return the instantaneous electrical level
/// (`true` = asserted), before any polarity correction.
pub trait LevelSensePort {
    fn sample_raw(&mut self, channel: usize) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: time sources → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic and wall-clock time access.
///
/// `uptime_ms` wraps at `u32::MAX`; all interval arithmetic against it
/// must use `wrapping_sub`.  `epoch_secs` returns whatever the system
/// wall clock currently holds — callers decide trust via
/// [`ClockFacade::is_trusted`](crate::clock::ClockFacade::is_trusted).
pub trait ClockPort {
    /// Milliseconds since boot (monotonic, wraps).
    fn uptime_ms(&self) -> u32;

    /// Current wall-clock time as Unix seconds. Garbage (typically a
    /// small value near 0) until the first successful synchronization.
    fn epoch_secs(&self) -> u32;

    /// Kick off a best-effort, non-blocking time-source sync attempt.
    /// Silent failure is expected; the next trust check simply stays false.
    fn request_sync(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: WiFi → domain)
// ───────────────────────────────────────────────────────────────

/// Network reachability.  The core only ever consumes
/// [`is_connected`](ConnectivityPort::is_connected); `poll` is the
/// per-iteration housekeeping hook (reconnect backoff).
pub trait ConnectivityPort {
    fn is_connected(&self) -> bool;
    fn poll(&mut self);
    fn rssi(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → HTTP client)
// ───────────────────────────────────────────────────────────────

/// A completed HTTP exchange: numeric status plus the full response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Errors below the HTTP layer — the request never produced a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established (DNS, TCP, TLS handshake).
    Connect,
    /// The exchange started but reading the response failed.
    Io,
    /// URL scheme is neither `http` nor `https`.
    UnsupportedScheme,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Io => write!(f, "transfer I/O error"),
            Self::UnsupportedScheme => write!(f, "unsupported URL scheme"),
        }
    }
}

/// Blocking fetch of a small text resource (the update manifest).
/// A non-2xx status is returned in [`FetchResponse`], not as an error —
/// the caller decides what status codes mean.
pub trait TransportPort {
    fn fetch(&mut self, url: &str) -> Result<FetchResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// OTA port (driven adapter: domain → firmware transfer engine)
// ───────────────────────────────────────────────────────────────

/// The three possible results of an OTA transfer attempt.
///
/// On real hardware a `Success` is never observed by the caller: the
/// adapter reboots into the new image before returning. The variant
/// exists so simulation and tests can exercise the full taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtaOutcome {
    /// Transfer or flash failed; device keeps running the current image.
    Failed { code: i32, message: String },
    /// The transfer layer itself found nothing to apply.
    NoUpdate,
    /// New image flashed and marked bootable.
    Success,
}

impl fmt::Display for OtaOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { code, message } => write!(f, "failed: {message} (code {code})"),
            Self::NoUpdate => write!(f, "no update returned"),
            Self::Success => write!(f, "success"),
        }
    }
}

/// Download a firmware image from `url` and apply it to the inactive
/// partition.  Blocking; the scheme (http/https) selects the transport
/// exactly as for manifest fetches.
pub trait OtaPort {
    fn apply(&mut self, url: &str) -> OtaOutcome;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / presentation)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, status
/// page push, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
