//! Update session state machine.
//!
//! ```text
//! Idle ──check──▶ NoUpdate / UpdateAvailable ──install──▶ Installing
//!                     ▲                                      │
//!                     └──────── failure / no-update ─────────┘
//! ```
//!
//! A check always supersedes the previous check's result. Install is only
//! honoured from `UpdateAvailable` with connectivity present; every other
//! attempt is refused locally with a status message and no state change.
//! All failures are surfaced as human-readable status text and retried
//! only on the next explicit trigger.

use log::{info, warn};

use crate::app::ports::{ConnectivityPort, OtaOutcome, OtaPort, TransportPort};
use crate::update::manifest::Manifest;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    /// No manifest has been considered yet (startup state).
    Idle,
    /// Last check found nothing newer, or failed.
    NoUpdate,
    /// A newer manifest is pending; install may proceed.
    UpdateAvailable,
    /// OTA transfer in progress (transient within [`UpdateSession::install`]).
    Installing,
}

/// Pending-update decision plus last-outcome text.
pub struct UpdateSession {
    phase: UpdatePhase,
    pending: Option<Manifest>,
    status: String,
    running_version_code: u32,
}

impl UpdateSession {
    pub fn new(running_version_code: u32) -> Self {
        Self {
            phase: UpdatePhase::Idle,
            pending: None,
            status: String::from("no update check performed"),
            running_version_code,
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn update_available(&self) -> bool {
        self.phase == UpdatePhase::UpdateAvailable
    }

    pub fn pending(&self) -> Option<&Manifest> {
        self.pending.as_ref()
    }

    /// Human-readable outcome of the most recent check/install attempt.
    pub fn status(&self) -> &str {
        &self.status
    }

    // ── Check ─────────────────────────────────────────────────

    /// Fetch and evaluate the manifest at `url`.
    ///
    /// Without connectivity the check is refused: only the status line
    /// changes. Any fetch or parse failure lands in `NoUpdate` with the
    /// pending manifest cleared. Returns `true` iff an update is pending
    /// afterwards.
    pub fn check(
        &mut self,
        url: &str,
        net: &impl ConnectivityPort,
        transport: &mut impl TransportPort,
    ) -> bool {
        if !net.is_connected() {
            self.status = String::from("update check skipped: network unavailable");
            warn!("update: {}", self.status);
            return self.update_available();
        }

        let body = match transport.fetch(url) {
            Ok(resp) if (200..300).contains(&resp.status) => resp.body,
            Ok(resp) => {
                self.fail_check(format!("manifest fetch failed: HTTP {}", resp.status));
                return false;
            }
            Err(e) => {
                self.fail_check(format!("manifest fetch failed: {e}"));
                return false;
            }
        };

        match Manifest::parse(&body) {
            Err(e) => {
                self.fail_check(format!("manifest rejected: {e}"));
                false
            }
            Ok(manifest) if manifest.version_code > self.running_version_code => {
                info!(
                    "update: version {} ({}) available, running {}",
                    manifest.version_code, manifest.version_name, self.running_version_code
                );
                self.status = format!("update {} available", manifest.version_name);
                self.phase = UpdatePhase::UpdateAvailable;
                self.pending = Some(manifest);
                true
            }
            Ok(manifest) => {
                info!(
                    "update: firmware is current (remote {}, running {})",
                    manifest.version_code, self.running_version_code
                );
                self.status = format!(
                    "firmware is current (remote {}, running {})",
                    manifest.version_code, self.running_version_code
                );
                self.phase = UpdatePhase::NoUpdate;
                self.pending = None;
                false
            }
        }
    }

    fn fail_check(&mut self, reason: String) {
        warn!("update: {}", reason);
        self.status = reason;
        self.phase = UpdatePhase::NoUpdate;
        self.pending = None;
    }

    // ── Install ───────────────────────────────────────────────

    /// Run the OTA transfer against the pending manifest.
    ///
    /// Returns `None` when the attempt was refused (no pending update or
    /// no connectivity — state untouched apart from the status line), or
    /// the transfer outcome otherwise. A successful transfer never
    /// returns on real hardware: the OTA adapter reboots into the new
    /// image. The post-success arm exists for simulation only and must
    /// not be given cleanup duties.
    pub fn install(
        &mut self,
        net: &impl ConnectivityPort,
        ota: &mut impl OtaPort,
    ) -> Option<OtaOutcome> {
        if !self.update_available() {
            self.status = String::from("install refused: no pending update");
            warn!("update: {}", self.status);
            return None;
        }
        if !net.is_connected() {
            self.status = String::from("install refused: network unavailable");
            warn!("update: {}", self.status);
            return None;
        }
        let Some(manifest) = self.pending.clone() else {
            // UpdateAvailable without a manifest cannot happen via the
            // public API; treat it as a refused attempt.
            self.status = String::from("install refused: no pending update");
            return None;
        };

        info!(
            "update: installing {} from {}",
            manifest.version_name, manifest.firmware_url
        );
        self.phase = UpdatePhase::Installing;
        let outcome = ota.apply(&manifest.firmware_url);

        match &outcome {
            OtaOutcome::Failed { code, message } => {
                self.status = format!("install failed: {message} (code {code})");
                warn!("update: {}", self.status);
                self.phase = UpdatePhase::NoUpdate;
                self.pending = None;
            }
            OtaOutcome::NoUpdate => {
                self.status = String::from("install aborted: transfer reported no update");
                warn!("update: {}", self.status);
                self.phase = UpdatePhase::NoUpdate;
                self.pending = None;
            }
            OtaOutcome::Success => {
                // Unreachable on hardware — the adapter reboots first.
                self.status = format!("update {} installed; rebooting", manifest.version_name);
                info!("update: {}", self.status);
                self.phase = UpdatePhase::Idle;
                self.pending = None;
            }
        }
        Some(outcome)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
