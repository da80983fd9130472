//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the status
//! page, serial console) that the
//! [`MonitorService`](super::service::MonitorService) interprets and acts
//! upon. The update flow is deliberately two-phase: a check never
//! installs, an install never re-checks.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Fetch the update manifest and decide whether a newer firmware exists.
    CheckUpdate,

    /// Install the pending update found by the last successful check.
    InstallUpdate,
}
