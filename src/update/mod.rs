//! Self-update subsystem — manifest wire format and the check/install
//! state machine.
//!
//! Flow: check (fetch + parse manifest, compare versions) → install
//! (stream the new image via the OTA port). Both steps are triggered
//! explicitly from outside the core; there is no automatic retry.

pub mod manifest;
pub mod session;
