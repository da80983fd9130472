//! Integration tests for the update flow: check → decision → install,
//! driven through the MonitorService command surface.

use crate::mock_hw::{MockNet, MockOta, MockTransport, RecordingSink};

use tankwatch::app::commands::AppCommand;
use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::TransportError;
use tankwatch::app::service::MonitorService;
use tankwatch::config::{SystemConfig, FIRMWARE_VERSION_CODE};
use tankwatch::update::session::UpdatePhase;

fn manifest_body(code: u32) -> String {
    format!("version_code={code}\nversion_name=rc-{code}\nfirmware_url=http://fw.host/img-{code}.bin\n")
}

fn newer() -> u32 {
    FIRMWARE_VERSION_CODE + 1
}

fn older() -> u32 {
    FIRMWARE_VERSION_CODE - 1
}

#[test]
fn check_fetches_configured_manifest_url() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut transport = MockTransport::new().respond_ok(200, &manifest_body(newer()));
    let mut ota = MockOta::empty();
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);

    assert_eq!(
        transport.fetched_urls,
        vec![SystemConfig::default().manifest_url]
    );
}

#[test]
fn newer_manifest_flags_update_available() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut transport = MockTransport::new().respond_ok(200, &manifest_body(newer()));
    let mut ota = MockOta::empty();
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);

    assert!(app.update_available());
    assert_eq!(app.update_phase(), UpdatePhase::UpdateAvailable);
    assert!(sink.contains(|e| matches!(e, AppEvent::UpdateCheckCompleted { available: true })));
    assert!(app.update_status().contains(&format!("rc-{}", newer())));
}

#[test]
fn older_manifest_clears_previous_pending() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut ota = MockOta::empty();
    let mut sink = RecordingSink::new();

    let mut transport = MockTransport::new()
        .respond_ok(200, &manifest_body(newer()))
        .respond_ok(200, &manifest_body(older()));

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);
    assert!(app.update_available());

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);
    assert!(!app.update_available());
    assert_eq!(app.update_phase(), UpdatePhase::NoUpdate);
    assert!(sink.contains(|e| matches!(e, AppEvent::UpdateCheckCompleted { available: false })));
}

#[test]
fn failed_fetch_reports_reason() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut transport = MockTransport::new().respond_err(TransportError::Connect);
    let mut ota = MockOta::empty();
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);

    assert!(!app.update_available());
    assert!(app.update_status().contains("connection failed"));
}

#[test]
fn install_without_check_is_refused() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut transport = MockTransport::new();
    let mut ota = MockOta::succeeding();
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::InstallUpdate, &net, &mut transport, &mut ota, &mut sink);

    assert!(ota.applied_urls.is_empty(), "OTA must not be invoked");
    assert!(app.update_status().contains("no pending update"));
    assert_eq!(app.update_phase(), UpdatePhase::Idle);
}

#[test]
fn install_streams_pending_manifest_url() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut transport = MockTransport::new().respond_ok(200, &manifest_body(newer()));
    let mut ota = MockOta::succeeding();
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);
    app.handle_command(AppCommand::InstallUpdate, &net, &mut transport, &mut ota, &mut sink);

    assert_eq!(
        ota.applied_urls,
        vec![format!("http://fw.host/img-{}.bin", newer())]
    );
    assert!(app.update_status().contains("rebooting"));
}

#[test]
fn failed_install_emits_event_and_reverts() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::online();
    let mut transport = MockTransport::new().respond_ok(200, &manifest_body(newer()));
    let mut ota = MockOta::failing(-104, "connection reset");
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);
    app.handle_command(AppCommand::InstallUpdate, &net, &mut transport, &mut ota, &mut sink);

    assert!(!app.update_available());
    assert_eq!(app.update_phase(), UpdatePhase::NoUpdate);
    assert!(app.update_status().contains("connection reset"));
    assert!(sink.contains(|e| matches!(e, AppEvent::UpdateInstallFailed { code: -104 })));

    // A second install attempt is refused — the pending update is gone.
    app.handle_command(AppCommand::InstallUpdate, &net, &mut transport, &mut ota, &mut sink);
    assert_eq!(ota.applied_urls.len(), 1);
}

#[test]
fn offline_check_and_install_are_refused() {
    let mut app = MonitorService::new(SystemConfig::default());
    let net = MockNet::offline();
    let mut transport = MockTransport::new().respond_ok(200, &manifest_body(newer()));
    let mut ota = MockOta::succeeding();
    let mut sink = RecordingSink::new();

    app.handle_command(AppCommand::CheckUpdate, &net, &mut transport, &mut ota, &mut sink);
    assert!(transport.fetched_urls.is_empty());
    assert!(app.update_status().contains("network unavailable"));

    app.handle_command(AppCommand::InstallUpdate, &net, &mut transport, &mut ota, &mut sink);
    assert!(ota.applied_urls.is_empty());
}
