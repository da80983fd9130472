//! Integration tests for the monitoring pipeline: poll → transition
//! stamping → clock trust → retroactive backfill → presentation.

use crate::mock_hw::{MockClock, MockHardware, RecordingSink};

use tankwatch::app::events::AppEvent;
use tankwatch::app::service::MonitorService;
use tankwatch::clock::MIN_VALID_EPOCH;
use tankwatch::config::SystemConfig;
use tankwatch::level::snapshot::CHANNEL_COUNT;

fn make_app() -> (MonitorService, MockClock, RecordingSink) {
    let mut app = MonitorService::new(SystemConfig::default());
    let mut clock = MockClock::new();
    let mut sink = RecordingSink::new();
    clock.uptime_ms = 1000;
    app.start(&mut clock, &mut sink);
    (app, clock, sink)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_makes_initial_sync_attempt() {
    let (_app, clock, sink) = make_app();
    assert_eq!(clock.sync_requests, vec![1000]);
    assert!(sink.contains(|e| matches!(e, AppEvent::Started)));
}

// ── Poll pipeline ─────────────────────────────────────────────

#[test]
fn first_tick_builds_the_snapshot() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::with_levels([false, false, true, true]);

    app.tick(&mut hw, &mut clock, &mut sink);

    let snap = app.snapshot();
    assert_eq!(snap.wet, [false, false, true, true]);
    assert_eq!(snap.wet_count, 2);
    assert_eq!(snap.fill_percent, 50);
    assert_eq!(snap.sampled_at_uptime_ms, 1000);
    // 4 channels × 5 debounce samples each.
    assert_eq!(hw.samples_taken, CHANNEL_COUNT * 5);
    assert_eq!(app.tick_count(), 1);
}

#[test]
fn level_flip_emits_events_and_restamps() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::with_levels([false, false, false, true]);

    app.tick(&mut hw, &mut clock, &mut sink);
    assert_eq!(app.transition(3).changed_at_uptime_ms, 1000);

    // Water rises to channel 2.
    hw.levels[2] = true;
    clock.advance_ms(4000);
    app.tick(&mut hw, &mut clock, &mut sink);

    assert_eq!(app.transition(2).changed_at_uptime_ms, 5000);
    assert_eq!(app.transition(3).changed_at_uptime_ms, 1000, "unchanged channel keeps stamp");
    assert!(sink.contains(|e| matches!(e, AppEvent::LevelChanged { channel: 2, wet: true })));
    assert!(sink.contains(|e| matches!(e, AppEvent::FillChanged { from: 25, to: 50 })));
}

#[test]
fn steady_levels_emit_nothing_new() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::with_levels([false, false, false, true]);

    app.tick(&mut hw, &mut clock, &mut sink);
    let events_after_first = sink.events.len();

    for _ in 0..5 {
        clock.advance_ms(1000);
        app.tick(&mut hw, &mut clock, &mut sink);
    }
    assert_eq!(sink.events.len(), events_after_first);
}

// ── Clock trust and backfill ──────────────────────────────────

#[test]
fn sync_trust_edge_backfills_pre_sync_transitions() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::with_levels([false, false, false, true]);

    // Transition observed at t=1000 with no wall clock.
    app.tick(&mut hw, &mut clock, &mut sink);
    assert!(!app.transition(3).has_trusted_epoch());
    assert_eq!(app.transition_time_display(3, &clock), "t+1s");

    // SNTP lands: epoch E at uptime 5000.
    let epoch_now = MIN_VALID_EPOCH + 500_000;
    clock.uptime_ms = 5000;
    clock.epoch = epoch_now;
    app.tick(&mut hw, &mut clock, &mut sink);

    // epoch = E - (5000 - 1000)/1000 = E - 4, for every channel.
    for channel in 0..CHANNEL_COUNT {
        assert_eq!(app.transition(channel).changed_at_epoch, epoch_now - 4);
    }
    assert!(sink.contains(|e| matches!(e, AppEvent::ClockTrusted { .. })));
    assert!(sink.contains(
        |e| matches!(e, AppEvent::TransitionBackfilled { channel: 3, epoch } if *epoch == epoch_now - 4)
    ));
}

#[test]
fn backfill_happens_once_and_sticks() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::all_dry();

    app.tick(&mut hw, &mut clock, &mut sink);

    clock.uptime_ms = 10_000;
    clock.epoch = MIN_VALID_EPOCH + 1000;
    app.tick(&mut hw, &mut clock, &mut sink);
    let stamped = app.transition(0).changed_at_epoch;

    // The clock drifts; stamps must not move.
    clock.uptime_ms = 60_000;
    clock.epoch += 120;
    app.tick(&mut hw, &mut clock, &mut sink);
    assert_eq!(app.transition(0).changed_at_epoch, stamped);
}

#[test]
fn post_sync_transitions_stamp_epoch_directly() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::all_dry();

    clock.epoch = MIN_VALID_EPOCH + 9000;
    app.tick(&mut hw, &mut clock, &mut sink);

    hw.levels[3] = true;
    clock.advance_ms(2000);
    clock.epoch += 2;
    app.tick(&mut hw, &mut clock, &mut sink);

    assert_eq!(app.transition(3).changed_at_epoch, MIN_VALID_EPOCH + 9002);
}

// ── Presentation accessors ────────────────────────────────────

#[test]
fn transition_display_switches_to_calendar_time() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::all_dry();

    app.tick(&mut hw, &mut clock, &mut sink);
    assert_eq!(app.transition_time_display(0, &clock), "t+1s");

    clock.uptime_ms = 3000;
    // 2021-01-01 00:00:02 UTC after backfill subtracts 2 s.
    clock.epoch = 1_609_459_202;
    app.tick(&mut hw, &mut clock, &mut sink);

    assert_eq!(
        app.transition_time_display(0, &clock),
        "2021-01-01 00:00:00 UTC"
    );
}

#[test]
fn status_report_mirrors_state() {
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::with_levels([false, true, true, true]);

    app.tick(&mut hw, &mut clock, &mut sink);
    let report = app.build_status(&clock, Some(-60));

    assert_eq!(report.fill_percent, 75);
    assert_eq!(report.wet_count, 3);
    assert!(!report.clock_trusted);
    assert!(!report.update_available);
    assert_eq!(report.wifi_rssi, Some(-60));

    // The report serialises for the status page.
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"fill_percent\":75"));
}

#[test]
fn clock_resync_paces_with_uptime() {
    let config = SystemConfig::default();
    let untrusted_ms = config.clock_resync_untrusted_secs * 1000;
    let (mut app, mut clock, mut sink) = make_app();
    let mut hw = MockHardware::all_dry();

    // Initial attempt at start(); within the interval nothing new.
    clock.advance_ms(1000);
    app.tick(&mut hw, &mut clock, &mut sink);
    assert_eq!(clock.sync_requests.len(), 1);

    clock.uptime_ms = 1000 + untrusted_ms;
    app.tick(&mut hw, &mut clock, &mut sink);
    assert_eq!(clock.sync_requests.len(), 2);
}
