//! Retroactive epoch stamping for transitions observed before time sync.
//!
//! Transitions recorded while the wall clock was untrusted carry only an
//! uptime stamp. Once the clock turns trustworthy, the epoch is
//! reconstructed backwards: `epoch = now_epoch - elapsed_since_flip`.
//! Each record is converted exactly once — the first computed value is
//! final, and later clock drift is not retroactively applied.

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, EventSink};
use crate::level::snapshot::{TransitionRecord, CHANNEL_COUNT};

/// Backfill pass over all channel records. No-op while `trusted` is false.
///
/// A record qualifies when it has been initialized, holds a transition
/// (`changed_at_uptime_ms != 0`), and its epoch is still below the trust
/// threshold. The computed epoch is clamped to `now_epoch`: an uptime
/// rollover or measurement skew can make the flip appear to lie in the
/// future, and a future stamp must never be produced.
///
/// Returns the number of records converted.
pub fn backfill(
    records: &mut [TransitionRecord; CHANNEL_COUNT],
    clock: &impl ClockPort,
    trusted: bool,
    sink: &mut impl EventSink,
) -> usize {
    if !trusted {
        return 0;
    }

    let now_ms = clock.uptime_ms();
    let now_epoch = clock.epoch_secs();
    let mut converted = 0;

    for (channel, record) in records.iter_mut().enumerate() {
        if !record.initialized || record.changed_at_uptime_ms == 0 || record.has_trusted_epoch() {
            continue;
        }

        let elapsed_secs = now_ms.wrapping_sub(record.changed_at_uptime_ms) / 1000;
        let epoch = now_epoch.wrapping_sub(elapsed_secs);
        record.changed_at_epoch = if epoch > now_epoch { now_epoch } else { epoch };

        debug!(
            "backfill: channel {} flip at t+{}s -> epoch {}",
            channel,
            record.changed_at_uptime_ms / 1000,
            record.changed_at_epoch
        );
        sink.emit(&AppEvent::TransitionBackfilled {
            channel,
            epoch: record.changed_at_epoch,
        });
        converted += 1;
    }

    converted
}
