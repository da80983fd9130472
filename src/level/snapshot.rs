//! Level snapshot engine — the current belief of tank state.
//!
//! [`LevelEngine::poll`] debounces all four channels, records per-channel
//! transition timestamps, and derives the aggregate fill percentage.
//! There is exactly one snapshot, continuously overwritten; history is
//! limited to the per-channel [`TransitionRecord`]s. Activity faster than
//! the poll period collapses into a single observed transition.

use embedded_hal::delay::DelayNs;

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, EventSink, LevelSensePort};
use crate::clock::MIN_VALID_EPOCH;
use crate::level::debounce;

/// Number of level channels. Channel 0 is the topmost probe, channel 3
/// the bottommost.
pub const CHANNEL_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A point-in-time view of all four channels plus derived aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelSnapshot {
    /// Debounced wet/dry state per channel, top to bottom.
    pub wet: [bool; CHANNEL_COUNT],
    /// Number of wet channels (not necessarily contiguous).
    pub wet_count: u8,
    /// Contiguous-band fill: 0, 25, 50, 75 or 100.
    pub fill_percent: u8,
    /// Uptime at which this snapshot was taken.
    pub sampled_at_uptime_ms: u32,
}

/// Contiguous-band fill rule: count wet channels from the bottom probe
/// upward, stopping at the first dry one. A wet channel above a dry gap
/// does not count — liquid fills from the bottom, so such a reading is a
/// splash or a stuck sensor, not level.
pub fn fill_percent(wet: &[bool; CHANNEL_COUNT]) -> u8 {
    let mut contiguous = 0u8;
    for channel in (0..CHANNEL_COUNT).rev() {
        if !wet[channel] {
            break;
        }
        contiguous += 1;
    }
    contiguous * 25
}

// ---------------------------------------------------------------------------
// Transition records
// ---------------------------------------------------------------------------

/// When a channel last flipped, in both time bases.
///
/// `changed_at_epoch` is only meaningful once it reaches
/// [`MIN_VALID_EPOCH`]; below that it is a leftover from an untrusted
/// clock and the uptime stamp is authoritative for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionRecord {
    /// Whether this channel has ever been sampled.
    pub initialized: bool,
    /// Uptime at the last observed flip. 0 = never recorded.
    pub changed_at_uptime_ms: u32,
    /// Wall-clock seconds at the last observed flip, or a pre-2020 value
    /// meaning "not yet backfilled".
    pub changed_at_epoch: u32,
}

impl TransitionRecord {
    /// Whether the epoch stamp is real calendar time.
    pub fn has_trusted_epoch(&self) -> bool {
        self.changed_at_epoch >= MIN_VALID_EPOCH
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the snapshot and transition records; mutated only by [`poll`].
///
/// [`poll`]: LevelEngine::poll
pub struct LevelEngine {
    snapshot: LevelSnapshot,
    transitions: [TransitionRecord; CHANNEL_COUNT],
    inverted: [bool; CHANNEL_COUNT],
}

impl LevelEngine {
    pub fn new(inverted: [bool; CHANNEL_COUNT]) -> Self {
        Self {
            snapshot: LevelSnapshot::default(),
            transitions: [TransitionRecord::default(); CHANNEL_COUNT],
            inverted,
        }
    }

    /// One polling round: debounce every channel, stamp transitions,
    /// rebuild the snapshot. Infallible — a read always yields a boolean.
    ///
    /// A channel's record updates iff this is its first-ever sample or the
    /// debounced value differs from the stored snapshot value. When the
    /// wall clock is `trusted` the epoch stamp is taken immediately;
    /// otherwise it stays at its untrusted value for later backfill.
    pub fn poll(
        &mut self,
        hw: &mut (impl LevelSensePort + DelayNs),
        clock: &impl ClockPort,
        trusted: bool,
        sink: &mut impl EventSink,
    ) {
        let now_ms = clock.uptime_ms();
        let epoch = if trusted { clock.epoch_secs() } else { 0 };
        let previous_fill = self.snapshot.fill_percent;
        let mut wet_count = 0u8;

        for channel in 0..CHANNEL_COUNT {
            let wet = debounce::read_channel(hw, channel, self.inverted[channel]);
            let record = &mut self.transitions[channel];

            let first_sample = !record.initialized;
            if first_sample || wet != self.snapshot.wet[channel] {
                record.initialized = true;
                record.changed_at_uptime_ms = now_ms;
                record.changed_at_epoch = epoch;
                if !first_sample {
                    sink.emit(&AppEvent::LevelChanged { channel, wet });
                }
            }

            self.snapshot.wet[channel] = wet;
            if wet {
                wet_count += 1;
            }
        }

        self.snapshot.wet_count = wet_count;
        self.snapshot.fill_percent = fill_percent(&self.snapshot.wet);
        self.snapshot.sampled_at_uptime_ms = now_ms;

        if self.snapshot.fill_percent != previous_fill {
            sink.emit(&AppEvent::FillChanged {
                from: previous_fill,
                to: self.snapshot.fill_percent,
            });
        }
    }

    pub fn snapshot(&self) -> &LevelSnapshot {
        &self.snapshot
    }

    pub fn transition(&self, channel: usize) -> &TransitionRecord {
        &self.transitions[channel]
    }

    pub fn transitions_mut(&mut self) -> &mut [TransitionRecord; CHANNEL_COUNT] {
        &mut self.transitions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
