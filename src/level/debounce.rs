//! Majority-vote sensor debouncing.
//!
//! A single GPIO read of a capacitive level sensor is vulnerable to
//! electrical bounce and coupling from nearby mains wiring. Each debounced
//! reading therefore takes [`SAMPLE_COUNT`] raw samples with a short
//! settle delay between them and accepts the majority. The read is
//! deliberately blocking (~10 ms per channel): the firmware is a single
//! cooperative loop with nothing else to preempt.

use embedded_hal::delay::DelayNs;

use crate::app::ports::LevelSensePort;

/// Raw samples per debounced reading. Odd, so a strict majority exists.
pub const SAMPLE_COUNT: usize = 5;
/// Settle delay between consecutive raw samples.
pub const SAMPLE_GAP_MS: u32 = 2;
/// Minimum asserted samples for a wet verdict.
pub const MAJORITY: usize = SAMPLE_COUNT / 2 + 1;

/// Debounced read of one channel.
///
/// Polarity inversion is applied to the vote result, not per-sample, so
/// an inverted channel gets exactly the same noise rejection as a normal
/// one. The `hw` parameter satisfies both [`LevelSensePort`] and
/// [`DelayNs`] — the sampling and the settle delay come from the same
/// adapter.
pub fn read_channel(
    hw: &mut (impl LevelSensePort + DelayNs),
    channel: usize,
    inverted: bool,
) -> bool {
    let mut asserted = 0usize;
    for _ in 0..SAMPLE_COUNT {
        if hw.sample_raw(channel) {
            asserted += 1;
        }
        hw.delay_ms(SAMPLE_GAP_MS);
    }
    let wet = asserted >= MAJORITY;
    wet != inverted
}
