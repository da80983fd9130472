//! Level sensing subsystem — debounce, snapshot aggregation, and
//! retroactive timestamp backfill.
//!
//! Four binary sensors, ordered top (channel 0) to bottom (channel 3),
//! are majority-vote debounced into a [`LevelSnapshot`](snapshot::LevelSnapshot)
//! whose fill percentage follows the contiguous-band rule: only wet
//! channels forming an unbroken run from the bottom count, because a
//! column of liquid fills from the bottom up.

pub mod backfill;
pub mod debounce;
pub mod snapshot;
