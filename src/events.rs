//! Inbound event queue for the driver loop.
//!
//! Events are produced by:
//! - Timer callbacks (periodic poll tick, status report tick)
//! - The status page handlers (update check / install triggers)
//!
//! Events are consumed by the main control loop, which processes them
//! one at a time, strictly sequentially.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer ISR    │────▶│              │     │              │
//! │ HTTP handler │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Software     │────▶│  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 16;

/// System event types, ordered by rough priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Driver-loop tick: clock maintenance, sensor poll, backfill.
    ControlTick = 0,
    /// Status report timer fired.
    StatusTick = 10,
    /// The user asked for an update check.
    CheckUpdateRequested = 20,
    /// The user confirmed installation of the pending update.
    InstallUpdateRequested = 21,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Collaborator callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices; the buffer lives in a static so the
// HTTP handler tasks can reach it without shared ownership plumbing.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed under the SPSC discipline enforced by
// the atomics: push_event (one producer context) writes a slot before
// publishing it via EVENT_HEAD with Release; pop_event (main loop, one
// consumer) reads the slot only after observing the head with Acquire.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from callback context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; slot published via Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    // SAFETY: slot was published by the Release store in push_event.
    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::ControlTick),
        10 => Some(Event::StatusTick),
        20 => Some(Event::CheckUpdateRequested),
        21 => Some(Event::InstallUpdateRequested),
        _ => None,
    }
}
