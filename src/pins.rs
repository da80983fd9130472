//! GPIO pin assignments for the TankWatch main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

use crate::level::snapshot::CHANNEL_COUNT;

// ---------------------------------------------------------------------------
// Level sensors — digital inputs, ordered top (index 0) to bottom (index 3)
// ---------------------------------------------------------------------------

/// XKC-Y25 non-contact level sensor, topmost probe position.
pub const LEVEL_SENSE_0_GPIO: i32 = 4;
/// Upper-middle probe position.
pub const LEVEL_SENSE_1_GPIO: i32 = 5;
/// Lower-middle probe position.
pub const LEVEL_SENSE_2_GPIO: i32 = 6;
/// Bottommost probe position.
pub const LEVEL_SENSE_3_GPIO: i32 = 7;

/// All four channel pins in top-to-bottom channel order.
pub const LEVEL_SENSE_GPIOS: [i32; CHANNEL_COUNT] = [
    LEVEL_SENSE_0_GPIO,
    LEVEL_SENSE_1_GPIO,
    LEVEL_SENSE_2_GPIO,
    LEVEL_SENSE_3_GPIO,
];

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
