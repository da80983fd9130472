//! Hardware adapter — bridges the level-sense GPIOs to the domain ports.
//!
//! Implements [`LevelSensePort`] (raw channel sampling) and the
//! embedded-hal [`DelayNs`] trait (the debouncer's inter-sample settle
//! delay), so the whole sampling concern lives behind one adapter.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers and busy-waits
//! with the ROM delay (the 2 ms sample gap is below the FreeRTOS tick).
//! On host/test: per-channel atomics scriptable from simulation code.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use crate::app::ports::LevelSensePort;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::level::snapshot::CHANNEL_COUNT;
use crate::pins;

static SIM_WET: [AtomicBool; CHANNEL_COUNT] = [
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
];

/// Script a channel's raw electrical level for host-side simulation.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw_level(channel: usize, asserted: bool) {
    SIM_WET[channel].store(asserted, Ordering::Relaxed);
}

/// Concrete adapter for the four level-sense inputs.
pub struct HardwareAdapter {
    gpios: [i32; CHANNEL_COUNT],
}

impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            gpios: pins::LEVEL_SENSE_GPIOS,
        }
    }
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelSensePort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn sample_raw(&mut self, channel: usize) -> bool {
        hw_init::gpio_read(self.gpios[channel])
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample_raw(&mut self, channel: usize) -> bool {
        let _ = self.gpios[channel];
        SIM_WET[channel].load(Ordering::Relaxed)
    }
}

impl DelayNs for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        // Busy-wait: the sample gap is shorter than a FreeRTOS tick.
        DelayNs::delay_ns(&mut esp_idf_hal::delay::Ets, ns);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
