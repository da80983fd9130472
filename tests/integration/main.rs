//! Host-side integration test suite.
//!
//! Everything here runs on x86_64 against the pure-logic core with mock
//! port adapters — no ESP-IDF, no hardware.

mod mock_hw;
mod monitor_tests;
mod update_tests;
