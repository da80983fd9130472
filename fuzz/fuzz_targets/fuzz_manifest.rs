//! Fuzz target: `Manifest::parse`
//!
//! Drives arbitrary byte sequences through the manifest parser and
//! asserts that it never panics and never accepts an invalid manifest
//! (zero version code or empty firmware URL).
//!
//! cargo fuzz run fuzz_manifest

#![no_main]

use libfuzzer_sys::fuzz_target;
use tankwatch::update::manifest::Manifest;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(manifest) = Manifest::parse(text) {
        assert!(manifest.version_code > 0, "invalid version_code accepted");
        assert!(!manifest.firmware_url.is_empty(), "empty firmware_url accepted");
        assert!(!manifest.version_name.is_empty(), "empty version_name produced");
    }
});
