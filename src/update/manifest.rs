//! Update manifest wire format.
//!
//! The update server publishes a small plain-text file:
//!
//! ```text
//! # TankWatch release feed
//! version_code=42
//! version_name=2.1.0-beta
//! firmware_url=https://updates.tankwatch.io/fw/tankwatch-42.bin
//! ```
//!
//! Newline-separated `key=value` lines; blank lines and `#` comments are
//! skipped; keys are matched case-insensitively after trimming; unknown
//! keys are ignored so old firmware survives feed extensions.

use core::fmt;

/// A successfully parsed, validated manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Release counter, strictly increasing across releases. Always > 0.
    pub version_code: u32,
    /// Display name; defaults to the decimal version code when absent.
    pub version_name: String,
    /// Absolute URL of the firmware image. Never empty.
    pub firmware_url: String,
}

/// Why a manifest was rejected. No partial manifest is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestError {
    /// `version_code` missing, zero, or non-numeric.
    MissingVersionCode,
    /// `firmware_url` missing or empty.
    MissingFirmwareUrl,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVersionCode => write!(f, "manifest has no valid version_code"),
            Self::MissingFirmwareUrl => write!(f, "manifest has no firmware_url"),
        }
    }
}

impl Manifest {
    /// Parse the wire format. Succeeds iff `version_code > 0` and
    /// `firmware_url` is non-empty after trimming.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut version_code: u32 = 0;
        let mut version_name = String::new();
        let mut firmware_url = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // Lines without '=' carry nothing we understand; skip them.
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.eq_ignore_ascii_case("version_code") {
                version_code = value.parse().unwrap_or(0);
            } else if key.eq_ignore_ascii_case("version_name") {
                version_name = value.to_string();
            } else if key.eq_ignore_ascii_case("firmware_url") {
                firmware_url = value.to_string();
            }
        }

        if version_code == 0 {
            return Err(ManifestError::MissingVersionCode);
        }
        if firmware_url.is_empty() {
            return Err(ManifestError::MissingFirmwareUrl);
        }
        if version_name.is_empty() {
            version_name = version_code.to_string();
        }

        Ok(Self {
            version_code,
            version_name,
            firmware_url,
        })
    }
}
