//! OTA transfer adapter — streams a firmware image from a URL into the
//! inactive partition via the `esp-ota` crate.
//!
//! Implements [`OtaPort`]. The HTTP transport mirrors
//! [`HttpTransport`](super::http::HttpTransport): scheme-selected, with
//! the same certificate-validation shortcut. The body is written to
//! flash chunk by chunk — firmware images do not fit in RAM.
//!
//! Outcome mapping:
//! - HTTP 304 / 404 → [`OtaOutcome::NoUpdate`] (server has nothing for us)
//! - any other non-2xx, transport error, or flash error → [`OtaOutcome::Failed`]
//! - a fully flashed image → reboot into it (`Success` is returned only
//!   in simulation; on hardware the restart below never returns)

#[cfg(target_os = "espidf")]
use log::info;
use log::warn;

use crate::app::ports::{OtaOutcome, OtaPort};

/// Error codes carried in [`OtaOutcome::Failed`], roughly mirroring the
/// stages of the transfer.
#[cfg(target_os = "espidf")]
mod codes {
    pub const CONNECT: i32 = -1;
    pub const READ: i32 = -2;
    pub const FLASH_BEGIN: i32 = -3;
    pub const FLASH_WRITE: i32 = -4;
    pub const FLASH_FINALIZE: i32 = -5;
    pub const BOOT_SET: i32 = -6;
}

pub struct HttpOtaAdapter {
    allow_insecure_tls: bool,
}

impl HttpOtaAdapter {
    pub fn new(allow_insecure_tls: bool) -> Self {
        Self { allow_insecure_tls }
    }
}

impl OtaPort for HttpOtaAdapter {
    #[cfg(target_os = "espidf")]
    fn apply(&mut self, url: &str) -> OtaOutcome {
        use embedded_svc::http::client::Client;
        use embedded_svc::http::{Method, Status};
        use embedded_svc::io::Read;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let failed = |code: i32, message: &str| OtaOutcome::Failed {
            code,
            message: message.to_string(),
        };

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return failed(codes::CONNECT, "unsupported URL scheme");
        }

        let config = Configuration {
            buffer_size: Some(4096),
            timeout: Some(std::time::Duration::from_secs(60)),
            use_global_ca_store: false,
            // Same trust shortcut as the manifest fetch.
            crt_bundle_attach: if self.allow_insecure_tls {
                None
            } else {
                Some(esp_idf_svc::sys::esp_crt_bundle_attach)
            },
            ..Default::default()
        };

        let connection = match EspHttpConnection::new(&config) {
            Ok(c) => c,
            Err(e) => {
                warn!("ota: connection setup failed: {e}");
                return failed(codes::CONNECT, "connection setup failed");
            }
        };
        let mut client = Client::wrap(connection);

        let request = match client.request(Method::Get, url, &[]) {
            Ok(r) => r,
            Err(e) => {
                warn!("ota: request failed: {e}");
                return failed(codes::CONNECT, "request failed");
            }
        };
        let mut response = match request.submit() {
            Ok(r) => r,
            Err(e) => {
                warn!("ota: submit failed: {e}");
                return failed(codes::CONNECT, "no response from server");
            }
        };

        let status = response.status();
        if status == 304 || status == 404 {
            info!("ota: server returned {} — nothing to apply", status);
            return OtaOutcome::NoUpdate;
        }
        if !(200..300).contains(&status) {
            return failed(i32::from(status), "unexpected HTTP status");
        }

        let mut update = match esp_ota::OtaUpdate::begin() {
            Ok(u) => u,
            Err(e) => {
                warn!("ota: begin failed: {e:?}");
                return failed(codes::FLASH_BEGIN, "could not open inactive partition");
            }
        };

        let mut total: usize = 0;
        let mut chunk = [0u8; 4096];
        loop {
            let n = match response.read(&mut chunk) {
                Ok(n) => n,
                Err(e) => {
                    warn!("ota: body read failed after {} bytes: {e:?}", total);
                    return failed(codes::READ, "image download interrupted");
                }
            };
            if n == 0 {
                break;
            }
            if let Err(e) = update.write(&chunk[..n]) {
                warn!("ota: flash write failed at {} bytes: {e:?}", total);
                return failed(codes::FLASH_WRITE, "flash write failed");
            }
            total += n;
        }
        info!("ota: image received ({} bytes), finalizing", total);

        let mut completed = match update.finalize() {
            Ok(c) => c,
            Err(e) => {
                warn!("ota: finalize failed: {e:?}");
                return failed(codes::FLASH_FINALIZE, "image verification failed");
            }
        };
        if let Err(e) = completed.set_as_boot_partition() {
            warn!("ota: set boot partition failed: {e:?}");
            return failed(codes::BOOT_SET, "could not select new image");
        }

        info!("ota: rebooting into new firmware");
        esp_ota::restart();
    }

    #[cfg(not(target_os = "espidf"))]
    fn apply(&mut self, url: &str) -> OtaOutcome {
        // No flash partitions in simulation; report the transfer layer
        // found nothing so the session exercises its failure path.
        warn!(
            "ota(sim): apply({url}) skipped (insecure_tls={})",
            self.allow_insecure_tls
        );
        OtaOutcome::NoUpdate
    }
}

// ── Boot validation ───────────────────────────────────────────

/// Check OTA image state on startup and mark this firmware as valid.
///
/// Without this, the rollback watchdog reverts to the previous firmware
/// after three consecutive failed boots.
#[cfg(target_os = "espidf")]
pub fn check_rollback() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("ota: firmware marked valid (rollback cancelled)"),
        Err(e) => warn!("ota: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn check_rollback() {
    log::info!("ota(sim): rollback check skipped");
}
