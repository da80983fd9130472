//! HTTP transport adapter for manifest fetches.
//!
//! Implements [`TransportPort`] over `EspHttpConnection`. The scheme
//! picks the transport: plain TCP for `http://`, TLS for `https://`.
//!
//! ## Trust model
//!
//! With `allow_insecure_tls` set (the default), the TLS path attaches no
//! certificate bundle — any server certificate is accepted and the update
//! server is trusted by URL alone. Clearing the flag attaches the ESP-IDF
//! CA bundle for full chain validation.

use log::warn;

use crate::app::ports::{FetchResponse, TransportError, TransportPort};

/// Largest manifest body the adapter will buffer.
#[cfg(target_os = "espidf")]
const MAX_BODY_BYTES: usize = 4096;

pub struct HttpTransport {
    allow_insecure_tls: bool,
}

impl HttpTransport {
    pub fn new(allow_insecure_tls: bool) -> Self {
        Self { allow_insecure_tls }
    }
}

fn scheme_supported(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl TransportPort for HttpTransport {
    #[cfg(target_os = "espidf")]
    fn fetch(&mut self, url: &str) -> Result<FetchResponse, TransportError> {
        use embedded_svc::http::client::Client;
        use embedded_svc::http::{Method, Status};
        use embedded_svc::io::Read;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        if !scheme_supported(url) {
            return Err(TransportError::UnsupportedScheme);
        }

        let config = Configuration {
            buffer_size: Some(2048),
            timeout: Some(std::time::Duration::from_secs(15)),
            use_global_ca_store: false,
            // Trust shortcut: by default the server certificate is not
            // validated (`allow_insecure_tls` in SystemConfig).
            crt_bundle_attach: if self.allow_insecure_tls {
                None
            } else {
                Some(esp_idf_svc::sys::esp_crt_bundle_attach)
            },
            ..Default::default()
        };

        let connection = EspHttpConnection::new(&config).map_err(|e| {
            warn!("http: connection setup failed: {e}");
            TransportError::Connect
        })?;
        let mut client = Client::wrap(connection);

        let request = client
            .request(Method::Get, url, &[])
            .map_err(|e| {
                warn!("http: request failed: {e}");
                TransportError::Connect
            })?;
        let mut response = request.submit().map_err(|e| {
            warn!("http: submit failed: {e}");
            TransportError::Io
        })?;

        let status = response.status();
        let mut body = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            let n = response.read(&mut chunk).map_err(|e| {
                warn!("http: body read failed: {e:?}");
                TransportError::Io
            })?;
            if n == 0 {
                break;
            }
            if body.len() + n > MAX_BODY_BYTES {
                warn!("http: response body exceeds {} bytes", MAX_BODY_BYTES);
                return Err(TransportError::Io);
            }
            body.extend_from_slice(&chunk[..n]);
        }

        Ok(FetchResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn fetch(&mut self, url: &str) -> Result<FetchResponse, TransportError> {
        if !scheme_supported(url) {
            return Err(TransportError::UnsupportedScheme);
        }
        // No network stack in simulation; tests script TransportPort mocks.
        warn!(
            "http(sim): no transport for {url} (insecure_tls={})",
            self.allow_insecure_tls
        );
        Err(TransportError::Connect)
    }
}
