// ABOUTME: Image validation for the favicon fallback probe.
// ABOUTME: ImageValidator trait plus an HTTP implementation that sniffs fetched bytes.

//! Image validation.
//!
//! The favicon rule only falls back to `{scheme}://{host}/favicon.ico` when
//! that location actually serves an image. The check is expressed as the
//! [`ImageValidator`] trait so the network round-trip stays an injected
//! capability: the facade wires in [`HttpImageValidator`], tests substitute
//! a fake.

use std::time::Duration;

use tracing::debug;

/// Maximum number of bytes fetched when validating a candidate image.
const MAX_PROBE_BYTES: usize = 1024 * 1024;

/// Decides whether a URL resolves to a recognized image.
pub trait ImageValidator: Send + Sync {
    fn is_valid_image(&self, url: &str) -> bool;
}

/// Validates images by fetching them and sniffing the payload.
///
/// A candidate passes when its bytes carry a known image signature
/// (PNG, JPEG, GIF, or ICO - the formats favicons are served in).
/// The content-type header alone is not trusted.
pub struct HttpImageValidator {
    client: reqwest::blocking::Client,
}

impl HttpImageValidator {
    /// Creates a validator with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl ImageValidator for HttpImageValidator {
    fn is_valid_image(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        let response = match self.client.get(url).send() {
            Ok(r) => r,
            Err(err) => {
                debug!(url, error = %err, "image probe request failed");
                return false;
            }
        };
        if !response.status().is_success() {
            return false;
        }

        let body = match response.bytes() {
            Ok(b) => b,
            Err(err) => {
                debug!(url, error = %err, "image probe body read failed");
                return false;
            }
        };
        let head = &body[..body.len().min(MAX_PROBE_BYTES)];

        detect_image_content_type(head).is_some()
    }
}

/// Sniffs the content type of an image payload from its magic bytes.
///
/// Recognizes the favicon content-type set: PNG, JPEG, GIF, and ICO.
pub fn detect_image_content_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("image/png");
    }
    if data.starts_with(b"\xff\xd8\xff") {
        return Some("image/jpeg");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if data.starts_with(b"\x00\x00\x01\x00") {
        return Some("image/x-icon");
    }
    None
}
