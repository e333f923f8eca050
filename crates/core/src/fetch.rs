// ABOUTME: Pluggable HTML fetching with SSRF protection, size limits, and charset decoding.
// ABOUTME: Fetcher trait plus the StandardFetcher implementation on a blocking HTTP client.

//! HTML fetching.
//!
//! The extraction engine itself never touches the network; fetching is a
//! pluggable collaborator behind the [`Fetcher`] trait. [`StandardFetcher`]
//! is the plain HTTP implementation: scheme and private-address checks,
//! a content-length cap, and charset-aware decoding of the body.

use std::collections::HashMap;
use std::net::{IpAddr, ToSocketAddrs};

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Returns true when the response looks like an HTML document.
    ///
    /// A missing content-type header counts as HTML; servers that omit it
    /// are overwhelmingly serving pages.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => ct.contains("html"),
            None => true,
        }
    }

    /// Decodes the body as UTF-8 text, honoring the charset in the
    /// content-type header and falling back to encoding detection.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Fetches HTML pages for the parse facade.
pub trait Fetcher: Send + Sync {
    /// A short name identifying the fetcher in results and logs.
    fn name(&self) -> &str;

    /// Fetches the resource at the given URL.
    fn fetch(&self, url: &str) -> Result<FetchResult, Error>;
}

/// Plain HTTP fetcher.
pub struct StandardFetcher {
    client: reqwest::blocking::Client,
    allow_private_networks: bool,
}

impl StandardFetcher {
    /// Creates a fetcher with the given timeout and user agent.
    pub fn new(
        timeout: std::time::Duration,
        user_agent: &str,
        allow_private_networks: bool,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            allow_private_networks,
        }
    }
}

impl Fetcher for StandardFetcher {
    fn name(&self) -> &str {
        "standard"
    }

    fn fetch(&self, url: &str) -> Result<FetchResult, Error> {
        if url.is_empty() {
            return Err(Error::InvalidUrl("empty URL".to_string()));
        }
        let parsed = Url::parse(url).map_err(Error::invalid_url)?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::InvalidUrl(format!(
                "scheme must be http or https, got {scheme}"
            )));
        }

        if !self.allow_private_networks {
            check_public_host(&parsed)?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::fetch(format!("request failed: {e}")))?;

        // Re-check after redirects: the final host must also be public.
        if !self.allow_private_networks {
            check_public_host(response.url())?;
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(Error::fetch("content too large"));
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|value| (k.to_string(), value.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .map_err(|e| Error::fetch(format!("failed to read body: {e}")))?;
        if body.len() > MAX_CONTENT_LENGTH {
            return Err(Error::fetch("content too large"));
        }

        if !(200..300).contains(&status) {
            return Err(Error::fetch(format!("HTTP status {status}")));
        }

        debug!(url, status, "fetched page");
        Ok(FetchResult {
            status,
            url: url.to_string(),
            final_url,
            content_type,
            headers,
            body,
        })
    }
}

/// Rejects URLs whose host is, or resolves to, a private or reserved
/// address.
fn check_public_host(parsed: &Url) -> Result<(), Error> {
    let host = match parsed.host_str() {
        Some(h) => h,
        None => return Err(Error::InvalidUrl("URL has no host".to_string())),
    };

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(Error::fetch("private addresses are not allowed"));
        }
        return Ok(());
    }

    let port = parsed
        .port()
        .unwrap_or(if parsed.scheme() == "https" { 443 } else { 80 });
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::fetch(format!("DNS lookup failed: {e}")))?;
    for addr in addrs {
        if is_private_ip(&addr.ip()) {
            return Err(Error::fetch("private addresses are not allowed"));
        }
    }
    Ok(())
}

/// Check if an IP address is in a private/reserved range.
fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => {
            // RFC1918 private ranges
            let private_10: Ipv4Net = "10.0.0.0/8".parse().unwrap();
            let private_172: Ipv4Net = "172.16.0.0/12".parse().unwrap();
            let private_192: Ipv4Net = "192.168.0.0/16".parse().unwrap();
            // Loopback
            let loopback: Ipv4Net = "127.0.0.0/8".parse().unwrap();
            // Link-local
            let link_local: Ipv4Net = "169.254.0.0/16".parse().unwrap();

            private_10.contains(ip)
                || private_172.contains(ip)
                || private_192.contains(ip)
                || loopback.contains(ip)
                || link_local.contains(ip)
        }
        IpAddr::V6(ip) => {
            if ip.is_loopback() {
                return true;
            }
            // Unique local fc00::/7, link-local fe80::/10
            let unique_local: Ipv6Net = "fc00::/7".parse().unwrap();
            let link_local: Ipv6Net = "fe80::/10".parse().unwrap();

            unique_local.contains(ip) || link_local.contains(ip)
        }
    }
}

/// Decode body bytes to a String using the charset from the content-type
/// header, or detection when no usable charset is declared.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn fetcher() -> StandardFetcher {
        StandardFetcher::new(Duration::from_secs(5), "unfurl-test", true)
    }

    #[test]
    fn test_fetch_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><head><title>Hi</title></head></html>");
        });

        let result = fetcher().fetch(&server.url("/page")).expect("fetch");
        mock.assert();

        assert_eq!(result.status, 200);
        assert!(result.is_html());
        assert!(result.text_utf8().contains("<title>Hi</title>"));
    }

    #[test]
    fn test_fetch_non_200_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404).body("not found");
        });

        let err = fetcher().fetch(&server.url("/gone")).unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn test_fetch_rejects_bad_scheme() {
        let err = fetcher().fetch("ftp://example.com/x").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_fetch_rejects_empty_url() {
        let err = fetcher().fetch("").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_private_ip_blocked_by_default() {
        let server = MockServer::start();
        let guarded = StandardFetcher::new(Duration::from_secs(5), "unfurl-test", false);

        let url = format!("http://127.0.0.1:{}/page", server.port());
        let err = guarded.fetch(&url).unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn test_is_html_detection() {
        let result = FetchResult {
            status: 200,
            url: String::new(),
            final_url: String::new(),
            content_type: Some("application/json".to_string()),
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert!(!result.is_html());

        let html = FetchResult {
            content_type: Some("text/html; charset=utf-8".to_string()),
            ..result.clone()
        };
        assert!(html.is_html());

        let unknown = FetchResult {
            content_type: None,
            ..result
        };
        assert!(unknown.is_html());
    }

    #[test]
    fn test_is_private_ip_v4() {
        assert!(is_private_ip(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_ip(&"192.168.0.1".parse().unwrap()));
        assert!(is_private_ip(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"169.254.0.1".parse().unwrap()));

        assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip(&"172.32.0.1".parse().unwrap()));
    }

    #[test]
    fn test_is_private_ip_v6() {
        assert!(is_private_ip(&"::1".parse().unwrap()));
        assert!(is_private_ip(&"fc00::1".parse().unwrap()));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_decode_body_latin1_detected() {
        // "café" in ISO-8859-1; no charset header, detection kicks in.
        let bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        let decoded = decode_body(bytes, None);
        assert_eq!(decoded, "café");
    }
}
