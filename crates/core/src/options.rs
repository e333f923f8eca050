// ABOUTME: Configuration options and builder for the Unfurl facade.
// ABOUTME: Timeout, user agent, network policy, favicon probe toggle, and injectable collaborators.

use std::sync::Arc;
use std::time::Duration;

use crate::client::Unfurl;
use crate::fetch::Fetcher;
use crate::image::ImageValidator;

/// Configuration for an [`Unfurl`] instance.
#[derive(Clone)]
pub struct Options {
    /// Timeout applied to the standard fetcher and the favicon probe.
    pub timeout: Duration,
    pub user_agent: String,
    /// Allow fetching from private/reserved addresses (off by default).
    pub allow_private_networks: bool,
    /// Probe `{scheme}://{host}/favicon.ico` when no icon link is found.
    pub favicon_probe: bool,
    /// Custom image validator for the favicon probe. When unset and the
    /// probe is enabled, an HTTP validator is constructed from `timeout`.
    pub validator: Option<Arc<dyn ImageValidator>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "unfurl/0.1".to_string(),
            allow_private_networks: false,
            favicon_probe: true,
            validator: None,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("allow_private_networks", &self.allow_private_networks)
            .field("favicon_probe", &self.favicon_probe)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Builder for [`Unfurl`] instances.
#[derive(Default)]
pub struct UnfurlBuilder {
    opts: Options,
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl UnfurlBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allows or disallows requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Enables or disables the favicon fallback probe.
    pub fn favicon_probe(mut self, enabled: bool) -> Self {
        self.opts.favicon_probe = enabled;
        self
    }

    /// Injects a custom image validator for the favicon probe.
    pub fn validator(mut self, validator: Arc<dyn ImageValidator>) -> Self {
        self.opts.validator = Some(validator);
        self
    }

    /// Adds a fetcher. Fetchers are tried in registration order; when none
    /// are added, the standard HTTP fetcher is used.
    pub fn fetcher(mut self, fetcher: Box<dyn Fetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    /// Builds the configured [`Unfurl`] instance.
    pub fn build(self) -> Unfurl {
        Unfurl::new(self.opts, self.fetchers)
    }
}
