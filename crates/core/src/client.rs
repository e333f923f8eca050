// ABOUTME: The Unfurl facade tying together fetchers, the extractor, and the site registry.
// ABOUTME: read_and_parse works on supplied HTML; fetch_and_parse pulls the page first.

//! The parse facade.
//!
//! [`Unfurl`] owns the collaborators a full extraction needs: one or more
//! [`Fetcher`]s, the [`MetadataExtractor`], and the [`SiteRegistry`]
//! (seeded with the built-in sites). Callers with HTML already in hand use
//! [`Unfurl::read_and_parse`]; [`Unfurl::fetch_and_parse`] goes to the
//! network first and also reports response envelope data.

use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::extractor::MetadataExtractor;
use crate::fetch::{FetchResult, Fetcher, StandardFetcher};
use crate::image::HttpImageValidator;
use crate::metadata::Metadata;
use crate::options::{Options, UnfurlBuilder};
use crate::sites::{Site, SiteRegistry};
use crate::urls::clean_url;

/// Extracted metadata together with the response envelope it came from.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub metadata: Metadata,
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub is_html: bool,
    pub fetcher_name: String,
}

/// The main entry point for fetching pages and extracting their metadata.
pub struct Unfurl {
    extractor: MetadataExtractor,
    fetchers: Vec<Box<dyn Fetcher>>,
    registry: SiteRegistry,
}

impl Unfurl {
    /// Creates a builder for configuring an instance.
    pub fn builder() -> UnfurlBuilder {
        UnfurlBuilder::new()
    }

    /// Creates an instance from options and fetchers.
    ///
    /// When the favicon probe is enabled and no validator was injected, an
    /// HTTP validator is constructed with the configured timeout. When no
    /// fetchers are given, the standard HTTP fetcher is used.
    pub fn new(opts: Options, mut fetchers: Vec<Box<dyn Fetcher>>) -> Self {
        let validator: Option<Arc<dyn crate::image::ImageValidator>> = if opts.favicon_probe {
            opts.validator
                .clone()
                .or_else(|| Some(Arc::new(HttpImageValidator::new(opts.timeout))))
        } else {
            None
        };

        if fetchers.is_empty() {
            fetchers.push(Box::new(StandardFetcher::new(
                opts.timeout,
                &opts.user_agent,
                opts.allow_private_networks,
            )));
        }

        Self {
            extractor: MetadataExtractor::new(validator),
            fetchers,
            registry: SiteRegistry::with_builtin(),
        }
    }

    /// Registers a site override, replacing any previous entry for its
    /// domain. Must happen before parsing for the override to take effect.
    pub fn register_site(&mut self, site: Site) {
        self.registry.register(site);
    }

    /// The site registry (built-in sites plus any registered ones).
    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// The underlying extractor, for single-rule re-extraction.
    pub fn extractor(&self) -> &MetadataExtractor {
        &self.extractor
    }

    /// Parses the given HTML and extracts metadata, resolving relative
    /// references against `target_url`. Site overrides registered for the
    /// target's domain are applied for this call.
    pub fn read_and_parse(&self, html: &str, target_url: &str) -> Result<Metadata, Error> {
        let target = Url::parse(target_url).map_err(Error::invalid_url)?;
        let doc = Html::parse_document(html);

        match self.registry.find_for_url(&target) {
            Some(site) => {
                debug!(domain = site.domain_key(), "applying site-specific rules");
                self.extractor.extract_metadata_for_site(&doc, &target, site)
            }
            None => self.extractor.extract_metadata(&doc, &target),
        }
    }

    /// Fetches the page at `target_url`, then parses and extracts.
    ///
    /// Fetchers are tried in order; the first success wins. Non-HTML
    /// responses are reported in the envelope without running extraction.
    pub fn fetch_and_parse(&self, target_url: &str) -> Result<Fetched, Error> {
        let (result, fetcher_name) = self.fetch_with_fallback(target_url)?;

        let is_html = result.is_html();
        if !is_html {
            return Ok(Fetched {
                metadata: Metadata::default(),
                status: result.status,
                final_url: result.final_url,
                content_type: result.content_type,
                is_html: false,
                fetcher_name,
            });
        }

        let html = result.text_utf8();
        let mut metadata = self.read_and_parse(&html, &result.final_url)?;
        metadata.clean_url = clean_url(&result.final_url);

        Ok(Fetched {
            metadata,
            status: result.status,
            final_url: result.final_url,
            content_type: result.content_type,
            is_html: true,
            fetcher_name,
        })
    }

    fn fetch_with_fallback(&self, target_url: &str) -> Result<(FetchResult, String), Error> {
        let mut last_err = Error::fetch("no fetchers configured");
        for fetcher in &self.fetchers {
            match fetcher.fetch(target_url) {
                Ok(result) => return Ok((result, fetcher.name().to_string())),
                Err(err) => {
                    warn!(fetcher = fetcher.name(), error = %err, "fetcher failed");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}
