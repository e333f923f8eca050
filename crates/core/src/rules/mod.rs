// ABOUTME: The rule engine: strategies, rules, and priority-ordered resolution.
// ABOUTME: A rule walks its strategies in declaration order and stops at the first hit.

//! Field extraction rules.
//!
//! A [`Strategy`] pairs one extraction [`Technique`] with an ordered list of
//! selector candidates. A [`Rule`] is an ordered list of strategies for one
//! metadata field; resolution short-circuits at the first strategy that
//! finds a value. Strategy order is significant: it encodes a quality
//! ranking (structured data and Open Graph tags before bare CSS
//! heuristics), so earlier strategies always win over later ones no matter
//! where their matches sit in the document.
//!
//! Four fields need behavior beyond first-match resolution (canonical URL,
//! favicon, feeds, site name); [`RuleKind`] selects that post-processing.

pub mod compiled;
pub mod fields;
mod result;
mod technique;

pub use result::{ExtractResult, ReadableValue, SelectorInfo};
pub use technique::Technique;

use std::sync::Arc;

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::image::ImageValidator;
use crate::urls::fix_relative_path;

/// One heuristic for finding a field's value: a technique plus the selector
/// candidates to try with it.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub selectors: Vec<String>,
    pub technique: Technique,
}

impl Strategy {
    pub fn new(technique: Technique, selectors: &[&str]) -> Self {
        Self {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            technique,
        }
    }
}

/// Selects the per-field post-processing a rule applies after (or instead
/// of) plain first-match resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleKind {
    /// First-match resolution only.
    #[default]
    Standard,
    /// Absolutize the winner and fall back to the target URL itself.
    Canonical,
    /// Probe `/favicon.ico` when no icon link is present.
    Favicon,
    /// Aggregate every matching link across all strategies.
    Feed,
    /// Fall back to the bare domain of the target URL.
    SiteName,
}

/// The full ordered set of strategies for one metadata field.
#[derive(Clone)]
pub struct Rule {
    strategies: Vec<Strategy>,
    kind: RuleKind,
    validator: Option<Arc<dyn ImageValidator>>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("strategies", &self.strategies)
            .field("kind", &self.kind)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl Rule {
    /// Creates a standard first-match rule.
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self {
            strategies,
            kind: RuleKind::Standard,
            validator: None,
        }
    }

    /// Creates a rule with field-specific post-processing.
    pub fn with_kind(strategies: Vec<Strategy>, kind: RuleKind) -> Self {
        Self {
            strategies,
            kind,
            validator: None,
        }
    }

    /// Attaches an image validator, used by the favicon fallback probe.
    /// Without one the probe is skipped entirely.
    pub fn with_validator(mut self, validator: Option<Arc<dyn ImageValidator>>) -> Self {
        self.validator = validator;
        self
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Extracts a value from the document.
    ///
    /// Walks the strategies in declaration order and returns the first found
    /// result; `Err(Error::ValueNotFound)` when every strategy misses and no
    /// field-specific fallback applies.
    pub fn extract(&self, doc: &Html, target: &Url) -> Result<ExtractResult, Error> {
        match self.kind {
            RuleKind::Standard => self.extract_first(doc, target),
            RuleKind::Canonical => self.extract_canonical(doc, target),
            RuleKind::Favicon => self.extract_favicon(doc, target),
            RuleKind::Feed => self.extract_feed(doc, target),
            RuleKind::SiteName => self.extract_site_name(doc, target),
        }
    }

    /// First-match resolution across the strategy list.
    fn extract_first(&self, doc: &Html, target: &Url) -> Result<ExtractResult, Error> {
        for strategy in &self.strategies {
            let result = strategy.technique.run(doc, target, &strategy.selectors);
            if result.found() {
                return Ok(result);
            }
        }
        Err(Error::ValueNotFound)
    }

    /// Canonical URL resolution.
    ///
    /// A found value that is not already absolute gets the target's scheme
    /// and host prepended, and the in-meta flag is recomputed from the
    /// winning attribute. When nothing matches, the target URL itself is the
    /// canonical URL; this rule never reports a miss.
    fn extract_canonical(&self, doc: &Html, target: &Url) -> Result<ExtractResult, Error> {
        match self.extract_first(doc, target) {
            Ok(ExtractResult::Single { value, info }) => {
                let in_meta = info.attr == "content";
                let absolute = if value.starts_with("http") {
                    value
                } else {
                    fix_relative_path(target, &value)
                };
                Ok(ExtractResult::single(
                    absolute,
                    SelectorInfo::new(info.selector, info.attr, in_meta),
                ))
            }
            Ok(other) => Ok(other),
            Err(Error::ValueNotFound) => Ok(ExtractResult::single(
                target.as_str(),
                SelectorInfo::new("target_url", "href", false),
            )),
            Err(err) => Err(err),
        }
    }

    /// Favicon resolution with `/favicon.ico` fallback.
    ///
    /// When no icon link matched and a validator is configured, probes the
    /// conventional location and accepts it only if it resolves to a real
    /// image. Probe failures surface as ValueNotFound, never as hard errors.
    fn extract_favicon(&self, doc: &Html, target: &Url) -> Result<ExtractResult, Error> {
        if let Ok(result) = self.extract_first(doc, target) {
            return Ok(result);
        }

        let validator = match &self.validator {
            Some(v) => v,
            None => return Err(Error::ValueNotFound),
        };
        let host = match target.host_str() {
            Some(h) => h,
            None => return Err(Error::ValueNotFound),
        };

        let favicon_url = format!("{}://{}/favicon.ico", target.scheme(), host);
        if validator.is_valid_image(&favicon_url) {
            Ok(ExtractResult::single(
                favicon_url,
                SelectorInfo::new("favicon.ico", "href", false),
            ))
        } else {
            debug!(url = %favicon_url, "favicon probe found no usable image");
            Err(Error::ValueNotFound)
        }
    }

    /// Feed discovery.
    ///
    /// Unlike the other fields this does not stop at the first hit: every
    /// strategy runs and every matching link contributes, whatever its MIME
    /// subtype. Collected URLs are absolutized; duplicates are kept.
    fn extract_feed(&self, doc: &Html, target: &Url) -> Result<ExtractResult, Error> {
        let mut feeds = Vec::new();

        for strategy in &self.strategies {
            let attr = strategy.technique.attr_name().unwrap_or("href");
            for sel_str in &strategy.selectors {
                let sel = match compiled::get_or_compile(sel_str) {
                    Some(s) => s,
                    None => continue,
                };
                for el in doc.select(&sel) {
                    if let Some(href) = el.value().attr(attr) {
                        if !href.trim().is_empty() {
                            feeds.push(fix_relative_path(target, href));
                        }
                    }
                }
            }
        }

        if feeds.is_empty() {
            return Err(Error::ValueNotFound);
        }
        Ok(ExtractResult::multi(
            feeds,
            SelectorInfo::new("feed", "href", false),
        ))
    }

    /// Site name resolution with a bare-domain fallback.
    fn extract_site_name(&self, doc: &Html, target: &Url) -> Result<ExtractResult, Error> {
        if let Ok(result) = self.extract_first(doc, target) {
            return Ok(result);
        }

        match target.host_str() {
            Some(host) => {
                let domain = crate::urls::normalize_domain(host);
                Ok(ExtractResult::single(
                    domain,
                    SelectorInfo::new("domain", "", false),
                ))
            }
            None => Err(Error::ValueNotFound),
        }
    }
}
