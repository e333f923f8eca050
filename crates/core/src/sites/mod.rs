// ABOUTME: Site-specific rule overrides and the domain-keyed site registry.
// ABOUTME: A Site supplies replacement rules for specific fields on specific domains.

//! Site overrides.
//!
//! Some domains are structured enough (or weird enough) that the generic
//! heuristics lose to a handful of hand-picked selectors. A [`Site`] carries
//! replacement rules for individual fields; the [`SiteRegistry`] maps
//! normalized domains to sites. Overrides replace the default rule for a
//! field wholesale - they never combine with it.

pub mod youtube;

use std::collections::HashMap;

use crate::rules::Rule;
use crate::urls::normalize_domain;

/// Replacement rules for one domain.
#[derive(Debug, Clone)]
pub struct Site {
    domain_key: String,
    rules: HashMap<String, Rule>,
}

impl Site {
    /// Creates a site keyed by its normalized domain (no scheme, no `www.`).
    pub fn new(domain_key: impl Into<String>) -> Self {
        Self {
            domain_key: normalize_domain(&domain_key.into()),
            rules: HashMap::new(),
        }
    }

    /// Adds a replacement rule for a field key.
    pub fn with_rule(mut self, key: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    /// The domain this site matches.
    pub fn domain_key(&self) -> &str {
        &self.domain_key
    }

    /// The field rules this site overrides.
    pub fn rules(&self) -> &HashMap<String, Rule> {
        &self.rules
    }
}

/// Maps normalized domains to their site overrides.
///
/// Lookup is a direct key match on the normalized hostname; there is no
/// wildcard or suffix matching. Sites are registered at startup and read
/// per extraction call.
#[derive(Debug, Default, Clone)]
pub struct SiteRegistry {
    map: HashMap<String, Site>,
}

impl SiteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the built-in sites.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(youtube::youtube());
        registry
    }

    /// Registers a site, overwriting any previous entry for its domain.
    pub fn register(&mut self, site: Site) {
        self.map.insert(site.domain_key().to_string(), site);
    }

    /// Looks up a site by hostname (normalized before matching).
    pub fn find(&self, host: &str) -> Option<&Site> {
        self.map.get(&normalize_domain(host))
    }

    /// Looks up the site matching a target URL's host.
    pub fn find_for_url(&self, url: &url::Url) -> Option<&Site> {
        url.host_str().and_then(|host| self.find(host))
    }

    /// Returns the number of registered sites.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no sites are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
