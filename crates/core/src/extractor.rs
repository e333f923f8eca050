// ABOUTME: The extraction orchestrator: holds the field-to-rule registry and runs it over documents.
// ABOUTME: Merges per-field results into one Metadata record; site overrides replace rules per key.

//! Metadata extraction orchestration.
//!
//! [`MetadataExtractor`] owns one rule per field. A full pass runs every
//! rule against the document and projects found results onto a single
//! [`Metadata`] record. Missing fields are the norm, not an error: a rule
//! that finds nothing leaves its field at the zero value and the pass
//! continues.
//!
//! Site overrides are merged into an effective rule map per call
//! (`extract_metadata_for_site`), so a shared extractor never has to be
//! mutated; `apply_site_rules` exists for callers that prefer to dedicate
//! an extractor instance to one site.

use std::collections::HashMap;
use std::sync::Arc;

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::image::ImageValidator;
use crate::metadata::Metadata;
use crate::rules::{fields, ExtractResult, Rule};
use crate::sites::Site;

/// Runs the per-field rules over parsed documents.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    rules: HashMap<String, Rule>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MetadataExtractor {
    /// Creates an extractor with the default rules for every field.
    ///
    /// `validator` backs the favicon fallback probe; pass `None` to disable
    /// the probe (unit tests, offline use).
    pub fn new(validator: Option<Arc<dyn ImageValidator>>) -> Self {
        Self {
            rules: fields::default_rules(validator),
        }
    }

    /// The keys of all registered rules.
    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }

    /// Replaces this extractor's rules with the site's overrides, in place.
    ///
    /// Prefer [`MetadataExtractor::extract_metadata_for_site`] when the same
    /// extractor serves documents from many domains.
    pub fn apply_site_rules(&mut self, site: &Site) {
        for (key, rule) in site.rules() {
            self.rules.insert(key.clone(), rule.clone());
        }
    }

    /// Extracts metadata using the default rules.
    pub fn extract_metadata(&self, doc: &Html, target: &Url) -> Result<Metadata, Error> {
        self.run_rules(&self.rules, doc, target)
    }

    /// Extracts metadata with the site's overrides layered over the default
    /// rules for this call only.
    pub fn extract_metadata_for_site(
        &self,
        doc: &Html,
        target: &Url,
        site: &Site,
    ) -> Result<Metadata, Error> {
        let mut effective = self.rules.clone();
        for (key, rule) in site.rules() {
            effective.insert(key.clone(), rule.clone());
        }
        self.run_rules(&effective, doc, target)
    }

    /// Runs a single named rule, for callers that want to re-extract one
    /// field independent of a full pass.
    pub fn extract_rule_by_key(
        &self,
        doc: &Html,
        target: &Url,
        key: &str,
    ) -> Result<ExtractResult, Error> {
        let rule = self
            .rules
            .get(key)
            .ok_or_else(|| Error::UnknownRule(key.to_string()))?;
        rule.extract(doc, target)
    }

    fn run_rules(
        &self,
        rules: &HashMap<String, Rule>,
        doc: &Html,
        target: &Url,
    ) -> Result<Metadata, Error> {
        let mut meta = Metadata {
            html: doc.root_element().html(),
            ..Default::default()
        };

        for (key, rule) in rules {
            match rule.extract(doc, target) {
                Ok(result) if result.found() => result.apply(key, target, &mut meta),
                Ok(_) => {}
                Err(err) if err.is_value_not_found() => {
                    debug!(field = %key, "no value found");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(meta)
    }
}
