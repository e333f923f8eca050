// ABOUTME: Metadata struct holding all extracted page data.
// ABOUTME: One field per extracted concept plus an open dynamic map for site-specific keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The metadata extracted from a single page.
///
/// Every field starts at its zero value and is filled in as the field's rule
/// resolves; fields with no match in the document are simply left empty.
/// `dynamic` collects values for site-override keys outside the fixed set.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Metadata {
    pub author: String,
    pub canonical_url: String,
    /// The final URL with known tracking query parameters removed.
    pub clean_url: String,
    pub date: String,
    pub description: String,
    pub favicon_url: String,
    pub feed_urls: Vec<String>,
    /// The page HTML as re-serialized from the parsed document.
    pub html: String,
    pub is_readable: bool,
    pub lang: String,
    /// True when the lead image was found in a meta tag rather than an <img>.
    pub lead_image_in_meta: bool,
    pub lead_image_url: String,
    pub publisher: String,
    pub readable_byline: String,
    pub readable_excerpt: String,
    pub readable_html: String,
    pub readable_image: String,
    pub readable_lang: String,
    pub readable_length: usize,
    pub readable_site_name: String,
    pub readable_text: String,
    pub readable_title: String,
    pub site_name: String,
    pub title: String,
    pub url: String,
    /// Values extracted for keys outside the fixed field set.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dynamic: HashMap<String, serde_json::Value>,
}

impl Metadata {
    /// Returns true if no field carries a value.
    pub fn is_empty(&self) -> bool {
        self == &Metadata {
            html: self.html.clone(),
            ..Default::default()
        }
    }

    /// Returns true if at least one feed URL was discovered.
    pub fn has_feeds(&self) -> bool {
        !self.feed_urls.is_empty()
    }

    /// Returns true if a readable article body was extracted.
    pub fn has_readable_content(&self) -> bool {
        self.is_readable && !self.readable_text.is_empty()
    }
}
