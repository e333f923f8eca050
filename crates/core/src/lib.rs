// ABOUTME: Main library entry point for the unfurl metadata extraction engine.
// ABOUTME: Re-exports the public API: Unfurl facade, extractor, rules, sites, fetchers, metadata.

//! unfurl-core - rule-based metadata extraction from HTML pages.
//!
//! The engine resolves a fixed set of metadata fields (title, author, date,
//! canonical URL, favicon, feed links, lead image, readable article body,
//! ...) by walking an ordered list of extraction strategies per field
//! against a parsed document. Higher-quality signals (JSON-LD, Open Graph)
//! are tried before noisier CSS heuristics, and individual domains can
//! override the rules for specific fields.
//!
//! # Example
//!
//! ```no_run
//! use unfurl_core::Unfurl;
//!
//! fn main() -> Result<(), unfurl_core::Error> {
//!     let unfurl = Unfurl::builder().build();
//!     let page = unfurl.fetch_and_parse("https://example.com/article")?;
//!     println!("{} ({})", page.metadata.title, page.metadata.canonical_url);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod image;
pub mod metadata;
pub mod normalize;
pub mod options;
pub mod readable;
pub mod rules;
pub mod sites;
pub mod urls;

pub use crate::client::{Fetched, Unfurl};
pub use crate::error::Error;
pub use crate::extractor::MetadataExtractor;
pub use crate::fetch::{FetchResult, Fetcher, StandardFetcher};
pub use crate::image::{HttpImageValidator, ImageValidator};
pub use crate::metadata::Metadata;
pub use crate::options::{Options, UnfurlBuilder};
pub use crate::rules::{
    ExtractResult, ReadableValue, Rule, RuleKind, SelectorInfo, Strategy, Technique,
};
pub use crate::sites::{Site, SiteRegistry};
