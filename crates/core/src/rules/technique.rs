// ABOUTME: The extraction primitives: meta, attribute, CSS text, JSON-LD path, time, readable.
// ABOUTME: Each technique is a pure function of (document, target URL, selectors) returning an ExtractResult.

//! Extraction techniques.
//!
//! A technique is one way of pulling a value out of a document. Strategies
//! pair a technique with an ordered list of selector candidates; the
//! technique tries each selector in turn and reports the first hit.
//!
//! Key behaviors:
//! - Selectors are tried in order; the first selector with a usable match wins.
//! - Invalid selectors are skipped, not fatal.
//! - The meta technique rejects empty `content=""` attributes.
//! - Malformed JSON-LD blocks are skipped silently.

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::rules::compiled::get_or_compile;
use crate::rules::result::{ExtractResult, SelectorInfo};

/// One extraction technique, selected per strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Technique {
    /// Read the `content` attribute of a meta tag, rejecting empty values.
    Meta,
    /// Read the named attribute off the first matching node.
    Attr(String),
    /// Take the first text child of the first matching node.
    CssText,
    /// Walk dotted paths through `application/ld+json` script blocks.
    JsonLd,
    /// Read the `datetime` attribute (for `<time>` elements).
    Time,
    /// Delegate to the readable-content algorithm.
    Readable,
}

impl Technique {
    /// Convenience constructor for attribute extraction.
    pub fn attr(name: impl Into<String>) -> Self {
        Technique::Attr(name.into())
    }

    /// Runs this technique against the document.
    pub fn run(&self, doc: &Html, target: &Url, selectors: &[String]) -> ExtractResult {
        match self {
            Technique::Meta => extract_meta(doc, selectors),
            Technique::Attr(name) => extract_attr(doc, selectors, name, false),
            Technique::CssText => extract_css_text(doc, selectors),
            Technique::JsonLd => extract_json_ld(doc, selectors),
            Technique::Time => extract_attr(doc, selectors, "datetime", false),
            Technique::Readable => extract_readable(doc, target),
        }
    }

    /// The attribute this technique reads, when it reads one.
    pub(crate) fn attr_name(&self) -> Option<&str> {
        match self {
            Technique::Meta => Some("content"),
            Technique::Attr(name) => Some(name),
            Technique::Time => Some("datetime"),
            _ => None,
        }
    }
}

/// Tries each selector in order and reads the named attribute off the first
/// matching node. A matching node without the attribute, or with a
/// whitespace-only value, falls through to the next selector.
fn extract_attr(doc: &Html, selectors: &[String], attr: &str, in_meta: bool) -> ExtractResult {
    for sel_str in selectors {
        let sel = match get_or_compile(sel_str) {
            Some(s) => s,
            None => continue,
        };

        if let Some(el) = doc.select(&sel).next() {
            if let Some(value) = el.value().attr(attr) {
                if !value.trim().is_empty() {
                    return ExtractResult::single(
                        value,
                        SelectorInfo::new(sel_str.clone(), attr, in_meta),
                    );
                }
            }
        }
    }
    ExtractResult::NotFound
}

/// Attribute extraction specialized to meta tags: reads `content`, trims,
/// and treats an empty value as not found. Guards against pages that ship
/// `<meta property="og:title" content="">`.
fn extract_meta(doc: &Html, selectors: &[String]) -> ExtractResult {
    match extract_attr(doc, selectors, "content", true) {
        ExtractResult::Single { value, info } => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                ExtractResult::NotFound
            } else {
                ExtractResult::single(trimmed, info)
            }
        }
        other => other,
    }
}

/// Tries each selector in order and takes the first text child of the first
/// matching node. Nodes without usable text fall through to the next
/// selector.
fn extract_css_text(doc: &Html, selectors: &[String]) -> ExtractResult {
    for sel_str in selectors {
        let sel = match get_or_compile(sel_str) {
            Some(s) => s,
            None => continue,
        };

        if let Some(el) = doc.select(&sel).next() {
            for child in el.children() {
                if let Some(text) = child.value().as_text() {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        return ExtractResult::single(
                            trimmed,
                            SelectorInfo::new(sel_str.clone(), "text", false),
                        );
                    }
                }
            }
        }
    }
    ExtractResult::NotFound
}

/// Scans `<script type="application/ld+json">` blocks in document order and
/// walks each dotted-path selector (e.g. `author.name`) through the parsed
/// object. At each path segment: descend into objects, return strings
/// immediately, abandon the selector otherwise. Malformed blocks are skipped.
fn extract_json_ld(doc: &Html, selectors: &[String]) -> ExtractResult {
    let script_sel = match get_or_compile(r#"script[type="application/ld+json"]"#) {
        Some(s) => s,
        None => return ExtractResult::NotFound,
    };

    for script in doc.select(&script_sel) {
        let raw: String = script.text().collect();
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(err) => {
                debug!(error = %err, "skipping malformed JSON-LD block");
                continue;
            }
        };

        let obj = match value.as_object() {
            Some(o) => o,
            None => continue,
        };

        for selector in selectors {
            let mut current = obj;
            for key in selector.split('.') {
                match current.get(key) {
                    Some(serde_json::Value::Object(next)) => current = next,
                    Some(serde_json::Value::String(s)) => {
                        return ExtractResult::single(
                            s.clone(),
                            SelectorInfo::new(selector.clone(), "json-ld", false),
                        );
                    }
                    _ => break,
                }
            }
        }
    }
    ExtractResult::NotFound
}

/// Runs the readable-content delegate over the whole document.
fn extract_readable(doc: &Html, target: &Url) -> ExtractResult {
    match crate::readable::extract_readable(doc, target) {
        Some(value) => {
            ExtractResult::readable(value, SelectorInfo::new("readable", "readable", false))
        }
        None => ExtractResult::NotFound,
    }
}
