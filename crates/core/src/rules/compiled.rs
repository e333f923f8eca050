// ABOUTME: Pre-compiled CSS selector cache for repeated DOM queries.
// ABOUTME: Compiles each selector string once and reuses it across extraction passes.

//! Selector caching for efficient repeated DOM queries.
//!
//! The same small set of selector strings is evaluated against every
//! document, and parsing a CSS selector is expensive relative to matching
//! it. This module compiles each selector once into a process-wide cache;
//! invalid selectors are cached as `None` so they are only rejected once.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

/// Thread-safe cache of compiled CSS selectors.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Selector)` if the selector is valid, `None` if invalid.
/// Subsequent calls with the same selector string return the cached result.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    // Fast path: check read lock for cached value
    {
        let cache = SELECTOR_CACHE.read().unwrap();
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    // Slow path: compile and cache
    let compiled = Selector::parse(css).ok();
    let mut cache = SELECTOR_CACHE.write().unwrap();
    // Another thread may have inserted while we compiled
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}
