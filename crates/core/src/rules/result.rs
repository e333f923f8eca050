// ABOUTME: Extraction result types shared between extraction techniques and rules.
// ABOUTME: ExtractResult variants know how to project themselves onto the Metadata record.

use url::Url;

use crate::metadata::Metadata;
use crate::normalize::normalize;
use crate::urls::fix_relative_path;

/// Describes where an extracted value was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorInfo {
    /// The selector (or synthetic tag such as "domain" or "favicon.ico")
    /// that produced the value.
    pub selector: String,
    /// The attribute the value was read from ("text" for element text).
    pub attr: String,
    /// True when the value came from a <meta> tag's content attribute.
    pub in_meta: bool,
}

impl SelectorInfo {
    pub fn new(selector: impl Into<String>, attr: impl Into<String>, in_meta: bool) -> Self {
        Self {
            selector: selector.into(),
            attr: attr.into(),
            in_meta,
        }
    }
}

/// The composite output of the readable-content delegate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadableValue {
    pub excerpt: String,
    pub html: String,
    pub text: String,
    pub image: String,
    pub lang: String,
    pub length: usize,
    pub title: String,
    pub byline: String,
    pub site_name: String,
    pub is_readable: bool,
}

/// The result of running one extraction technique or rule.
///
/// Each variant knows how to project itself onto the output record via
/// [`ExtractResult::apply`]: single strings land in the field named by the
/// rule key, multi-value results populate the feed list, and readable
/// results fan out across the `readable_*` fields. Unrecognized keys go to
/// the record's dynamic map.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractResult {
    /// Nothing found.
    NotFound,
    /// One string value.
    Single { value: String, info: SelectorInfo },
    /// A found set of values (used for feed URLs).
    Multi {
        values: Vec<String>,
        info: SelectorInfo,
    },
    /// Composite readable-content result.
    Readable {
        value: ReadableValue,
        info: SelectorInfo,
    },
}

impl ExtractResult {
    pub fn single(value: impl Into<String>, info: SelectorInfo) -> Self {
        ExtractResult::Single {
            value: value.into(),
            info,
        }
    }

    pub fn multi(values: Vec<String>, info: SelectorInfo) -> Self {
        ExtractResult::Multi { values, info }
    }

    pub fn readable(value: ReadableValue, info: SelectorInfo) -> Self {
        ExtractResult::Readable { value, info }
    }

    /// Returns true if the extraction produced a usable value.
    ///
    /// A `Multi` result with an empty value set does not count as found.
    pub fn found(&self) -> bool {
        match self {
            ExtractResult::NotFound => false,
            ExtractResult::Single { .. } => true,
            ExtractResult::Multi { values, .. } => !values.is_empty(),
            ExtractResult::Readable { .. } => true,
        }
    }

    /// Returns the selector info for found results.
    pub fn selector_info(&self) -> Option<&SelectorInfo> {
        match self {
            ExtractResult::NotFound => None,
            ExtractResult::Single { info, .. } => Some(info),
            ExtractResult::Multi { info, .. } => Some(info),
            ExtractResult::Readable { info, .. } => Some(info),
        }
    }

    /// Returns the single string value, if this is a `Single` result.
    pub fn single_value(&self) -> Option<&str> {
        match self {
            ExtractResult::Single { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the value set, if this is a `Multi` result.
    pub fn multi_values(&self) -> Option<&[String]> {
        match self {
            ExtractResult::Multi { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Writes this result into the metadata record under the given rule key.
    ///
    /// `target` is the URL the document was fetched from, used to absolutize
    /// URL-valued fields.
    pub fn apply(&self, key: &str, target: &Url, meta: &mut Metadata) {
        match self {
            ExtractResult::NotFound => {}
            ExtractResult::Single { value, info } => {
                apply_single(key, value, info, target, meta)
            }
            ExtractResult::Multi { values, .. } => match key {
                "feed" => meta.feed_urls = values.clone(),
                _ => {
                    meta.dynamic
                        .insert(key.to_string(), serde_json::json!(values));
                }
            },
            ExtractResult::Readable { value, .. } => {
                meta.readable_excerpt = value.excerpt.clone();
                meta.readable_html = value.html.clone();
                meta.readable_text = value.text.clone();
                meta.readable_image = value.image.clone();
                meta.readable_lang = value.lang.clone();
                meta.readable_length = value.length;
                meta.readable_title = value.title.clone();
                meta.readable_byline = value.byline.clone();
                meta.readable_site_name = value.site_name.clone();
                meta.is_readable = value.is_readable;
            }
        }
    }
}

fn apply_single(key: &str, value: &str, info: &SelectorInfo, target: &Url, meta: &mut Metadata) {
    match key {
        "author" => meta.author = normalize(value),
        "canonical" => {
            let canonical = fix_relative_path(target, value);
            meta.canonical_url = canonical.clone();
            meta.url = canonical;
        }
        "date" => meta.date = normalize(value),
        "description" => meta.description = normalize(value),
        "favicon" => meta.favicon_url = fix_relative_path(target, value),
        "lang" => meta.lang = normalize(value),
        "lead_image" => {
            meta.lead_image_url = fix_relative_path(target, value);
            meta.lead_image_in_meta = info.in_meta;
        }
        "publisher" => meta.publisher = normalize(value),
        "site_name" => meta.site_name = normalize(value),
        "title" => meta.title = normalize(value),
        _ => {
            meta.dynamic
                .insert(key.to_string(), serde_json::json!(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target() -> Url {
        Url::parse("https://example.com/post").unwrap()
    }

    fn info() -> SelectorInfo {
        SelectorInfo::new("meta[name='author']", "content", true)
    }

    #[test]
    fn test_not_found_is_not_found() {
        assert!(!ExtractResult::NotFound.found());
        assert!(ExtractResult::NotFound.selector_info().is_none());
    }

    #[test]
    fn test_empty_multi_is_not_found() {
        let result = ExtractResult::multi(vec![], info());
        assert!(!result.found());
    }

    #[test]
    fn test_apply_author_normalizes() {
        let mut meta = Metadata::default();
        let result = ExtractResult::single("  <b>Jane Doe</b> ", info());
        result.apply("author", &target(), &mut meta);
        assert_eq!(meta.author, "Jane Doe");
    }

    #[test]
    fn test_apply_canonical_sets_url_too() {
        let mut meta = Metadata::default();
        let result = ExtractResult::single("https://example.com/canonical", info());
        result.apply("canonical", &target(), &mut meta);
        assert_eq!(meta.canonical_url, "https://example.com/canonical");
        assert_eq!(meta.url, "https://example.com/canonical");
    }

    #[test]
    fn test_apply_favicon_fixes_relative_path() {
        let mut meta = Metadata::default();
        let result = ExtractResult::single("/favicon.png", info());
        result.apply("favicon", &target(), &mut meta);
        assert_eq!(meta.favicon_url, "https://example.com/favicon.png");
    }

    #[test]
    fn test_apply_lead_image_records_meta_flag() {
        let mut meta = Metadata::default();
        let result = ExtractResult::single(
            "/hero.jpg",
            SelectorInfo::new("meta[property='og:image']", "content", true),
        );
        result.apply("lead_image", &target(), &mut meta);
        assert_eq!(meta.lead_image_url, "https://example.com/hero.jpg");
        assert!(meta.lead_image_in_meta);
    }

    #[test]
    fn test_apply_feed_multi() {
        let mut meta = Metadata::default();
        let result = ExtractResult::multi(
            vec![
                "https://example.com/rss".to_string(),
                "https://example.com/atom".to_string(),
            ],
            SelectorInfo::new("feed", "href", false),
        );
        result.apply("feed", &target(), &mut meta);
        assert_eq!(meta.feed_urls.len(), 2);
    }

    #[test]
    fn test_apply_unknown_key_goes_to_dynamic() {
        let mut meta = Metadata::default();
        let result = ExtractResult::single("abc123", info());
        result.apply("video_id", &target(), &mut meta);
        assert_eq!(
            meta.dynamic.get("video_id"),
            Some(&serde_json::json!("abc123"))
        );
    }

    #[test]
    fn test_apply_readable_populates_all_fields() {
        let mut meta = Metadata::default();
        let value = ReadableValue {
            excerpt: "An excerpt".to_string(),
            html: "<p>Body</p>".to_string(),
            text: "Body".to_string(),
            image: "https://example.com/lead.jpg".to_string(),
            lang: "en".to_string(),
            length: 4,
            title: "The Title".to_string(),
            byline: "Jane Doe".to_string(),
            site_name: "Example".to_string(),
            is_readable: true,
        };
        let result = ExtractResult::readable(value, SelectorInfo::new("readable", "readable", false));
        result.apply("readable", &target(), &mut meta);

        assert_eq!(meta.readable_excerpt, "An excerpt");
        assert_eq!(meta.readable_html, "<p>Body</p>");
        assert_eq!(meta.readable_text, "Body");
        assert_eq!(meta.readable_image, "https://example.com/lead.jpg");
        assert_eq!(meta.readable_lang, "en");
        assert_eq!(meta.readable_length, 4);
        assert_eq!(meta.readable_title, "The Title");
        assert_eq!(meta.readable_byline, "Jane Doe");
        assert_eq!(meta.readable_site_name, "Example");
        assert!(meta.is_readable);
    }
}
