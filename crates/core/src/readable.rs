// ABOUTME: Readable-content delegate: runs the external readability algorithm and packages its output.
// ABOUTME: Fills the gaps the algorithm does not cover (excerpt, byline, lang, lead image, site name) from the document head.

//! Readable article extraction.
//!
//! The heavy lifting (boilerplate removal, content scoring) is delegated to
//! the `readability` crate; this module wraps its output into a
//! [`ReadableValue`], sanitizes the article HTML, and derives the fields the
//! algorithm does not report: excerpt, byline, language, lead image, and
//! site name.

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::rules::compiled::get_or_compile;
use crate::rules::ReadableValue;
use crate::urls::fix_relative_path;

/// Excerpts longer than this are cut and marked with an ellipsis.
const MAX_EXCERPT_LEN: usize = 255;

/// Minimum text length before statistical language detection is attempted.
const MIN_LANG_TEXT_LEN: usize = 50;

/// Minimum confidence for accepting a statistically detected language.
const MIN_LANG_CONFIDENCE: f64 = 0.25;

/// Runs the readability algorithm over the document and assembles the
/// composite readable result. Returns `None` when the algorithm fails;
/// callers treat that as an ordinary per-field miss.
pub fn extract_readable(doc: &Html, target: &Url) -> Option<ReadableValue> {
    // Nothing to score on a document with no text at all.
    if doc.root_element().text().all(|t| t.trim().is_empty()) {
        return None;
    }

    let html = doc.root_element().html();

    let product = match readability::extractor::extract(&mut html.as_bytes(), target) {
        Ok(p) => p,
        Err(err) => {
            debug!(error = %err, "readable extraction failed");
            return None;
        }
    };

    let text = product.text;
    let sanitized_html = sanitize_article_html(&product.content);
    let excerpt = truncate_excerpt(&build_excerpt(doc, &text));
    let image = first_meta_content(
        doc,
        &[
            "meta[property='og:image']",
            "meta[name='twitter:image']",
            "meta[name='twitter:image:src']",
        ],
    )
    .map(|v| fix_relative_path(target, &v))
    .unwrap_or_default();
    let lang = detect_lang(doc, &text).unwrap_or_default();
    let byline = extract_byline(doc).unwrap_or_default();
    let site_name = extract_site_name(doc).unwrap_or_default();
    let length = text.chars().count();
    let is_readable = !text.trim().is_empty();

    Some(ReadableValue {
        excerpt,
        html: sanitized_html,
        text,
        image,
        lang,
        length,
        title: product.title,
        byline,
        site_name,
        is_readable,
    })
}

/// Sanitizes article HTML down to a plain content vocabulary.
fn sanitize_article_html(html: &str) -> String {
    let allowed_tags = [
        "p", "br", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
        "li", "blockquote", "pre", "code", "img", "a", "span", "div", "figure", "figcaption",
        "table", "thead", "tbody", "tr", "td", "th",
    ];

    let mut builder = ammonia::Builder::new();
    builder.tags(allowed_tags.iter().copied().collect());
    builder.add_tag_attributes("a", &["href"]);
    builder.add_tag_attributes("img", &["src", "alt", "width", "height"]);

    builder
        .url_schemes(["http", "https", "mailto"].iter().copied().collect())
        .clean(html)
        .to_string()
}

/// Prefers the page's own description meta tags for the excerpt, falling
/// back to the opening of the article text.
fn build_excerpt(doc: &Html, text: &str) -> String {
    if let Some(description) = first_meta_content(
        doc,
        &[
            "meta[property='og:description']",
            "meta[name='twitter:description']",
            "meta[name='description']",
        ],
    ) {
        return description;
    }
    text.trim().to_string()
}

fn truncate_excerpt(excerpt: &str) -> String {
    if excerpt.chars().count() > MAX_EXCERPT_LEN {
        let cut: String = excerpt.chars().take(MAX_EXCERPT_LEN).collect();
        format!("{}...", cut)
    } else {
        excerpt.to_string()
    }
}

/// Document language: `html[lang]`, then `og:locale`, then statistical
/// detection over the article text. Locale values are reduced to the
/// primary tag ("en-US" -> "en").
fn detect_lang(doc: &Html, text: &str) -> Option<String> {
    if let Some(sel) = get_or_compile("html") {
        if let Some(el) = doc.select(&sel).next() {
            if let Some(lang) = el.value().attr("lang") {
                let primary = primary_lang_tag(lang);
                if !primary.is_empty() {
                    return Some(primary);
                }
            }
        }
    }

    if let Some(locale) = first_meta_content(doc, &["meta[property='og:locale']"]) {
        let primary = primary_lang_tag(&locale);
        if !primary.is_empty() {
            return Some(primary);
        }
    }

    if text.trim().len() < MIN_LANG_TEXT_LEN {
        return None;
    }
    if let Some(info) = whatlang::detect(text) {
        if info.confidence() >= MIN_LANG_CONFIDENCE {
            return Some(lang_to_code(info.lang()));
        }
    }
    None
}

/// Reduces a locale string to its primary language tag.
fn primary_lang_tag(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Maps a detected language to a two-letter code where one exists.
fn lang_to_code(lang: whatlang::Lang) -> String {
    use whatlang::Lang;
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Rus => "ru".to_string(),
        Lang::Cmn => "zh".to_string(),
        Lang::Spa => "es".to_string(),
        Lang::Fra => "fr".to_string(),
        Lang::Deu => "de".to_string(),
        Lang::Jpn => "ja".to_string(),
        Lang::Kor => "ko".to_string(),
        Lang::Por => "pt".to_string(),
        Lang::Ita => "it".to_string(),
        Lang::Nld => "nl".to_string(),
        Lang::Pol => "pl".to_string(),
        Lang::Tur => "tr".to_string(),
        Lang::Swe => "sv".to_string(),
        Lang::Dan => "da".to_string(),
        Lang::Fin => "fi".to_string(),
        Lang::Heb => "he".to_string(),
        Lang::Ara => "ar".to_string(),
        Lang::Hin => "hi".to_string(),
        Lang::Tha => "th".to_string(),
        Lang::Vie => "vi".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

fn extract_byline(doc: &Html) -> Option<String> {
    if let Some(author) = first_meta_content(
        doc,
        &["meta[name='author']", "meta[property='article:author']"],
    ) {
        return Some(author);
    }

    // Visible byline elements
    for sel_str in [".byline", "[rel='author']", ".author"] {
        if let Some(sel) = get_or_compile(sel_str) {
            if let Some(el) = doc.select(&sel).next() {
                let text: String = el.text().collect::<Vec<_>>().join(" ");
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Site name from `og:site_name`, falling back to a "Title - Site" or
/// "Title | Site" suffix in the page title.
fn extract_site_name(doc: &Html) -> Option<String> {
    if let Some(name) = first_meta_content(doc, &["meta[property='og:site_name']"]) {
        return Some(name);
    }

    let sel = get_or_compile("title")?;
    let el = doc.select(&sel).next()?;
    let title: String = el.text().collect();
    if let Some(pos) = title.rfind(" - ") {
        return Some(title[pos + 3..].trim().to_string());
    }
    if let Some(pos) = title.rfind(" | ") {
        return Some(title[pos + 3..].trim().to_string());
    }
    None
}

/// Returns the trimmed `content` attribute of the first matching meta tag.
fn first_meta_content(doc: &Html, selectors: &[&str]) -> Option<String> {
    for sel_str in selectors {
        let sel = match get_or_compile(sel_str) {
            Some(s) => s,
            None => continue,
        };
        if let Some(el) = doc.select(&sel).next() {
            if let Some(content) = el.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARTICLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Deep Dive - Example Journal</title>
            <meta property="og:site_name" content="Example Journal">
            <meta name="author" content="Jane Doe">
            <meta property="og:image" content="/images/lead.jpg">
            <meta name="description" content="A short article description.">
        </head>
        <body>
            <article>
                <h1>Deep Dive</h1>
                <p>This is the first paragraph of the article body. It carries enough
                meaningful prose for the content scorer to pick it up as the main
                content of the page rather than boilerplate.</p>
                <p>A second paragraph continues the discussion with additional detail,
                giving the extraction algorithm a realistic amount of text to work
                with across multiple block elements.</p>
                <p>The third paragraph wraps up the argument and keeps the overall
                text length comfortably above any minimum thresholds.</p>
            </article>
        </body>
        </html>
    "#;

    fn target() -> Url {
        Url::parse("https://example.com/articles/deep-dive").unwrap()
    }

    #[test]
    fn test_extract_readable_populates_fields() {
        let doc = Html::parse_document(ARTICLE_HTML);
        let value = extract_readable(&doc, &target()).expect("readable extraction");

        assert!(value.is_readable);
        assert!(!value.text.trim().is_empty());
        assert!(value.length > 0);
        assert_eq!(value.excerpt, "A short article description.");
        assert_eq!(value.byline, "Jane Doe");
        assert_eq!(value.site_name, "Example Journal");
        assert_eq!(value.lang, "en");
        assert_eq!(value.image, "https://example.com/images/lead.jpg");
    }

    #[test]
    fn test_truncate_excerpt_long() {
        let long = "x".repeat(300);
        let truncated = truncate_excerpt(&long);
        assert_eq!(truncated.chars().count(), MAX_EXCERPT_LEN + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_excerpt_short_unchanged() {
        assert_eq!(truncate_excerpt("short"), "short");
    }

    #[test]
    fn test_primary_lang_tag() {
        assert_eq!(primary_lang_tag("en-US"), "en");
        assert_eq!(primary_lang_tag("FR_fr"), "fr");
        assert_eq!(primary_lang_tag("de"), "de");
        assert_eq!(primary_lang_tag(""), "");
    }

    #[test]
    fn test_site_name_from_title_suffix() {
        let doc = Html::parse_document(
            "<html><head><title>Some Post | The Daily Example</title></head><body></body></html>",
        );
        assert_eq!(
            extract_site_name(&doc),
            Some("The Daily Example".to_string())
        );
    }

    #[test]
    fn test_sanitize_article_html_strips_scripts() {
        let dirty = "<p>Keep</p><script>alert(1)</script><iframe src='x'></iframe>";
        let clean = sanitize_article_html(dirty);
        assert!(clean.contains("<p>Keep</p>"));
        assert!(!clean.contains("script"));
        assert!(!clean.contains("iframe"));
    }
}
