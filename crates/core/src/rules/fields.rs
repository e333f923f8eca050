// ABOUTME: Default rule factories, one per metadata field.
// ABOUTME: Each factory declares that field's strategies in priority order (structured data first, CSS heuristics last).

//! Default field rules.
//!
//! One factory per metadata field. Strategy order within a factory is a
//! quality ranking: JSON-LD and Open Graph/meta signals come before
//! microdata and RDFa markup, and bare class-name CSS heuristics come last.
//! The `*_with` constructors take replacement strategies for site overrides
//! and tests.

use std::collections::HashMap;
use std::sync::Arc;

use crate::image::ImageValidator;
use crate::rules::{Rule, RuleKind, Strategy, Technique};

/// Rule for the page title.
pub fn title_rule() -> Rule {
    Rule::new(vec![
        Strategy::new(
            Technique::attr("content"),
            &[
                "meta[property='og:title']",
                "meta[name='twitter:title']",
                "meta[property='twitter:title']",
            ],
        ),
        Strategy::new(Technique::CssText, &["title"]),
        Strategy::new(Technique::JsonLd, &["headline"]),
        Strategy::new(
            Technique::CssText,
            &[
                ".post-title",
                ".entry-title",
                "h1[class*='title'] a",
                "h1[class*='title']",
            ],
        ),
    ])
}

/// Rule for the author byline.
pub fn author_rule() -> Rule {
    author_rule_with(default_author_strategies())
}

/// Author rule with replacement strategies (site overrides, tests).
pub fn author_rule_with(strategies: Vec<Strategy>) -> Rule {
    Rule::new(strategies)
}

fn default_author_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(Technique::JsonLd, &["author.name", "brand.name", "creator.name"]),
        Strategy::new(
            Technique::Meta,
            &[
                "meta[name='author']",
                "meta[property='article:author']",
                "meta[property='dc:creator']",
                "meta[property='schema:author']",
                "meta[itemprop='author']",
            ],
        ),
        Strategy::new(
            Technique::CssText,
            &[
                // RDFa
                "span[property='schema:author']",
                "div[typeof='schema:Person'] span[property='schema:name']",
                "span[property='dc:creator']",
                "div[typeof='dc:Person'] span[property='dc:name']",
                // Microdata
                "span[itemprop='author']",
                "div[itemtype='http://schema.org/Person'] span[itemprop='name']",
                // Common class or ID based markup
                "span.author",
                "a[rel='author']",
                "span#author",
            ],
        ),
    ]
}

/// Rule for the publication date.
pub fn date_rule() -> Rule {
    date_rule_with(default_date_strategies())
}

/// Date rule with replacement strategies (site overrides, tests).
pub fn date_rule_with(strategies: Vec<Strategy>) -> Rule {
    Rule::new(strategies)
}

fn default_date_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(
            Technique::JsonLd,
            &["datePublished", "dateCreated", "dateModified"],
        ),
        Strategy::new(
            Technique::Meta,
            &[
                "meta[property='article:published_time']",
                "meta[property*='published_time']",
                "meta[itemprop*='datePublished']",
                "meta[property='og:published_time']",
                "meta[name='article:published_time']",
                "meta[name='og:published_time']",
                "meta[property*='modified_time']",
                "meta[itemprop*='dateModified']",
                "meta[itemprop*='date']",
            ],
        ),
        Strategy::new(Technique::Time, &["time[itemprop*='date']", "time[datetime]"]),
        Strategy::new(
            Technique::CssText,
            &[
                ".post-date",
                ".entry-date",
                ".article-date",
                "[id*='date']",
                "[class*='date']",
                "[class*='time']",
            ],
        ),
    ]
}

/// Rule for the page description.
pub fn description_rule() -> Rule {
    Rule::new(vec![
        Strategy::new(
            Technique::Meta,
            &[
                "meta[property='og:description']",
                "meta[name='twitter:description']",
                "meta[property='twitter:description']",
                "meta[name='description']",
                "meta[itemprop='description']",
            ],
        ),
        Strategy::new(Technique::JsonLd, &["description", "articleBody"]),
        Strategy::new(
            Technique::CssText,
            &[
                ".post-description",
                ".entry-description",
                ".article-description",
                ".post-content p",
                ".entry-content p",
                ".article-content p",
                ".post-content",
                ".entry-content",
                ".article-content",
                ".post-body",
                ".entry-body",
                ".article-body",
                ".post",
                ".entry",
            ],
        ),
    ])
}

/// Rule for the canonical URL. Falls back to the target URL itself.
pub fn canonical_rule() -> Rule {
    Rule::with_kind(
        vec![
            Strategy::new(
                Technique::attr("content"),
                &[
                    "meta[property='og:url']",
                    "meta[name='twitter:url']",
                    "meta[property='twitter:url']",
                ],
            ),
            Strategy::new(
                Technique::attr("href"),
                &[
                    "link[rel='canonical']",
                    "link[rel='alternate'][hreflang='x-default']",
                ],
            ),
        ],
        RuleKind::Canonical,
    )
}

/// Rule for the favicon URL. Probes `/favicon.ico` through the given
/// validator when no icon link is present.
pub fn favicon_rule(validator: Option<Arc<dyn ImageValidator>>) -> Rule {
    Rule::with_kind(
        vec![Strategy::new(
            Technique::attr("href"),
            &[
                "link[rel='icon']",
                "link[rel='shortcut icon']",
                "link[rel='apple-touch-icon']",
                "link[rel='apple-touch-icon-precomposed']",
                "link[rel~='mask-icon']",
            ],
        )],
        RuleKind::Favicon,
    )
    .with_validator(validator)
}

/// Rule for feed discovery. One strategy per feed flavor so every flavor
/// contributes to the aggregate.
pub fn feed_rule() -> Rule {
    Rule::with_kind(
        vec![
            Strategy::new(Technique::attr("href"), &["link[type='application/rss+xml']"]),
            Strategy::new(Technique::attr("href"), &["link[type='application/feed+json']"]),
            Strategy::new(Technique::attr("href"), &["link[type='application/atom+xml']"]),
        ],
        RuleKind::Feed,
    )
}

/// Rule for the document language.
pub fn lang_rule() -> Rule {
    Rule::new(vec![
        Strategy::new(
            Technique::Meta,
            &["meta[property='og:locale']", "meta[itemprop='inLanguage']"],
        ),
        Strategy::new(Technique::attr("lang"), &["html"]),
    ])
}

/// Rule for the lead image.
pub fn lead_image_rule() -> Rule {
    Rule::new(vec![
        Strategy::new(
            Technique::Meta,
            &[
                "meta[property='og:image:secure_url']",
                "meta[property='og:image:url']",
                "meta[property='og:image']",
                "meta[name='og:image']",
                "meta[name='twitter:image:src']",
                "meta[property='twitter:image:src']",
                "meta[name='twitter:image']",
                "meta[property='twitter:image']",
                "meta[itemprop='image']",
            ],
        ),
        Strategy::new(
            Technique::attr("src"),
            &["img[src]:not([width='1']):not([height='1'])"],
        ),
        Strategy::new(
            Technique::attr("data-src"),
            &["img[data-src]:not([width='1']):not([height='1'])"],
        ),
        Strategy::new(
            Technique::attr("data-lazy-src"),
            &["img[data-lazy-src]:not([width='1']):not([height='1'])"],
        ),
    ])
}

/// Rule for the publisher name.
pub fn publisher_rule() -> Rule {
    Rule::new(vec![
        Strategy::new(Technique::JsonLd, &["publisher.name", "brand.name"]),
        Strategy::new(
            Technique::Meta,
            &[
                "meta[property='og:site_name']",
                "meta[name*='application-name']",
                "meta[name*='app-title']",
                "meta[property*='app_name']",
                "meta[name='publisher']",
                "meta[name='twitter:app:name:iphone']",
                "meta[property='twitter:app:name:iphone']",
                "meta[name='twitter:app:name:ipad']",
                "meta[property='twitter:app:name:ipad']",
                "meta[name='twitter:app:name:googleplay']",
                "meta[property='twitter:app:name:googleplay']",
            ],
        ),
        Strategy::new(
            Technique::CssText,
            &["#logo", ".logo", "a[class*='brand']", "[class*='brand']"],
        ),
        Strategy::new(
            Technique::attr("alt"),
            &["[class*='logo'] a img[alt]", "[class*='logo'] img[alt]"],
        ),
    ])
}

/// Rule for readable article content (delegate-backed).
pub fn readable_rule() -> Rule {
    Rule::new(vec![Strategy::new(Technique::Readable, &[])])
}

/// Rule for the site name. Falls back to the bare domain.
pub fn site_name_rule() -> Rule {
    Rule::with_kind(
        vec![Strategy::new(
            Technique::attr("content"),
            &[
                "meta[property='og:site_name']",
                "meta[name='og:site_name']",
                "meta[property='twitter:site_name']",
                "meta[name='twitter:site_name']",
                "meta[itemprop='name']",
                "meta[name='application-name']",
            ],
        )],
        RuleKind::SiteName,
    )
}

/// Builds the full default field-to-rule registry.
pub fn default_rules(validator: Option<Arc<dyn ImageValidator>>) -> HashMap<String, Rule> {
    let mut rules = HashMap::new();
    rules.insert("author".to_string(), author_rule());
    rules.insert("canonical".to_string(), canonical_rule());
    rules.insert("date".to_string(), date_rule());
    rules.insert("description".to_string(), description_rule());
    rules.insert("favicon".to_string(), favicon_rule(validator));
    rules.insert("feed".to_string(), feed_rule());
    rules.insert("lang".to_string(), lang_rule());
    rules.insert("lead_image".to_string(), lead_image_rule());
    rules.insert("publisher".to_string(), publisher_rule());
    rules.insert("readable".to_string(), readable_rule());
    rules.insert("site_name".to_string(), site_name_rule());
    rules.insert("title".to_string(), title_rule());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;
    use url::Url;

    fn target() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_default_rules_cover_all_fields() {
        let rules = default_rules(None);
        for key in [
            "author",
            "canonical",
            "date",
            "description",
            "favicon",
            "feed",
            "lang",
            "lead_image",
            "publisher",
            "readable",
            "site_name",
            "title",
        ] {
            assert!(rules.contains_key(key), "missing rule for {key}");
        }
        assert_eq!(rules.len(), 12);
    }

    #[test]
    fn test_title_prefers_og_over_title_element() {
        let doc = parse(
            r#"<html><head>
                <title>Element Title</title>
                <meta property="og:title" content="OG Title">
            </head></html>"#,
        );
        let result = title_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("OG Title"));
    }

    #[test]
    fn test_title_css_class_heuristic_last() {
        let doc = parse(r#"<html><body><h1 class="page-title">Heuristic Title</h1></body></html>"#);
        let result = title_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("Heuristic Title"));
    }

    #[test]
    fn test_author_json_ld_beats_meta() {
        let doc = parse(
            r#"<html><head>
                <script type="application/ld+json">{"author": {"name": "LD Author"}}</script>
                <meta name="author" content="Meta Author">
            </head></html>"#,
        );
        let result = author_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("LD Author"));
    }

    #[test]
    fn test_author_rdfa_span() {
        let doc =
            parse(r#"<html><body><span property="schema:author">John Schema</span></body></html>"#);
        let result = author_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("John Schema"));
    }

    #[test]
    fn test_date_meta_published_time() {
        let doc = parse(
            r#"<html><head><meta property="article:published_time" content="2022-10-11T15:04:05Z"></head></html>"#,
        );
        let result = date_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("2022-10-11T15:04:05Z"));
    }

    #[test]
    fn test_date_time_element_datetime() {
        let doc = parse(
            r#"<html><body><time datetime="2023-05-01T08:00:00Z">May 1</time></body></html>"#,
        );
        let result = date_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("2023-05-01T08:00:00Z"));
    }

    #[test]
    fn test_description_meta_empty_rejected() {
        let doc = parse(
            r#"<html><head>
                <meta property="og:description" content="">
                <meta name="description" content="Real description">
            </head></html>"#,
        );
        let result = description_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("Real description"));
    }

    #[test]
    fn test_lang_from_html_attribute() {
        let doc = parse(r#"<html lang="en-US"><head></head><body></body></html>"#);
        let result = lang_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("en-US"));
    }

    #[test]
    fn test_lead_image_meta_flag_set() {
        let doc = parse(
            r#"<html><head><meta property="og:image" content="https://example.com/a.jpg"></head></html>"#,
        );
        let result = lead_image_rule().extract(&doc, &target()).unwrap();
        assert!(result.selector_info().unwrap().in_meta);
    }

    #[test]
    fn test_lead_image_img_src_fallback() {
        let doc = parse(r#"<html><body><img src="/hero.jpg" alt=""></body></html>"#);
        let result = lead_image_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("/hero.jpg"));
        assert!(!result.selector_info().unwrap().in_meta);
    }

    #[test]
    fn test_lead_image_skips_tracking_pixel() {
        let doc = parse(
            r#"<html><body>
                <img src="/pixel.gif" width="1" height="1">
                <img src="/real.jpg">
            </body></html>"#,
        );
        let result = lead_image_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("/real.jpg"));
    }

    #[test]
    fn test_publisher_json_ld() {
        let doc = parse(
            r#"<html><head><script type="application/ld+json">{"publisher": {"name": "Example Media"}}</script></head></html>"#,
        );
        let result = publisher_rule().extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("Example Media"));
    }

    #[test]
    fn test_author_rule_with_replacement_strategies() {
        let doc = parse(r#"<html><body><div class="user-info">Channel Name</div></body></html>"#);
        let rule = author_rule_with(vec![Strategy::new(
            Technique::CssText,
            &["[class*='user-info']"],
        )]);
        let result = rule.extract(&doc, &target()).unwrap();
        assert_eq!(result.single_value(), Some("Channel Name"));
    }
}
