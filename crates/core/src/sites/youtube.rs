// ABOUTME: Built-in site override for YouTube pages.
// ABOUTME: Replaces the author and date rules with YouTube-specific selectors.

use crate::rules::fields::{author_rule_with, date_rule_with};
use crate::rules::{Strategy, Technique};
use crate::sites::Site;

/// YouTube watch pages bury the channel name and upload date in microdata
/// rather than the usual article markup.
pub fn youtube() -> Site {
    Site::new("youtube.com")
        .with_rule(
            "author",
            author_rule_with(vec![
                Strategy::new(Technique::CssText, &["[class*='user-info']"]),
                Strategy::new(
                    Technique::attr("content"),
                    &["[itemprop='author'] [itemprop='name']", "link[itemprop='name']"],
                ),
            ]),
        )
        .with_rule(
            "date",
            date_rule_with(vec![
                Strategy::new(
                    Technique::Meta,
                    &[
                        "meta[itemprop='datePublished']",
                        "meta[itemprop='uploadDate']",
                    ],
                ),
                Strategy::new(Technique::JsonLd, &["uploadDate", "datePublished"]),
            ]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;
    use url::Url;

    const WATCH_PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta itemprop="datePublished" content="2023-04-02">
        </head>
        <body>
            <div itemprop="author" itemscope>
                <link itemprop="name" content="Example Channel">
            </div>
        </body>
        </html>
    "#;

    #[test]
    fn test_youtube_overrides_author_and_date() {
        let site = youtube();
        assert_eq!(site.domain_key(), "youtube.com");

        let doc = Html::parse_document(WATCH_PAGE);
        let target = Url::parse("https://www.youtube.com/watch?v=abc").unwrap();

        let author = site.rules()["author"].extract(&doc, &target).unwrap();
        assert_eq!(author.single_value(), Some("Example Channel"));

        let date = site.rules()["date"].extract(&doc, &target).unwrap();
        assert_eq!(date.single_value(), Some("2023-04-02"));
    }
}
