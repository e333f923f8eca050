// ABOUTME: String normalization for extracted values.
// ABOUTME: Strips markup, decodes HTML entities, and trims whitespace.

use scraper::Html;

/// Cleans up an extracted string: strips any HTML tags, decodes HTML
/// entities, and trims surrounding whitespace.
///
/// Extracted values routinely carry markup fragments (`<b>Author</b>`) or
/// encoded entities (`Fish &amp; Chips`); running them through the HTML
/// parser and collecting only the text nodes handles both at once.
pub fn normalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(input);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}
