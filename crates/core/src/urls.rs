// ABOUTME: URL helpers for relative-path fixup, domain normalization, and tracking-param removal.
// ABOUTME: Shared by rule post-processing and the fetch/parse facade.

use url::Url;

/// Tracking query parameters removed by [`clean_url`].
///
/// Original list from: https://github.com/mpchadwick/tracking-query-params-registry
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "gclsrc",
    "utm_content",
    "utm_term",
    "utm_campaign",
    "utm_medium",
    "utm_source",
    "utm_id",
    "_ga",
    "mc_cid",
    "mc_eid",
    "_bta_tid",
    "_bta_c",
    "trk_contact",
    "trk_msg",
    "trk_module",
    "trk_sid",
    "gdfms",
    "gdftrk",
    "gdffi",
    "_ke",
    "redirect_log_mongo_id",
    "redirect_mongo_id",
    "sb_referer_host",
    "mkwid",
    "pcrid",
    "ef_id",
    "s_kwcid",
    "msclkid",
    "dm_i",
    "epik",
    "pk_campaign",
    "pk_kwd",
    "pk_keyword",
    "piwik_campaign",
    "piwik_kwd",
    "piwik_keyword",
    "mtm_campaign",
    "mtm_keyword",
    "mtm_source",
    "mtm_medium",
    "mtm_content",
    "mtm_cid",
    "mtm_group",
    "mtm_placement",
    "matomo_campaign",
    "matomo_keyword",
    "matomo_source",
    "matomo_medium",
    "matomo_content",
    "matomo_cid",
    "matomo_group",
    "matomo_placement",
    "hsa_cam",
    "hsa_grp",
    "hsa_mt",
    "hsa_src",
    "hsa_ad",
    "hsa_acc",
    "hsa_net",
    "hsa_kw",
    "hsa_tgt",
    "hsa_ver",
    "_branch_match_id",
    "mkevt",
    "mkcid",
    "mkrid",
    "campid",
    "toolid",
    "customid",
    "igshid",
    "si",
];

/// Converts a possibly-relative path into an absolute URL against `base`.
///
/// - Absolute URLs (`http...`) and `data:` URIs pass through untouched.
/// - Scheme-relative paths (`//cdn.example.com/x`) get the base scheme.
/// - Host-relative (`/x`) and bare (`x`) paths get scheme and host, with a
///   `/` inserted when missing.
pub fn fix_relative_path(base: &Url, path: &str) -> String {
    let path = path.trim();

    if path.starts_with("http") || path.starts_with("data:") {
        return path.to_string();
    }

    if let Some(rest) = path.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), rest);
    }

    let host = base.host_str().unwrap_or("");
    if path.starts_with('/') {
        format!("{}://{}{}", base.scheme(), host, path)
    } else {
        format!("{}://{}/{}", base.scheme(), host, path)
    }
}

/// Checks whether the given string is a well-formed absolute http(s) URL
/// with a plausible hostname.
pub fn is_url_valid(u: &str) -> bool {
    let parsed = match Url::parse(u) {
        Ok(p) => p,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    // Basic host sanity check: non-empty and dotted.
    match parsed.host_str() {
        Some(host) => !host.is_empty() && host.contains('.'),
        None => false,
    }
}

/// Removes known tracking query parameters from a URL.
///
/// Returns the input unchanged when it does not parse or carries no
/// tracked parameters.
pub fn clean_url(u: &str) -> String {
    let mut parsed = match Url::parse(u) {
        Ok(p) => p,
        Err(_) => return u.to_string(),
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let changed = parsed
        .query_pairs()
        .any(|(key, _)| TRACKING_PARAMS.contains(&key.as_ref()));
    if !changed {
        return u.to_string();
    }

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    parsed.to_string()
}

/// Normalizes a hostname for registry lookups: lowercased, `www.` stripped.
pub fn normalize_domain(host: &str) -> String {
    let lower = host.trim().to_lowercase();
    lower.strip_prefix("www.").unwrap_or(&lower).to_string()
}

/// Extracts the normalized domain from a URL string.
pub fn extract_domain(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    parsed.host_str().map(normalize_domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://example.com/articles/post").unwrap()
    }

    #[test]
    fn test_fix_relative_path_absolute_passthrough() {
        assert_eq!(
            fix_relative_path(&base(), "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            fix_relative_path(&base(), "http://other.com/x"),
            "http://other.com/x"
        );
    }

    #[test]
    fn test_fix_relative_path_data_uri_passthrough() {
        assert_eq!(
            fix_relative_path(&base(), "data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_fix_relative_path_scheme_relative() {
        assert_eq!(
            fix_relative_path(&base(), "//cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_fix_relative_path_host_relative() {
        assert_eq!(
            fix_relative_path(&base(), "/images/a.png"),
            "https://example.com/images/a.png"
        );
    }

    #[test]
    fn test_fix_relative_path_bare_path() {
        assert_eq!(
            fix_relative_path(&base(), "favicon.ico"),
            "https://example.com/favicon.ico"
        );
    }

    #[test]
    fn test_fix_relative_path_trims_whitespace() {
        assert_eq!(
            fix_relative_path(&base(), "  /a.png "),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_is_url_valid() {
        assert!(is_url_valid("https://example.com/page"));
        assert!(is_url_valid("http://sub.example.co.uk"));
        assert!(!is_url_valid("ftp://example.com"));
        assert!(!is_url_valid("not a url"));
        assert!(!is_url_valid("https://localhost"));
    }

    #[test]
    fn test_clean_url_removes_tracking_params() {
        let cleaned = clean_url("https://example.com/a?utm_source=x&id=7&fbclid=zzz");
        assert_eq!(cleaned, "https://example.com/a?id=7");
    }

    #[test]
    fn test_clean_url_drops_query_when_all_tracked() {
        let cleaned = clean_url("https://example.com/a?utm_source=x&utm_medium=y");
        assert_eq!(cleaned, "https://example.com/a");
    }

    #[test]
    fn test_clean_url_untracked_unchanged() {
        let original = "https://example.com/a?id=7&page=2";
        assert_eq!(clean_url(original), original);
    }

    #[test]
    fn test_clean_url_unparseable_unchanged() {
        assert_eq!(clean_url("::not-a-url::"), "::not-a-url::");
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("www.Example.COM"), "example.com");
        assert_eq!(normalize_domain("news.example.com"), "news.example.com");
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://www.example.com/path?x=1"),
            Some("example.com".to_string())
        );
        assert_eq!(extract_domain("not a url"), None);
    }
}
