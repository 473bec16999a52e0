// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::LazyLock;

use regex::Regex;

/// Internal delivery URL served by the archive's replay backend.
static LOAD_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://wlgprdowapp01\.natlib\.govt\.nz/nlnzwebarchive_PROD/ap/(\d+)id_/(https?://.+)")
        .unwrap_or_else(|e| panic!("load URL pattern is invalid: {e}"))
});

/// Public replay URL template for a capture id and original URL.
const ACCESS_URL_REPLACEMENT: &str = "https://ndhadeliver.natlib.govt.nz/webarchive/${1}/${2}";

/// Rewrite an internal load URL into the archive's public access URL.
///
/// Values that do not match the internal pattern are returned unchanged.
///
/// # Examples
/// ```
/// use wa_toolkit::utils::url::access_url_from_load_url;
///
/// assert_eq!(
///     access_url_from_load_url(
///         "https://wlgprdowapp01.natlib.govt.nz/nlnzwebarchive_PROD/ap/20230101000000id_/http://example.com/"
///     ),
///     "https://ndhadeliver.natlib.govt.nz/webarchive/20230101000000/http://example.com/"
/// );
/// ```
pub fn access_url_from_load_url(load_url: &str) -> String {
    LOAD_URL_PATTERN
        .replace_all(load_url, ACCESS_URL_REPLACEMENT)
        .into_owned()
}

/// Append a trailing `/` unless one is already present.
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Whether `candidate` is an absolute http(s) URL with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    if candidate.trim() != candidate || candidate.is_empty() {
        return false;
    }
    match url::Url::parse(candidate) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// File name for a screenshot of `url`.
///
/// Every `http(s)://` scheme marker is removed (replay URLs embed a second
/// one) and `/` becomes `_`.
pub fn screenshot_file_name(url: &str) -> String {
    let stripped = url.replace("https://", "").replace("http://", "");
    format!("{}.png", stripped.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_url_rewrite() {
        assert_eq!(
            access_url_from_load_url(
                "https://wlgprdowapp01.natlib.govt.nz/nlnzwebarchive_PROD/ap/20230101000000id_/http://example.com/"
            ),
            "https://ndhadeliver.natlib.govt.nz/webarchive/20230101000000/http://example.com/"
        );
    }

    #[test]
    fn test_access_url_keeps_query() {
        assert_eq!(
            access_url_from_load_url(
                "https://wlgprdowapp01.natlib.govt.nz/nlnzwebarchive_PROD/ap/20200401004141id_/https://covid19.govt.nz/?a=1&b=2"
            ),
            "https://ndhadeliver.natlib.govt.nz/webarchive/20200401004141/https://covid19.govt.nz/?a=1&b=2"
        );
    }

    #[test]
    fn test_access_url_passthrough() {
        let other = "https://example.org/replay/20200101/http://example.com/";
        assert_eq!(access_url_from_load_url(other), other);
    }

    #[test]
    fn test_ensure_trailing_slash() {
        assert_eq!(ensure_trailing_slash("https://a.nz"), "https://a.nz/");
        assert_eq!(ensure_trailing_slash("https://a.nz/"), "https://a.nz/");
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://covid19.govt.nz/"));
        assert!(is_valid_url("http://example.com/path?q=1"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("ftp://example.com/"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_screenshot_file_name() {
        assert_eq!(
            screenshot_file_name("https://ndhadeliver.natlib.govt.nz/webarchive/20250401004141/https://covid19.govt.nz/"),
            "ndhadeliver.natlib.govt.nz_webarchive_20250401004141_covid19.govt.nz_.png"
        );
        assert_eq!(screenshot_file_name("http://a.nz/b"), "a.nz_b.png");
    }
}
