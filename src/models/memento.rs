//! Memento protocol structures: typed links, relation sets, and TimeMaps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::CaptureSet;

/// A single RFC 8288 web link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Link target
    pub url: String,

    /// Raw `rel` value, e.g. `"first memento"`
    pub rel: String,

    /// Remaining parameters (`datetime`, `type`, `from`, ...) keyed in lower case
    pub params: BTreeMap<String, String>,
}

impl Link {
    /// Lower-cased relation tokens.
    pub fn rel_tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.rel.split_whitespace().map(|t| t.to_ascii_lowercase())
    }

    pub fn has_rel(&self, token: &str) -> bool {
        self.rel_tokens().any(|t| t == token)
    }

    /// The `datetime` parameter, if any.
    pub fn datetime(&self) -> Option<&str> {
        self.params.get("datetime").map(String::as_str)
    }
}

/// Parse a `Link` header value (or a link-format document) into links.
///
/// Quoted parameter values may contain commas and semicolons, as the
/// `datetime` parameter always does.
pub fn parse_link_header(value: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        let Some(open) = rest.strip_prefix('<') else {
            break;
        };
        let Some(close) = open.find('>') else {
            break;
        };
        let url = open[..close].trim().to_string();
        rest = &open[close + 1..];

        let mut params = BTreeMap::new();
        while let Some(after) = rest.trim_start().strip_prefix(';') {
            let after = after.trim_start();
            let name_end = after
                .find(|c: char| c == '=' || c == ';' || c == ',')
                .unwrap_or(after.len());
            let name = after[..name_end].trim().to_ascii_lowercase();
            let (param_value, remaining) = match after[name_end..].strip_prefix('=') {
                Some(raw) => parse_param_value(raw.trim_start()),
                None => (String::new(), &after[name_end..]),
            };
            rest = remaining;
            if !name.is_empty() {
                params.entry(name).or_insert(param_value);
            }
        }

        let rel = params.remove("rel").unwrap_or_default();
        links.push(Link { url, rel, params });
    }

    links
}

/// Split one parameter value off the front of `raw`, returning it and the remainder.
fn parse_param_value(raw: &str) -> (String, &str) {
    if let Some(quoted) = raw.strip_prefix('"') {
        let mut value = String::new();
        let mut escaped = false;
        for (i, c) in quoted.char_indices() {
            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return (value, &quoted[i + 1..]);
            } else {
                value.push(c);
            }
        }
        // unterminated quote
        return (value, "");
    }

    let end = raw.find(|c: char| c == ';' || c == ',').unwrap_or(raw.len());
    (raw[..end].trim().to_string(), &raw[end..])
}

/// Relation links advertised by a Memento endpoint.
///
/// Every field is optional: which relations appear depends on the server
/// and on the resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MementoLinks {
    pub original: Option<String>,
    pub memento: Option<String>,
    pub first_memento: Option<String>,
    pub last_memento: Option<String>,
    pub timegate: Option<String>,
    pub timemap: Option<String>,

    /// Raw relation string to URL, later duplicates overwrite earlier ones
    pub relations: BTreeMap<String, String>,
}

impl MementoLinks {
    /// Classify parsed links by relation.
    pub fn from_links(links: &[Link]) -> Self {
        let mut out = Self::default();

        for link in links {
            let key = if link.rel.is_empty() {
                link.url.clone()
            } else {
                link.rel.clone()
            };
            out.relations.insert(key, link.url.clone());

            let url = Some(link.url.clone());
            if link.has_rel("original") {
                out.original = url.clone();
            }
            if link.has_rel("timegate") {
                out.timegate = url.clone();
            }
            if link.has_rel("timemap") {
                out.timemap = url.clone();
            }
            if link.has_rel("memento") {
                let first = link.has_rel("first");
                let last = link.has_rel("last");
                if first {
                    out.first_memento = url.clone();
                }
                if last {
                    out.last_memento = url.clone();
                }
                if !first && !last {
                    out.memento = url;
                }
            }
        }

        out
    }

    /// Parse one or more `Link` header values.
    pub fn from_headers<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let links: Vec<Link> = values.into_iter().flat_map(parse_link_header).collect();
        Self::from_links(&links)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Result of a TimeMap request, tagged by the response content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Timemap {
    /// `text/x-ndjson`: one capture per line
    Records(CaptureSet),

    /// `application/link-format`: RFC 7089 link list
    Links(Vec<Link>),

    /// Any other content type, passed through untouched
    Raw { content_type: String, body: String },
}

impl Timemap {
    /// Capture records, when the server answered in JSON lines.
    pub fn records(&self) -> Option<&CaptureSet> {
        match self {
            Self::Records(set) => Some(set),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<https://example.com/>; rel="original", <https://archive.test/webarchive/timemap/link/https://example.com/>; rel="timemap"; type="application/link-format", <https://archive.test/webarchive/20200101000000/https://example.com/>; rel="first memento"; datetime="Wed, 01 Jan 2020 00:00:00 GMT", <https://archive.test/webarchive/20210101000000/https://example.com/>; rel="memento"; datetime="Fri, 01 Jan 2021 00:00:00 GMT", <https://archive.test/webarchive/20220101000000/https://example.com/>; rel="last memento"; datetime="Sat, 01 Jan 2022 00:00:00 GMT""#;

    #[test]
    fn test_parse_link_header_counts() {
        let links = parse_link_header(HEADER);
        assert_eq!(links.len(), 5);
        assert_eq!(links[0].url, "https://example.com/");
        assert_eq!(links[0].rel, "original");
        assert_eq!(
            links[2].datetime(),
            Some("Wed, 01 Jan 2020 00:00:00 GMT")
        );
        assert_eq!(
            links[1].params.get("type").map(String::as_str),
            Some("application/link-format")
        );
    }

    #[test]
    fn test_memento_links_classification() {
        let links = MementoLinks::from_headers([HEADER]);
        assert_eq!(links.original.as_deref(), Some("https://example.com/"));
        assert!(links.timemap.is_some());
        assert!(links.timegate.is_none());
        assert_eq!(
            links.first_memento.as_deref(),
            Some("https://archive.test/webarchive/20200101000000/https://example.com/")
        );
        assert_eq!(
            links.memento.as_deref(),
            Some("https://archive.test/webarchive/20210101000000/https://example.com/")
        );
        assert_eq!(
            links.last_memento.as_deref(),
            Some("https://archive.test/webarchive/20220101000000/https://example.com/")
        );
        assert_eq!(links.relations.len(), 5);
        assert!(links.relations.contains_key("first memento"));
    }

    #[test]
    fn test_first_last_memento_in_one_link() {
        let links = MementoLinks::from_headers([r#"<http://a/1>; rel="first last memento""#]);
        assert_eq!(links.first_memento.as_deref(), Some("http://a/1"));
        assert_eq!(links.last_memento.as_deref(), Some("http://a/1"));
        assert!(links.memento.is_none());
    }

    #[test]
    fn test_unquoted_and_multiline() {
        let body = "<http://a/>; rel=original,\n<http://b/>;rel=timegate\n";
        let links = parse_link_header(body);
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].rel, "timegate");
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(parse_link_header("not a link header").is_empty());
        assert!(MementoLinks::from_headers(["", "<unterminated"]).is_empty());
    }
}
