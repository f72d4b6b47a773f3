//! URL utilities for short-link detection and content ID extraction

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Numeric identifier of a video on the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ID patterns, tried strictly in this order; the first match wins.
///
/// `/(\d+)/` also matches stray numeric path segments on non-video pages.
/// It stays in third place so existing links keep resolving the same way.
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"/video/(\d+)", r"video/(\d+)", r"/(\d+)/", r"item/(\d+)"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("ID patterns are valid"))
        .collect()
});

/// Extract the content ID from a canonical URL
pub fn extract_content_id(url: &str) -> Option<ContentId> {
    ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|id| ContentId(id.as_str().to_string()))
}

/// Check if the URL's host is one of the short-link hosts
pub fn is_short_link(url: &str, short_link_hosts: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    parsed.host_str().is_some_and(|host| {
        short_link_hosts
            .iter()
            .any(|short| host.eq_ignore_ascii_case(short.trim()))
    })
}
