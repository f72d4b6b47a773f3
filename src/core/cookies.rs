//! Cookie file loading.
//!
//! Two file formats are accepted: a single `Cookie:` header line
//! (`k1=v1; k2=v2`) or a browser-exported Netscape cookie jar. Loading never
//! fails: a missing, empty or unreadable file degrades to a session without
//! cookies and downloads proceed anonymously.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Format of the configured cookie file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum CookieFileType {
    /// One line of `key=value` pairs, sent as the `Cookie` header
    #[default]
    Header,
    /// Netscape cookies.txt, handed to the fetch tool untouched
    Netscape,
}

impl From<String> for CookieFileType {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl CookieFileType {
    /// Anything other than `netscape` is treated as a header file
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("netscape") {
            CookieFileType::Netscape
        } else {
            CookieFileType::Header
        }
    }
}

/// Cookie settings, fixed at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub enabled: bool,
    pub file_path: PathBuf,
    pub file_type: CookieFileType,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_path: PathBuf::from("cookies.txt"),
            file_type: CookieFileType::Header,
        }
    }
}

/// What happened when the cookie file was loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieStatus {
    Disabled,
    Missing(PathBuf),
    Empty(PathBuf),
    Unreadable { path: PathBuf, reason: String },
    LoadedHeader { pairs: usize },
    LoadedNetscape(PathBuf),
}

impl CookieStatus {
    /// True when cookies are enabled but nothing usable was found
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            CookieStatus::Missing(_) | CookieStatus::Empty(_) | CookieStatus::Unreadable { .. }
        )
    }

    /// True when a cookie source will be attached to requests
    pub fn is_loaded(&self) -> bool {
        matches!(
            self,
            CookieStatus::LoadedHeader { .. } | CookieStatus::LoadedNetscape(_)
        )
    }
}

/// Cookies resolved from [`CookieConfig`].
///
/// At most one of `cookie_header` and `cookie_jar_path` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub cookie_header: Option<String>,
    pub cookie_jar_path: Option<PathBuf>,
    pub status: CookieStatus,
}

impl ResolvedSession {
    /// A session that attaches no cookies
    pub fn empty(status: CookieStatus) -> Self {
        Self {
            cookie_header: None,
            cookie_jar_path: None,
            status,
        }
    }

    /// Individual pairs of the header cookie, for the HTTP session's store
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.cookie_header
            .as_deref()
            .map(parse_header_pairs)
            .unwrap_or_default()
    }
}

/// Load the cookie file described by `config`
pub fn load(config: &CookieConfig) -> ResolvedSession {
    if !config.enabled {
        debug!("Cookie loading disabled");
        return ResolvedSession::empty(CookieStatus::Disabled);
    }

    let path = config.file_path.as_path();
    if !path.exists() {
        warn!(path = %path.display(), "Cookie file not found");
        return ResolvedSession::empty(CookieStatus::Missing(path.to_path_buf()));
    }

    let content = match read_trimmed(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cookie file");
            return ResolvedSession::empty(CookieStatus::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    if content.is_empty() {
        warn!(path = %path.display(), "Cookie file is empty");
        return ResolvedSession::empty(CookieStatus::Empty(path.to_path_buf()));
    }

    match config.file_type {
        CookieFileType::Netscape => {
            info!(path = %path.display(), "Using Netscape cookie jar");
            ResolvedSession {
                cookie_header: None,
                cookie_jar_path: Some(config.file_path.clone()),
                status: CookieStatus::LoadedNetscape(config.file_path.clone()),
            }
        }
        CookieFileType::Header => {
            let pairs = parse_header_pairs(&content).len();
            info!(path = %path.display(), pairs, "Using Cookie header file");
            ResolvedSession {
                cookie_header: Some(content),
                cookie_jar_path: None,
                status: CookieStatus::LoadedHeader { pairs },
            }
        }
    }
}

/// Split a `Cookie` header value into `(name, value)` pairs.
///
/// Segments without `=` are skipped. The value is everything after the
/// first `=`, so base64 padding survives.
pub fn parse_header_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn read_trimmed(path: &Path) -> std::io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}
