//! Media-fetch tool interface

use crate::core::MediaMetadata;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Which playlist items to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistItems {
    All,
}

/// Options for one probe/fetch pair. Built per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Quality selector understood by the tool
    pub format_selector: String,
    /// Output path template in the tool's `%(field)s` syntax
    pub output_template: String,
    /// Headers sent with every request the tool makes
    pub http_headers: BTreeMap<String, String>,
    /// Netscape cookie jar file
    pub cookie_file: Option<PathBuf>,
    /// `None` restricts the tool to a single video
    pub playlist_items: Option<PlaylistItems>,
}

impl FetchOptions {
    pub fn is_playlist(&self) -> bool {
        self.playlist_items.is_some()
    }
}

/// Failure reported by the fetch tool
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Failed { code: Option<i32>, message: String },

    #[error("I/O error while running media tool: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable metadata from media tool: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the failure points at missing or invalid cookies.
    ///
    /// The tool has no typed errors, so this is a case-insensitive search for
    /// "cookie" in the message. Every cookie-related failure takes the same
    /// guidance path.
    pub fn is_cookie_related(&self) -> bool {
        self.to_string().to_lowercase().contains("cookie")
    }
}

/// An external tool that can describe and download media
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch metadata without downloading media. `Ok(None)` means the tool
    /// found nothing at the URL.
    async fn probe(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<Option<MediaMetadata>, FetchError>;

    /// Download media to the path described by `options.output_template`
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<(), FetchError>;
}
