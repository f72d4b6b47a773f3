//! Download orchestration: resolve, probe, confirm, fetch

use crate::cli::output::OutputFormatter;
use crate::cli::prompt::Prompter;
use crate::config::AppConfig;
use crate::core::cookies::ResolvedSession;
use crate::core::MediaMetadata;
use crate::download::{FetchError, FetchOptions, MediaFetcher, PlaylistItems};
use crate::error::DydlError;
use crate::platform::client::browser_headers;
use crate::platform::UrlResolver;
use crate::utils::filename::{output_template, to_tool_template};
use crate::utils::url::ContentId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the user asked to download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Single,
    Playlist,
}

/// One download request from the interactive loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub mode: DownloadMode,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, mode: DownloadMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }
}

/// Why a download did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    /// No content ID could be extracted from the URL
    IdExtraction,
    /// The probe returned nothing
    NoMetadata,
    /// The collection has no entries
    EmptyPlaylist,
    /// The media tool complained about cookies
    CookieRequired(String),
    /// Any other media tool failure
    Fetch(String),
}

/// Result of a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    Cancelled,
    Failed(DownloadFailure),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Completed)
    }
}

/// Drives the media tool for single videos and collections
pub struct Downloader {
    config: Arc<AppConfig>,
    session: Arc<ResolvedSession>,
    resolver: UrlResolver,
    fetcher: Arc<dyn MediaFetcher>,
    formatter: Arc<OutputFormatter>,
}

impl Downloader {
    pub fn new(
        config: Arc<AppConfig>,
        session: Arc<ResolvedSession>,
        resolver: UrlResolver,
        fetcher: Arc<dyn MediaFetcher>,
        formatter: Arc<OutputFormatter>,
    ) -> Self {
        Self {
            config,
            session,
            resolver,
            fetcher,
            formatter,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Cookies attached to every request
    pub fn session(&self) -> &ResolvedSession {
        &self.session
    }

    /// Configured download directory
    pub fn download_dir(&self) -> &Path {
        &self.config.download.download_path
    }

    /// Create the download directory if needed and return its absolute path
    pub fn ensure_download_dir(&self) -> Result<PathBuf, DydlError> {
        let dir = self.download_dir();
        std::fs::create_dir_all(dir)?;
        Ok(std::fs::canonicalize(dir)?)
    }

    /// Dispatch a request by mode
    pub async fn download(
        &self,
        request: &DownloadRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<DownloadOutcome, DydlError> {
        match request.mode {
            DownloadMode::Single => Ok(self.download_single(&request.url).await),
            DownloadMode::Playlist => self.download_playlist(&request.url, prompter).await,
        }
    }

    /// Download one video
    pub async fn download_single(&self, url: &str) -> DownloadOutcome {
        self.formatter.step("Starting single video download...");

        let id = match self.resolver.resolve(url).await {
            Ok(Some(id)) => id,
            Ok(None) => return self.id_failure(),
            Err(e) => {
                self.formatter.error(&format!("Cannot resolve share link: {}", e));
                if e.is_network_error() {
                    self.formatter.info("Check your network connection and try again");
                }
                return self.id_failure();
            }
        };
        info!(url, id = %id, "Resolved content ID");

        let options = self.single_options(&id);
        let metadata = match self.probe(url, &options, "Fetching video info...").await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                self.formatter.error("Cannot get video info");
                return DownloadOutcome::Failed(DownloadFailure::NoMetadata);
            }
            Err(e) => return self.fetch_failure(e),
        };

        self.formatter
            .print_video_info(metadata.display_title(), metadata.duration_secs());
        self.formatter.info("Starting video download...");

        match self.fetcher.fetch(url, &options).await {
            Ok(()) => {
                self.formatter.success("Video download complete!");
                DownloadOutcome::Completed
            }
            Err(e) => self.fetch_failure(e),
        }
    }

    /// Download every item of a collection after the user confirms
    pub async fn download_playlist(
        &self,
        url: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<DownloadOutcome, DydlError> {
        self.formatter.step("Starting collection download...");

        let options = self.playlist_options();
        let metadata = match self.probe(url, &options, "Fetching collection info...").await {
            Ok(metadata) => metadata,
            Err(e) => return Ok(self.fetch_failure(e)),
        };

        let total = match metadata.as_ref().and_then(MediaMetadata::entry_count) {
            Some(total) if total > 0 => total,
            _ => {
                self.formatter
                    .error("Cannot get collection info, or the collection is empty");
                return Ok(DownloadOutcome::Failed(DownloadFailure::EmptyPlaylist));
            }
        };
        let title = metadata
            .as_ref()
            .map(MediaMetadata::display_title)
            .unwrap_or("Unknown");
        self.formatter.print_playlist_info(title, total);

        let question = format!("Download all {} videos? (y/n): ", total);
        if !prompter.confirm(&question)? {
            self.formatter.info("Download cancelled");
            return Ok(DownloadOutcome::Cancelled);
        }

        self.formatter.info("Starting collection download...");
        match self.fetcher.fetch(url, &options).await {
            Ok(()) => {
                self.formatter.success("Collection download complete!");
                Ok(DownloadOutcome::Completed)
            }
            Err(e) => Ok(self.fetch_failure(e)),
        }
    }

    /// Options for a single video named after its content ID
    pub fn single_options(&self, id: &ContentId) -> FetchOptions {
        let name = to_tool_template(
            &self.config.filenames.single_video,
            &[("video_id", id.as_str())],
        );
        FetchOptions {
            format_selector: self.config.download.format.clone(),
            output_template: output_template(self.download_dir(), &[name]),
            http_headers: self.http_headers(),
            cookie_file: self.session.cookie_jar_path.clone(),
            playlist_items: None,
        }
    }

    /// Options for a whole collection, one folder per collection
    pub fn playlist_options(&self) -> FetchOptions {
        let filenames = &self.config.filenames;
        let folder = to_tool_template(&filenames.playlist_folder, &[]);
        let name = to_tool_template(&filenames.playlist_video, &[]);
        FetchOptions {
            format_selector: self.config.download.format.clone(),
            output_template: output_template(self.download_dir(), &[folder, name]),
            http_headers: self.http_headers(),
            cookie_file: self.session.cookie_jar_path.clone(),
            playlist_items: Some(PlaylistItems::All),
        }
    }

    fn http_headers(&self) -> BTreeMap<String, String> {
        let mut headers = browser_headers(&self.config.network);
        if let Some(cookie) = &self.session.cookie_header {
            headers.insert("Cookie".to_string(), cookie.clone());
        }
        headers
    }

    async fn probe(
        &self,
        url: &str,
        options: &FetchOptions,
        message: &str,
    ) -> Result<Option<MediaMetadata>, FetchError> {
        let spinner = self.formatter.spinner(message);
        let result = self.fetcher.probe(url, options).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        debug!(url, ok = result.is_ok(), "Probe finished");
        result
    }

    fn id_failure(&self) -> DownloadOutcome {
        self.formatter.error("Cannot extract video ID");
        DownloadOutcome::Failed(DownloadFailure::IdExtraction)
    }

    fn fetch_failure(&self, error: FetchError) -> DownloadOutcome {
        let message = error.to_string();
        warn!(error = %message, "Media tool failed");

        if error.is_cookie_related() {
            self.formatter
                .print_cookie_guidance(&self.config.cookies.file_path);
            DownloadOutcome::Failed(DownloadFailure::CookieRequired(message))
        } else {
            self.formatter.error(&format!("Download failed: {}", message));
            DownloadOutcome::Failed(DownloadFailure::Fetch(message))
        }
    }
}
