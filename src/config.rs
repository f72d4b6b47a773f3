//! Application configuration.
//!
//! Every setting has a default, so a missing config file is not an error.
//! A JSON file can override any subset of sections and keys, and
//! command-line flags are applied on top (see [`crate::cli::Args::apply`]).

use crate::core::cookies::CookieConfig;
use crate::error::DydlError;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "dydl.json";

/// Browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Top-level configuration, one section per concern
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub download: DownloadSettings,
    pub network: NetworkSettings,
    pub filenames: FilenameTemplates,
    pub cookies: CookieConfig,
    pub resolver: ResolverSettings,
    pub ui: UiSettings,
    pub fetcher: FetcherSettings,
}

/// Settings handed to the media-fetch tool
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Quality selector (best, worst, bestvideo+bestaudio, ...)
    pub format: String,
    /// Output directory, relative to the working directory
    pub download_path: PathBuf,
    /// Let the tool draw its own progress output
    pub show_progress: bool,
    /// Socket timeout for the tool
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Retry count for the tool
    pub retries: u32,
    /// Never overwrite files that already exist
    pub skip_existing: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            format: "best".to_string(),
            download_path: PathBuf::from("downloads"),
            show_progress: true,
            timeout: Duration::from_secs(30),
            retries: 3,
            skip_existing: true,
        }
    }
}

/// Settings for the short-link HTTP session and the browser headers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8".to_string(),
            accept_language: "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
        }
    }
}

/// Output filename templates.
///
/// `{video_id}` is filled in locally; `{title}`, `{ext}`, `{playlist_index}`
/// and the other media fields are left for the fetch tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilenameTemplates {
    pub single_video: String,
    pub playlist_video: String,
    pub playlist_folder: String,
}

impl Default for FilenameTemplates {
    fn default() -> Self {
        Self {
            single_video: "{video_id}_{title}.{ext}".to_string(),
            playlist_video: "playlist_{playlist_index}_{title}.{ext}".to_string(),
            playlist_folder: "{playlist_title}".to_string(),
        }
    }
}

/// Short-link handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Hosts whose links must be expanded by following redirects
    pub short_link_hosts: Vec<String>,
    /// Where header cookies are registered; a leading dot makes a domain cookie
    pub cookie_domains: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            short_link_hosts: vec!["v.douyin.com".to_string()],
            cookie_domains: vec![".douyin.com".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub enable_colors: bool,
    pub verbose_logging: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            enable_colors: true,
            verbose_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherSettings {
    /// Path or name of the yt-dlp executable
    pub binary: PathBuf,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `dydl.json` in the working
    /// directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, DydlError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, DydlError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DydlError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&content)
            .map_err(|e| DydlError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, DydlError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Accepts either whole seconds (`30`) or a humantime string (`"1m 30s"`)
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
        RawDuration::Text(text) => {
            humantime::parse_duration(text.trim()).map_err(serde::de::Error::custom)
        }
    }
}
