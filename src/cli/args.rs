//! Command line argument parsing

use crate::config::AppConfig;
use crate::core::cookies::CookieFileType;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// DYDL - interactive short-video downloader.
///
/// Links are asked for interactively; the flags below only override the
/// configuration file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (JSON). Defaults to ./dydl.json when present
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Download directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Format selector passed to yt-dlp (e.g. 'best', 'bestvideo+bestaudio')
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Cookie file
    #[arg(long, value_name = "PATH")]
    pub cookies: Option<PathBuf>,

    /// Cookie file format
    #[arg(long, value_enum, value_name = "TYPE")]
    pub cookie_type: Option<CookieTypeArg>,

    /// Do not attach cookies to any request
    #[arg(long)]
    pub no_cookies: bool,

    /// yt-dlp executable
    #[arg(long = "yt-dlp", value_name = "PATH")]
    pub yt_dlp: Option<PathBuf>,

    /// Socket timeout for yt-dlp (e.g. 30s, 1m)
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<humantime::Duration>,

    /// Retries performed by yt-dlp
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Cookie file format
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CookieTypeArg {
    /// One `Cookie:` header line
    Header,
    /// Netscape cookies.txt
    Netscape,
}

impl From<CookieTypeArg> for CookieFileType {
    fn from(value: CookieTypeArg) -> Self {
        match value {
            CookieTypeArg::Header => CookieFileType::Header,
            CookieTypeArg::Netscape => CookieFileType::Netscape,
        }
    }
}

impl Args {
    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(output) = &self.output {
            config.download.download_path = output.clone();
        }
        if let Some(format) = &self.format {
            config.download.format = format.clone();
        }
        if let Some(timeout) = self.timeout_duration() {
            config.download.timeout = timeout;
        }
        if let Some(retries) = self.retries {
            config.download.retries = retries;
        }
        if let Some(cookies) = &self.cookies {
            config.cookies.file_path = cookies.clone();
        }
        if let Some(cookie_type) = self.cookie_type {
            config.cookies.file_type = cookie_type.into();
        }
        if self.no_cookies {
            config.cookies.enabled = false;
        }
        if let Some(binary) = &self.yt_dlp {
            config.fetcher.binary = binary.clone();
        }
        if self.no_color {
            config.ui.enable_colors = false;
        }
        if self.verbose {
            config.ui.verbose_logging = true;
        }
    }

    /// Get yt-dlp timeout as Duration
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.clone().map(Into::into)
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

// Implement Default for Args to make tests work
impl Default for Args {
    fn default() -> Self {
        Self {
            config: None,
            output: None,
            format: None,
            cookies: None,
            cookie_type: None,
            no_cookies: false,
            yt_dlp: None,
            timeout: None,
            retries: None,
            no_color: false,
            verbose: false,
            quiet: false,
        }
    }
}
