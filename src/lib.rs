//! # dydl - interactive short-video downloader
//!
//! Downloads single videos and whole collections from a short-video
//! platform by driving `yt-dlp`.
//!
//! ## Features
//!
//! - Share-link expansion and content ID extraction
//! - Cookie files in `Cookie:` header or Netscape format
//! - Collection downloads with confirmation
//! - JSON configuration with command-line overrides
//!
//! ## Example
//!
//! ```rust,no_run
//! use dydl::config::AppConfig;
//! use dydl::core::{cookies, Downloader};
//! use dydl::cli::output::OutputFormatter;
//! use dydl::cli::args::VerbosityLevel;
//! use dydl::download::YtDlp;
//! use dydl::platform::{HttpSession, UrlResolver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let session = Arc::new(cookies::load(&config.cookies));
//!     let http = HttpSession::new(&config.network, &config.resolver.cookie_domains, &session)?;
//!     let resolver = UrlResolver::new(Arc::new(http), config.resolver.short_link_hosts.clone());
//!     let fetcher = Arc::new(YtDlp::from_config(&config));
//!     let formatter = Arc::new(OutputFormatter::new(VerbosityLevel::Normal));
//!
//!     let downloader = Downloader::new(Arc::new(config), session, resolver, fetcher, formatter);
//!     let outcome = downloader.download_single("https://v.douyin.com/abc123/").await;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod download;
pub mod error;
pub mod platform;
pub mod utils;

// Re-export main types
pub use config::AppConfig;
pub use core::{DownloadOutcome, Downloader, MediaMetadata, ResolvedSession};
pub use error::DydlError;

/// Result type alias for dydl operations
pub type Result<T> = std::result::Result<T, DydlError>;
