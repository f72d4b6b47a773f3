//! Core functionality for dydl

pub mod cookies;
pub mod downloader;
pub mod media_info;

pub use cookies::{CookieConfig, CookieFileType, CookieStatus, ResolvedSession};
pub use downloader::*;
pub use media_info::*;
