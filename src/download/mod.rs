//! Media-fetch tool integration

pub mod fetcher;
pub mod ytdlp;

pub use fetcher::*;
pub use ytdlp::*;
