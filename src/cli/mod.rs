//! Command line interface for dydl

pub mod app;
pub mod args;
pub mod output;
pub mod prompt;

pub use app::App;
pub use args::Args;
