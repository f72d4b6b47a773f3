//! Platform HTTP client and share-link resolution

pub mod client;
pub mod resolver;

pub use client::*;
pub use resolver::*;
