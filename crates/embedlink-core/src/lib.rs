//! Embed Link Resolution Core Library
//!
//! Turns streaming-site hoster links into direct, downloadable media URLs.
//!
//! # Overview
//!
//! Episode pages list several third-party video hosts ("providers") per
//! episode. Each host hides the real media URL behind its own scheme:
//! token exchanges, text ciphers, iframe indirection. This crate provides:
//! - An HTTP fetch primitive with bounded timeouts and manual redirects
//! - A decode toolkit for the hosts' string obfuscation
//! - One extractor per supported host behind a common [`Extractor`] trait
//! - A resolver that picks a provider, follows its redirect and attaches
//!   the headers the final download needs
//!
//! # Example
//!
//! ```no_run
//! use embedlink_core::{Resolver, Result, parse_provider_map};
//! use embedlink_core::client::FetchRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let resolver = Resolver::new()?;
//!
//!     let episode = "https://aniworld.to/anime/stream/example/staffel-1/episode-1";
//!     let html = resolver.http().get_text(FetchRequest::get(episode)).await?;
//!     let providers = parse_provider_map(&html, "https://aniworld.to")?;
//!
//!     // Prefer language key 1, fall back to the first provider otherwise
//!     let link = resolver.resolve(&providers, 1).await?;
//!     println!("{} via {}", link.url, link.provider);
//!     for header in &link.headers {
//!         println!("  {}: {}", header.name, header.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Direct links
//!
//! Resolved URLs usually carry tokens and expiry parameters. They must
//! be fetched soon after resolution, with exactly the returned headers.
//! Do not cache them.

pub mod client;
pub mod decode;
mod error;
pub mod parser;
pub mod providers;
mod resolver;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, FetchRequest, FetchResponse, HttpClient};

// Re-export error types
pub use error::{DecodeStage, ResolveError, Result};

// Re-export parser functions
pub use parser::parse_provider_map;

// Re-export provider registry
pub use providers::{Extractor, Provider, ProviderRegistry, ProviderSpec, headers_for};

// Re-export main resolver API
pub use resolver::{
    LanguageFallback, Resolver, RetryPolicy, Selection, select_provider, select_provider_with,
    smallest_language_key,
};

// Re-export data types
pub use types::{Header, LanguageKey, LanguageMap, ProviderMap, ResolvedLink};

// Re-export URL helper functions for convenience
pub use url::{derive_output_filename, sanitize_filename, site_base_url};
