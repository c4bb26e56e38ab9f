//! Provider extractors and the registry that dispatches to them
//!
//! # Architecture
//!
//! - [`Provider`]: closed set of supported hosts
//! - [`PROVIDER_SPECS`]: static download-header table, one row per host
//! - [`Extractor`]: async capability turning an embed URL into a direct link
//! - [`ProviderRegistry`]: maps provider names to extractors
//!
//! Providers share no behaviour, only the [`Extractor`] contract.

mod doodstream;
mod filemoon;
mod loadx;
mod luluvdo;
mod vidmoly;
mod vidoza;
mod voe;

pub use doodstream::{Clock, DoodstreamExtractor, SystemClock, build_doodstream_url};
pub use filemoon::FilemoonExtractor;
pub use loadx::{LoadxExtractor, parse_video_source};
pub use luluvdo::LuluvdoExtractor;
pub use vidmoly::VidmolyExtractor;
pub use vidoza::VidozaExtractor;
pub use voe::{VoeExtractor, decode_voe_payload};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::client::{DESKTOP_USER_AGENT, HttpClient, MOBILE_USER_AGENT};
use crate::error::{ResolveError, Result};
use crate::types::Header;

/// Supported video hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Vidoza,
    Vidmoly,
    Filemoon,
    Luluvdo,
    LoadX,
    Doodstream,
    Voe,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::Vidoza,
        Provider::Vidmoly,
        Provider::Filemoon,
        Provider::Luluvdo,
        Provider::LoadX,
        Provider::Doodstream,
        Provider::Voe,
    ];

    /// Name as listed on episode pages
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn spec(self) -> &'static ProviderSpec {
        // Table rows are declared in `ALL` order
        &PROVIDER_SPECS[self as usize]
    }

    /// Headers the downloader must send when fetching the direct link
    pub fn download_headers(self) -> Vec<Header> {
        self.spec()
            .headers
            .iter()
            .map(|(name, value)| Header::new(*name, *value))
            .collect()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = ResolveError;

    fn from_str(name: &str) -> Result<Self> {
        PROVIDER_SPECS
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.provider)
            .ok_or_else(|| ResolveError::NotSupported(name.to_string()))
    }
}

/// Static per-provider configuration
#[derive(Debug)]
pub struct ProviderSpec {
    pub provider: Provider,
    pub name: &'static str,
    /// Ordered (name, value) pairs for the final download request
    pub headers: &'static [(&'static str, &'static str)],
}

pub static PROVIDER_SPECS: [ProviderSpec; 7] = [
    ProviderSpec {
        provider: Provider::Vidoza,
        name: "Vidoza",
        headers: &[],
    },
    ProviderSpec {
        provider: Provider::Vidmoly,
        name: "Vidmoly",
        headers: &[("Referer", "https://vidmoly.to")],
    },
    ProviderSpec {
        provider: Provider::Filemoon,
        name: "Filemoon",
        headers: &[
            ("User-Agent", DESKTOP_USER_AGENT),
            ("Referer", "https://filemoon.to"),
        ],
    },
    ProviderSpec {
        provider: Provider::Luluvdo,
        name: "Luluvdo",
        headers: &[
            ("User-Agent", MOBILE_USER_AGENT),
            ("Accept-Language", "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"),
            ("Origin", "https://luluvdo.com"),
            ("Referer", "https://luluvdo.com/"),
        ],
    },
    ProviderSpec {
        provider: Provider::LoadX,
        name: "LoadX",
        headers: &[("Accept", "*/*")],
    },
    ProviderSpec {
        provider: Provider::Doodstream,
        name: "Doodstream",
        headers: &[("Referer", "https://dood.li/")],
    },
    ProviderSpec {
        provider: Provider::Voe,
        name: "VOE",
        headers: &[("User-Agent", DESKTOP_USER_AGENT)],
    },
];

/// Download headers for a provider name
///
/// # Errors
/// Returns `NotSupported` for names outside the supported set
pub fn headers_for(name: &str) -> Result<Vec<Header>> {
    Ok(name.parse::<Provider>()?.download_headers())
}

/// Turns a provider's embed URL into a direct media URL
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Provider this extractor handles
    fn provider(&self) -> Provider;

    /// Fetch the embed page (and whatever it points to) and recover the
    /// direct link
    ///
    /// Every pattern or lookup miss is an error, never an empty result.
    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String>;
}

/// Maps provider names to their extractors
///
/// Built once, read-only afterwards.
pub struct ProviderRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ProviderRegistry {
    /// Create a registry with the default extractor for every provider
    pub fn new() -> Self {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(VidozaExtractor),
            Box::new(VidmolyExtractor),
            Box::new(FilemoonExtractor),
            Box::new(LuluvdoExtractor::new()),
            Box::new(LoadxExtractor),
            Box::new(DoodstreamExtractor::new()),
            Box::new(VoeExtractor),
        ];

        Self { extractors }
    }

    /// Replace the extractor registered for the same provider
    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        let provider = extractor.provider();
        self.extractors.retain(|e| e.provider() != provider);
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Find the extractor for a provider name
    ///
    /// # Errors
    /// Returns `NotSupported` if no extractor handles the name
    pub fn lookup(&self, name: &str) -> Result<&dyn Extractor> {
        let provider: Provider = name.parse()?;
        self.extractors
            .iter()
            .find(|e| e.provider() == provider)
            .map(|e| e.as_ref())
            .ok_or_else(|| ResolveError::NotSupported(name.to_string()))
    }

    /// Download headers for a provider name
    pub fn headers_for(&self, name: &str) -> Result<Vec<Header>> {
        headers_for(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(headers: &[Header]) -> Vec<(&str, &str)> {
        headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
            .collect()
    }

    #[test]
    fn test_spec_table_matches_enum_order() {
        for provider in Provider::ALL {
            assert_eq!(provider.spec().provider, provider);
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("VOE".parse::<Provider>().unwrap(), Provider::Voe);
        assert_eq!("LoadX".parse::<Provider>().unwrap(), Provider::LoadX);
        assert!(matches!(
            "Streamtape".parse::<Provider>(),
            Err(ResolveError::NotSupported(_))
        ));
        // Names are matched exactly
        assert!("voe".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_name_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(provider.name().parse::<Provider>().unwrap(), provider);
            assert_eq!(provider.to_string(), provider.name());
        }
    }

    #[test]
    fn test_headers_for_each_provider() {
        assert!(headers_for("Vidoza").unwrap().is_empty());
        assert_eq!(
            pairs(&headers_for("Vidmoly").unwrap()),
            vec![("Referer", "https://vidmoly.to")]
        );
        assert_eq!(
            pairs(&headers_for("Filemoon").unwrap()),
            vec![
                ("User-Agent", DESKTOP_USER_AGENT),
                ("Referer", "https://filemoon.to")
            ]
        );
        assert_eq!(
            pairs(&headers_for("Luluvdo").unwrap()),
            vec![
                ("User-Agent", MOBILE_USER_AGENT),
                ("Accept-Language", "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"),
                ("Origin", "https://luluvdo.com"),
                ("Referer", "https://luluvdo.com/"),
            ]
        );
        assert_eq!(pairs(&headers_for("LoadX").unwrap()), vec![("Accept", "*/*")]);
        assert_eq!(
            pairs(&headers_for("Doodstream").unwrap()),
            vec![("Referer", "https://dood.li/")]
        );
        assert_eq!(
            pairs(&headers_for("VOE").unwrap()),
            vec![("User-Agent", DESKTOP_USER_AGENT)]
        );
    }

    #[test]
    fn test_headers_for_is_stable() {
        for provider in Provider::ALL {
            assert_eq!(
                headers_for(provider.name()).unwrap(),
                headers_for(provider.name()).unwrap()
            );
        }
    }

    #[test]
    fn test_headers_for_unknown() {
        assert!(matches!(
            headers_for("Hanime"),
            Err(ResolveError::NotSupported(_))
        ));
    }

    #[test]
    fn test_registry_covers_every_provider() {
        let registry = ProviderRegistry::new();
        for provider in Provider::ALL {
            let extractor = registry.lookup(provider.name()).unwrap();
            assert_eq!(extractor.provider(), provider);
        }
    }

    #[test]
    fn test_registry_lookup_unknown() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.lookup("SpeedFiles"),
            Err(ResolveError::NotSupported(name)) if name == "SpeedFiles"
        ));
    }

    #[test]
    fn test_registry_with_extractor_replaces() {
        let registry = ProviderRegistry::new()
            .with_extractor(LuluvdoExtractor::with_base_url("http://127.0.0.1:9"));
        assert_eq!(registry.extractors.len(), Provider::ALL.len());
        assert!(registry.lookup("Luluvdo").is_ok());
    }
}
