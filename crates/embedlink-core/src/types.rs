//! Core data types for link resolution
//!
//! Contains the provider map handed in by the episode parser and the
//! resolved link handed out to the downloader.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

/// Small integer identifying a dub/sub variant (site-defined)
pub type LanguageKey = u32;

/// Language key → redirect URL for one provider
pub type LanguageMap = BTreeMap<LanguageKey, String>;

/// A single HTTP header required to fetch a resolved link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Direct media link plus the headers needed to download it
///
/// Headers must be passed verbatim when fetching `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    /// Provider that produced the link (e.g., "VOE")
    pub provider: String,

    /// Absolute, usually token-bearing and time-limited media URL
    pub url: String,

    /// Ordered (name, value) pairs for the final download request
    pub headers: Vec<Header>,
}

/// Provider name → language key → redirect URL, in insertion order
///
/// Built once per episode page. Provider order matters: it is the
/// order [`crate::select_provider`] scans in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderMap {
    entries: Vec<(String, LanguageMap)>,
}

impl ProviderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a redirect URL for a provider/language pair
    ///
    /// New providers are appended; existing ones keep their position
    /// and get the key (re)assigned.
    ///
    /// # Errors
    /// - `InvalidProvider` if the name is empty or whitespace only
    /// - `InvalidUrl` if the redirect URL is not an absolute http(s) URL
    pub fn insert(
        &mut self,
        provider: &str,
        language: LanguageKey,
        redirect_url: &str,
    ) -> Result<()> {
        let provider = provider.trim();
        if provider.is_empty() {
            return Err(ResolveError::InvalidProvider(provider.to_string()));
        }

        let parsed = ::url::Url::parse(redirect_url)
            .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", redirect_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ResolveError::InvalidUrl(redirect_url.to_string()));
        }

        match self.entries.iter_mut().find(|(name, _)| name.as_str() == provider) {
            Some((_, languages)) => {
                languages.insert(language, redirect_url.to_string());
            }
            None => {
                let mut languages = LanguageMap::new();
                languages.insert(language, redirect_url.to_string());
                self.entries.push((provider.to_string(), languages));
            }
        }
        Ok(())
    }

    /// Language map of one provider
    pub fn get(&self, provider: &str) -> Option<&LanguageMap> {
        self.entries
            .iter()
            .find(|(name, _)| name.as_str() == provider)
            .map(|(_, languages)| languages)
    }

    /// Providers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageMap)> {
        self.entries
            .iter()
            .map(|(name, languages)| (name.as_str(), languages))
    }

    /// Provider names in insertion order
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
