//! Resolution orchestrator
//!
//! Provides the high-level API combining the HTTP client, provider
//! selection and the extractor registry.

use std::time::Duration;

use crate::client::{ClientConfig, FetchRequest, HttpClient};
use crate::error::{ResolveError, Result};
use crate::providers::ProviderRegistry;
use crate::types::{LanguageKey, LanguageMap, ProviderMap, ResolvedLink};

/// Chooses a language when a provider lacks the preferred one
pub type LanguageFallback = fn(&LanguageMap) -> Option<LanguageKey>;

/// Provider/language pair picked from a [`ProviderMap`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub provider: String,
    pub language: LanguageKey,
    pub redirect_url: String,
}

/// Whole-resolution retry settings
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retry attempts for transient errors (default: 3)
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

/// Smallest language key the provider offers
///
/// This mirrors how the reference site orders its dub/sub variants and
/// is a heuristic, not a site contract.
pub fn smallest_language_key(languages: &LanguageMap) -> Option<LanguageKey> {
    languages.keys().next().copied()
}

/// Picks a provider with the default language fallback
///
/// Returns the first provider (insertion order) offering `preferred`.
/// If none does, returns the first provider with its smallest key.
///
/// # Errors
/// - `NoProvidersFound` if the map is empty or the first provider
///   offers no language at all
pub fn select_provider(map: &ProviderMap, preferred: LanguageKey) -> Result<Selection> {
    select_provider_with(map, preferred, smallest_language_key)
}

/// Picks a provider, using `fallback` when no provider offers `preferred`
pub fn select_provider_with(
    map: &ProviderMap,
    preferred: LanguageKey,
    fallback: LanguageFallback,
) -> Result<Selection> {
    for (provider, languages) in map.iter() {
        if let Some(redirect_url) = languages.get(&preferred) {
            return Ok(Selection {
                provider: provider.to_string(),
                language: preferred,
                redirect_url: redirect_url.clone(),
            });
        }
    }

    let (provider, languages) = map.iter().next().ok_or(ResolveError::NoProvidersFound)?;
    let language = fallback(languages).ok_or(ResolveError::NoProvidersFound)?;
    let redirect_url = languages
        .get(&language)
        .ok_or(ResolveError::NoProvidersFound)?;

    tracing::warn!(
        "No provider offers language {}, falling back to {} with language {}",
        preferred,
        provider,
        language
    );

    Ok(Selection {
        provider: provider.to_string(),
        language,
        redirect_url: redirect_url.clone(),
    })
}

/// Main resolution API
///
/// Holds only read-only state after construction, so one instance can
/// serve independent resolutions concurrently.
pub struct Resolver {
    http: HttpClient,
    registry: ProviderRegistry,
    fallback: LanguageFallback,
}

impl Resolver {
    /// Create a resolver with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a resolver with custom client configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_parts(
            HttpClient::with_config(config)?,
            ProviderRegistry::new(),
        ))
    }

    /// Assemble a resolver from an existing client and registry
    pub fn from_parts(http: HttpClient, registry: ProviderRegistry) -> Self {
        Self {
            http,
            registry,
            fallback: smallest_language_key,
        }
    }

    /// Replace the language fallback used by [`Resolver::resolve`]
    pub fn with_language_fallback(mut self, fallback: LanguageFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Follow a redirect URL to the provider's embed page
    ///
    /// # Returns
    /// The settled URL after all redirects
    pub async fn follow_redirect(&self, redirect_url: &str) -> Result<String> {
        let response = self.http.fetch(FetchRequest::get(redirect_url)).await?;
        Ok(response.final_url)
    }

    /// Resolve an episode's provider map into a direct link
    ///
    /// Selection → extractor lookup → redirect → extraction → headers.
    /// Unsupported providers fail before any request is made.
    ///
    /// # Errors
    /// - `NoProvidersFound` if the map is empty
    /// - `NotSupported` if the selected provider has no extractor
    /// - `Extraction` wrapping the first failure of a network/parse step
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> embedlink_core::Result<()> {
    /// use embedlink_core::{ProviderMap, Resolver};
    /// let mut providers = ProviderMap::new();
    /// providers.insert("VOE", 1, "https://aniworld.to/redirect/123")?;
    ///
    /// let resolver = Resolver::new()?;
    /// let link = resolver.resolve(&providers, 1).await?;
    /// println!("{} ({} headers)", link.url, link.headers.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve(&self, map: &ProviderMap, preferred: LanguageKey) -> Result<ResolvedLink> {
        if map.is_empty() {
            return Err(ResolveError::NoProvidersFound);
        }

        let selection = select_provider_with(map, preferred, self.fallback)?;
        // Fail on unsupported providers before touching the network
        self.registry.lookup(&selection.provider)?;

        tracing::info!(
            "Selected provider: {} (language {}, redirect: {})",
            selection.provider,
            selection.language,
            selection.redirect_url
        );

        let embed_url = self
            .follow_redirect(&selection.redirect_url)
            .await
            .map_err(|e| ResolveError::extraction(&selection.provider, "follow_redirect", e))?;
        tracing::info!("Embed URL: {}", embed_url);

        self.resolve_embed(&selection.provider, &embed_url).await
    }

    /// Resolve a known provider's embed URL into a direct link
    ///
    /// # Errors
    /// - `NotSupported` if the provider has no extractor
    /// - `Extraction` if the extractor fails
    pub async fn resolve_embed(&self, provider: &str, embed_url: &str) -> Result<ResolvedLink> {
        let extractor = self.registry.lookup(provider)?;
        let headers = self.registry.headers_for(provider)?;

        let url = extractor
            .resolve(&self.http, embed_url)
            .await
            .map_err(|e| ResolveError::extraction(provider, "extract", e))?;
        tracing::info!("Direct video URL from {}: {}", provider, url);

        Ok(ResolvedLink {
            provider: provider.to_string(),
            url,
            headers,
        })
    }

    /// [`Resolver::resolve`] retried as a whole on transient failures
    ///
    /// Backs off exponentially (1s, 2s, 4s, ...). Individual steps are
    /// never retried on their own since provider tokens are single-use.
    pub async fn resolve_with_retry(
        &self,
        map: &ProviderMap,
        preferred: LanguageKey,
        policy: &RetryPolicy,
    ) -> Result<ResolvedLink> {
        let mut attempt = 0;

        loop {
            match self.resolve(map, preferred).await {
                Ok(link) => return Ok(link),
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    let backoff = Duration::from_secs(1 << attempt);
                    tracing::warn!(
                        "Resolution failed ({}), retrying in {:?} [{}/{}]",
                        e,
                        backoff,
                        attempt + 1,
                        policy.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
