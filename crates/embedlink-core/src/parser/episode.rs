//! Episode page parser
//!
//! Parses an episode page's hoster list into a [`ProviderMap`].

use scraper::{ElementRef, Html, Selector};

use crate::error::{ResolveError, Result};
use crate::types::{LanguageKey, ProviderMap};
use crate::url::join_url;

const ENTRY_CLASS_PREFIX: &str = "episodeLink";

/// Parses episode page HTML into provider → language → redirect URL
///
/// Every `li` with a class starting with `episodeLink` is one hoster entry:
/// the provider name is the `h4` text, the redirect is the
/// `a.watchEpisode` href (joined against `base_url`) and the language is
/// the numeric `data-lang-key` attribute. Incomplete entries are skipped.
///
/// # Arguments
/// * `html` - Raw HTML string from the episode page
/// * `base_url` - Site root used to absolutize redirect paths
///
/// # Errors
/// Returns `NoProvidersFound` if the page lists no usable hoster entry
pub fn parse_provider_map(html: &str, base_url: &str) -> Result<ProviderMap> {
    let document = Html::parse_document(html);
    let entry_selector = Selector::parse("li[class]")
        .map_err(|e| ResolveError::Parse(format!("Invalid selector: {:?}", e)))?;

    let mut providers = ProviderMap::new();

    for element in document.select(&entry_selector) {
        if !is_hoster_entry(&element) {
            continue;
        }
        let Some((name, language, href)) = parse_hoster_entry(&element) else {
            continue;
        };

        let redirect_url = match join_url(base_url, &href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping {} entry with bad redirect: {}", name, e);
                continue;
            }
        };

        if let Err(e) = providers.insert(&name, language, &redirect_url) {
            tracing::debug!("Skipping {} entry: {}", name, e);
        }
    }

    if providers.is_empty() {
        return Err(ResolveError::NoProvidersFound);
    }

    Ok(providers)
}

/// Any one of the `li`'s classes starts with `episodeLink`
fn is_hoster_entry(element: &ElementRef) -> bool {
    element
        .value()
        .classes()
        .any(|class| class.starts_with(ENTRY_CLASS_PREFIX))
}

/// Parses a single hoster `li`
///
/// # Returns
/// `Some((provider, language, href))` if every part is present
fn parse_hoster_entry(element: &ElementRef) -> Option<(String, LanguageKey, String)> {
    let name_selector = Selector::parse("h4").ok()?;
    let name = element
        .select(&name_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())?;
    if name.is_empty() {
        return None;
    }

    let link_selector = Selector::parse("a.watchEpisode[href]").ok()?;
    let href = element
        .select(&link_selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)?;

    let raw_key = element.value().attr("data-lang-key")?;
    let Some(language) = parse_language_key(raw_key) else {
        tracing::debug!("Skipping {} entry with language key {:?}", name, raw_key);
        return None;
    };

    Some((name, language, href))
}

/// Accepts only all-digit, non-zero keys
fn parse_language_key(raw: &str) -> Option<LanguageKey> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<LanguageKey>().ok().filter(|key| *key != 0)
}
