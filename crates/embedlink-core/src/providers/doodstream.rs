//! Doodstream: `pass_md5` token exchange plus a client-built suffix
//!
//! The page script fetches a base URL from `/pass_md5/...` and appends a
//! random 10-character suffix, the page token and the current time.
//! Clock and randomness are injectable so link construction is testable.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient};
use crate::decode::{extract_token, pattern};
use crate::error::{ResolveError, Result};
use crate::url::join_url;

const REFERER: &str = "https://dood.li/";
const PASS_MD5_PATTERN: &str = r"\$\.get\('([^']*/pass_md5/[^']*)'";
const TOKEN_PATTERN: &str = r"token=([a-zA-Z0-9]+)";
const SUFFIX_LEN: usize = 10;

/// Source of the `expiry` timestamp
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch
    fn unix_now(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

pub struct DoodstreamExtractor {
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl DoodstreamExtractor {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic extractor for tests
    pub fn with_clock_and_seed(clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn random_suffix(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (0..SUFFIX_LEN)
            .map(|_| rng.sample(Alphanumeric) as char)
            .collect()
    }
}

impl Default for DoodstreamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for DoodstreamExtractor {
    fn provider(&self) -> Provider {
        Provider::Doodstream
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        if embed_url.trim().is_empty() {
            return Err(ResolveError::InvalidUrl(
                "Embed URL cannot be empty".to_string(),
            ));
        }

        tracing::debug!("Fetching Doodstream embed page: {}", embed_url);
        let page = http
            .fetch(
                FetchRequest::get(embed_url)
                    .header("Referer", REFERER)
                    .insecure(),
            )
            .await?;
        let html = page.text();

        let pass_md5 = extract_token(&pattern(PASS_MD5_PATTERN)?, &html, "Doodstream pass_md5 URL")?;
        let pass_md5_url = join_url(&page.final_url, &pass_md5)?;
        let token = extract_token(&pattern(TOKEN_PATTERN)?, &html, "Doodstream token")?;

        tracing::debug!("Fetching Doodstream pass_md5: {}", pass_md5_url);
        let base_url = http
            .get_text(
                FetchRequest::get(pass_md5_url)
                    .header("Referer", REFERER)
                    .insecure(),
            )
            .await?;
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(ResolveError::Parse(
                "Empty base URL received from Doodstream".to_string(),
            ));
        }

        Ok(build_doodstream_url(
            base_url,
            &self.random_suffix(),
            &token,
            self.clock.unix_now(),
        ))
    }
}

/// `<base><suffix>?token=<token>&expiry=<unix seconds>`
pub fn build_doodstream_url(base_url: &str, suffix: &str, token: &str, expiry: u64) -> String {
    format!("{}{}?token={}&expiry={}", base_url, suffix, token, expiry)
}
