//! Luluvdo: the file code from the embed URL feeds a fixed embed API

use async_trait::async_trait;

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient, MOBILE_USER_AGENT};
use crate::decode::{extract_token, pattern};
use crate::error::{ResolveError, Result};
use crate::url::{parse_absolute, trailing_path_id};

const BASE_URL: &str = "https://luluvdo.com";
const FILE_PATTERN: &str = r#"file:\s*"([^"]+)""#;

pub struct LuluvdoExtractor {
    base_url: String,
    base_host: String,
}

impl LuluvdoExtractor {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the embed API at another origin; embed URLs must then be
    /// hosted on that origin's host
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base_host = ::url::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_else(|| base_url.to_lowercase());
        Self {
            base_url,
            base_host,
        }
    }

    fn validate<'a>(&self, embed_url: &'a str) -> Result<&'a str> {
        let embed_url = embed_url.trim();
        if embed_url.is_empty() {
            return Err(ResolveError::InvalidUrl(
                "Luluvdo URL cannot be empty".to_string(),
            ));
        }
        if !embed_url.starts_with("http://") && !embed_url.starts_with("https://") {
            return Err(ResolveError::InvalidUrl(format!(
                "{}: must start with http:// or https://",
                embed_url
            )));
        }

        let parsed = parse_absolute(embed_url)?;
        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        if !host.contains(&self.base_host) {
            return Err(ResolveError::InvalidUrl(format!(
                "{}: not a {} URL",
                embed_url, self.base_host
            )));
        }
        Ok(embed_url)
    }

    fn embed_api_url(&self, file_code: &str) -> String {
        format!(
            "{}/dl?op=embed&file_code={}&embed=1&referer=luluvdo.com&adb=0",
            self.base_url,
            urlencoding::encode(file_code)
        )
    }
}

impl Default for LuluvdoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for LuluvdoExtractor {
    fn provider(&self) -> Provider {
        Provider::Luluvdo
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        let embed_url = self.validate(embed_url)?;
        let file_code = trailing_path_id(embed_url)
            .ok_or_else(|| ResolveError::Parse("Luluvdo file code not found".to_string()))?;

        let api_url = self.embed_api_url(&file_code);
        tracing::debug!("Fetching Luluvdo embed API: {}", api_url);

        let origin = self.base_url.as_str();
        let referer = format!("{}/", self.base_url);
        let body = http
            .get_text(FetchRequest::get(api_url).headers(&[
                ("Origin", origin),
                ("Referer", referer.as_str()),
                ("User-Agent", MOBILE_USER_AGENT),
            ]))
            .await?;

        let re = pattern(FILE_PATTERN)?;
        let file = extract_token(&re, &body, "Luluvdo file literal")?;
        Ok(file.trim().to_string())
    }
}
