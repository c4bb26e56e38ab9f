//! Vidoza: the player script assigns the media URL to `sourcesCode`

use async_trait::async_trait;

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient};
use crate::decode::pattern;
use crate::error::Result;
use crate::parser::find_script_literal;

const SOURCES_PATTERN: &str = r#"sourcesCode:\s*"([^"]+)""#;

pub struct VidozaExtractor;

#[async_trait]
impl Extractor for VidozaExtractor {
    fn provider(&self) -> Provider {
        Provider::Vidoza
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        tracing::debug!("Fetching Vidoza embed page: {}", embed_url);
        let html = http.get_text(FetchRequest::get(embed_url)).await?;
        parse_sources_code(&html)
    }
}

fn parse_sources_code(html: &str) -> Result<String> {
    let re = pattern(SOURCES_PATTERN)?;
    find_script_literal(html, &re, "Vidoza sourcesCode literal")
}
