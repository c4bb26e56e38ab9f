//! Filemoon: download page → iframe → player page with a `file:` literal

use async_trait::async_trait;

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient};
use crate::decode::{extract_token, pattern};
use crate::error::{ResolveError, Result};
use crate::parser::first_iframe_src;
use crate::url::join_url;

const FILE_PATTERN: &str = r#"file:\s*"([^"]+)""#;
const REFERER: &str = "https://filemoon.to";

pub struct FilemoonExtractor;

#[async_trait]
impl Extractor for FilemoonExtractor {
    fn provider(&self) -> Provider {
        Provider::Filemoon
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        if embed_url.trim().is_empty() {
            return Err(ResolveError::InvalidUrl(
                "Embed URL cannot be empty".to_string(),
            ));
        }

        let download_url = download_page_url(embed_url);
        tracing::debug!("Fetching Filemoon page: {}", download_url);
        let page = http.fetch(FetchRequest::get(download_url)).await?;

        let iframe_src = first_iframe_src(&page.text())?;
        let iframe_url = join_url(&page.final_url, &iframe_src)?;

        tracing::debug!("Fetching Filemoon iframe: {}", iframe_url);
        let player = http
            .get_text(FetchRequest::get(iframe_url).header("Referer", REFERER))
            .await?;

        parse_file_literal(&player)
    }
}

/// `/e/<id>` embeds are served from `/d/<id>`
fn download_page_url(embed_url: &str) -> String {
    embed_url.replace("/e/", "/d/")
}

fn parse_file_literal(html: &str) -> Result<String> {
    let re = pattern(FILE_PATTERN)?;
    let file = extract_token(&re, html, "Filemoon file literal")?;
    Ok(file.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_page_url() {
        assert_eq!(
            download_page_url("https://filemoon.to/e/abc123/episode"),
            "https://filemoon.to/d/abc123/episode"
        );
        assert_eq!(
            download_page_url("https://filemoon.to/d/abc123"),
            "https://filemoon.to/d/abc123"
        );
    }

    #[test]
    fn test_parse_file_literal_trims() {
        let html = r#"jwplayer("vplayer").setup({sources:[{file:" https://be2.filemoon.cc/hls2/x/master.m3u8 "}]});"#;
        assert_eq!(
            parse_file_literal(html).unwrap(),
            "https://be2.filemoon.cc/hls2/x/master.m3u8"
        );
    }

    #[test]
    fn test_parse_file_literal_missing() {
        assert!(matches!(
            parse_file_literal("<html></html>"),
            Err(ResolveError::Parse(_))
        ));
    }
}
