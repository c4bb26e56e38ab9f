//! Vidmoly: JWPlayer setup carries the HLS URL in a `file:` literal

use async_trait::async_trait;

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient};
use crate::decode::pattern;
use crate::error::Result;
use crate::parser::find_script_literal;

const FILE_PATTERN: &str = r#"file:\s*"(https?://[^"]+)""#;

pub struct VidmolyExtractor;

#[async_trait]
impl Extractor for VidmolyExtractor {
    fn provider(&self) -> Provider {
        Provider::Vidmoly
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        tracing::debug!("Fetching Vidmoly embed page: {}", embed_url);
        let html = http.get_text(FetchRequest::get(embed_url)).await?;
        parse_file_literal(&html)
    }
}

fn parse_file_literal(html: &str) -> Result<String> {
    let re = pattern(FILE_PATTERN)?;
    find_script_literal(html, &re, "Vidmoly file literal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    #[test]
    fn test_parse_file_literal() {
        let html = r#"
        <script>
            player.setup({
                sources: [{file:"https://box-1021-t.vmwesa.online/hls/xx,yy,.urlset/master.m3u8"}],
                image: "https://vidmoly.to/poster.jpg"
            });
        </script>
        "#;

        let url = parse_file_literal(html).unwrap();
        assert_eq!(
            url,
            "https://box-1021-t.vmwesa.online/hls/xx,yy,.urlset/master.m3u8"
        );
    }

    #[test]
    fn test_parse_file_literal_ignores_relative_file() {
        let html = r#"<script>tracks: [{file: "/subs/en.vtt"}]</script>"#;
        assert!(matches!(
            parse_file_literal(html),
            Err(ResolveError::Parse(_))
        ));
    }
}
