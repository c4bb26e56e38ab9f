//! LoadX: canonical id from a HEAD redirect chain, then a JSON player API

use async_trait::async_trait;
use serde::Deserialize;

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient};
use crate::error::{ResolveError, Result};
use crate::url::parse_absolute;

pub struct LoadxExtractor;

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    #[serde(rename = "videoSource")]
    video_source: Option<String>,
}

#[async_trait]
impl Extractor for LoadxExtractor {
    fn provider(&self) -> Provider {
        Provider::LoadX
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        let embed_url = validate(embed_url)?;

        // LoadX serves broken certificates
        tracing::debug!("Resolving LoadX canonical URL: {}", embed_url);
        let head = http.fetch(FetchRequest::head(embed_url).insecure()).await?;

        let api_url = player_api_url(&head.final_url)?;
        tracing::debug!("Requesting LoadX video source: {}", api_url);
        let response = http
            .fetch(
                FetchRequest::post(api_url)
                    .header("X-Requested-With", "XMLHttpRequest")
                    .insecure(),
            )
            .await?;

        parse_video_source(&response.text())
    }
}

fn validate(embed_url: &str) -> Result<&str> {
    let embed_url = embed_url.trim();
    if embed_url.is_empty() {
        return Err(ResolveError::InvalidUrl(
            "LoadX URL cannot be empty".to_string(),
        ));
    }
    if !embed_url.starts_with("http://") && !embed_url.starts_with("https://") {
        return Err(ResolveError::InvalidUrl(format!(
            "{}: must start with http:// or https://",
            embed_url
        )));
    }
    let parsed = parse_absolute(embed_url)?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ResolveError::InvalidUrl(format!(
            "{}: missing domain",
            embed_url
        )));
    }
    Ok(embed_url)
}

/// Builds `<scheme>://<host>/player/index.php?data=<id>&do=getVideo`
/// from the settled `/<kind>/<id>/...` URL
fn player_api_url(settled_url: &str) -> Result<String> {
    let parsed = parse_absolute(settled_url)?;
    let parts: Vec<&str> = parsed.path().split('/').collect();
    let id_hash = parts
        .get(2)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ResolveError::Parse(format!("LoadX id not found in {}", settled_url)))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| ResolveError::InvalidUrl(format!("{}: missing host", settled_url)))?;
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    Ok(format!(
        "{}://{}/player/index.php?data={}&do=getVideo",
        parsed.scheme(),
        authority,
        id_hash
    ))
}

/// Reads the trimmed `videoSource` field of the player API response
///
/// # Errors
/// Returns `Parse` if the body is not JSON or the field is missing/empty
pub fn parse_video_source(body: &str) -> Result<String> {
    let response: PlayerResponse = serde_json::from_str(body)
        .map_err(|e| ResolveError::Parse(format!("Invalid LoadX JSON response: {}", e)))?;

    response
        .video_source
        .map(|source| source.trim().to_string())
        .filter(|source| !source.is_empty())
        .ok_or_else(|| ResolveError::Parse("LoadX videoSource not found".to_string()))
}
