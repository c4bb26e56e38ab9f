//! HTTP fetch primitive used by every extractor
//!
//! Wraps reqwest with manual redirect handling, uniform status checking
//! and an opt-out from TLS certificate verification for hosts that serve
//! broken certificates.

use std::time::Duration;

use reqwest::{Method, StatusCode};

use crate::error::{ResolveError, Result};

/// Desktop browser user agent sent by default
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Mobile Firefox user agent expected by Luluvdo
pub const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (Android 15; Mobile; rv:132.0) Gecko/132.0 Firefox/132.0";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Maximum redirect hops per fetch (default: 10)
    pub max_redirects: usize,
    /// Default User-Agent, overridable per request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 10,
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

/// A single outbound request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub follow_redirects: bool,
    pub verify_tls: bool,
}

impl FetchRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            follow_redirects: true,
            verify_tls: true,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::HEAD, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn headers(self, headers: &[(&str, &str)]) -> Self {
        headers
            .iter()
            .fold(self, |req, (name, value)| req.header(name, value))
    }

    /// Return 3xx responses as-is instead of following them
    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    /// Skip TLS certificate verification for this request
    pub fn insecure(mut self) -> Self {
        self.verify_tls = false;
        self
    }
}

/// Outcome of a fetch: settled URL, status and raw body
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub final_url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client shared by the resolver and all extractors
///
/// Handles:
/// - Bounded timeout on every request
/// - Manual redirect following with a hop limit
/// - Status checking (non-2xx becomes `HttpStatus`)
/// - Per-request TLS verification opt-out
///
/// Holds no per-resolution state, so one instance can serve
/// concurrent resolutions.
#[derive(Debug, Clone)]
pub struct HttpClient {
    verified: reqwest::Client,
    insecure: reqwest::Client,
    max_redirects: usize,
}

impl HttpClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let build = |accept_invalid_certs: bool| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.as_str())
                .redirect(reqwest::redirect::Policy::none())
                .danger_accept_invalid_certs(accept_invalid_certs)
                .build()
                .map_err(ResolveError::Transport)
        };

        Ok(Self {
            verified: build(false)?,
            insecure: build(true)?,
            max_redirects: config.max_redirects,
        })
    }

    /// Perform one logical request, following redirects if asked to
    ///
    /// # Errors
    /// - `Transport` - Network, timeout or body read errors
    /// - `HttpStatus` - Final response was not 2xx
    /// - `TooManyRedirects` - Hop limit exceeded
    /// - `InvalidUrl` - Unparseable request URL or `Location` header
    pub async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let client = if request.verify_tls {
            &self.verified
        } else {
            &self.insecure
        };

        let mut current_url = ::url::Url::parse(&request.url)
            .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", request.url, e)))?;
        let mut method = request.method.clone();

        for _ in 0..=self.max_redirects {
            tracing::debug!("{} {}", method, current_url);

            let mut builder = client.request(method.clone(), current_url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            let response = builder.send().await.map_err(ResolveError::Transport)?;
            let status = response.status();

            if status.is_redirection() && request.follow_redirects {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|loc| loc.to_str().ok());

                if let Some(location) = location {
                    current_url = current_url.join(location).map_err(|e| {
                        ResolveError::InvalidUrl(format!("{}: {}", location, e))
                    })?;
                    // Browsers re-issue a redirected POST as GET
                    if method == Method::POST
                        && matches!(
                            status,
                            StatusCode::MOVED_PERMANENTLY
                                | StatusCode::FOUND
                                | StatusCode::SEE_OTHER
                        )
                    {
                        method = Method::GET;
                    }
                    continue;
                }
            }

            if !status.is_success() && !(status.is_redirection() && !request.follow_redirects) {
                return Err(ResolveError::HttpStatus {
                    status: status.as_u16(),
                    url: current_url.to_string(),
                });
            }

            let body = response.bytes().await.map_err(ResolveError::Transport)?;
            return Ok(FetchResponse {
                final_url: current_url.to_string(),
                status: status.as_u16(),
                body: body.to_vec(),
            });
        }

        Err(ResolveError::TooManyRedirects(request.url))
    }

    /// GET a page and return its body as text
    pub async fn get_text(&self, request: FetchRequest) -> Result<String> {
        Ok(self.fetch(request).await?.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.user_agent, DESKTOP_USER_AGENT);
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = ClientConfig {
            timeout_secs: 5,
            max_redirects: 2,
            user_agent: "embedlink-test".to_string(),
        };
        let client = HttpClient::with_config(config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetch_request_builder() {
        let request = FetchRequest::post("https://loadx.ws/player/index.php")
            .header("X-Requested-With", "XMLHttpRequest")
            .headers(&[("Accept", "*/*"), ("Referer", "https://loadx.ws/")])
            .no_redirects()
            .insecure();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers.len(), 3);
        assert_eq!(request.headers[0].0, "X-Requested-With");
        assert!(!request.follow_redirects);
        assert!(!request.verify_tls);
    }

    #[test]
    fn test_fetch_request_defaults() {
        let request = FetchRequest::get("https://vidoza.net/e/abc");
        assert_eq!(request.method, Method::GET);
        assert!(request.follow_redirects);
        assert!(request.verify_tls);
        assert!(request.headers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_relative_url() {
        let client = HttpClient::new().unwrap();
        let result = client.fetch(FetchRequest::get("/relative/path")).await;
        assert!(matches!(result, Err(ResolveError::InvalidUrl(_))));
    }
}
