//! HTTP transport for the GitHub API

use std::{collections::HashMap, future::Future};

use compact_str::{CompactString, ToCompactString};
use reqwest::{Client, Proxy, Response};
use tracing::{debug, instrument};

use super::{
    config::{ClientConfig, ProxyPolicy},
    error::{ClientError, Result},
};

/// Status, headers and undecoded body of one response
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are stored lower-cased
    headers: HashMap<CompactString, CompactString>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: HashMap::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<CompactString>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase().into(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .map(CompactString::as_str)
    }
}

/// Issues the GET behind each poll cycle
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// reqwest-backed transport; user agent, timeout and proxy are fixed at construction
#[derive(Debug, Clone)]
pub struct GithubApi {
    client: Client,
}

impl GithubApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let builder = Client::builder()
            .user_agent(config.request.user_agent.as_str())
            .timeout(config.request.timeout);

        let builder = match &config.request.proxy {
            ProxyPolicy::System => builder,
            ProxyPolicy::Url(url) => {
                let proxy = url::Url::parse(url)
                    .ok()
                    .and_then(|parsed| Proxy::all(parsed).ok())
                    .ok_or_else(|| ClientError::invalid_url(url.clone()))?;
                builder.proxy(proxy)
            },
            ProxyPolicy::Disabled => builder.no_proxy(),
        };

        let client = builder.build().map_err(ClientError::Http)?;

        debug!(
            user_agent = %config.request.user_agent,
            timeout = ?config.request.timeout,
            proxy = ?config.request.proxy,
            "GitHub transport created"
        );

        Ok(Self { client })
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(classify)?;

        read_response(response).await
    }
}

impl Transport for GithubApi {
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse>> + Send {
        self.fetch(url)
    }
}

async fn read_response(response: Response) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_compact_string(), v.to_compact_string()))
        })
        .collect();

    let body = response.bytes().await.map_err(classify)?.to_vec();

    debug!(status, body_length = body.len(), "Response received");

    Ok(RawResponse { status, headers, body })
}

fn classify(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Http(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = RawResponse::new(200, "[]").with_header("X-RateLimit-Remaining", "59");

        assert_eq!(response.header("x-ratelimit-remaining"), Some("59"));
        assert_eq!(response.header("X-RATELIMIT-REMAINING"), Some("59"));
        assert_eq!(response.header("X-RateLimit-Reset"), None);
    }

    #[test]
    fn invalid_proxy_url_is_rejected() {
        let mut config = ClientConfig::new("octocat");
        config.request.proxy = ProxyPolicy::Url("not a url".into());

        assert!(matches!(
            GithubApi::new(&config),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
