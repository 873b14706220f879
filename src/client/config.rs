//! Configuration management for GitHub client

use std::time::Duration;

use compact_str::{CompactString, format_compact};

use super::error::{ClientError, Result};
use crate::config::PulseConfig;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_HTML_URL: &str = "https://github.com";

/// Main configuration for GitHub client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GitHub API root
    pub api_url: CompactString,
    /// Root used for the links in change events
    pub html_url: CompactString,
    /// Whose repositories are watched
    pub username: CompactString,
    /// Polling configuration
    pub polling: PollingConfig,
    /// Request configuration
    pub request: RequestConfig,
}

/// Polling interval configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval between repository list fetches
    pub interval: Duration,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: CompactString,
    /// How requests find their way out
    pub proxy: ProxyPolicy,
}

/// Proxy resolution, fixed when the HTTP client is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProxyPolicy {
    /// Honour the system proxy environment
    #[default]
    System,
    /// Route everything through this proxy
    Url(CompactString),
    /// Connect directly
    Disabled,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(60) }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format_compact!("repo-pulse/{}", env!("CARGO_PKG_VERSION")),
            proxy: ProxyPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration against the public GitHub API
    pub fn new(username: impl Into<CompactString>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            html_url: DEFAULT_HTML_URL.into(),
            username: username.into(),
            polling: PollingConfig::default(),
            request: RequestConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(ClientError::config_validation(
                "username",
                "Username cannot be empty",
            ));
        }

        if self.username.contains('/') {
            return Err(ClientError::config_validation(
                "username",
                "Username cannot contain '/'",
            ));
        }

        validate_http_url("api_url", &self.api_url)?;
        validate_http_url("html_url", &self.html_url)?;

        if let ProxyPolicy::Url(proxy) = &self.request.proxy
            && url::Url::parse(proxy).is_err()
        {
            return Err(ClientError::invalid_url(proxy.clone()));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        if self.polling.interval.is_zero() {
            return Err(ClientError::config_validation(
                "poll_interval",
                "Poll interval must be greater than zero",
            ));
        }

        Ok(())
    }

    /// `GET {api}/users/{username}/repos`
    pub fn repos_url(&self) -> CompactString {
        format_compact!(
            "{}/users/{}/repos",
            self.api_url.trim_end_matches('/'),
            self.username
        )
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ClientError::config_validation(
            field,
            "URL must start with http:// or https://",
        ));
    }

    if url::Url::parse(value).is_err() {
        return Err(ClientError::invalid_url(value));
    }

    Ok(())
}

impl From<PulseConfig> for ClientConfig {
    fn from(config: PulseConfig) -> Self {
        let proxy = match (config.no_proxy, config.proxy) {
            (true, _) => ProxyPolicy::Disabled,
            (false, Some(proxy)) => ProxyPolicy::Url(proxy),
            (false, None) => ProxyPolicy::System,
        };

        Self::new(config.username)
            .with_api_url(config.api_url)
            .with_html_url(config.html_url)
            .with_polling(PollingConfig {
                interval: Duration::from_secs(config.poll_interval_secs),
            })
            .with_request(RequestConfig {
                timeout: Duration::from_secs(config.timeout_secs),
                proxy,
                ..RequestConfig::default()
            })
    }
}

impl ClientConfig {
    pub fn with_api_url(mut self, api_url: impl Into<CompactString>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_html_url(mut self, html_url: impl Into<CompactString>) -> Self {
        self.html_url = html_url.into();
        self
    }

    /// Set polling configuration
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}
