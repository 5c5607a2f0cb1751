//! Authenticated JSON transport for the GitHub REST API
//!
//! The aggregator only sees [`Transport`]: give it a target, get JSON back or
//! a structured error. [`HttpTransport`] is the reqwest implementation.

use crate::config::InsightsConfig;
use crate::{InsightsError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, warn};

/// Versioned media type pinned on every request
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// What to request: a path under the API base URL, or a URL the API handed
/// back inline (commit detail links)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Relative(String),
    Absolute(String),
}

impl Target {
    pub fn path(path: impl Into<String>) -> Self {
        Target::Relative(path.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Target::Absolute(url.into())
    }

    /// Full URL for this target under `base_url`
    pub fn resolve(&self, base_url: &str) -> String {
        match self {
            Target::Relative(path) => format!("{}{}", base_url.trim_end_matches('/'), path),
            Target::Absolute(url) => url.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Relative(path) => write!(f, "{}", path),
            Target::Absolute(url) => write!(f, "{}", url),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue an authenticated GET and return the decoded JSON body.
    ///
    /// Non-2xx responses fail with [`InsightsError::Auth`] (401/403) or
    /// [`InsightsError::RemoteRequest`], both carrying the decoded body.
    async fn request(&self, target: &Target) -> Result<serde_json::Value>;
}

/// Request `target` and decode the body into `T`
pub async fn fetch<T, R>(transport: &R, target: &Target) -> Result<T>
where
    T: DeserializeOwned,
    R: Transport + ?Sized,
{
    let value = transport.request(target).await?;
    serde_json::from_value(value).map_err(|source| InsightsError::Decode {
        url: target.to_string(),
        source,
    })
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Create a transport for `config.api_url` using `token`
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &InsightsConfig, token: impl Into<String>) -> Result<Self> {
        let user_agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| InsightsError::Config(format!("Invalid user agent: {}", e)))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(header::USER_AGENT, user_agent);
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static(GITHUB_MEDIA_TYPE),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, target: &Target) -> Result<serde_json::Value> {
        let url = target.resolve(&self.base_url);
        debug!(url = %url, "GitHub API request");

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map_err(|source| InsightsError::Decode { url, source });
        }

        let body = decode_error_body(&bytes);
        warn!(status = status.as_u16(), url = %url, "GitHub API request failed");
        Err(InsightsError::from_status(status.as_u16(), url, body))
    }
}

/// Error bodies are usually JSON; anything else (or nothing) becomes `Null`
fn decode_error_body(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap_or(serde_json::Value::Null)
}
