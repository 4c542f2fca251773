use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::redirect::Policy;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from the transport-level asset probe.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS or TLS failure
    #[error("Request failed: {0}")]
    Network(String),
    /// No response within the request timeout
    #[error("Request timed out")]
    Timeout,
    /// Non-2xx final response
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Redirect chain too long or looping
    #[error("Redirect error: {0}")]
    Redirect(String),
    #[error("Invalid asset URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// 4xx responses and malformed URLs will not get better by waiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) | TransportError::Timeout => true,
            TransportError::HttpStatus(status) => *status >= 500 || *status == 429,
            TransportError::Redirect(_) | TransportError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_redirect() {
            TransportError::Redirect(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidUrl(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// What a successful HEAD probe yields.
#[derive(Debug, Clone)]
pub struct HeadResponse {
    /// URL after following redirects; the media probe targets this, not the
    /// configured URL, since the latter may be a short-link.
    pub final_url: String,
    pub headers: HeaderMap,
}

impl HeadResponse {
    pub fn content_length(&self) -> Option<&str> {
        self.header(CONTENT_LENGTH.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Issues the redirect-following HEAD request for an asset.
///
/// Implemented over `reqwest` for real runs; tests substitute canned
/// responses.
pub trait AssetTransport {
    fn head(&self, url: &str) -> impl Future<Output = Result<HeadResponse, TransportError>> + Send;
}

/// Create a redirect policy with loop detection and a hop limit.
fn redirect_policy(max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= max_redirects {
            return attempt.error(format!("Too many redirects (max {})", max_redirects));
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// [`AssetTransport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(redirect_policy(max_redirects))
            .timeout(timeout)
            .user_agent(concat!("podcast-rss-generator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl AssetTransport for ReqwestTransport {
    async fn head(&self, url: &str) -> Result<HeadResponse, TransportError> {
        let response = self.client.head(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        Ok(HeadResponse {
            final_url: response.url().to_string(),
            headers: response.headers().clone(),
        })
    }
}
