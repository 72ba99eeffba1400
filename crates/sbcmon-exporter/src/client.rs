use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body of a 2xx response, or a status error for `url`.
    pub fn into_body(self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: self.status,
            })
        }
    }
}

/// Transport used for every request of a cycle: target probes, topology
/// listings and jobs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues an authenticated GET. Non-2xx statuses are returned as
    /// responses, not errors.
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, FetchError>;
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client with HTTP basic auth.
pub struct HttpFetcher {
    client: Client,
    credentials: Credentials,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(credentials: Credentials, timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            credentials,
            timeout,
        })
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: Box::new(e),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, FetchError> {
        tracing::debug!(url, "Fetching");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(url, e))?;

        Ok(FetchResponse::new(status, body.to_vec()))
    }
}
