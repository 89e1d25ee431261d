//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::Client;
use skyfeed_core::{HttpError, HttpRequest, HttpResponse, Transport};
use std::time::Duration;

const USER_AGENT: &str = concat!("skyfeed/", env!("CARGO_PKG_VERSION"));

/// Sends each request once through a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Transport {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, url: &str, error: reqwest::Error) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            // Strip the URL from reqwest's message; it carries the api key.
            HttpError::Transport {
                url: url.to_string(),
                reason: error.without_url().to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| self.map_error(&request.url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(&request.url, e))?;

        Ok(HttpResponse { status, body })
    }
}
