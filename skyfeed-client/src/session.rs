//! HTTP session with retry.
//!
//! Every request issued through a [`Session`] is retried on connection-level
//! failures and on retryable statuses, sleeping `backoff_factor * 2^n`
//! seconds between attempts. No other layer retries.

use skyfeed_core::{HttpError, HttpRequest, HttpResponse, RetryPolicy, Transport};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Reusable transport handle bound to a base URL.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn connect(
        base_url: impl Into<String>,
        retry: RetryPolicy,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            retry,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Join `path` onto the base URL with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Issue `request`, retrying per the session's policy.
    ///
    /// Returns the first 2xx response. A non-retryable status fails at once;
    /// retryable failures surface after `max_attempts` tries.
    pub async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(url = %request.url, attempt, max_attempts, "Sending request");

            let failure = match self.transport.get(request).await {
                Ok(response) if response.is_success() => {
                    debug!(url = %request.url, status = response.status, "Request succeeded");
                    return Ok(response);
                }
                Ok(response) if self.retry.is_retryable(response.status) => HttpError::Status {
                    url: request.url.clone(),
                    status: response.status,
                    attempts: attempt,
                },
                Ok(response) => {
                    warn!(url = %request.url, status = response.status, "Request rejected");
                    return Err(HttpError::Status {
                        url: request.url.clone(),
                        status: response.status,
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                error!(
                    url = %request.url,
                    attempts = attempt,
                    error = %failure,
                    "Request failed after exhausting retries"
                );
                return Err(failure);
            }

            let delay = self.retry.backoff_for(attempt - 1);
            warn!(
                url = %request.url,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
