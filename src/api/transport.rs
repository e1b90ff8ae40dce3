//! Raw body transport: `fetch(url, params, headers) -> body`.
//!
//! The router and the projector never touch the network; everything goes
//! through a [`Transport`]. [`ReqwestTransport`] is the production
//! implementation with backoff for transient failures.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::{debug, error, info, instrument, warn};

use crate::api::http_client::create_http_client_with_timeout;
use crate::constants::retry;
use crate::error::AppError;

/// Executes one GET request and returns the response body as text.
pub trait Transport: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// [`Transport`] over a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_retries: u32,
    initial_backoff: Duration,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_retries: retry::MAX_RETRIES,
            initial_backoff: Duration::from_millis(retry::INITIAL_BACKOFF_MS),
        }
    }

    pub fn with_timeout(timeout_seconds: u64) -> Result<Self, AppError> {
        Ok(Self::new(create_http_client_with_timeout(timeout_seconds)?))
    }

    /// Overrides the retry budget; zero disables retries.
    pub fn with_retries(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }
}

impl Transport for ReqwestTransport {
    #[instrument(skip(self, params, headers))]
    async fn fetch(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> Result<String, AppError> {
        info!("Fetching data from URL: {url}");

        // Retry 429/5xx and timeout/connect errors with exponential backoff
        let mut attempt = 0u32;
        let mut backoff = self.initial_backoff;
        let response = loop {
            let request = self
                .client
                .get(url)
                .query(params)
                .headers(headers.clone());
            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if (status.as_u16() == 429 || status.is_server_error())
                        && attempt < self.max_retries
                    {
                        // Respect Retry-After if provided
                        let retry_after = resp
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs);
                        let wait = retry_after.unwrap_or(backoff);
                        warn!(
                            "Transient {} from {}. Retrying in {:?} (attempt {}/{})",
                            status,
                            url,
                            wait,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        backoff = backoff.saturating_mul(2);
                        continue;
                    }
                    break resp;
                }
                Err(e) => {
                    if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries {
                        warn!(
                            "Request error {} for {}. Retrying in {:?} (attempt {}/{})",
                            e,
                            url,
                            backoff,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        backoff = backoff.saturating_mul(2);
                        continue;
                    }
                    error!("Request failed for URL {}: {}", url, e);
                    return if e.is_timeout() {
                        Err(AppError::network_timeout(url))
                    } else if e.is_connect() {
                        Err(AppError::network_connection(url, e.to_string()))
                    } else {
                        Err(AppError::ApiFetch(e))
                    };
                }
            }
        };

        let status = response.status();
        debug!("Response status: {status}");

        if !status.is_success() {
            let status_code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            let body = response.text().await.unwrap_or_default();

            error!("HTTP {} - {} (URL: {})", status_code, reason, url);

            return Err(match status_code {
                401 => AppError::unauthorized(error_message(&body, reason), url),
                404 => AppError::api_not_found(url),
                429 => AppError::api_rate_limit(reason, url),
                400..=499 => AppError::api_client_error(status_code, reason, url),
                _ => AppError::api_server_error(status_code, reason, url),
            });
        }

        let body = response.text().await.map_err(|e| {
            error!("Failed to read response text from URL {}: {}", url, e);
            AppError::ApiFetch(e)
        })?;

        debug!("Response length: {} bytes", body.len());
        let preview: String = body.chars().take(512).collect();
        debug!("Response text (first 512 chars): {preview}");

        Ok(body)
    }
}

/// Short description for an error body; falls back to the HTTP reason phrase.
fn error_message(body: &str, reason: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
