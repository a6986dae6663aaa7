//! HTTP client with bounded retry and error classification.
//!
//! Transient failures (5xx, connection resets, timeouts) are retried a
//! fixed number of times; client-side failures (bad key, rate limit, 404)
//! are surfaced immediately as [`NonRetryableError`].

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::io::Write;
use thiserror::Error;

/// Maximum number of attempts for a network operation.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that will not succeed on retry.
#[derive(Error, Debug)]
pub enum NonRetryableError {
    #[error("Authentication failed: {0}. Check your CURSEFORGE_KEY.")]
    AuthenticationFailed(String),
    #[error("Rate limit exceeded: {0}. Try again later.")]
    RateLimitExceeded(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Access forbidden: {0}")]
    Forbidden(String),
    #[error("Request error: {0}")]
    ClientError(String),
}

/// Classifies a status error from `error_for_status()`. Retryable errors
/// pass through as-is; the rest are wrapped in [`NonRetryableError`].
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    let Some(status) = error.status() else {
        return anyhow::Error::from(error);
    };
    match status {
        StatusCode::UNAUTHORIZED => anyhow::Error::from(NonRetryableError::AuthenticationFailed(
            "invalid or missing API key".to_string(),
        )),
        StatusCode::FORBIDDEN => anyhow::Error::from(NonRetryableError::Forbidden(
            "access to this resource is forbidden".to_string(),
        )),
        StatusCode::TOO_MANY_REQUESTS => anyhow::Error::from(NonRetryableError::RateLimitExceeded(
            "too many requests".to_string(),
        )),
        StatusCode::NOT_FOUND => anyhow::Error::from(NonRetryableError::NotFound(
            "the requested resource was not found".to_string(),
        )),
        s if s.is_client_error() => anyhow::Error::from(NonRetryableError::ClientError(format!(
            "HTTP {} error",
            s.as_u16()
        ))),
        // 5xx stays a reqwest::Error and is retried
        _ => anyhow::Error::from(error),
    }
}

fn is_retryable(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}

/// HTTP client wrapping `reqwest::Client` with retry support.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a URL with query parameters and deserialize the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET {} with query {:?}...", url, query);

        self.with_retry("GET JSON", || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .context("Failed to send request")?;

            let response = response.error_for_status().map_err(check_retryable)?;

            response
                .json::<T>()
                .await
                .context("Failed to parse JSON response")
        })
        .await
    }

    /// Stream a file from a URL into a writer produced by `create_writer`.
    /// The writer is recreated on each retry so partial content is never kept.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        self.with_retry("Download", || async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .context("Failed to start download request")?;

            let mut response = response.error_for_status().map_err(check_retryable)?;

            let mut writer = create_writer()?;
            let mut downloaded: u64 = 0;
            while let Some(chunk) = response
                .chunk()
                .await
                .context("Failed to read chunk from download stream")?
            {
                writer
                    .write_all(&chunk)
                    .context("Failed to write chunk to file")?;
                downloaded += chunk.len() as u64;
            }

            debug!("Downloaded {:.2} MB", downloaded as f64 / (1024.0 * 1024.0));
            Ok(downloaded)
        })
        .await
    }

    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }
                    if attempt < MAX_RETRIES {
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            operation_name, attempt, MAX_RETRIES, e, RETRY_DELAY_MS
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, MAX_RETRIES)
        }))
    }
}
