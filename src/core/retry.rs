//! Exponential-backoff retry around the HTTP request primitive.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Method, Response, StatusCode};
use tracing::debug;

/// Statuses worth retrying: rate limiting and transient server failures.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts after the first (total attempts = 1 + max_retries).
    pub max_retries: u32,
    /// Base sleep in seconds; attempt `n` sleeps `backoff_base * 2^n` plus jitter.
    pub backoff_base: f64,
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: 0.5,
            retry_on_status: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryConfig {
    fn is_retryable(&self, status: StatusCode) -> bool {
        self.retry_on_status.contains(&status.as_u16())
    }
}

/// Issue `method url` with up to `1 + max_retries` attempts.
///
/// Retries on transport errors and on the configured statuses. If the final
/// attempt still yields a retryable status the response is returned anyway;
/// if every attempt errored the last transport error is propagated.
pub async fn request_with_retry(
    client: &Client,
    method: Method,
    url: &str,
    retry_config: &RetryConfig,
) -> Result<Response, reqwest::Error> {
    let attempts = retry_config.max_retries + 1;
    let mut last_error: Option<reqwest::Error> = None;

    for attempt in 0..attempts {
        match client.request(method.clone(), url).send().await {
            Ok(response) => {
                if !retry_config.is_retryable(response.status()) || attempt + 1 == attempts {
                    return Ok(response);
                }
                debug!(
                    url,
                    status = response.status().as_u16(),
                    attempt,
                    "retryable status, backing off"
                );
            }
            Err(e) => {
                if attempt + 1 == attempts {
                    return Err(e);
                }
                debug!(url, error = %e, attempt, "request error, backing off");
                last_error = Some(e);
            }
        }

        let jitter: f64 = rand::rng().random_range(0.0..0.1);
        let delay = retry_config.backoff_base * 2f64.powi(attempt as i32) + jitter;
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    }

    // Unreachable: the loop always returns on its final attempt. Kept for the
    // type checker; surfaces the last transport error if control ever lands here.
    match last_error {
        Some(e) => Err(e),
        None => client.request(method, url).send().await,
    }
}
