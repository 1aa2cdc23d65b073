use crate::config::HttpClientConfig;
use crate::utils::error::{AppError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Longest upstream error body kept in errors and logs.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// JSON-over-HTTPS sender shared by the Azure adapters.
///
/// Every request carries the `api-key` header and a per-request timeout.
/// Throttling (429), server errors (5xx), timeouts and connection failures
/// are retried `retry_attempts` times with a linearly growing delay.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    service: &'static str,
    config: HttpClientConfig,
}

impl UpstreamClient {
    pub fn new(service: &'static str, config: HttpClientConfig) -> Self {
        Self {
            client: Client::new(),
            service,
            config,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub async fn post_json<B, R>(&self, url: &str, api_key: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.send_once(url, api_key, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.retry_attempts => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        "{} request failed ({}), retry {}/{} in {:?}",
                        self.service,
                        e,
                        attempt,
                        self.config.retry_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Linear backoff; saturates instead of overflowing on huge delays.
    fn backoff(&self, attempt: u32) -> Duration {
        self.config.retry_delay().saturating_mul(attempt)
    }

    async fn send_once<B, R>(&self, url: &str, api_key: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("Calling {}: POST {}", self.service, redact_query(url));

        let response = self
            .client
            .post(url)
            .header("api-key", api_key)
            .timeout(self.config.timeout())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("{} response status: {}", self.service, status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError {
                service: self.service.to_string(),
                status: status.as_u16(),
                body: truncate(&text),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::UpstreamProtocolError {
            service: self.service.to_string(),
            message: e.to_string(),
        })
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
