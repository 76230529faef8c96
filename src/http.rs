use crate::config::HttpConfig;
use crate::error::{Error, Result};
use reqwest::{Client, Response, StatusCode, header};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Per-phase request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub listing: Duration,
    pub detail: Duration,
    pub title: Duration,
    pub probe: Duration,
}

impl From<&HttpConfig> for Timeouts {
    fn from(config: &HttpConfig) -> Self {
        Self {
            listing: Duration::from_secs(config.listing_timeout_secs),
            detail: Duration::from_secs(config.detail_timeout_secs),
            title: Duration::from_secs(config.title_timeout_secs),
            probe: Duration::from_secs(config.probe_timeout_secs),
        }
    }
}

/// Outbound client shared by every site adapter.
///
/// Page fetches are attempted exactly once; only image probes honour
/// `max_retries`, since a probe is a field-level lookup.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    base_delay_ms: u64,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::http(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            base_delay_ms: config.retry_base_delay_ms,
        })
    }

    /// Fetches an HTML document and decodes it, tolerating pages that lie
    /// about their charset.
    pub async fn get_page(
        &self,
        url: &str,
        timeout: Duration,
        headers: &[(&str, &str)],
    ) -> Result<String> {
        let mut req = self.client.get(url).timeout(timeout);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        let resp = req.send().await.map_err(|e| Error::http(e.to_string()))?;
        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await.map_err(|e| Error::http(e.to_string()))?;
        Ok(decode_body(&bytes))
    }

    /// Metadata-only reachability check for an image URL: 2xx plus an
    /// `image/*` content type. Never errors.
    pub async fn probe_image(&self, url: &str, timeout: Duration) -> bool {
        let outcome = self
            .request_with_retry(|| self.client.head(url).timeout(timeout))
            .await;
        match outcome {
            Ok(resp) => {
                let is_image = resp
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|ct| ct.contains("image"));
                debug!(url, status = %resp.status(), is_image, "image probe");
                resp.status().is_success() && is_image
            }
            Err(e) => {
                debug!(url, error = %e, "image probe failed");
                false
            }
        }
    }

    async fn request_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = Error::http("no attempts made");
        let mut delay = self.base_delay_ms;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, delay_ms = delay, "retrying request");
                sleep(Duration::from_millis(delay)).await;
                delay = (delay * 2).min(30_000);
            }

            let result = match build().send().await {
                Ok(resp) => check_status(resp).await,
                Err(e) => Err(Error::http(e.to_string())),
            };
            match result {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_transient() => {
                    warn!(attempt, error = %e, "transient failure, will retry");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = resp
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(Error::RateLimit {
            host: extract_domain(&url),
            retry_after_secs: retry_after,
        });
    }
    let body = resp.text().await.unwrap_or_default();
    let message: String = body.chars().take(200).collect();
    Err(Error::status(extract_domain(&url), status.as_u16(), message))
}

/// UTF-8 when valid, otherwise Windows-1252.
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (text, _had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
