use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use reqwest::StatusCode;
use tracing::{info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BASE_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_retries: 2,
        }
    }
}

pub fn client(opts: &FetchOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(opts.timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// GET a page body, retrying rate limits, server errors and transport errors.
pub async fn fetch_page(url: &str, opts: &FetchOptions) -> Result<String> {
    let client = client(opts)?;

    for attempt in 0..=opts.max_retries {
        let start = Instant::now();
        let err = match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let body = resp.text().await.context("Failed to read response body")?;
                info!(
                    "Fetched {} ({} bytes) in {}ms",
                    url,
                    body.len(),
                    start.elapsed().as_millis()
                );
                return Ok(body);
            }
            Ok(resp) if is_retryable(resp.status()) => anyhow!("HTTP {} from {}", resp.status(), url),
            Ok(resp) => return Err(anyhow!("HTTP {} from {}", resp.status(), url)),
            Err(e) => anyhow!(e).context(format!("Request to {} failed", url)),
        };

        if attempt == opts.max_retries {
            return Err(err);
        }

        let backoff = backoff_for(attempt);
        warn!(
            "{:#} (attempt {}/{}), backing off {:.1}s",
            err,
            attempt + 1,
            opts.max_retries,
            backoff.as_secs_f64()
        );
        tokio::time::sleep(backoff).await;
    }

    Err(anyhow!("No attempts made for {}", url))
}

/// Doubles per attempt, capped at `MAX_BACKOFF_MS`.
fn backoff_for(attempt: u32) -> Duration {
    let ms = BASE_BACKOFF_MS.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(ms.min(MAX_BACKOFF_MS))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::FORBIDDEN));
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(backoff_for(0), Duration::from_millis(1000));
        assert_eq!(backoff_for(3), Duration::from_millis(8000));
        assert_eq!(backoff_for(10), Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(backoff_for(200), Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[test]
    fn client_builds() {
        assert!(client(&FetchOptions::default()).is_ok());
    }
}
