//! Catalog source fetched over HTTP.
//!
//! The endpoint answers `GET` with either a JSON array of packages or an
//! object `{"packages": [...]}`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use crate::domain::Package;
use crate::error::CatalogError;
use crate::port::CatalogSource;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    List(Vec<Package>),
    Wrapped { packages: Vec<Package> },
}

impl CatalogResponse {
    fn into_packages(self) -> Vec<Package> {
        match self {
            Self::List(packages) | Self::Wrapped { packages } => packages,
        }
    }
}

/// HTTP catalog source with bounded retry on transient errors.
pub struct HttpCatalogSource {
    http: HttpClient,
    url: String,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl HttpCatalogSource {
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration, retry_max_attempts: u32) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            url: url.into(),
            retry_max_attempts,
            retry_backoff_ms: 500,
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "Catalog request failed, retrying"
        );
        let delay = backoff_delay(self.retry_backoff_ms, attempt);
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Exponential backoff with up to 20% jitter.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let base = base_ms.saturating_mul(1 << attempt.saturating_sub(1).min(6));
    let jitter_range = base / 5;
    if jitter_range == 0 {
        return Duration::from_millis(base);
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    Duration::from_millis(base + u64::from(nanos) % (jitter_range + 1))
}

/// Parse an HTTP catalog payload.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] when the body is neither accepted shape.
pub fn parse_response(body: &str) -> Result<Vec<Package>, CatalogError> {
    serde_json::from_str::<CatalogResponse>(body)
        .map(CatalogResponse::into_packages)
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Vec<Package>, CatalogError> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = match self.http.get(&self.url).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(CatalogError::Unavailable(err.to_string()));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = response
                .error_for_status()
                .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

            match response.text().await {
                Ok(body) => return parse_response(&body),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(CatalogError::Unavailable(err.to_string()));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_with_bounded_jitter() {
        let first = backoff_delay(500, 1);
        let third = backoff_delay(500, 3);
        assert!(first >= Duration::from_millis(500) && first <= Duration::from_millis(600));
        assert!(third >= Duration::from_millis(2_000) && third <= Duration::from_millis(2_400));
        assert_eq!(backoff_delay(0, 4), Duration::ZERO);
    }

    #[test]
    fn parses_bare_array() {
        let packages =
            parse_response(r#"[{"id":"ghost","name":"Ghost","image":"ghost:5","category":"Blog"}]"#)
                .unwrap();
        assert_eq!(packages.len(), 1);
    }

    #[test]
    fn parses_wrapped_object() {
        let packages =
            parse_response(r#"{"packages":[{"id":"ghost","name":"Ghost","image":"ghost:5"}]}"#)
                .unwrap();
        assert_eq!(packages[0].name, "Ghost");
    }

    #[test]
    fn rejects_other_shapes() {
        let err = parse_response(r#"{"items":[]}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn unreachable_source_is_unavailable() {
        let source =
            HttpCatalogSource::new("http://127.0.0.1:9/catalog", Duration::from_millis(200), 1);
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
