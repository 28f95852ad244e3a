//! HTTP orchestrator client.
//!
//! Speaks a small JSON management API rooted at the configured endpoint:
//!
//! - `GET /health` - 2xx means online
//! - `POST /deployments` - body is a [`DeploymentSpec`], answer `{"id": ...}`
//! - `GET /deployments/{id}` - answer `{"state": ..., "message": ...}`
//! - `DELETE /deployments/{id}` - 2xx or 404 means gone

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::domain::DeploymentHandle;
use crate::error::{ConfigError, OrchestratorError};
use crate::port::{DeploymentSpec, DeploymentStatus, OrchestratorClient};

/// Environment variable holding the optional bearer token.
pub const TOKEN_ENV: &str = "BERTH_ORCHESTRATOR_TOKEN";

#[derive(Debug, Deserialize)]
struct DeployResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: String,
    #[serde(default)]
    message: Option<String>,
}

impl StatusResponse {
    fn into_status(self) -> DeploymentStatus {
        match self.state.to_ascii_lowercase().as_str() {
            "pending" | "starting" | "provisioning" => DeploymentStatus::Provisioning,
            "running" | "ready" => DeploymentStatus::Running,
            "failed" | "error" => {
                DeploymentStatus::Failed(self.message.unwrap_or(self.state))
            }
            _ => DeploymentStatus::Unknown,
        }
    }
}

/// Orchestrator client over HTTP.
pub struct HttpOrchestratorClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    timeout_ms: u64,
}

impl HttpOrchestratorClient {
    /// Create a client rooted at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `endpoint` is not an absolute
    /// http(s) URL.
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
            field: "orchestrator.endpoint",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "orchestrator.endpoint",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Create a client using the token from [`TOKEN_ENV`], if set.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_env(endpoint: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(endpoint, token, timeout)
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn map_error(&self, operation: &'static str, err: reqwest::Error) -> OrchestratorError {
        if err.is_timeout() {
            OrchestratorError::Timeout {
                operation,
                timeout_ms: self.timeout_ms,
            }
        } else if err.is_decode() {
            OrchestratorError::Protocol(err.to_string())
        } else {
            OrchestratorError::Unreachable(err.to_string())
        }
    }
}

async fn rejection(response: reqwest::Response) -> OrchestratorError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        OrchestratorError::Rejected(status.to_string())
    } else {
        OrchestratorError::Rejected(format!("{status}: {body}"))
    }
}

#[async_trait]
impl OrchestratorClient for HttpOrchestratorClient {
    async fn is_online(&self) -> bool {
        let request = self.authorized(self.http.get(self.url("/health")));
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "Orchestrator health check failed");
                false
            }
        }
    }

    async fn deploy(&self, spec: &DeploymentSpec) -> Result<DeploymentHandle, OrchestratorError> {
        let request = self.authorized(self.http.post(self.url("/deployments")).json(spec));
        let response = request
            .send()
            .await
            .map_err(|e| self.map_error("deploy", e))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: DeployResponse = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Protocol(e.to_string()))?;
        Ok(DeploymentHandle::from(body.id))
    }

    async fn status(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<DeploymentStatus, OrchestratorError> {
        let path = format!("/deployments/{handle}");
        let request = self.authorized(self.http.get(self.url(&path)));
        let response = request
            .send()
            .await
            .map_err(|e| match self.map_error("status", e) {
                OrchestratorError::Timeout { .. } => {
                    OrchestratorError::StatusUnknown("status request timed out".into())
                }
                other => other,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeploymentStatus::Unknown);
        }
        if !response.status().is_success() {
            return Err(OrchestratorError::StatusUnknown(response.status().to_string()));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Protocol(e.to_string()))?;
        Ok(body.into_status())
    }

    async fn remove(&self, handle: &DeploymentHandle) -> Result<(), OrchestratorError> {
        let path = format!("/deployments/{handle}");
        let request = self.authorized(self.http.delete(self.url(&path)));
        let response = request
            .send()
            .await
            .map_err(|e| self.map_error("remove", e))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(rejection(response).await)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
