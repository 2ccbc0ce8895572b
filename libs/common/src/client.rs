//! Pre-configured HTTP client for the external backend
//!
//! All calls go to a fixed base address with a JSON content type. Calls are
//! made once: there is no retry, no backoff and no partial-result handling.

use anyhow::Result;
use reqwest::{
    Client, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use crate::{
    config::ApiConfig,
    error::{BackendError, BackendResult},
    models::{TokenExchangeRequest, TokenExchangeResponse},
};

const TOKEN_EXCHANGE_PATH: &str = "/api/auth/google";
const DASHBOARD_PATH: &str = "/api/dashboard";

/// Client for the backend API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the configured backend
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid backend base URL: {}", e))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!("Backend client initialized with base URL: {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a path against the base address
    pub fn endpoint(&self, path: &str) -> BackendResult<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Exchange a provider access token for a backend token
    pub async fn exchange_google_token(
        &self,
        access_token: &str,
    ) -> BackendResult<TokenExchangeResponse> {
        info!("Exchanging provider access token with the backend");

        let url = self.endpoint(TOKEN_EXCHANGE_PATH)?;
        let body = TokenExchangeRequest {
            access_token: access_token.to_string(),
        };

        let response = self.http.post(url).json(&body).send().await?;
        let response = Self::check_status(response).await?;

        Ok(response.json::<TokenExchangeResponse>().await?)
    }

    /// Fetch the dashboard payload with a bridged backend token
    ///
    /// A blank token is rejected before anything is sent.
    pub async fn dashboard(&self, backend_token: &str) -> BackendResult<serde_json::Value> {
        if backend_token.trim().is_empty() {
            return Err(BackendError::MissingToken);
        }

        let url = self.endpoint(DASHBOARD_PATH)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(backend_token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        Ok(response.json::<serde_json::Value>().await?)
    }

    /// Turn a non-2xx response into `BackendError::Status`
    async fn check_status(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Backend returned {} for {}", status, body);

        Err(BackendError::Status {
            status,
            message: server_message(&body),
        })
    }
}

/// Pull a human-readable message out of a JSON error body
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
