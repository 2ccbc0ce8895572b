//! Configuration for the backend HTTP client

use anyhow::Result;
use url::Url;

/// Fallback backend address used when `API_BASE_URL` is not set
pub const DEFAULT_API_BASE_URL: &str = "https://express-sigma-one.vercel.app/";

/// Backend client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base address of the backend, e.g. "https://api.example.com/"
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl ApiConfig {
    /// Create a new ApiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_BASE_URL`: Base URL of the backend (default: "https://express-sigma-one.vercel.app/")
    /// - `API_TIMEOUT_SECONDS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        Url::parse(&base_url)
            .map_err(|e| anyhow::anyhow!("API_BASE_URL is not a valid URL: {}", e))?;

        let timeout_seconds = std::env::var("API_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(ApiConfig {
            base_url,
            timeout_seconds,
        })
    }
}
