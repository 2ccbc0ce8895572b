//! Service configuration read from the environment

use anyhow::Result;
use url::Url;

use crate::oauth::OAuthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Web service configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Public origin of this service, e.g. "https://app.example.com"
    pub public_url: String,
    /// Socket address to listen on
    pub bind_address: String,
    /// Google OAuth2 client settings
    pub google: OAuthConfig,
}

impl WebConfig {
    /// Create a new WebConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GOOGLE_CLIENT_ID`: OAuth client id issued by Google
    /// - `GOOGLE_CLIENT_SECRET`: OAuth client secret issued by Google
    /// - `PUBLIC_URL`: Public origin of the service (default: "http://localhost:3000")
    /// - `BIND_ADDRESS`: Listen address (default: "0.0.0.0:3000")
    /// - `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`, `GOOGLE_USERINFO_URL`: Provider endpoints
    ///   (default: Google's production endpoints)
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable not set"))?;

        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_SECRET environment variable not set"))?;

        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Url::parse(&public_url)
            .map_err(|e| anyhow::anyhow!("PUBLIC_URL is not a valid URL: {}", e))?;

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let google = OAuthConfig {
            client_id,
            client_secret,
            redirect_url: format!("{}/api/auth/callback/google", public_url),
            auth_url: std::env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| GOOGLE_AUTH_URL.to_string()),
            token_url: std::env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| GOOGLE_TOKEN_URL.to_string()),
            userinfo_url: std::env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| GOOGLE_USERINFO_URL.to_string()),
        };

        Ok(WebConfig {
            public_url,
            bind_address,
            google,
        })
    }

    /// Whether cookies should carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            for key in [
                "GOOGLE_CLIENT_ID",
                "GOOGLE_CLIENT_SECRET",
                "PUBLIC_URL",
                "BIND_ADDRESS",
                "GOOGLE_AUTH_URL",
                "GOOGLE_TOKEN_URL",
                "GOOGLE_USERINFO_URL",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_web_config_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("GOOGLE_CLIENT_ID", "client-id");
            std::env::set_var("GOOGLE_CLIENT_SECRET", "client-secret");
        }

        let config = WebConfig::from_env().unwrap();
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.google.client_id, "client-id");
        assert_eq!(
            config.google.redirect_url,
            "http://localhost:3000/api/auth/callback/google"
        );
        assert_eq!(config.google.token_url, GOOGLE_TOKEN_URL);
        assert!(!config.secure_cookies());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_web_config_from_env_with_custom_values() {
        clear_env();
        unsafe {
            std::env::set_var("GOOGLE_CLIENT_ID", "client-id");
            std::env::set_var("GOOGLE_CLIENT_SECRET", "client-secret");
            std::env::set_var("PUBLIC_URL", "https://app.example.com/");
            std::env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("GOOGLE_TOKEN_URL", "http://127.0.0.1:9999/token");
        }

        let config = WebConfig::from_env().unwrap();
        assert_eq!(config.public_url, "https://app.example.com");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(
            config.google.redirect_url,
            "https://app.example.com/api/auth/callback/google"
        );
        assert_eq!(config.google.token_url, "http://127.0.0.1:9999/token");
        assert!(config.secure_cookies());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_web_config_requires_client_credentials() {
        clear_env();
        assert!(WebConfig::from_env().is_err());

        unsafe {
            std::env::set_var("GOOGLE_CLIENT_ID", "client-id");
        }
        assert!(WebConfig::from_env().is_err());

        clear_env();
    }
}
