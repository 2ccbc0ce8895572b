//! Application state shared across handlers

use anyhow::Result;
use common::{client::ApiClient, config::ApiConfig};

use crate::{
    bridge::TokenBridge,
    config::WebConfig,
    jwt::{JwtConfig, JwtService},
    oauth::OAuthClient,
    templates::Templates,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: WebConfig,
    pub jwt_service: JwtService,
    pub oauth_client: OAuthClient,
    pub api_client: ApiClient,
    pub token_bridge: TokenBridge,
    pub templates: Templates,
}

impl AppState {
    /// Wire up every service from its configuration
    pub fn new(config: WebConfig, jwt_config: JwtConfig, api_config: &ApiConfig) -> Result<Self> {
        let jwt_service = JwtService::new(jwt_config)?;
        let oauth_client = OAuthClient::new_google(config.google.clone())?;
        let api_client = ApiClient::new(api_config)?;
        let token_bridge = TokenBridge::new(api_client.clone());
        let templates = Templates::new()?;

        Ok(AppState {
            config,
            jwt_service,
            oauth_client,
            api_client,
            token_bridge,
            templates,
        })
    }

    /// Whether cookies should carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies()
    }
}
