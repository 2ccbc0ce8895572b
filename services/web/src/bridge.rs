//! Bridge from provider access tokens to backend tokens
//!
//! Runs inside the sign-in callback: one POST to the backend's token exchange
//! endpoint, no retry. A failed exchange is logged and the session is left
//! without a backend token; the user stays signed in with the provider.

use common::client::ApiClient;
use tracing::{error, info};

use crate::session::Session;

/// Exchanges provider tokens for backend tokens
#[derive(Debug, Clone)]
pub struct TokenBridge {
    api_client: ApiClient,
}

impl TokenBridge {
    /// Create a new token bridge
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Run the exchange for a fresh sign-in and record the outcome in the session
    ///
    /// Without a provider access token nothing is sent and the session is not
    /// touched.
    pub async fn on_sign_in(&self, session: &mut Session, provider_access_token: Option<&str>) {
        let Some(access_token) = provider_access_token.filter(|t| !t.is_empty()) else {
            info!("No provider access token, skipping backend token exchange");
            return;
        };

        match self.api_client.exchange_google_token(access_token).await {
            Ok(response) => {
                info!("Backend token exchange succeeded for session {}", session.jti);
                session.apply_backend_user(response.token, response.user);
            }
            Err(e) => {
                error!("Backend token exchange failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionUser;
    use common::config::ApiConfig;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    fn bridge_for(server: &MockServer) -> TokenBridge {
        let client = ApiClient::new(&ApiConfig {
            base_url: server.uri(),
            timeout_seconds: 5,
        })
        .unwrap();
        TokenBridge::new(client)
    }

    fn session() -> Session {
        Session::new(
            SessionUser {
                id: Some("g-1".to_string()),
                name: Some("A".to_string()),
                email: Some("a@b.com".to_string()),
                image: None,
            },
            3600,
        )
    }

    #[tokio::test]
    async fn test_successful_exchange_stores_backend_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/google"))
            .and(body_json(json!({ "accessToken": "provider-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "backend-token",
                "user": { "id": "1", "email": "a@b.com", "name": "A" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session();
        bridge_for(&server)
            .on_sign_in(&mut session, Some("provider-token"))
            .await;

        assert_eq!(session.backend_token.as_deref(), Some("backend-token"));
        assert_eq!(session.user.id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_missing_provider_token_skips_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/google"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let original = session();

        let mut session = original.clone();
        bridge.on_sign_in(&mut session, None).await;
        assert_eq!(session, original);

        bridge.on_sign_in(&mut session, Some("")).await;
        assert_eq!(session, original);
    }

    #[tokio::test]
    async fn test_failed_exchange_leaves_session_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/google"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let original = session();
        let mut session = original.clone();
        bridge_for(&server)
            .on_sign_in(&mut session, Some("provider-token"))
            .await;

        assert_eq!(session.backend_token, None);
        assert_eq!(session, original);
    }
}
