//! OAuth2 integration with the Google identity provider

use anyhow::Result;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Scopes requested at sign-in
const SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// OAuth2 provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Get the provider name as used in routes
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

/// OAuth2 configuration for a provider
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

/// OAuth2 client wrapper
#[derive(Clone)]
pub struct OAuthClient {
    provider: OAuthProvider,
    client: BasicClient,
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    /// Create a new OAuth2 client for Google
    pub fn new_google(config: OAuthConfig) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone())?,
            Some(TokenUrl::new(config.token_url.clone())?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        Ok(Self {
            provider: OAuthProvider::Google,
            client,
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Generate authorization URL with PKCE
    pub fn generate_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        info!("Generating authorization URL for {:?}", self.provider);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, csrf_token) = request.url();

        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchange authorization code for the provider access token
    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<String> {
        info!(
            "Exchanging authorization code for access token for {:?}",
            self.provider
        );

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        Ok(token_response.access_token().secret().clone())
    }

    /// Get user profile information from the provider
    pub async fn get_user_profile(&self, access_token: &str) -> Result<OAuthUserProfile> {
        info!("Getting user profile for {:?}", self.provider);

        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to get {} user profile: {}",
                self.provider.as_str(),
                response.status()
            );
        }

        let google_user: GoogleUser = response.json().await?;
        Ok(google_user.into())
    }

    /// Get the provider
    pub fn provider(&self) -> OAuthProvider {
        self.provider
    }
}

/// Google user profile response
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<GoogleUser> for OAuthUserProfile {
    fn from(user: GoogleUser) -> Self {
        let name = user.name.or_else(|| {
            let parts: Vec<String> = [user.given_name, user.family_name]
                .into_iter()
                .flatten()
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        });

        OAuthUserProfile {
            id: user.id,
            email: user.email,
            name,
            image: user.picture,
            provider: OAuthProvider::Google,
        }
    }
}

/// OAuth user profile information
#[derive(Debug, Clone)]
pub struct OAuthUserProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider: OAuthProvider,
}

/// In-flight sign-in data carried in the signed state cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
    pub provider: OAuthProvider,
    /// Path to land on after a successful sign-in
    pub callback_url: String,
    pub exp: i64,
}

impl OAuthState {
    /// Create a new OAuth state
    pub fn new(
        csrf_token: &CsrfToken,
        pkce_verifier: &PkceCodeVerifier,
        provider: OAuthProvider,
        callback_url: String,
        exp: i64,
    ) -> Self {
        Self {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
            provider,
            callback_url,
            exp,
        }
    }

    /// Whether the `state` echoed by the provider matches this sign-in
    pub fn matches(&self, state: &str) -> bool {
        !state.is_empty() && self.csrf_token == state
    }

    /// Rebuild the PKCE verifier for the code exchange
    pub fn verifier(&self) -> PkceCodeVerifier {
        PkceCodeVerifier::new(self.pkce_verifier.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn config(base: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_url: "http://localhost:3000/api/auth/callback/google".to_string(),
            auth_url: format!("{}/auth", base),
            token_url: format!("{}/token", base),
            userinfo_url: format!("{}/userinfo", base),
        }
    }

    #[test]
    fn test_generate_auth_url() {
        let client = OAuthClient::new_google(config("https://accounts.example.com")).unwrap();
        let (url, csrf, _verifier) = client.generate_auth_url();

        let url = url::Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/auth");
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], *csrf.secret());
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:3000/api/auth/callback/google"
        );
    }

    #[test]
    fn test_oauth_state_matches() {
        let client = OAuthClient::new_google(config("https://accounts.example.com")).unwrap();
        let (_, csrf, verifier) = client.generate_auth_url();
        let state = OAuthState::new(
            &csrf,
            &verifier,
            OAuthProvider::Google,
            "/dashboard".to_string(),
            0,
        );

        assert!(state.matches(csrf.secret()));
        assert!(!state.matches("forged"));
        assert!(!state.matches(""));
        assert_eq!(state.verifier().secret(), verifier.secret());
    }

    #[test]
    fn test_profile_name_falls_back_to_given_and_family() {
        let user: GoogleUser = serde_json::from_value(json!({
            "id": "g-1",
            "email": "a@b.com",
            "given_name": "Ada",
            "family_name": "Lovelace"
        }))
        .unwrap();
        let profile = OAuthUserProfile::from(user);

        assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.image, None);
    }

    #[tokio::test]
    async fn test_exchange_code_and_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "provider-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer provider-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "g-1",
                "email": "a@b.com",
                "name": "A",
                "picture": "https://example.com/a.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new_google(config(&server.uri())).unwrap();
        let (_, _, verifier) = client.generate_auth_url();

        let token = client
            .exchange_code("auth-code".to_string(), verifier)
            .await
            .unwrap();
        assert_eq!(token, "provider-token");

        let profile = client.get_user_profile(&token).await.unwrap();
        assert_eq!(profile.id, "g-1");
        assert_eq!(profile.name.as_deref(), Some("A"));
        assert_eq!(profile.image.as_deref(), Some("https://example.com/a.png"));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::new_google(config(&server.uri())).unwrap();
        let (_, _, verifier) = client.generate_auth_url();

        assert!(
            client
                .exchange_code("bad-code".to_string(), verifier)
                .await
                .is_err()
        );
    }
}
