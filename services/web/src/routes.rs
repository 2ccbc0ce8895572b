//! Web service routes and identity provider endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    error::SignInError,
    middleware::require_session,
    oauth::OAuthState,
    pages,
    session::{self, OAUTH_STATE_COOKIE, Session, SessionStatus, SessionUser},
    state::AppState,
};

/// Where users land after sign-in unless told otherwise
pub const DEFAULT_CALLBACK_URL: &str = "/dashboard";

/// Query of the sign-in endpoint
#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Query the provider sends back to the callback endpoint
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Create the router for the web service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/dashboard",
            get(pages::dashboard).post(pages::fetch_dashboard_data),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health_check))
        .route("/login", get(pages::login))
        .route("/api/auth/signin/google", get(sign_in).post(sign_in))
        .route("/api/auth/callback/google", get(callback))
        .route("/api/auth/signout", post(pages::sign_out))
        .route("/api/auth/session", get(session_info))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "web"
    }))
}

/// Keep post-sign-in redirects on this site
///
/// Paths with control characters are refused; browsers drop a tab from
/// `Location` (`/\t/host` becomes `//host`).
pub fn safe_callback_url(callback_url: Option<&str>) -> String {
    match callback_url {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.contains('\\')
                && !url.chars().any(char::is_control) =>
        {
            url.to_string()
        }
        _ => DEFAULT_CALLBACK_URL.to_string(),
    }
}

/// Start the provider sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SignInQuery>,
) -> Response {
    let provider = state.oauth_client.provider();
    info!("Starting {} sign-in", provider.as_str());

    let callback_url = safe_callback_url(query.callback_url.as_deref());
    let (auth_url, csrf_token, pkce_verifier) = state.oauth_client.generate_auth_url();

    let max_age = state.jwt_service.state_max_age();
    let oauth_state = OAuthState::new(
        &csrf_token,
        &pkce_verifier,
        provider,
        callback_url,
        Utc::now().timestamp() + max_age as i64,
    );

    match state.jwt_service.sign(&oauth_state) {
        Ok(token) => {
            let cookie =
                session::build_cookie(OAUTH_STATE_COOKIE, token, max_age, state.secure_cookies());
            (jar.add(cookie), Redirect::to(&auth_url)).into_response()
        }
        Err(e) => {
            error!("Failed to sign OAuth state: {}", e);
            Redirect::to(&SignInError::OAuthSignin.login_path()).into_response()
        }
    }
}

/// Provider redirect target: finish sign-in and bridge the backend token
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let oauth_state = jar.get(OAUTH_STATE_COOKIE).and_then(|cookie| {
        state
            .jwt_service
            .verify::<OAuthState>(cookie.value())
            .map_err(|e| warn!("Rejecting OAuth state cookie: {}", e))
            .ok()
    });
    let jar = jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path("/"));

    let (session, callback_url) = match complete_sign_in(&state, oauth_state, params).await {
        Ok(result) => result,
        Err(err) => return (jar, Redirect::to(&err.login_path())).into_response(),
    };

    match session::store_session(&state.jwt_service, jar.clone(), &session, state.secure_cookies())
    {
        Ok(jar) => (jar, Redirect::to(&safe_callback_url(Some(&callback_url)))).into_response(),
        Err(e) => {
            error!("Failed to issue session: {}", e);
            (jar, Redirect::to(&SignInError::Callback.login_path())).into_response()
        }
    }
}

/// Verify the callback, load the provider profile and run the token bridge
async fn complete_sign_in(
    state: &AppState,
    oauth_state: Option<OAuthState>,
    params: CallbackParams,
) -> Result<(Session, String), SignInError> {
    if let Some(error) = params.error {
        warn!("Provider returned an error: {}", error);
        return Err(SignInError::OAuthCallback);
    }

    let oauth_state = oauth_state.ok_or_else(|| {
        warn!("Callback without a valid OAuth state");
        SignInError::OAuthCallback
    })?;

    if !oauth_state.matches(params.state.as_deref().unwrap_or_default()) {
        warn!("OAuth state mismatch");
        return Err(SignInError::OAuthCallback);
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(SignInError::OAuthCallback)?;

    let access_token = state
        .oauth_client
        .exchange_code(code, oauth_state.verifier())
        .await
        .map_err(|e| {
            error!("Failed to exchange authorization code: {}", e);
            SignInError::OAuthCallback
        })?;

    let profile = state
        .oauth_client
        .get_user_profile(&access_token)
        .await
        .map_err(|e| {
            error!("Failed to load user profile: {}", e);
            SignInError::OAuthCallback
        })?;

    let mut session = Session::new(
        SessionUser::from(&profile),
        state.jwt_service.session_max_age(),
    );
    state
        .token_bridge
        .on_sign_in(&mut session, Some(access_token.as_str()))
        .await;

    info!(
        "Signed in {} user, backend token {}",
        profile.provider.as_str(),
        if session.backend_token.is_some() { "present" } else { "missing" }
    );

    Ok((session, oauth_state.callback_url))
}

/// Current session as JSON, `{}` when signed out
pub async fn session_info(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    match session::status_from_jar(&state.jwt_service, &jar) {
        SessionStatus::Authenticated(session) => Json(json!({
            "user": session.user,
            "backendToken": session.backend_token,
            "expires": DateTime::<Utc>::from_timestamp(session.exp, 0).map(|d| d.to_rfc3339()),
        })),
        _ => Json(json!({})),
    }
}
