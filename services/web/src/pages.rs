//! Page controllers: login, dashboard and sign-out

use axum::{
    Extension,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use common::error::BackendError;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use url::form_urlencoded;

use crate::{
    error::{SignInError, WebResult},
    routes::safe_callback_url,
    session::{self, Session, SessionStatus},
    state::AppState,
};

/// Shown when a dashboard API call fails without a server-provided message
pub const DASHBOARD_ERROR: &str = "Failed to fetch dashboard data";

/// Query of the login page
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Serialize)]
struct LoginView {
    error: Option<&'static str>,
    signin_action: String,
}

#[derive(Serialize)]
struct DashboardView<'a> {
    name: &'a str,
    email: &'a str,
    image: Option<&'a str>,
    initial: Option<String>,
    data: Option<String>,
    error: Option<String>,
}

/// Landing route
pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

/// Login page
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> WebResult<Response> {
    if let SessionStatus::Authenticated(_) = session::status_from_jar(&state.jwt_service, &jar) {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let error = query
        .error
        .as_deref()
        .map(|code| SignInError::from_code(code).message());

    let callback_url = safe_callback_url(query.callback_url.as_deref());
    let signin_action = format!(
        "/api/auth/signin/google?callbackUrl={}",
        form_urlencoded::byte_serialize(callback_url.as_bytes()).collect::<String>()
    );

    let html = state.templates.render(
        "login.html",
        LoginView {
            error,
            signin_action,
        },
    )?;

    Ok(Html(html).into_response())
}

/// Protected dashboard page
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> WebResult<Html<String>> {
    render_dashboard(&state, &session, None, None)
}

/// "Test Backend API" action: call the backend with the bridged token
///
/// Without a backend token no request is sent. Failures are shown once and
/// not retried.
pub async fn fetch_dashboard_data(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> WebResult<Html<String>> {
    let token = session.backend_token.as_deref().unwrap_or_default();

    match state.api_client.dashboard(token).await {
        Ok(data) => {
            let pretty = serde_json::to_string_pretty(&data).map_err(anyhow::Error::from)?;
            render_dashboard(&state, &session, Some(pretty), None)
        }
        Err(BackendError::MissingToken) => {
            warn!("Session {} has no backend token, dashboard call not attempted", session.jti);
            render_dashboard(&state, &session, None, Some(DASHBOARD_ERROR.to_string()))
        }
        Err(e) => {
            error!("Dashboard API error: {}", e);
            let message = e.user_message(DASHBOARD_ERROR);
            render_dashboard(&state, &session, None, Some(message))
        }
    }
}

fn render_dashboard(
    state: &AppState,
    session: &Session,
    data: Option<String>,
    error: Option<String>,
) -> WebResult<Html<String>> {
    let user = &session.user;
    let html = state.templates.render(
        "dashboard.html",
        DashboardView {
            name: user.name.as_deref().unwrap_or_default(),
            email: user.email.as_deref().unwrap_or_default(),
            image: user.image.as_deref(),
            initial: user.initial(),
            data,
            error,
        },
    )?;

    Ok(Html(html))
}

/// Whether a state-changing request was sent by a page of this site
///
/// A present `Origin` must equal the public URL. Without one, a browser
/// `Sec-Fetch-Site: cross-site` marker is refused.
fn same_origin(headers: &HeaderMap, public_url: &str) -> bool {
    match headers.get(header::ORIGIN) {
        Some(origin) => origin
            .to_str()
            .is_ok_and(|origin| origin == public_url.trim_end_matches('/')),
        None => headers
            .get("sec-fetch-site")
            .and_then(|v| v.to_str().ok())
            .is_none_or(|site| site != "cross-site"),
    }
}

/// Sign out: drop the session and go back to the login page
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if !same_origin(&headers, &state.config.public_url) {
        warn!("Refusing cross-site sign-out");
        return StatusCode::FORBIDDEN.into_response();
    }

    if let SessionStatus::Authenticated(session) = session::status_from_jar(&state.jwt_service, &jar)
    {
        info!("Signing out session {}", session.jti);
    }

    (session::clear_session(jar), Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const PUBLIC_URL: &str = "https://app.example.com";

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_same_origin() {
        assert!(same_origin(&headers(&[]), PUBLIC_URL));
        assert!(same_origin(
            &headers(&[("origin", "https://app.example.com")]),
            PUBLIC_URL
        ));
        assert!(same_origin(
            &headers(&[("origin", "https://app.example.com")]),
            "https://app.example.com/"
        ));
        assert!(same_origin(
            &headers(&[("sec-fetch-site", "same-origin")]),
            PUBLIC_URL
        ));

        assert!(!same_origin(
            &headers(&[("origin", "https://evil.example")]),
            PUBLIC_URL
        ));
        assert!(!same_origin(&headers(&[("origin", "null")]), PUBLIC_URL));
        assert!(!same_origin(
            &headers(&[("sec-fetch-site", "cross-site")]),
            PUBLIC_URL
        ));
    }
}
