//! Page access guard for protected routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use tracing::{info, warn};

use crate::{
    error::WebError,
    session::{self, Session, SessionStatus},
    state::AppState,
};

/// What a protected page does for a given session status
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Status not resolved yet: show a placeholder and take no action
    Placeholder,
    /// No session: send the visitor to the login page
    RedirectToLogin,
    /// Signed in: render the protected content
    Render(Session),
}

/// Three-state gate over the session status
pub fn gate(status: SessionStatus) -> GateDecision {
    match status {
        SessionStatus::Loading => GateDecision::Placeholder,
        SessionStatus::Unauthenticated => GateDecision::RedirectToLogin,
        SessionStatus::Authenticated(session) => GateDecision::Render(session),
    }
}

/// Guard protected pages on the session cookie
///
/// Inserts the `Session` into the request extensions and re-issues the
/// cookie once the session is older than the configured update age.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let status = session::status_from_jar(&state.jwt_service, &jar);

    let session = match gate(status) {
        GateDecision::Placeholder => {
            return match state.templates.render("loading.html", context! {}) {
                Ok(html) => Html(html).into_response(),
                Err(e) => WebError::from(e).into_response(),
            };
        }
        GateDecision::RedirectToLogin => {
            info!("Unauthenticated request to {}, redirecting to login", req.uri().path());
            return Redirect::to("/login").into_response();
        }
        GateDecision::Render(session) => session,
    };

    let refreshed = session
        .needs_refresh(state.jwt_service.session_update_age())
        .then(|| session.refreshed(state.jwt_service.session_max_age()));

    req.extensions_mut()
        .insert(refreshed.clone().unwrap_or(session));

    let response = next.run(req).await;

    let Some(refreshed) = refreshed else {
        return response;
    };

    match session::store_session(&state.jwt_service, jar, &refreshed, state.secure_cookies()) {
        Ok(jar) => (jar, response).into_response(),
        Err(e) => {
            warn!("Failed to re-issue session {}: {}", refreshed.jti, e);
            response
        }
    }
}
