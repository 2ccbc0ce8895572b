//! Session record and cookie handling
//!
//! The session is a signed JWT kept in the `session_token` cookie. Page
//! handlers only read it; the token bridge is the only place that writes the
//! backend token and user fields after sign-in.

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use common::models::BackendUser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{jwt::JwtService, oauth::OAuthUserProfile};

/// Cookie holding the signed session
pub const SESSION_COOKIE: &str = "session_token";

/// Cookie holding the signed in-flight OAuth state
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// User part of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl SessionUser {
    /// First letter of the name, upper-cased, for avatar placeholders
    pub fn initial(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(|name| name.chars().next())
            .map(|c| c.to_uppercase().collect())
    }
}

impl From<&OAuthUserProfile> for SessionUser {
    fn from(profile: &OAuthUserProfile) -> Self {
        SessionUser {
            id: Some(profile.id.clone()),
            name: profile.name.clone(),
            email: profile.email.clone(),
            image: profile.image.clone(),
        }
    }
}

/// Session record carried in the session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub backend_token: Option<String>,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Session id
    pub jti: Uuid,
}

impl Session {
    /// Start a session for a freshly signed-in provider user
    pub fn new(user: SessionUser, max_age: u64) -> Self {
        let now = Utc::now().timestamp();
        Session {
            user,
            backend_token: None,
            iat: now,
            exp: now + max_age as i64,
            jti: Uuid::new_v4(),
        }
    }

    /// Record the result of a successful token exchange
    ///
    /// Fields the backend leaves out keep their provider values.
    pub fn apply_backend_user(&mut self, token: String, user: BackendUser) {
        self.backend_token = Some(token);

        if user.id.is_some() {
            self.user.id = user.id;
        }
        if user.name.is_some() {
            self.user.name = user.name;
        }
        if user.email.is_some() {
            self.user.email = user.email;
        }
        if user.image.is_some() {
            self.user.image = user.image;
        }
    }

    /// Whether the session should be re-issued with a fresh expiry
    pub fn needs_refresh(&self, update_age: u64) -> bool {
        Utc::now().timestamp() - self.iat >= update_age as i64
    }

    /// Same session with a new issue time and expiry
    ///
    /// The user and backend token are carried over unchanged.
    pub fn refreshed(&self, max_age: u64) -> Self {
        let now = Utc::now().timestamp();
        Session {
            iat: now,
            exp: now + max_age as i64,
            ..self.clone()
        }
    }
}

/// Session status as seen by a page
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    Authenticated(Session),
}

/// Resolve the session status from the request cookies
pub fn status_from_jar(jwt: &JwtService, jar: &CookieJar) -> SessionStatus {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SessionStatus::Unauthenticated;
    };

    match jwt.verify::<Session>(cookie.value()) {
        Ok(session) => SessionStatus::Authenticated(session),
        Err(e) => {
            warn!("Ignoring invalid session cookie: {}", e);
            SessionStatus::Unauthenticated
        }
    }
}

/// Build a signed session cookie
pub fn session_cookie(jwt: &JwtService, session: &Session, secure: bool) -> Result<Cookie<'static>> {
    let token = jwt.sign(session)?;
    Ok(build_cookie(SESSION_COOKIE, token, jwt.session_max_age(), secure))
}

/// Store a session in the jar
pub fn store_session(
    jwt: &JwtService,
    jar: CookieJar,
    session: &Session,
    secure: bool,
) -> Result<CookieJar> {
    info!("Issuing session {}", session.jti);
    Ok(jar.add(session_cookie(jwt, session, secure)?))
}

/// Remove the session cookie
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Build an HttpOnly, SameSite=Lax cookie scoped to the whole site
pub fn build_cookie(name: &'static str, value: String, max_age: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age as i64))
        .build()
}
