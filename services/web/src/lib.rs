//! Authenticated web front end
//!
//! Google sign-in, a signed session cookie carrying the backend token issued
//! in exchange for the provider token, and a session-gated dashboard that
//! calls the external backend with that token.

pub mod bridge;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;

pub use routes::create_router;
pub use state::AppState;
