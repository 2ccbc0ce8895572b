//! Common library for the web front end
//!
//! This crate provides the pieces shared with anything that talks to the
//! external backend service: the pre-configured HTTP client, its
//! configuration, the wire models and the backend error type.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

/// Example usage of the backend client
///
/// ```rust,no_run
/// use common::{client::ApiClient, config::ApiConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ApiConfig::from_env()?;
///     let client = ApiClient::new(&config)?;
///     let exchange = client.exchange_google_token("ya29.provider-token").await?;
///     let data = client.dashboard(&exchange.token).await?;
///     println!("Dashboard: {}", data);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
