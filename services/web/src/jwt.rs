//! JWT service for signing and verifying cookie payloads
//!
//! Both the session cookie and the short-lived OAuth state cookie are HS256
//! JWTs signed with the session secret. A cookie that fails verification
//! (bad signature, expired, malformed) is treated as absent.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};

/// Shortest accepted session secret in bytes
const MIN_SECRET_LEN: usize = 32;

/// Longest accepted session or state lifetime in seconds (10 years)
const MAX_LIFETIME: u64 = 315_360_000;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign session and state cookies
    pub secret: String,
    /// Session lifetime in seconds (default: 30 days)
    pub session_max_age: u64,
    /// Age in seconds after which a session is re-issued (default: 24 hours)
    pub session_update_age: u64,
    /// Lifetime of the OAuth state cookie in seconds (default: 15 minutes)
    pub state_max_age: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_SECRET`: Signing secret, at least 32 bytes
    /// - `SESSION_MAX_AGE`: Session lifetime in seconds (default: 2592000)
    /// - `SESSION_UPDATE_AGE`: Session re-issue age in seconds (default: 86400)
    /// - `OAUTH_STATE_MAX_AGE`: OAuth state lifetime in seconds (default: 900)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable not set"))?;

        let session_max_age = std::env::var("SESSION_MAX_AGE")
            .unwrap_or_else(|_| "2592000".to_string()) // 30 days
            .parse()
            .unwrap_or(2_592_000);

        let session_update_age = std::env::var("SESSION_UPDATE_AGE")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .unwrap_or(86_400);

        let state_max_age = std::env::var("OAUTH_STATE_MAX_AGE")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let config = JwtConfig {
            secret,
            session_max_age,
            session_update_age,
            state_max_age,
        };
        config.validate_lifetimes()?;

        Ok(config)
    }

    /// Reject lifetimes that would overflow a cookie expiry timestamp
    pub fn validate_lifetimes(&self) -> Result<()> {
        for (name, value) in [
            ("SESSION_MAX_AGE", self.session_max_age),
            ("SESSION_UPDATE_AGE", self.session_update_age),
            ("OAUTH_STATE_MAX_AGE", self.state_max_age),
        ] {
            if value > MAX_LIFETIME {
                anyhow::bail!(
                    "{} must be at most {} seconds, got {}",
                    name,
                    MAX_LIFETIME,
                    value
                );
            }
        }

        Ok(())
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} bytes long",
                MIN_SECRET_LEN
            );
        }
        config.validate_lifetimes()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Sign a set of claims. The claims must carry an `exp` field.
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token and return its claims
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let token_data = decode::<T>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the session lifetime
    pub fn session_max_age(&self) -> u64 {
        self.config.session_max_age
    }

    /// Get the session re-issue age
    pub fn session_update_age(&self) -> u64 {
        self.config.session_update_age
    }

    /// Get the OAuth state lifetime
    pub fn state_max_age(&self) -> u64 {
        self.config.state_max_age
    }
}
