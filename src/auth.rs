use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub jti: String, // token id (unique per token)
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
    pub iss: String, // issuer
}

/// Authenticated caller, as decoded from a verified session token.
/// Only [`authenticate_request`] produces these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// Issues and verifies stateless session tokens (HS256).
///
/// Holds the process-wide signing secret, read-only after construction.
/// There is no revocation list: a token stays valid until its expiry.
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl_hours: i64,
    issuer: String,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("access_token_ttl_hours", &self.access_token_ttl_hours)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.jwt_secret.trim().is_empty() {
            return Err(AppError::config("JWT_SECRET must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_ttl_hours: config.access_token_ttl_hours,
            issuer: config.jwt_issuer.clone(),
        })
    }

    /// Sign a session token for a verified identity.
    pub fn create_token(&self, username: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.access_token_ttl_hours);

        let claims = Claims {
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify signature, expiry and issuer; returns the decoded claims.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.clone()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// Resolve a presented session token to an [`Identity`].
///
/// Uniform rejection point for every authenticated operation: a missing,
/// malformed, tampered or expired token is refused here, before any domain
/// logic runs.
pub fn authenticate_request(auth: &AuthManager, token: Option<&str>) -> AppResult<Identity> {
    let token = token.ok_or_else(|| AppError::auth("missing session token"))?;

    let claims = auth.verify_token(token).map_err(|e| {
        tracing::warn!(error = %e, "session token rejected");
        e
    })?;

    Ok(Identity {
        username: claims.sub,
    })
}
