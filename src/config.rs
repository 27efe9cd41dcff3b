use std::env;

use crate::error::{AppError, AppResult};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACCESS_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_JWT_ISSUER: &str = "courier";

/// Main configuration structure.
///
/// Loaded once at startup and shared read-only for the process lifetime.
/// In particular the signing secret is never mutated after init.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,

    /// Symmetric secret for HS256 session tokens. Required, non-empty.
    pub jwt_secret: String,
    pub jwt_issuer: String,

    /// Validity window for issued session tokens.
    pub access_token_ttl_hours: i64,

    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::config("DATABASE_URL must be set"))?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| AppError::config("JWT_SECRET must be set"))?;
        if jwt_secret.trim().is_empty() {
            return Err(AppError::config("JWT_SECRET must not be empty"));
        }

        let db_max_connections = env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let access_token_ttl_hours =
            env_parse("ACCESS_TOKEN_TTL_HOURS", DEFAULT_ACCESS_TOKEN_TTL_HOURS)?;

        Ok(Self {
            database_url,
            db_max_connections,
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string()),
            access_token_ttl_hours,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{} is not a valid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "DATABASE_URL",
            "DB_MAX_CONNECTIONS",
            "JWT_SECRET",
            "JWT_ISSUER",
            "ACCESS_TOKEN_TTL_HOURS",
            "RUST_LOG",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn from_env_applies_defaults() {
        clear_env();
        env::set_var("DATABASE_URL", "postgres://localhost/courier");
        env::set_var("JWT_SECRET", "test-secret");

        let config = Config::from_env().unwrap();
        assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(config.access_token_ttl_hours, DEFAULT_ACCESS_TOKEN_TTL_HOURS);
        assert_eq!(config.jwt_issuer, DEFAULT_JWT_ISSUER);
    }

    #[test]
    #[serial]
    fn missing_secret_is_rejected() {
        clear_env();
        env::set_var("DATABASE_URL", "postgres://localhost/courier");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    #[serial]
    fn blank_secret_is_rejected() {
        clear_env();
        env::set_var("DATABASE_URL", "postgres://localhost/courier");
        env::set_var("JWT_SECRET", "   ");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    #[serial]
    fn malformed_numeric_value_is_rejected() {
        clear_env();
        env::set_var("DATABASE_URL", "postgres://localhost/courier");
        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("DB_MAX_CONNECTIONS", "lots");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
