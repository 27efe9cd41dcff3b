use http::StatusCode;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Every failure a service operation can produce is one of these variants,
/// carrying enough classification for the transport layer to choose the
/// right external status. Lower layers never catch and reinterpret: a store
/// failure surfaces here unchanged.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Authentication & Authorization Errors =====
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // ===== Domain Errors =====
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    /// A create referenced a user that does not exist (dangling foreign key).
    #[error("Unknown reference: {0}")]
    Reference(String),

    /// A listing produced no rows. Kept distinct from `NotFound` so callers
    /// can tell "store empty" from "entity absent".
    #[error("Empty result: {0}")]
    Empty(String),

    // ===== Database & Storage Errors =====
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::Empty(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Reference(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Hash(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Reference(_) => "REFERENCE_ERROR",
            AppError::Empty(_) => "EMPTY_RESULT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(msg) => format!("Authentication failed: {}", msg),
            AppError::Jwt(_) => "Invalid or expired token".to_string(),
            AppError::Forbidden(msg) => format!("Forbidden: {}", msg),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::Conflict(msg) => format!("Conflict: {}", msg),
            AppError::Reference(msg) => format!("Unknown reference: {}", msg),
            AppError::Empty(msg) => format!("Empty result: {}", msg),
            AppError::Database(_) => "Database error".to_string(),
            AppError::Hash(_) => "Internal server error".to_string(),
            AppError::Config(msg) => format!("Configuration error: {}", msg),
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "Request rejected"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }

    /// Structured error body for the transport layer.
    /// Server errors never expose internal details to the client.
    pub fn to_body(&self) -> serde_json::Value {
        let status = self.status_code();

        if status.is_server_error() {
            json!({
                "error": "Internal server error",
                "error_code": self.error_code(),
                "status": status.as_u16(),
            })
        } else {
            json!({
                "error": self.user_message(),
                "error_code": self.error_code(),
                "status": status.as_u16(),
            })
        }
    }
}

// ============================================================================
// Helper functions for creating common errors
// ============================================================================

impl AppError {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::Auth(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Create a dangling-reference error
    pub fn reference(msg: impl Into<String>) -> Self {
        AppError::Reference(msg.into())
    }

    /// Create an empty-result error
    pub fn empty(msg: impl Into<String>) -> Self {
        AppError::Empty(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(AppError::auth("bad").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::forbidden("no").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_found("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::empty("none").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::conflict("dup").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::reference("dangling").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::config("bad").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn empty_and_not_found_stay_distinct() {
        assert_ne!(
            AppError::empty("no rows").error_code(),
            AppError::not_found("no row").error_code()
        );
    }

    #[test]
    fn server_error_body_hides_details() {
        let err = AppError::Database(sqlx::Error::PoolClosed);
        let body = err.to_body();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["status"], 500);
    }

    #[test]
    fn client_error_body_carries_message() {
        let body = AppError::conflict("username already taken").to_body();
        assert_eq!(body["error_code"], "CONFLICT");
        assert_eq!(body["status"], 409);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("username already taken"));
    }
}
