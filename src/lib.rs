// ============================================================================
// Courier - messaging service core
// ============================================================================
//
// Library core for a small messaging service:
// - User registration and login (bcrypt credentials)
// - Stateless session tokens (HS256 JWT)
// - Message exchange between two users, with per-operation authorization:
//   only the two parties to a message may view it, and only the recipient
//   may mark it read
//
// HTTP routing and process bootstrap are intentionally not part of this
// crate; consumers wire the service functions to their own transport.
//
// ============================================================================

pub mod auth;
pub mod auth_service;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod messages;
pub mod messaging_service;
pub mod telemetry;
pub mod user_service;
pub mod users;

pub use auth::{authenticate_request, AuthManager, Claims, Identity};
pub use config::Config;
pub use context::AppContext;
pub use db::{create_pool, run_migrations, DbPool, PgStore};
pub use error::{AppError, AppResult};
