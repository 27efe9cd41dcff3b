use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub type DbPool = Pool<Postgres>;

/// Postgres-backed implementation of the store traits
/// ([`crate::users::UserStore`], [`crate::messages::MessageStore`]).
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub async fn create_pool(config: &Config) -> AppResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(sqlx::Error::Migrate(Box::new(e))))?;
    Ok(())
}

/// Classify constraint violations on insert. Uniqueness and foreign-key
/// violations are store-state facts the caller asked about, not server
/// faults, so they get their own error kinds; anything else stays a
/// database error.
pub(crate) fn classify_insert_error(
    err: sqlx::Error,
    on_conflict: &str,
    on_reference: &str,
) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::conflict(on_conflict),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::reference(on_reference)
        }
        _ => AppError::Database(err),
    }
}
