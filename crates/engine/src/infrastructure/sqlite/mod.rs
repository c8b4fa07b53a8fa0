//! SQLite persistence.

mod location_repo;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

pub use location_repo::SqliteLocationRepo;

/// Open (creating if missing) a SQLite database with foreign keys enforced.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))
        .map_err(|e| RepoError::database("connect", e))?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}

/// Translate constraint failures so callers can tell them from outages.
pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.is_foreign_key_violation() =>
        {
            RepoError::constraint(db.message())
        }
        _ => RepoError::database(operation, &err),
    }
}
