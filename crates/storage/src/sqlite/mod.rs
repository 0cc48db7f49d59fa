use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::Storage;

mod level_repo;
mod list_repo;
mod mapping;
mod migrate;
mod progress_repo;
mod user_repo;
mod word_repo;

/// Connection setup applied to every pooled connection.
const CONNECTION_PRAGMAS: [&str; 3] = [
    "PRAGMA foreign_keys = ON;",
    "PRAGMA journal_mode = WAL;",
    "PRAGMA busy_timeout = 5000;",
];

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// One adapter implementing every repository trait over a shared pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open a pool for `database_url`. Foreign keys are enforced so list
    /// deletion cascades to words, progress and active-list rows.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or a pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        tracing::debug!(url = database_url, "opened sqlite pool");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the schema up to the latest version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Connect, migrate and share one `SQLite` adapter across all repositories.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connecting or migrating fails.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        Ok(Self::from_repository(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pragmas_are_applied_on_connect() {
        let repo = SqliteRepository::connect("sqlite:file:memdb_pragmas?mode=memory&cache=shared")
            .await
            .unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys;")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn migrating_twice_is_harmless() {
        let repo = SqliteRepository::connect("sqlite:file:memdb_remigrate?mode=memory&cache=shared")
            .await
            .unwrap();
        repo.migrate().await.unwrap();
        repo.migrate().await.unwrap();
        let (versions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(versions, 1);
    }
}
