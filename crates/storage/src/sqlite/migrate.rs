use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates levels, users, vocabulary lists, words, progress, the active-list
/// relation and their indexes.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS levels (
                    id INTEGER PRIMARY KEY,
                    code TEXT NOT NULL UNIQUE,
                    description TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    username TEXT NOT NULL,
                    level_id INTEGER,
                    daily_target INTEGER NOT NULL CHECK (daily_target >= 0),
                    FOREIGN KEY (level_id) REFERENCES levels(id) ON DELETE SET NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS vocab_lists (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    level_id INTEGER NOT NULL,
                    created_by INTEGER,
                    is_system INTEGER NOT NULL CHECK (is_system IN (0, 1)),
                    FOREIGN KEY (level_id) REFERENCES levels(id) ON DELETE CASCADE,
                    FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS words (
                    id INTEGER PRIMARY KEY,
                    list_id INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    translation TEXT NOT NULL,
                    FOREIGN KEY (list_id) REFERENCES vocab_lists(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress (
                    user_id INTEGER NOT NULL,
                    word_id INTEGER NOT NULL,
                    created_on TEXT NOT NULL,
                    correct_count INTEGER NOT NULL CHECK (correct_count >= 0),
                    last_correct TEXT,
                    next_review TEXT,
                    PRIMARY KEY (user_id, word_id),
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                    FOREIGN KEY (word_id) REFERENCES words(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Row id doubles as activation order.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS active_lists (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    list_id INTEGER NOT NULL,
                    UNIQUE (user_id, list_id),
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                    FOREIGN KEY (list_id) REFERENCES vocab_lists(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_words_list_text
                    ON words(list_id, text, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user_last_correct
                    ON progress(user_id, last_correct);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_vocab_lists_level
                    ON vocab_lists(level_id, is_system);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
