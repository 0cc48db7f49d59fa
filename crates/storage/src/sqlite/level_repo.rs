use vocab_core::model::{LanguageLevel, LevelId};

use super::SqliteRepository;
use super::mapping::{db, id_i64, map_level_row};
use crate::repository::{LevelRepository, StorageError};

#[async_trait::async_trait]
impl LevelRepository for SqliteRepository {
    async fn upsert_level(&self, level: &LanguageLevel) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO levels (id, code, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                code = excluded.code,
                description = excluded.description
            ",
        )
        .bind(id_i64("level_id", level.id().value())?)
        .bind(level.code())
        .bind(level.description())
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn get_level(&self, id: LevelId) -> Result<Option<LanguageLevel>, StorageError> {
        let row = sqlx::query("SELECT id, code, description FROM levels WHERE id = ?1")
            .bind(id_i64("level_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;
        row.as_ref().map(map_level_row).transpose()
    }

    async fn find_level_by_code(&self, code: &str) -> Result<Option<LanguageLevel>, StorageError> {
        let row = sqlx::query("SELECT id, code, description FROM levels WHERE code = ?1")
            .bind(code.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;
        row.as_ref().map(map_level_row).transpose()
    }

    async fn list_levels(&self) -> Result<Vec<LanguageLevel>, StorageError> {
        let rows = sqlx::query("SELECT id, code, description FROM levels ORDER BY code ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;
        rows.iter().map(map_level_row).collect()
    }
}
