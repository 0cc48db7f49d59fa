use sqlx::Row;
use vocab_core::model::{UserId, UserProfile, VocabListId};

use super::SqliteRepository;
use super::mapping::{db, id_i64, map_user_row, ser};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let level = user
            .level_id()
            .map(|l| id_i64("level_id", l.value()))
            .transpose()?;
        sqlx::query(
            r"
            INSERT INTO users (id, username, level_id, daily_target)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                level_id = excluded.level_id,
                daily_target = excluded.daily_target
            ",
        )
        .bind(id_i64("user_id", user.id().value())?)
        .bind(user.username())
        .bind(level)
        .bind(i64::from(user.daily_target()))
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            "SELECT id, username, level_id, daily_target FROM users WHERE id = ?1",
        )
        .bind(id_i64("user_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;
        row.as_ref().map(map_user_row).transpose()
    }

    async fn active_lists(&self, user: UserId) -> Result<Vec<VocabListId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT list_id FROM active_lists
            WHERE user_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_i64("user_id", user.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter()
            .map(|row| {
                let raw: i64 = row.try_get("list_id").map_err(ser)?;
                u64::try_from(raw)
                    .map(VocabListId::new)
                    .map_err(|_| StorageError::Serialization("list_id sign overflow".into()))
            })
            .collect()
    }

    async fn activate_list(&self, user: UserId, list: VocabListId) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO active_lists (user_id, list_id)
            VALUES (?1, ?2)
            ON CONFLICT(user_id, list_id) DO NOTHING
            ",
        )
        .bind(id_i64("user_id", user.value())?)
        .bind(id_i64("list_id", list.value())?)
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(res.rows_affected() > 0)
    }

    async fn deactivate_list(
        &self,
        user: UserId,
        list: VocabListId,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM active_lists WHERE user_id = ?1 AND list_id = ?2")
            .bind(id_i64("user_id", user.value())?)
            .bind(id_i64("list_id", list.value())?)
            .execute(&self.pool)
            .await
            .map_err(db)?;
        Ok(res.rows_affected() > 0)
    }
}
