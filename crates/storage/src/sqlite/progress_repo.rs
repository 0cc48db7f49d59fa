use sqlx::{QueryBuilder, Row, Sqlite};
use vocab_core::model::Progress;

use super::SqliteRepository;
use super::mapping::{count_from_i64, db, id_i64, map_progress_row, ser};
use crate::repository::{ProgressFilter, ProgressRepository, StorageError};

const PROGRESS_COLUMNS: &str =
    "p.user_id, p.word_id, p.created_on, p.correct_count, p.last_correct, p.next_review";

fn push_progress_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    filter: &ProgressFilter,
) -> Result<(), StorageError> {
    if let Some(user) = filter.user {
        qb.push(" AND p.user_id = ");
        qb.push_bind(id_i64("user_id", user.value())?);
    }
    if let Some(word) = filter.word {
        qb.push(" AND p.word_id = ");
        qb.push_bind(id_i64("word_id", word.value())?);
    }
    if let Some(list) = filter.list {
        qb.push(" AND w.list_id = ");
        qb.push_bind(id_i64("list_id", list.value())?);
    }
    if let Some(min) = filter.min_correct {
        qb.push(" AND p.correct_count >= ");
        qb.push_bind(i64::from(min));
    }
    if let Some(max) = filter.max_correct {
        qb.push(" AND p.correct_count < ");
        qb.push_bind(i64::from(max));
    }
    if let Some(day) = filter.last_correct {
        qb.push(" AND p.last_correct = ");
        qb.push_bind(day);
    }
    Ok(())
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (user_id, word_id, created_on, correct_count, last_correct, next_review)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, word_id) DO UPDATE SET
                correct_count = excluded.correct_count,
                last_correct = excluded.last_correct,
                next_review = excluded.next_review
            ",
        )
        .bind(id_i64("user_id", progress.user_id().value())?)
        .bind(id_i64("word_id", progress.word_id().value())?)
        .bind(progress.created_on())
        .bind(i64::from(progress.correct_count()))
        .bind(progress.last_correct())
        .bind(progress.next_review())
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn count_progress(&self, filter: &ProgressFilter) -> Result<u32, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r"
            SELECT COUNT(*) AS n
            FROM progress p
            JOIN words w ON w.id = p.word_id
            WHERE 1 = 1",
        );
        push_progress_filters(&mut qb, filter)?;

        let row = qb.build().fetch_one(&self.pool).await.map_err(db)?;
        count_from_i64(row.try_get("n").map_err(ser)?)
    }

    async fn list_progress(&self, filter: &ProgressFilter) -> Result<Vec<Progress>, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(PROGRESS_COLUMNS);
        qb.push(
            r"
            FROM progress p
            JOIN words w ON w.id = p.word_id
            WHERE 1 = 1",
        );
        push_progress_filters(&mut qb, filter)?;
        qb.push(" ORDER BY p.word_id ASC, p.user_id ASC");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(db)?;
        rows.iter().map(map_progress_row).collect()
    }
}
