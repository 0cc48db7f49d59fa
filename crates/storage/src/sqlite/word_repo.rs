use sqlx::{QueryBuilder, Row, Sqlite};
use vocab_core::model::{VocabListId, Word, WordId};

use super::SqliteRepository;
use super::mapping::{count_from_i64, db, id_i64, map_word_row, ser};
use crate::repository::{StorageError, WordQuery, WordRepository};

const WORDS_BY_LEVEL: &str = r"
    FROM words w
    JOIN vocab_lists l ON l.id = w.list_id
    JOIN levels v ON v.id = l.level_id
    WHERE 1 = 1";

fn push_level_filter(qb: &mut QueryBuilder<'_, Sqlite>, query: &WordQuery) {
    if let Some(code) = &query.level_code {
        qb.push(" AND v.code = ");
        qb.push_bind(code.clone());
    }
}

#[async_trait::async_trait]
impl WordRepository for SqliteRepository {
    async fn insert_new_word(&self, word: &Word) -> Result<WordId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO words (list_id, text, translation)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(id_i64("list_id", word.list_id().value())?)
        .bind(word.text())
        .bind(word.translation())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        let id = u64::try_from(res.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("word_id sign overflow".into()))?;
        Ok(WordId::new(id))
    }

    async fn upsert_word(&self, word: &Word) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO words (id, list_id, text, translation)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                list_id = excluded.list_id,
                text = excluded.text,
                translation = excluded.translation
            ",
        )
        .bind(id_i64("word_id", word.id().value())?)
        .bind(id_i64("list_id", word.list_id().value())?)
        .bind(word.text())
        .bind(word.translation())
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn get_word(&self, id: WordId) -> Result<Option<Word>, StorageError> {
        let row = sqlx::query("SELECT id, list_id, text, translation FROM words WHERE id = ?1")
            .bind(id_i64("word_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;
        row.as_ref().map(map_word_row).transpose()
    }

    async fn get_words(&self, ids: &[WordId]) -> Result<Vec<Word>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, list_id, text, translation FROM words WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id_i64("word_id", id.value())?);
        }
        separated.push_unseparated(") ORDER BY id ASC");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(db)?;
        rows.iter().map(map_word_row).collect()
    }

    async fn list_words(&self, list: VocabListId) -> Result<Vec<Word>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, list_id, text, translation
            FROM words
            WHERE list_id = ?1
            ORDER BY text ASC, id ASC
            ",
        )
        .bind(id_i64("list_id", list.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;
        rows.iter().map(map_word_row).collect()
    }

    async fn count_words(&self, list: VocabListId) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM words WHERE list_id = ?1")
            .bind(id_i64("list_id", list.value())?)
            .fetch_one(&self.pool)
            .await
            .map_err(db)?;
        count_from_i64(row.try_get("n").map_err(ser)?)
    }

    async fn search_words(&self, query: &WordQuery) -> Result<Vec<Word>, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT w.id, w.list_id, w.text, w.translation");
        qb.push(WORDS_BY_LEVEL);
        push_level_filter(&mut qb, query);
        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        qb.push(" ORDER BY w.text ASC, w.id ASC LIMIT ");
        qb.push_bind(query.limit.map_or(-1, i64::from));
        qb.push(" OFFSET ");
        qb.push_bind(i64::from(query.offset));

        let rows = qb.build().fetch_all(&self.pool).await.map_err(db)?;
        rows.iter().map(map_word_row).collect()
    }

    async fn count_matching_words(&self, query: &WordQuery) -> Result<u32, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n");
        qb.push(WORDS_BY_LEVEL);
        push_level_filter(&mut qb, query);

        let row = qb.build().fetch_one(&self.pool).await.map_err(db)?;
        count_from_i64(row.try_get("n").map_err(ser)?)
    }
}
