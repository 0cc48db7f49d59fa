use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use vocab_core::model::{VocabListId, VocabularyList, Word};

use super::SqliteRepository;
use super::mapping::{count_from_i64, db, id_i64, map_list_row, ser};
use crate::repository::{ListQuery, ListScope, StorageError, VocabListRepository};

fn push_list_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    query: &ListQuery,
) -> Result<(), StorageError> {
    match query.scope {
        ListScope::All => {}
        ListScope::System => {
            qb.push(" AND l.is_system = 1");
        }
        ListScope::CustomOf(user) => {
            qb.push(" AND l.is_system = 0 AND l.created_by = ");
            qb.push_bind(id_i64("user_id", user.value())?);
        }
    }
    if let Some(code) = &query.level_code {
        qb.push(" AND v.code = ");
        qb.push_bind(code.clone());
    }
    Ok(())
}

const INSERT_LIST: &str = r"
    INSERT INTO vocab_lists (name, level_id, created_by, is_system)
    VALUES (?1, ?2, ?3, ?4)
";

fn list_id_from_rowid(rowid: i64) -> Result<VocabListId, StorageError> {
    u64::try_from(rowid)
        .map(VocabListId::new)
        .map_err(|_| StorageError::Serialization("list_id sign overflow".into()))
}

fn list_bindings(list: &VocabularyList) -> Result<(i64, Option<i64>, i64), StorageError> {
    let level = id_i64("level_id", list.level_id().value())?;
    let owner = list
        .created_by()
        .map(|u| id_i64("created_by", u.value()))
        .transpose()?;
    let is_system = i64::from(list.is_system());
    Ok((level, owner, is_system))
}

async fn write_list_with_words(
    conn: &mut SqliteConnection,
    list: &VocabularyList,
    words: &[Word],
) -> Result<VocabListId, StorageError> {
    let (level, owner, is_system) = list_bindings(list)?;
    let res = sqlx::query(INSERT_LIST)
        .bind(list.name())
        .bind(level)
        .bind(owner)
        .bind(is_system)
        .execute(&mut *conn)
        .await
        .map_err(db)?;
    let id = list_id_from_rowid(res.last_insert_rowid())?;
    let list_id = id_i64("list_id", id.value())?;

    for word in words {
        sqlx::query("INSERT INTO words (list_id, text, translation) VALUES (?1, ?2, ?3)")
            .bind(list_id)
            .bind(word.text())
            .bind(word.translation())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
    }
    Ok(id)
}

#[async_trait::async_trait]
impl VocabListRepository for SqliteRepository {
    async fn insert_new_list(&self, list: &VocabularyList) -> Result<VocabListId, StorageError> {
        let (level, owner, is_system) = list_bindings(list)?;
        let res = sqlx::query(INSERT_LIST)
            .bind(list.name())
            .bind(level)
            .bind(owner)
            .bind(is_system)
            .execute(&self.pool)
            .await
            .map_err(db)?;
        list_id_from_rowid(res.last_insert_rowid())
    }

    async fn insert_list_with_words(
        &self,
        list: &VocabularyList,
        words: &[Word],
    ) -> Result<VocabListId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(db)?;
        match write_list_with_words(&mut tx, list, words).await {
            Ok(id) => {
                tx.commit().await.map_err(db)?;
                tracing::debug!(list = %id, words = words.len(), "inserted list with words");
                Ok(id)
            }
            Err(err) => {
                tx.rollback().await.map_err(db)?;
                Err(err)
            }
        }
    }

    async fn upsert_list(&self, list: &VocabularyList) -> Result<(), StorageError> {
        let (level, owner, is_system) = list_bindings(list)?;
        sqlx::query(
            r"
            INSERT INTO vocab_lists (id, name, level_id, created_by, is_system)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                level_id = excluded.level_id,
                created_by = excluded.created_by,
                is_system = excluded.is_system
            ",
        )
        .bind(id_i64("list_id", list.id().value())?)
        .bind(list.name())
        .bind(level)
        .bind(owner)
        .bind(is_system)
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn get_list(&self, id: VocabListId) -> Result<Option<VocabularyList>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, level_id, created_by, is_system
            FROM vocab_lists WHERE id = ?1
            ",
        )
        .bind(id_i64("list_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;
        row.as_ref().map(map_list_row).transpose()
    }

    async fn list_lists(&self, query: &ListQuery) -> Result<Vec<VocabularyList>, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r"
            SELECT l.id, l.name, l.level_id, l.created_by, l.is_system
            FROM vocab_lists l
            JOIN levels v ON v.id = l.level_id
            WHERE 1 = 1",
        );
        push_list_filters(&mut qb, query)?;
        qb.push(" ORDER BY l.id ASC");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(db)?;
        rows.iter().map(map_list_row).collect()
    }

    async fn count_lists(&self, query: &ListQuery) -> Result<u32, StorageError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r"
            SELECT COUNT(*) AS n
            FROM vocab_lists l
            JOIN levels v ON v.id = l.level_id
            WHERE 1 = 1",
        );
        push_list_filters(&mut qb, query)?;

        let row = qb.build().fetch_one(&self.pool).await.map_err(db)?;
        count_from_i64(row.try_get("n").map_err(ser)?)
    }

    async fn delete_list(&self, id: VocabListId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM vocab_lists WHERE id = ?1")
            .bind(id_i64("list_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
