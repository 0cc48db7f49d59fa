use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use vocab_core::model::{
    LanguageLevel, LevelId, Progress, UserId, UserProfile, VocabListId, VocabularyList, Word,
    WordId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Map a driver error, surfacing constraint failures as domain errors.
pub(crate) fn db(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
        if db_err.is_unique_violation() {
            return StorageError::Conflict;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn count_from_i64(v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization("count overflow".into()))
}

pub(crate) fn map_level_row(row: &SqliteRow) -> Result<LanguageLevel, StorageError> {
    let id = LevelId::new(i64_to_u64("level_id", row.try_get("id").map_err(ser)?)?);
    LanguageLevel::new(
        id,
        row.try_get::<String, _>("code").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_list_row(row: &SqliteRow) -> Result<VocabularyList, StorageError> {
    let id = VocabListId::new(i64_to_u64("list_id", row.try_get("id").map_err(ser)?)?);
    let level_id = LevelId::new(i64_to_u64("level_id", row.try_get("level_id").map_err(ser)?)?);
    let created_by = row
        .try_get::<Option<i64>, _>("created_by")
        .map_err(ser)?
        .map(|v| i64_to_u64("created_by", v).map(UserId::new))
        .transpose()?;
    let is_system = row.try_get::<i64, _>("is_system").map_err(ser)? != 0;

    VocabularyList::from_persisted(
        id,
        row.try_get::<String, _>("name").map_err(ser)?,
        level_id,
        is_system,
        created_by,
    )
    .map_err(ser)
}

pub(crate) fn map_word_row(row: &SqliteRow) -> Result<Word, StorageError> {
    let id = WordId::new(i64_to_u64("word_id", row.try_get("id").map_err(ser)?)?);
    let list_id = VocabListId::new(i64_to_u64("list_id", row.try_get("list_id").map_err(ser)?)?);
    Word::new(
        id,
        list_id,
        row.try_get::<String, _>("text").map_err(ser)?,
        row.try_get::<String, _>("translation").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<Progress, StorageError> {
    let user_id = UserId::new(i64_to_u64("user_id", row.try_get("user_id").map_err(ser)?)?);
    let word_id = WordId::new(i64_to_u64("word_id", row.try_get("word_id").map_err(ser)?)?);
    let correct_count = u32::try_from(row.try_get::<i64, _>("correct_count").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("correct_count overflow".into()))?;

    Ok(Progress::from_persisted(
        user_id,
        word_id,
        row.try_get::<NaiveDate, _>("created_on").map_err(ser)?,
        correct_count,
        row.try_get::<Option<NaiveDate>, _>("last_correct")
            .map_err(ser)?,
        row.try_get::<Option<NaiveDate>, _>("next_review")
            .map_err(ser)?,
    ))
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<UserProfile, StorageError> {
    let id = UserId::new(i64_to_u64("user_id", row.try_get("id").map_err(ser)?)?);
    let level_id = row
        .try_get::<Option<i64>, _>("level_id")
        .map_err(ser)?
        .map(|v| i64_to_u64("level_id", v).map(LevelId::new))
        .transpose()?;
    let daily_target = u32::try_from(row.try_get::<i64, _>("daily_target").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("daily_target overflow".into()))?;

    Ok(UserProfile::new(id, row.try_get::<String, _>("username").map_err(ser)?)
        .map_err(ser)?
        .with_level(level_id)
        .with_daily_target(daily_target))
}
