//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use vocab_core::model::{
    ProgressStatsError, UserId, UserProfileError, VocabListError, VocabListId, WordId,
};

/// Errors emitted by `ActiveListResolver`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MembershipError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error("vocabulary list {0} not found")]
    ListNotFound(VocabListId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressAggregator` and `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error(transparent)]
    Stats(#[from] ProgressStatsError),
    #[error(transparent)]
    Membership(#[from] MembershipError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AnswerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error("word {0} not found")]
    UnknownWord(WordId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ListCatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error("unknown level {0}")]
    UnknownLevel(String),
    #[error("vocabulary list {0} not found")]
    ListNotFound(VocabListId),
    #[error("page {page} out of range (1..={last_page})")]
    PageOutOfRange { page: u32, last_page: u32 },
    #[error(transparent)]
    VocabList(#[from] VocabListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    UserProfile(#[from] UserProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
