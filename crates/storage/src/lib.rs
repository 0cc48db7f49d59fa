#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, LevelRepository, ListQuery, ListScope, ProgressFilter,
    ProgressRepository, Storage, StorageError, UserRepository, VocabListRepository,
    WordQuery, WordRepository,
};
