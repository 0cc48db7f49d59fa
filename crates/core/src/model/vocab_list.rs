use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{LevelId, UserId, VocabListId};

pub const MAX_LIST_NAME_CHARS: usize = 100;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabListError {
    #[error("list name cannot be empty")]
    EmptyName,

    #[error("list name must be at most {MAX_LIST_NAME_CHARS} characters")]
    NameTooLong,

    #[error("custom lists need an owner")]
    MissingOwner,
}

//
// ─── VOCABULARY LIST ───────────────────────────────────────────────────────────
//

/// Where a list comes from: shipped with the app, or built by a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
pub enum ListOrigin {
    System,
    Custom(UserId),
}

/// A named collection of words tagged with a proficiency level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyList {
    id: VocabListId,
    name: String,
    level_id: LevelId,
    origin: ListOrigin,
}

impl VocabularyList {
    /// Creates a system list.
    ///
    /// # Errors
    ///
    /// Returns `VocabListError` if the name is empty or too long.
    pub fn system(
        id: VocabListId,
        name: impl Into<String>,
        level_id: LevelId,
    ) -> Result<Self, VocabListError> {
        Self::new(id, name, level_id, ListOrigin::System)
    }

    /// Creates a custom list owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `VocabListError` if the name is empty or too long.
    pub fn custom(
        id: VocabListId,
        name: impl Into<String>,
        level_id: LevelId,
        owner: UserId,
    ) -> Result<Self, VocabListError> {
        Self::new(id, name, level_id, ListOrigin::Custom(owner))
    }

    /// Rebuilds a list from its persisted columns.
    ///
    /// # Errors
    ///
    /// Returns `VocabListError::MissingOwner` for a non-system row without a creator,
    /// or a name validation error.
    pub fn from_persisted(
        id: VocabListId,
        name: impl Into<String>,
        level_id: LevelId,
        is_system: bool,
        created_by: Option<UserId>,
    ) -> Result<Self, VocabListError> {
        let origin = match (is_system, created_by) {
            (true, _) => ListOrigin::System,
            (false, Some(owner)) => ListOrigin::Custom(owner),
            (false, None) => return Err(VocabListError::MissingOwner),
        };
        Self::new(id, name, level_id, origin)
    }

    fn new(
        id: VocabListId,
        name: impl Into<String>,
        level_id: LevelId,
        origin: ListOrigin,
    ) -> Result<Self, VocabListError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(VocabListError::EmptyName);
        }
        if name.chars().count() > MAX_LIST_NAME_CHARS {
            return Err(VocabListError::NameTooLong);
        }

        Ok(Self {
            id,
            name,
            level_id,
            origin,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> VocabListId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn origin(&self) -> ListOrigin {
        self.origin
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self.origin, ListOrigin::System)
    }

    #[must_use]
    pub fn created_by(&self) -> Option<UserId> {
        match self.origin {
            ListOrigin::System => None,
            ListOrigin::Custom(owner) => Some(owner),
        }
    }

    /// True when `user` created this list.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by() == Some(user)
    }

    /// Returns a copy carrying the id assigned by storage.
    #[must_use]
    pub fn with_id(mut self, id: VocabListId) -> Self {
        self.id = id;
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
