use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{LevelId, UserId};

pub const DEFAULT_DAILY_TARGET: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserProfileError {
    #[error("username cannot be empty")]
    EmptyUsername,
}

/// Learning-related profile of a user. Identity itself lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    id: UserId,
    username: String,
    level_id: Option<LevelId>,
    daily_target: u32,
}

impl UserProfile {
    /// # Errors
    ///
    /// Returns `UserProfileError::EmptyUsername` for a blank username.
    pub fn new(id: UserId, username: impl Into<String>) -> Result<Self, UserProfileError> {
        let username = username.into().trim().to_owned();
        if username.is_empty() {
            return Err(UserProfileError::EmptyUsername);
        }
        Ok(Self {
            id,
            username,
            level_id: None,
            daily_target: DEFAULT_DAILY_TARGET,
        })
    }

    #[must_use]
    pub fn with_level(mut self, level_id: Option<LevelId>) -> Self {
        self.level_id = level_id;
        self
    }

    #[must_use]
    pub fn with_daily_target(mut self, daily_target: u32) -> Self {
        self.daily_target = daily_target;
        self
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn level_id(&self) -> Option<LevelId> {
        self.level_id
    }

    /// Words the learner aims to answer correctly per day.
    #[must_use]
    pub fn daily_target(&self) -> u32 {
        self.daily_target
    }
}
