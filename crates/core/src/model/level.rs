use serde::Serialize;
use thiserror::Error;

use crate::model::ids::LevelId;

pub const MAX_LEVEL_CODE_CHARS: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level code cannot be empty")]
    EmptyCode,

    #[error("level code must be at most {MAX_LEVEL_CODE_CHARS} characters")]
    CodeTooLong,
}

/// A proficiency level such as `A1` or `B2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageLevel {
    id: LevelId,
    code: String,
    description: String,
}

impl LanguageLevel {
    /// Creates a level, normalising the code to upper case.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` if the code is empty or too long.
    pub fn new(
        id: LevelId,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, LevelError> {
        let code = code.into().trim().to_uppercase();
        if code.is_empty() {
            return Err(LevelError::EmptyCode);
        }
        if code.chars().count() > MAX_LEVEL_CODE_CHARS {
            return Err(LevelError::CodeTooLong);
        }

        Ok(Self {
            id,
            code,
            description: description.into().trim().to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_code() {
        let level = LanguageLevel::new(LevelId::new(1), " b1 ", "Intermediate").unwrap();
        assert_eq!(level.code(), "B1");
        assert_eq!(level.description(), "Intermediate");
    }

    #[test]
    fn rejects_bad_codes() {
        assert_eq!(
            LanguageLevel::new(LevelId::new(1), "  ", "").unwrap_err(),
            LevelError::EmptyCode
        );
        assert_eq!(
            LanguageLevel::new(LevelId::new(1), "ABCDEF", "").unwrap_err(),
            LevelError::CodeTooLong
        );
    }
}
