use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{VocabListId, WordId};

pub const MAX_WORD_CHARS: usize = 100;
pub const MAX_TRANSLATION_CHARS: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word text cannot be empty")]
    EmptyText,

    #[error("word text must be at most {MAX_WORD_CHARS} characters")]
    TextTooLong,

    #[error("translation cannot be empty")]
    EmptyTranslation,

    #[error("translation must be at most {MAX_TRANSLATION_CHARS} characters")]
    TranslationTooLong,
}

/// A single vocabulary entry. Belongs to exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    id: WordId,
    list_id: VocabListId,
    text: String,
    translation: String,
}

impl Word {
    /// # Errors
    ///
    /// Returns `WordError` if text or translation are empty or too long.
    pub fn new(
        id: WordId,
        list_id: VocabListId,
        text: impl Into<String>,
        translation: impl Into<String>,
    ) -> Result<Self, WordError> {
        let text = text.into().trim().to_owned();
        let translation = translation.into().trim().to_owned();

        if text.is_empty() {
            return Err(WordError::EmptyText);
        }
        if text.chars().count() > MAX_WORD_CHARS {
            return Err(WordError::TextTooLong);
        }
        if translation.is_empty() {
            return Err(WordError::EmptyTranslation);
        }
        if translation.chars().count() > MAX_TRANSLATION_CHARS {
            return Err(WordError::TranslationTooLong);
        }

        Ok(Self {
            id,
            list_id,
            text,
            translation,
        })
    }

    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn list_id(&self) -> VocabListId {
        self.list_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn translation(&self) -> &str {
        &self.translation
    }

    /// Returns a copy carrying the id assigned by storage.
    #[must_use]
    pub fn with_id(mut self, id: WordId) -> Self {
        self.id = id;
        self
    }

    /// Copy of this word placed into another list, awaiting a storage id.
    #[must_use]
    pub fn copy_into(&self, list_id: VocabListId) -> Self {
        Self {
            id: WordId::new(0),
            list_id,
            text: self.text.clone(),
            translation: self.translation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_fields() {
        let word = Word::new(WordId::new(1), VocabListId::new(1), " Haus ", " house ").unwrap();
        assert_eq!(word.text(), "Haus");
        assert_eq!(word.translation(), "house");
    }

    #[test]
    fn validates_lengths() {
        let list = VocabListId::new(1);
        assert_eq!(
            Word::new(WordId::new(1), list, "", "x").unwrap_err(),
            WordError::EmptyText
        );
        assert_eq!(
            Word::new(WordId::new(1), list, "x", " ").unwrap_err(),
            WordError::EmptyTranslation
        );
        assert_eq!(
            Word::new(WordId::new(1), list, "x".repeat(101), "y").unwrap_err(),
            WordError::TextTooLong
        );
        assert_eq!(
            Word::new(WordId::new(1), list, "x", "y".repeat(201)).unwrap_err(),
            WordError::TranslationTooLong
        );
    }

    #[test]
    fn copy_keeps_text_and_moves_list() {
        let word = Word::new(WordId::new(4), VocabListId::new(1), "Baum", "tree").unwrap();
        let copy = word.copy_into(VocabListId::new(9));
        assert_eq!(copy.list_id(), VocabListId::new(9));
        assert_eq!(copy.text(), "Baum");
        assert_eq!(copy.translation(), "tree");
    }
}
