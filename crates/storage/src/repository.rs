use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use vocab_core::model::{
    LanguageLevel, LevelId, Progress, UserId, UserProfile, VocabListId, VocabularyList, Word,
    WordId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── QUERIES ───────────────────────────────────────────────────────────────────
//

/// Equality and range filter over progress rows.
///
/// Unset fields do not constrain the result. `min_correct` is inclusive,
/// `max_correct` exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressFilter {
    pub user: Option<UserId>,
    pub word: Option<WordId>,
    pub list: Option<VocabListId>,
    pub min_correct: Option<u32>,
    pub max_correct: Option<u32>,
    pub last_correct: Option<NaiveDate>,
}

impl ProgressFilter {
    #[must_use]
    pub fn for_user(user: UserId) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_list(mut self, list: VocabListId) -> Self {
        self.list = Some(list);
        self
    }

    #[must_use]
    pub fn word(mut self, word: WordId) -> Self {
        self.word = Some(word);
        self
    }

    #[must_use]
    pub fn correct_at_least(mut self, min: u32) -> Self {
        self.min_correct = Some(min);
        self
    }

    #[must_use]
    pub fn correct_below(mut self, max: u32) -> Self {
        self.max_correct = Some(max);
        self
    }

    #[must_use]
    pub fn last_correct_on(mut self, day: NaiveDate) -> Self {
        self.last_correct = Some(day);
        self
    }

    /// Check a row against the filter. `word_list` is the list owning the row's word.
    #[must_use]
    pub fn matches(&self, progress: &Progress, word_list: Option<VocabListId>) -> bool {
        self.user.is_none_or(|u| progress.user_id() == u)
            && self.word.is_none_or(|w| progress.word_id() == w)
            && self.list.is_none_or(|l| word_list == Some(l))
            && self.min_correct.is_none_or(|min| progress.correct_count() >= min)
            && self.max_correct.is_none_or(|max| progress.correct_count() < max)
            && self
                .last_correct
                .is_none_or(|day| progress.last_correct() == Some(day))
    }
}

/// Which lists a catalog query covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListScope {
    #[default]
    All,
    System,
    CustomOf(UserId),
}

/// Filter over vocabulary lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub scope: ListScope,
    pub level_code: Option<String>,
}

impl ListQuery {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scoped(scope: ListScope) -> Self {
        Self {
            scope,
            level_code: None,
        }
    }

    #[must_use]
    pub fn with_level_code(mut self, code: Option<String>) -> Self {
        self.level_code = normalize_level_code(code);
        self
    }

    fn matches(&self, list: &VocabularyList, level_code: Option<&str>) -> bool {
        let in_scope = match self.scope {
            ListScope::All => true,
            ListScope::System => list.is_system(),
            ListScope::CustomOf(user) => !list.is_system() && list.is_owned_by(user),
        };
        in_scope
            && self
                .level_code
                .as_deref()
                .is_none_or(|code| level_code == Some(code))
    }
}

fn normalize_level_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty())
}

/// Words across every list, optionally narrowed to one level, with paging.
///
/// `limit == None` returns everything after `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordQuery {
    pub level_code: Option<String>,
    pub offset: u32,
    pub limit: Option<u32>,
}

impl WordQuery {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_level_code(mut self, code: Option<String>) -> Self {
        self.level_code = normalize_level_code(code);
        self
    }

    #[must_use]
    pub fn window(mut self, offset: u32, limit: u32) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait LevelRepository: Send + Sync {
    /// Persist or update a level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another level already uses the code.
    async fn upsert_level(&self, level: &LanguageLevel) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_level(&self, id: LevelId) -> Result<Option<LanguageLevel>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn find_level_by_code(&self, code: &str) -> Result<Option<LanguageLevel>, StorageError>;

    /// All levels ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_levels(&self) -> Result<Vec<LanguageLevel>, StorageError>;
}

#[async_trait]
pub trait VocabListRepository: Send + Sync {
    /// Insert a list and let storage assign its ID. The list's own ID is ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the level or owner does not exist.
    async fn insert_new_list(&self, list: &VocabularyList) -> Result<VocabListId, StorageError>;

    /// Insert a list together with copies of `words` placed into it. Either
    /// the list and every word are stored, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the level or owner does not exist.
    async fn insert_list_with_words(
        &self,
        list: &VocabularyList,
        words: &[Word],
    ) -> Result<VocabListId, StorageError>;

    /// Persist or update a list under its own ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn upsert_list(&self, list: &VocabularyList) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_list(&self, id: VocabListId) -> Result<Option<VocabularyList>, StorageError>;

    /// Lists matching the query, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_lists(&self, query: &ListQuery) -> Result<Vec<VocabularyList>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn count_lists(&self, query: &ListQuery) -> Result<u32, StorageError>;

    /// Delete a list together with its words, their progress rows and any
    /// active-list entries pointing at it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the list does not exist.
    async fn delete_list(&self, id: VocabListId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait WordRepository: Send + Sync {
    /// Insert a word and let storage assign its ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owning list does not exist.
    async fn insert_new_word(&self, word: &Word) -> Result<WordId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the word cannot be stored.
    async fn upsert_word(&self, word: &Word) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_word(&self, id: WordId) -> Result<Option<Word>, StorageError>;

    /// Fetch the words that exist among `ids`, ordered by ID. Missing IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_words(&self, ids: &[WordId]) -> Result<Vec<Word>, StorageError>;

    /// Words of a list ordered by text, then ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_words(&self, list: VocabListId) -> Result<Vec<Word>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn count_words(&self, list: VocabListId) -> Result<u32, StorageError>;

    /// Words matching `query`, ordered by text, then ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn search_words(&self, query: &WordQuery) -> Result<Vec<Word>, StorageError>;

    /// Number of words matching `query`, ignoring its offset and limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn count_matching_words(&self, query: &WordQuery) -> Result<u32, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// The single row for `(user, word)`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_progress(
        &self,
        user: UserId,
        word: WordId,
    ) -> Result<Option<Progress>, StorageError> {
        let filter = ProgressFilter::for_user(user).word(word);
        Ok(self.list_progress(&filter).await?.into_iter().next())
    }

    /// Insert or replace the single row for `(user, word)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user or word does not exist.
    async fn upsert_progress(&self, progress: &Progress) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn count_progress(&self, filter: &ProgressFilter) -> Result<u32, StorageError>;

    /// Matching rows ordered by word ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_progress(&self, filter: &ProgressFilter) -> Result<Vec<Progress>, StorageError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StorageError>;

    /// Active lists of a user in activation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn active_lists(&self, user: UserId) -> Result<Vec<VocabListId>, StorageError>;

    /// Returns `true` when the list was not active before.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user or list does not exist.
    async fn activate_list(&self, user: UserId, list: VocabListId) -> Result<bool, StorageError>;

    /// Returns `true` when the list was active before.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn deactivate_list(&self, user: UserId, list: VocabListId)
    -> Result<bool, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    levels: HashMap<LevelId, LanguageLevel>,
    lists: HashMap<VocabListId, VocabularyList>,
    words: HashMap<WordId, Word>,
    progress: HashMap<(UserId, WordId), Progress>,
    users: HashMap<UserId, UserProfile>,
    active: Vec<(UserId, VocabListId)>,
    next_list_id: u64,
    next_word_id: u64,
}

impl MemoryState {
    fn level_code(&self, id: LevelId) -> Option<&str> {
        self.levels.get(&id).map(LanguageLevel::code)
    }

    fn word_level_code(&self, word: &Word) -> Option<&str> {
        let list = self.lists.get(&word.list_id())?;
        self.level_code(list.level_id())
    }

    fn words_matching<'a>(&'a self, query: &'a WordQuery) -> impl Iterator<Item = &'a Word> + 'a {
        self.words.values().filter(move |w| {
            query
                .level_code
                .as_deref()
                .is_none_or(|code| self.word_level_code(w) == Some(code))
        })
    }

    fn word_list(&self, id: WordId) -> Option<VocabListId> {
        self.words.get(&id).map(Word::list_id)
    }

    /// The list's level and owner must exist.
    fn check_list_refs(&self, list: &VocabularyList) -> Result<(), StorageError> {
        let owner_known = list
            .created_by()
            .is_none_or(|owner| self.users.contains_key(&owner));
        if self.levels.contains_key(&list.level_id()) && owner_known {
            Ok(())
        } else {
            Err(StorageError::NotFound)
        }
    }

    fn insert_list(&mut self, list: &VocabularyList) -> VocabListId {
        let max_existing = self.lists.keys().map(VocabListId::value).max().unwrap_or(0);
        let id = VocabListId::new(self.next_list_id.max(max_existing) + 1);
        self.next_list_id = id.value();
        self.lists.insert(id, list.clone().with_id(id));
        id
    }

    fn insert_word(&mut self, word: &Word) -> WordId {
        let max_existing = self.words.keys().map(WordId::value).max().unwrap_or(0);
        let id = WordId::new(self.next_word_id.max(max_existing) + 1);
        self.next_word_id = id.value();
        self.words.insert(id, word.clone().with_id(id));
        id
    }

    fn matching_progress<'a>(
        &'a self,
        filter: &'a ProgressFilter,
    ) -> impl Iterator<Item = &'a Progress> + 'a {
        self.progress
            .values()
            .filter(move |p| filter.matches(p, self.word_list(p.word_id())))
    }
}

fn count_u32(n: usize) -> Result<u32, StorageError> {
    u32::try_from(n).map_err(|_| StorageError::Serialization("count overflow".into()))
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl LevelRepository for InMemoryRepository {
    async fn upsert_level(&self, level: &LanguageLevel) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard
            .levels
            .values()
            .any(|l| l.code() == level.code() && l.id() != level.id())
        {
            return Err(StorageError::Conflict);
        }
        guard.levels.insert(level.id(), level.clone());
        Ok(())
    }

    async fn get_level(&self, id: LevelId) -> Result<Option<LanguageLevel>, StorageError> {
        Ok(self.lock()?.levels.get(&id).cloned())
    }

    async fn find_level_by_code(&self, code: &str) -> Result<Option<LanguageLevel>, StorageError> {
        let code = code.trim().to_uppercase();
        Ok(self
            .lock()?
            .levels
            .values()
            .find(|l| l.code() == code)
            .cloned())
    }

    async fn list_levels(&self) -> Result<Vec<LanguageLevel>, StorageError> {
        let mut levels: Vec<_> = self.lock()?.levels.values().cloned().collect();
        levels.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(levels)
    }
}

#[async_trait]
impl VocabListRepository for InMemoryRepository {
    async fn insert_new_list(&self, list: &VocabularyList) -> Result<VocabListId, StorageError> {
        let mut guard = self.lock()?;
        guard.check_list_refs(list)?;
        Ok(guard.insert_list(list))
    }

    async fn insert_list_with_words(
        &self,
        list: &VocabularyList,
        words: &[Word],
    ) -> Result<VocabListId, StorageError> {
        let mut guard = self.lock()?;
        guard.check_list_refs(list)?;
        let id = guard.insert_list(list);
        for word in words {
            guard.insert_word(&word.copy_into(id));
        }
        Ok(id)
    }

    async fn upsert_list(&self, list: &VocabularyList) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.levels.contains_key(&list.level_id()) {
            return Err(StorageError::NotFound);
        }
        guard.lists.insert(list.id(), list.clone());
        Ok(())
    }

    async fn get_list(&self, id: VocabListId) -> Result<Option<VocabularyList>, StorageError> {
        Ok(self.lock()?.lists.get(&id).cloned())
    }

    async fn list_lists(&self, query: &ListQuery) -> Result<Vec<VocabularyList>, StorageError> {
        let guard = self.lock()?;
        let mut lists: Vec<_> = guard
            .lists
            .values()
            .filter(|l| query.matches(l, guard.level_code(l.level_id())))
            .cloned()
            .collect();
        lists.sort_by_key(VocabularyList::id);
        Ok(lists)
    }

    async fn count_lists(&self, query: &ListQuery) -> Result<u32, StorageError> {
        let guard = self.lock()?;
        let n = guard
            .lists
            .values()
            .filter(|l| query.matches(l, guard.level_code(l.level_id())))
            .count();
        count_u32(n)
    }

    async fn delete_list(&self, id: VocabListId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.lists.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        let MemoryState {
            words,
            progress,
            active,
            ..
        } = &mut *guard;
        words.retain(|_, w| w.list_id() != id);
        progress.retain(|(_, word), _| words.contains_key(word));
        active.retain(|(_, list)| *list != id);
        Ok(())
    }
}

#[async_trait]
impl WordRepository for InMemoryRepository {
    async fn insert_new_word(&self, word: &Word) -> Result<WordId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.lists.contains_key(&word.list_id()) {
            return Err(StorageError::NotFound);
        }
        Ok(guard.insert_word(word))
    }

    async fn upsert_word(&self, word: &Word) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.lists.contains_key(&word.list_id()) {
            return Err(StorageError::NotFound);
        }
        guard.words.insert(word.id(), word.clone());
        Ok(())
    }

    async fn get_word(&self, id: WordId) -> Result<Option<Word>, StorageError> {
        Ok(self.lock()?.words.get(&id).cloned())
    }

    async fn get_words(&self, ids: &[WordId]) -> Result<Vec<Word>, StorageError> {
        let guard = self.lock()?;
        let mut found: Vec<_> = ids
            .iter()
            .filter_map(|id| guard.words.get(id).cloned())
            .collect();
        found.sort_by_key(Word::id);
        found.dedup_by_key(|w| w.id());
        Ok(found)
    }

    async fn list_words(&self, list: VocabListId) -> Result<Vec<Word>, StorageError> {
        let guard = self.lock()?;
        let mut words: Vec<_> = guard
            .words
            .values()
            .filter(|w| w.list_id() == list)
            .cloned()
            .collect();
        words.sort_by(|a, b| a.text().cmp(b.text()).then(a.id().cmp(&b.id())));
        Ok(words)
    }

    async fn count_words(&self, list: VocabListId) -> Result<u32, StorageError> {
        let n = self
            .lock()?
            .words
            .values()
            .filter(|w| w.list_id() == list)
            .count();
        count_u32(n)
    }

    async fn search_words(&self, query: &WordQuery) -> Result<Vec<Word>, StorageError> {
        let guard = self.lock()?;
        let mut words: Vec<_> = guard.words_matching(query).cloned().collect();
        words.sort_by(|a, b| a.text().cmp(b.text()).then(a.id().cmp(&b.id())));
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        Ok(words.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_matching_words(&self, query: &WordQuery) -> Result<u32, StorageError> {
        let guard = self.lock()?;
        count_u32(guard.words_matching(query).count())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&progress.user_id())
            || !guard.words.contains_key(&progress.word_id())
        {
            return Err(StorageError::NotFound);
        }
        guard
            .progress
            .insert((progress.user_id(), progress.word_id()), progress.clone());
        Ok(())
    }

    async fn count_progress(&self, filter: &ProgressFilter) -> Result<u32, StorageError> {
        let guard = self.lock()?;
        count_u32(guard.matching_progress(filter).count())
    }

    async fn list_progress(&self, filter: &ProgressFilter) -> Result<Vec<Progress>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<_> = guard.matching_progress(filter).cloned().collect();
        rows.sort_by_key(|p| (p.word_id(), p.user_id()));
        Ok(rows)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        self.lock()?.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn active_lists(&self, user: UserId) -> Result<Vec<VocabListId>, StorageError> {
        Ok(self
            .lock()?
            .active
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, list)| *list)
            .collect())
    }

    async fn activate_list(&self, user: UserId, list: VocabListId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&user) || !guard.lists.contains_key(&list) {
            return Err(StorageError::NotFound);
        }
        if guard.active.contains(&(user, list)) {
            return Ok(false);
        }
        guard.active.push((user, list));
        Ok(true)
    }

    async fn deactivate_list(
        &self,
        user: UserId,
        list: VocabListId,
    ) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let before = guard.active.len();
        guard.active.retain(|entry| *entry != (user, list));
        Ok(guard.active.len() != before)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub levels: Arc<dyn LevelRepository>,
    pub lists: Arc<dyn VocabListRepository>,
    pub words: Arc<dyn WordRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one adapter across every repository role.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: LevelRepository
            + VocabListRepository
            + WordRepository
            + ProgressRepository
            + UserRepository
            + Clone
            + 'static,
    {
        Self {
            levels: Arc::new(repo.clone()),
            lists: Arc::new(repo.clone()),
            words: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            users: Arc::new(repo),
        }
    }
}
