use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use storage::repository::{
    LevelRepository, ListQuery, ListScope, ProgressFilter, ProgressRepository, StorageError,
    UserRepository, VocabListRepository, WordQuery, WordRepository,
};
use vocab_core::ProgressConfig;
use vocab_core::model::{
    LanguageLevel, Progress, UserId, VocabListId, VocabularyList, Word, WordId,
};

use crate::error::CatalogError;

/// Words shown per page of the vocabulary overview.
pub const WORDS_PER_PAGE: u32 = 50;

/// Lists a learner can browse, grouped by origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListCatalog {
    pub system_lists: Vec<VocabularyList>,
    pub custom_lists: Vec<VocabularyList>,
    pub levels: Vec<LanguageLevel>,
    pub current_level: Option<String>,
}

/// A word with the learner's correct-answer count (0 when never answered).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordProgress {
    pub word: Word,
    pub correct_count: u32,
    pub learned: bool,
}

/// One page of all words across lists, ordered by text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyPage {
    pub words: Vec<Word>,
    pub page: u32,
    pub last_page: u32,
    pub total_words: u32,
    pub current_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListDetail {
    pub list: VocabularyList,
    pub words: Vec<WordProgress>,
    pub total_words: u32,
    pub learned_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedList {
    pub id: VocabListId,
    pub copied_words: u32,
}

/// Browsing and editing of vocabulary lists.
#[derive(Clone)]
pub struct ListCatalogService {
    config: ProgressConfig,
    levels: Arc<dyn LevelRepository>,
    lists: Arc<dyn VocabListRepository>,
    words: Arc<dyn WordRepository>,
    progress: Arc<dyn ProgressRepository>,
    users: Arc<dyn UserRepository>,
}

impl ListCatalogService {
    #[must_use]
    pub fn new(
        config: ProgressConfig,
        levels: Arc<dyn LevelRepository>,
        lists: Arc<dyn VocabListRepository>,
        words: Arc<dyn WordRepository>,
        progress: Arc<dyn ProgressRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            config,
            levels,
            lists,
            words,
            progress,
            users,
        }
    }

    /// System lists plus the user's own lists, optionally narrowed to one level.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn browse(
        &self,
        user: UserId,
        level_code: Option<&str>,
    ) -> Result<ListCatalog, CatalogError> {
        let system = ListQuery::scoped(ListScope::System)
            .with_level_code(level_code.map(str::to_owned));
        let custom = ListQuery::scoped(ListScope::CustomOf(user))
            .with_level_code(level_code.map(str::to_owned));

        Ok(ListCatalog {
            current_level: system.level_code.clone(),
            system_lists: self.lists.list_lists(&system).await?,
            custom_lists: self.lists.list_lists(&custom).await?,
            levels: self.levels.list_levels().await?,
        })
    }

    /// Words of a list ordered by text, annotated with the user's counts.
    ///
    /// Custom lists of other users are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ListNotFound` for unknown or foreign lists.
    #[tracing::instrument(skip_all, fields(user = %user, list = %list))]
    pub async fn list_detail(
        &self,
        user: UserId,
        list: VocabListId,
    ) -> Result<ListDetail, CatalogError> {
        let vocab_list = self
            .lists
            .get_list(list)
            .await?
            .filter(|l| l.is_system() || l.is_owned_by(user))
            .ok_or(CatalogError::ListNotFound(list))?;

        let rows: HashMap<WordId, Progress> = self
            .progress
            .list_progress(&ProgressFilter::for_user(user).in_list(list))
            .await?
            .into_iter()
            .map(|p| (p.word_id(), p))
            .collect();

        let words: Vec<WordProgress> = self
            .words
            .list_words(list)
            .await?
            .into_iter()
            .map(|word| {
                let row = rows.get(&word.id());
                WordProgress {
                    correct_count: row.map_or(0, Progress::correct_count),
                    learned: row.is_some_and(|p| p.is_learned(&self.config)),
                    word,
                }
            })
            .collect();
        let learned = words.iter().filter(|w| w.learned).count();

        Ok(ListDetail {
            list: vocab_list,
            total_words: u32::try_from(words.len()).unwrap_or(u32::MAX),
            learned_count: u32::try_from(learned).unwrap_or(u32::MAX),
            words,
        })
    }

    /// Create a list owned by `user`, copying text and translation of
    /// `copy_from`. Unknown word ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownUser`, `CatalogError::UnknownLevel` or a
    /// validation error for the name.
    #[tracing::instrument(skip_all, fields(user = %user))]
    pub async fn create_custom_list(
        &self,
        user: UserId,
        name: &str,
        level_code: &str,
        copy_from: &[WordId],
    ) -> Result<CreatedList, CatalogError> {
        if self.users.get_user(user).await?.is_none() {
            return Err(CatalogError::UnknownUser(user));
        }
        let level = self
            .levels
            .find_level_by_code(level_code)
            .await?
            .ok_or_else(|| CatalogError::UnknownLevel(level_code.to_owned()))?;

        let draft = VocabularyList::custom(VocabListId::new(0), name, level.id(), user)?;
        let sources = self.words.get_words(copy_from).await?;
        let id = self.lists.insert_list_with_words(&draft, &sources).await?;
        let copied_words = u32::try_from(sources.len()).unwrap_or(u32::MAX);

        tracing::info!(list = %id, copied_words, "created custom list");
        Ok(CreatedList { id, copied_words })
    }

    /// Every word of every list, ordered by text, optionally narrowed to one
    /// level. Pages are numbered from 1; an empty result still has page 1.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::PageOutOfRange` for page 0 or past the last page.
    #[tracing::instrument(skip_all, fields(page = page))]
    pub async fn vocabulary(
        &self,
        level_code: Option<&str>,
        page: u32,
    ) -> Result<VocabularyPage, CatalogError> {
        let query = WordQuery::all().with_level_code(level_code.map(str::to_owned));
        let total_words = self.words.count_matching_words(&query).await?;
        let last_page = total_words.div_ceil(WORDS_PER_PAGE).max(1);
        if page == 0 || page > last_page {
            return Err(CatalogError::PageOutOfRange { page, last_page });
        }

        let offset = (page - 1) * WORDS_PER_PAGE;
        let words = self
            .words
            .search_words(&query.clone().window(offset, WORDS_PER_PAGE))
            .await?;
        tracing::debug!(words = words.len(), total_words, "loaded vocabulary page");
        Ok(VocabularyPage {
            words,
            page,
            last_page,
            total_words,
            current_level: query.level_code,
        })
    }

    /// Delete one of the user's own lists. System lists and lists owned by
    /// someone else are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ListNotFound` if the user may not delete the list.
    #[tracing::instrument(skip_all, fields(user = %user, list = %list))]
    pub async fn delete_custom_list(
        &self,
        user: UserId,
        list: VocabListId,
    ) -> Result<(), CatalogError> {
        let deletable = self
            .lists
            .get_list(list)
            .await?
            .is_some_and(|l| !l.is_system() && l.is_owned_by(user));
        if !deletable {
            return Err(CatalogError::ListNotFound(list));
        }

        match self.lists.delete_list(list).await {
            Err(StorageError::NotFound) => Err(CatalogError::ListNotFound(list)),
            other => {
                other?;
                tracing::info!("deleted custom list");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vocab_core::model::{LevelId, UserProfile};

    use crate::test_support::Fixture;

    fn catalog(fx: &Fixture) -> ListCatalogService {
        ListCatalogService::new(
            fx.config,
            fx.storage.levels.clone(),
            fx.storage.lists.clone(),
            fx.storage.words.clone(),
            fx.storage.progress.clone(),
            fx.storage.users.clone(),
        )
    }

    async fn add_level(fx: &Fixture, id: u64, code: &str) -> LevelId {
        let level = LanguageLevel::new(LevelId::new(id), code, code).unwrap();
        fx.storage.levels.upsert_level(&level).await.unwrap();
        level.id()
    }

    async fn other_user(fx: &Fixture) -> UserId {
        let ben = UserProfile::new(UserId::new(2), "ben").unwrap();
        fx.storage.users.upsert_user(&ben).await.unwrap();
        ben.id()
    }

    #[tokio::test]
    async fn browse_splits_system_and_own_lists() {
        let fx = Fixture::new().await;
        let b1 = add_level(&fx, 2, "B1").await;
        fx.list_with_words("Grundwortschatz", 0).await;
        let travel = VocabularyList::system(VocabListId::new(0), "Reisen", b1).unwrap();
        fx.storage.lists.insert_new_list(&travel).await.unwrap();

        let service = catalog(&fx);
        let mine = service
            .create_custom_list(fx.user, "Meine Verben", "A1", &[])
            .await
            .unwrap();
        let ben = other_user(&fx).await;
        service
            .create_custom_list(ben, "Bens Liste", "A1", &[])
            .await
            .unwrap();

        let all = service.browse(fx.user, None).await.unwrap();
        assert_eq!(all.system_lists.len(), 2);
        let custom: Vec<_> = all.custom_lists.iter().map(VocabularyList::id).collect();
        assert_eq!(custom, vec![mine.id]);
        let codes: Vec<_> = all.levels.iter().map(LanguageLevel::code).collect();
        assert_eq!(codes, ["A1", "B1"]);
        assert_eq!(all.current_level, None);

        let b1_only = service.browse(fx.user, Some("b1")).await.unwrap();
        assert_eq!(b1_only.current_level.as_deref(), Some("B1"));
        assert_eq!(b1_only.system_lists.len(), 1);
        assert_eq!(b1_only.system_lists[0].name(), "Reisen");
        assert!(b1_only.custom_lists.is_empty());
    }

    #[tokio::test]
    async fn detail_annotates_words_with_counts() {
        let fx = Fixture::new().await;
        let (list, words) = fx.list_with_words("Obst", 3).await;
        fx.set_count(words[0], 7, fx.today()).await;
        fx.set_count(words[2], 2, fx.today()).await;

        let detail = catalog(&fx).list_detail(fx.user, list).await.unwrap();
        assert_eq!(detail.list.name(), "Obst");
        assert_eq!(detail.total_words, 3);
        assert_eq!(detail.learned_count, 1);
        let counts: Vec<_> = detail
            .words
            .iter()
            .map(|w| (w.word.text().to_owned(), w.correct_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("Obst-0".to_owned(), 7),
                ("Obst-1".to_owned(), 0),
                ("Obst-2".to_owned(), 2)
            ]
        );
        let learned: Vec<_> = detail.words.iter().map(|w| w.learned).collect();
        assert_eq!(learned, [true, false, false]);
    }

    #[tokio::test]
    async fn detail_learned_flag_follows_configured_threshold() {
        let mut fx = Fixture::new().await;
        fx.config = ProgressConfig::new(8, 60).unwrap();
        let (list, words) = fx.list_with_words("Zahlen", 2).await;
        fx.set_count(words[0], 7, fx.today()).await;
        fx.set_count(words[1], 8, fx.today()).await;

        let detail = catalog(&fx).list_detail(fx.user, list).await.unwrap();
        let learned: Vec<_> = detail.words.iter().map(|w| w.learned).collect();
        assert_eq!(learned, [false, true]);
        assert_eq!(detail.learned_count, 1);
    }

    #[tokio::test]
    async fn vocabulary_pages_through_all_words_by_text() {
        let fx = Fixture::new().await;
        fx.list_with_words("Liste", 60).await;
        fx.list_with_words("Alpha", 5).await;
        let service = catalog(&fx);

        let first = service.vocabulary(None, 1).await.unwrap();
        assert_eq!(first.total_words, 65);
        assert_eq!(first.last_page, 2);
        assert_eq!(first.words.len(), WORDS_PER_PAGE as usize);
        assert_eq!(first.words[0].text(), "Alpha-0");
        let texts: Vec<_> = first.words.iter().map(Word::text).collect();
        assert!(texts.windows(2).all(|pair| pair[0] <= pair[1]));

        let second = service.vocabulary(None, 2).await.unwrap();
        assert_eq!(second.words.len(), 15);
        assert_eq!(second.page, 2);

        for page in [0, 3] {
            assert!(matches!(
                service.vocabulary(None, page).await,
                Err(CatalogError::PageOutOfRange { last_page: 2, .. })
            ));
        }
    }

    #[tokio::test]
    async fn vocabulary_filters_by_level_code() {
        let fx = Fixture::new().await;
        let b1 = add_level(&fx, 2, "B1").await;
        fx.list_with_words("Basis", 3).await;
        let draft = VocabularyList::system(VocabListId::new(0), "Beruf", b1).unwrap();
        let job = fx.storage.lists.insert_new_list(&draft).await.unwrap();
        let word = Word::new(WordId::new(0), job, "Gehalt", "salary").unwrap();
        fx.storage.words.insert_new_word(&word).await.unwrap();

        let service = catalog(&fx);
        let b1_page = service.vocabulary(Some("b1"), 1).await.unwrap();
        assert_eq!(b1_page.current_level.as_deref(), Some("B1"));
        assert_eq!(b1_page.total_words, 1);
        assert_eq!(b1_page.words[0].text(), "Gehalt");

        let a1_page = service.vocabulary(Some("A1"), 1).await.unwrap();
        assert_eq!(a1_page.total_words, 3);
        assert!(a1_page.words.iter().all(|w| w.list_id() != job));

        let empty = service.vocabulary(Some("C2"), 1).await.unwrap();
        assert!(empty.words.is_empty());
        assert_eq!(empty.last_page, 1);
    }

    #[tokio::test]
    async fn detail_hides_foreign_custom_lists() {
        let fx = Fixture::new().await;
        let ben = other_user(&fx).await;
        let created = catalog(&fx)
            .create_custom_list(ben, "Privat", "A1", &[])
            .await
            .unwrap();

        assert!(matches!(
            catalog(&fx).list_detail(fx.user, created.id).await,
            Err(CatalogError::ListNotFound(_))
        ));
        assert!(catalog(&fx).list_detail(ben, created.id).await.is_ok());
    }

    #[tokio::test]
    async fn create_copies_selected_words() {
        let fx = Fixture::new().await;
        let (_, words) = fx.list_with_words("Quelle", 3).await;
        let service = catalog(&fx);

        let created = service
            .create_custom_list(
                fx.user,
                "Auswahl",
                "a1",
                &[words[0], words[2], WordId::new(404)],
            )
            .await
            .unwrap();
        assert_eq!(created.copied_words, 2);

        let copied = fx.storage.words.list_words(created.id).await.unwrap();
        let texts: Vec<_> = copied.iter().map(Word::text).collect();
        assert_eq!(texts, ["Quelle-0", "Quelle-2"]);
        assert!(copied.iter().all(|w| w.list_id() == created.id));

        let list = fx.storage.lists.get_list(created.id).await.unwrap().unwrap();
        assert!(!list.is_system());
        assert!(list.is_owned_by(fx.user));
    }

    #[tokio::test]
    async fn create_rejects_unknown_level_user_and_blank_name() {
        let fx = Fixture::new().await;
        let service = catalog(&fx);
        assert!(matches!(
            service.create_custom_list(fx.user, "X", "C2", &[]).await,
            Err(CatalogError::UnknownLevel(code)) if code == "C2"
        ));
        assert!(matches!(
            service.create_custom_list(UserId::new(9), "X", "A1", &[]).await,
            Err(CatalogError::UnknownUser(_))
        ));
        assert!(matches!(
            service.create_custom_list(fx.user, "   ", "A1", &[]).await,
            Err(CatalogError::VocabList(_))
        ));
    }

    #[tokio::test]
    async fn delete_only_own_custom_lists() {
        let fx = Fixture::new().await;
        let (system, _) = fx.list_with_words("System", 1).await;
        let ben = other_user(&fx).await;
        let service = catalog(&fx);
        let bens = service
            .create_custom_list(ben, "Bens", "A1", &[])
            .await
            .unwrap();

        assert!(matches!(
            service.delete_custom_list(fx.user, system).await,
            Err(CatalogError::ListNotFound(_))
        ));
        assert!(matches!(
            service.delete_custom_list(fx.user, bens.id).await,
            Err(CatalogError::ListNotFound(_))
        ));
        assert!(fx.storage.lists.get_list(bens.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_removes_words_progress_and_activation() {
        let fx = Fixture::new().await;
        let (_, source) = fx.list_with_words("Quelle", 2).await;
        let service = catalog(&fx);
        let created = service
            .create_custom_list(fx.user, "Weg damit", "A1", &source)
            .await
            .unwrap();
        let copied = fx.storage.words.list_words(created.id).await.unwrap();
        fx.set_count(copied[0].id(), 3, fx.today()).await;
        fx.activate(created.id).await;

        service.delete_custom_list(fx.user, created.id).await.unwrap();

        assert!(fx.storage.lists.get_list(created.id).await.unwrap().is_none());
        assert!(fx.storage.users.active_lists(fx.user).await.unwrap().is_empty());
        assert!(
            fx.storage
                .progress
                .get_progress(fx.user, copied[0].id())
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(fx.storage.words.count_words(created.id).await.unwrap(), 0);
    }
}
