use chrono::NaiveDate;
use storage::repository::{
    LevelRepository, ProgressRepository, Storage, UserRepository, VocabListRepository,
    WordRepository,
};
use vocab_core::model::{
    LanguageLevel, LevelId, Progress, UserId, UserProfile, VocabListId, VocabularyList, Word,
    WordId,
};
use vocab_core::time::fixed_now;
use vocab_core::{Clock, ProgressConfig};

/// In-memory storage seeded with one `A1` level and one learner.
pub(crate) struct Fixture {
    pub storage: Storage,
    pub user: UserId,
    pub level: LevelId,
    pub config: ProgressConfig,
    pub clock: Clock,
}

impl Fixture {
    pub async fn new() -> Self {
        let storage = Storage::in_memory();
        let level = LanguageLevel::new(LevelId::new(1), "A1", "Beginner").unwrap();
        storage.levels.upsert_level(&level).await.unwrap();
        let user = UserProfile::new(UserId::new(1), "anna")
            .unwrap()
            .with_daily_target(20);
        storage.users.upsert_user(&user).await.unwrap();

        Self {
            storage,
            user: user.id(),
            level: level.id(),
            config: ProgressConfig::default(),
            clock: Clock::fixed(fixed_now()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// System list with `n` generated words.
    pub async fn list_with_words(&self, name: &str, n: u32) -> (VocabListId, Vec<WordId>) {
        let list = VocabularyList::system(VocabListId::new(0), name, self.level).unwrap();
        let list_id = self.storage.lists.insert_new_list(&list).await.unwrap();
        let mut words = Vec::new();
        for i in 0..n {
            let word =
                Word::new(WordId::new(0), list_id, format!("{name}-{i}"), format!("t{i}")).unwrap();
            words.push(self.storage.words.insert_new_word(&word).await.unwrap());
        }
        (list_id, words)
    }

    /// Store a row with the given count, last answered on `day`.
    pub async fn set_count(&self, word: WordId, count: u32, day: NaiveDate) {
        let progress =
            Progress::from_persisted(self.user, word, day, count, Some(day), Some(day));
        self.storage.progress.upsert_progress(&progress).await.unwrap();
    }

    pub async fn activate(&self, list: VocabListId) {
        self.storage.users.activate_list(self.user, list).await.unwrap();
    }
}
