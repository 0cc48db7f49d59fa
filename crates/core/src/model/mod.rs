mod ids;
mod level;
mod progress;
mod stats;
mod user;
mod vocab_list;
mod word;

pub use ids::{LevelId, ParseIdError, UserId, VocabListId, WordId};

pub use level::{LanguageLevel, LevelError};
pub use progress::{Progress, review_interval_days};
pub use stats::{DashboardSummary, ListProgress, ProgressStatsError, progress_percent};
pub use user::{DEFAULT_DAILY_TARGET, UserProfile, UserProfileError};
pub use vocab_list::{ListOrigin, VocabListError, VocabularyList};
pub use word::{Word, WordError};
