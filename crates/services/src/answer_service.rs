use std::sync::Arc;

use storage::repository::{ProgressRepository, UserRepository, WordRepository};
use vocab_core::model::{Progress, UserId, WordId};
use vocab_core::{Clock, ProgressConfig};

use crate::error::AnswerError;

/// Books correct answers against a learner's progress.
#[derive(Clone)]
pub struct AnswerService {
    clock: Clock,
    config: ProgressConfig,
    users: Arc<dyn UserRepository>,
    words: Arc<dyn WordRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl AnswerService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: ProgressConfig,
        users: Arc<dyn UserRepository>,
        words: Arc<dyn WordRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            config,
            users,
            words,
            progress,
        }
    }

    /// Count one correct answer of `user` for `word`.
    ///
    /// The first answer creates the progress row; later ones increment it and
    /// push the next review further out.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::UnknownUser` / `AnswerError::UnknownWord` when
    /// either side is missing, or `AnswerError::Storage` on repository failure.
    #[tracing::instrument(skip_all, fields(user = %user, word = %word))]
    pub async fn record_correct_answer(
        &self,
        user: UserId,
        word: WordId,
    ) -> Result<Progress, AnswerError> {
        if self.users.get_user(user).await?.is_none() {
            return Err(AnswerError::UnknownUser(user));
        }
        if self.words.get_word(word).await?.is_none() {
            return Err(AnswerError::UnknownWord(word));
        }

        let today = self.clock.today();
        let progress = match self.progress.get_progress(user, word).await? {
            Some(mut existing) => {
                existing.record_correct(today, &self.config);
                existing
            }
            None => Progress::first_correct(user, word, today, &self.config),
        };
        self.progress.upsert_progress(&progress).await?;

        tracing::info!(
            count = progress.correct_count(),
            next_review = ?progress.next_review(),
            "recorded correct answer"
        );
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use storage::repository::ProgressFilter;

    use crate::test_support::Fixture;

    fn service(fx: &Fixture, clock: Clock) -> AnswerService {
        AnswerService::new(
            clock,
            fx.config,
            fx.storage.users.clone(),
            fx.storage.words.clone(),
            fx.storage.progress.clone(),
        )
    }

    #[tokio::test]
    async fn first_answer_creates_row() {
        let fx = Fixture::new().await;
        let (_, words) = fx.list_with_words("Haus", 1).await;

        let progress = service(&fx, fx.clock)
            .record_correct_answer(fx.user, words[0])
            .await
            .unwrap();
        assert_eq!(progress.correct_count(), 1);
        assert_eq!(progress.created_on(), fx.today());
        assert_eq!(progress.last_correct(), Some(fx.today()));
        assert_eq!(progress.next_review(), Some(fx.today() + Duration::days(1)));
    }

    #[tokio::test]
    async fn answering_twice_yields_one_row_with_count_two() {
        let fx = Fixture::new().await;
        let (list, words) = fx.list_with_words("Garten", 1).await;
        let answers = service(&fx, fx.clock);

        answers.record_correct_answer(fx.user, words[0]).await.unwrap();
        let second = answers.record_correct_answer(fx.user, words[0]).await.unwrap();
        assert_eq!(second.correct_count(), 2);

        let rows = fx
            .storage
            .progress
            .list_progress(&ProgressFilter::for_user(fx.user).in_list(list))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].correct_count(), 2);
    }

    #[tokio::test]
    async fn later_answers_move_review_out_and_keep_creation_day() {
        let fx = Fixture::new().await;
        let (_, words) = fx.list_with_words("Stadt", 1).await;
        let mut clock = fx.clock;
        service(&fx, clock)
            .record_correct_answer(fx.user, words[0])
            .await
            .unwrap();

        clock.advance(Duration::days(3));
        let progress = service(&fx, clock)
            .record_correct_answer(fx.user, words[0])
            .await
            .unwrap();
        let answered_on = fx.today() + Duration::days(3);
        assert_eq!(progress.created_on(), fx.today());
        assert_eq!(progress.last_correct(), Some(answered_on));
        assert_eq!(progress.next_review(), Some(answered_on + Duration::days(2)));
    }

    #[tokio::test]
    async fn unknown_word_or_user_is_rejected() {
        let fx = Fixture::new().await;
        let (_, words) = fx.list_with_words("Schule", 1).await;
        let answers = service(&fx, fx.clock);

        assert!(matches!(
            answers.record_correct_answer(fx.user, WordId::new(999)).await,
            Err(AnswerError::UnknownWord(id)) if id == WordId::new(999)
        ));
        assert!(matches!(
            answers.record_correct_answer(UserId::new(8), words[0]).await,
            Err(AnswerError::UnknownUser(_))
        ));
        assert!(
            fx.storage
                .progress
                .get_progress(fx.user, WordId::new(999))
                .await
                .unwrap()
                .is_none()
        );
    }
}
