use std::sync::Arc;

use storage::repository::{ProgressFilter, ProgressRepository, WordRepository};
use vocab_core::ProgressConfig;
use vocab_core::model::{ListProgress, UserId, VocabularyList};

use crate::error::ProgressError;
use crate::membership::ActiveListResolver;

/// Computes learned / in-progress / total counts per active list.
#[derive(Clone)]
pub struct ProgressAggregator {
    config: ProgressConfig,
    resolver: ActiveListResolver,
    words: Arc<dyn WordRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressAggregator {
    #[must_use]
    pub fn new(
        config: ProgressConfig,
        resolver: ActiveListResolver,
        words: Arc<dyn WordRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            config,
            resolver,
            words,
            progress,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Progress of `user` on a single list.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails, or
    /// `ProgressError::Stats` if the store reports more progress rows than words.
    pub async fn list_progress(
        &self,
        user: UserId,
        list: &VocabularyList,
    ) -> Result<ListProgress, ProgressError> {
        let threshold = self.config.learned_threshold();
        let total_words = self.words.count_words(list.id()).await?;

        let in_list = ProgressFilter::for_user(user).in_list(list.id());
        let learned_words = self
            .progress
            .count_progress(&in_list.clone().correct_at_least(threshold))
            .await?;
        let in_progress_words = self
            .progress
            .count_progress(&in_list.correct_at_least(1).correct_below(threshold))
            .await?;

        let progress = ListProgress::from_counts(
            list.id(),
            list.name(),
            total_words,
            learned_words,
            in_progress_words,
        )?;
        tracing::debug!(
            list = %list.id(),
            total = total_words,
            learned = learned_words,
            in_progress = in_progress_words,
            "aggregated list progress"
        );
        Ok(progress)
    }

    /// Progress for each active list of `user`, in activation order.
    ///
    /// # Errors
    ///
    /// Propagates storage and consistency errors from [`Self::list_progress`].
    #[tracing::instrument(skip_all, fields(user = %user))]
    pub async fn active_lists_with_progress(
        &self,
        user: UserId,
    ) -> Result<Vec<ListProgress>, ProgressError> {
        let lists = self.resolver.active_lists(user).await?;
        let mut results = Vec::with_capacity(lists.len());
        for list in &lists {
            results.push(self.list_progress(user, list).await?);
        }
        Ok(results)
    }
}
