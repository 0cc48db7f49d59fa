use std::sync::Arc;

use storage::repository::{
    ListQuery, ProgressFilter, ProgressRepository, UserRepository, VocabListRepository,
};
use vocab_core::Clock;
use vocab_core::model::{DashboardSummary, ListProgress, UserId};

use crate::aggregator::ProgressAggregator;
use crate::error::ProgressError;

/// Builds the dashboard overview for a learner.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    lists: Arc<dyn VocabListRepository>,
    progress: Arc<dyn ProgressRepository>,
    aggregator: ProgressAggregator,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        lists: Arc<dyn VocabListRepository>,
        progress: Arc<dyn ProgressRepository>,
        aggregator: ProgressAggregator,
    ) -> Self {
        Self {
            clock,
            users,
            lists,
            progress,
            aggregator,
        }
    }

    /// Words answered correctly today, by their last correct answer.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn words_today(&self, user: UserId) -> Result<u32, ProgressError> {
        let today = self.clock.today();
        let filter = ProgressFilter::for_user(user).last_correct_on(today);
        Ok(self.progress.count_progress(&filter).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::UnknownUser` if the profile does not exist.
    pub async fn daily_goal(&self, user: UserId) -> Result<u32, ProgressError> {
        let profile = self
            .users
            .get_user(user)
            .await?
            .ok_or(ProgressError::UnknownUser(user))?;
        Ok(profile.daily_target())
    }

    /// Every list in the store, system and custom alike.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn lists_total(&self) -> Result<u32, ProgressError> {
        Ok(self.lists.count_lists(&ListQuery::all()).await?)
    }

    /// Combine already computed parts into the dashboard value. Completed
    /// lists are counted from `started_lists`.
    #[must_use]
    pub fn build_summary(
        started_lists: Vec<ListProgress>,
        words_today: u32,
        words_goal: u32,
        lists_total: u32,
    ) -> DashboardSummary {
        DashboardSummary::new(started_lists, words_today, words_goal, lists_total)
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if the user is unknown, storage fails, or
    /// aggregated counts are inconsistent.
    #[tracing::instrument(skip_all, fields(user = %user))]
    pub async fn summary(&self, user: UserId) -> Result<DashboardSummary, ProgressError> {
        let words_goal = self.daily_goal(user).await?;
        let started_lists = self.aggregator.active_lists_with_progress(user).await?;
        let words_today = self.words_today(user).await?;
        let lists_total = self.lists_total().await?;

        let summary = Self::build_summary(started_lists, words_today, words_goal, lists_total);
        tracing::info!(
            started = summary.started_lists.len(),
            words_today = summary.words_today,
            lists_learned = summary.lists_learned,
            "built dashboard summary"
        );
        Ok(summary)
    }
}
