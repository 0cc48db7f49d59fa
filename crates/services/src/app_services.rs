use std::sync::Arc;

use storage::repository::{Storage, UserRepository};
use vocab_core::ProgressConfig;
use vocab_core::model::{UserId, UserProfile};

use crate::Clock;
use crate::aggregator::ProgressAggregator;
use crate::answer_service::AnswerService;
use crate::catalog_service::ListCatalogService;
use crate::dashboard::DashboardService;
use crate::error::AppServicesError;
use crate::membership::ActiveListResolver;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    membership: Arc<ActiveListResolver>,
    dashboard: Arc<DashboardService>,
    answers: Arc<AnswerService>,
    catalog: Arc<ListCatalogService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: ProgressConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, config))
    }

    /// Build services over volatile in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, config: ProgressConfig) -> Self {
        Self::from_storage(Storage::in_memory(), clock, config)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock, config: ProgressConfig) -> Self {
        let membership =
            ActiveListResolver::new(Arc::clone(&storage.users), Arc::clone(&storage.lists));
        let aggregator = ProgressAggregator::new(
            config,
            membership.clone(),
            Arc::clone(&storage.words),
            Arc::clone(&storage.progress),
        );
        let dashboard = Arc::new(DashboardService::new(
            clock,
            Arc::clone(&storage.users),
            Arc::clone(&storage.lists),
            Arc::clone(&storage.progress),
            aggregator,
        ));
        let answers = Arc::new(AnswerService::new(
            clock,
            config,
            Arc::clone(&storage.users),
            Arc::clone(&storage.words),
            Arc::clone(&storage.progress),
        ));
        let catalog = Arc::new(ListCatalogService::new(
            config,
            Arc::clone(&storage.levels),
            Arc::clone(&storage.lists),
            Arc::clone(&storage.words),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.users),
        ));

        Self {
            storage,
            membership: Arc::new(membership),
            dashboard,
            answers,
            catalog,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn membership(&self) -> Arc<ActiveListResolver> {
        Arc::clone(&self.membership)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn answers(&self) -> Arc<AnswerService> {
        Arc::clone(&self.answers)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<ListCatalogService> {
        Arc::clone(&self.catalog)
    }

    /// Make sure a learner profile exists. Returns `true` if it was created.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the username is blank or storage fails.
    pub async fn ensure_learner(
        &self,
        id: UserId,
        username: &str,
    ) -> Result<bool, AppServicesError> {
        ensure_learner(self.storage.users.as_ref(), id, username).await
    }
}

async fn ensure_learner(
    users: &dyn UserRepository,
    id: UserId,
    username: &str,
) -> Result<bool, AppServicesError> {
    if users.get_user(id).await?.is_some() {
        return Ok(false);
    }
    let profile = UserProfile::new(id, username)?;
    users.upsert_user(&profile).await?;
    tracing::info!(user = %id, username = %profile.username(), "created learner profile");
    Ok(true)
}
