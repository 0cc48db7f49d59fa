use std::sync::Arc;

use storage::repository::{StorageError, UserRepository, VocabListRepository};
use vocab_core::model::{UserId, VocabListId, VocabularyList};

use crate::error::MembershipError;

/// Resolves and edits the set of lists a learner is tracking.
#[derive(Clone)]
pub struct ActiveListResolver {
    users: Arc<dyn UserRepository>,
    lists: Arc<dyn VocabListRepository>,
}

impl ActiveListResolver {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, lists: Arc<dyn VocabListRepository>) -> Self {
        Self { users, lists }
    }

    /// Active lists of `user`, in activation order.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Storage` if repository access fails.
    #[tracing::instrument(skip_all, fields(user = %user))]
    pub async fn active_lists(&self, user: UserId) -> Result<Vec<VocabularyList>, MembershipError> {
        let ids = self.users.active_lists(user).await?;
        let mut lists = Vec::with_capacity(ids.len());
        for id in ids {
            match self.lists.get_list(id).await? {
                Some(list) => lists.push(list),
                None => tracing::warn!(list = %id, "active list no longer exists"),
            }
        }
        tracing::debug!(count = lists.len(), "resolved active lists");
        Ok(lists)
    }

    /// Start tracking a list. Returns `false` if it was already active.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::UnknownUser` or `MembershipError::ListNotFound`
    /// when either side is missing.
    pub async fn activate(&self, user: UserId, list: VocabListId) -> Result<bool, MembershipError> {
        if self.users.get_user(user).await?.is_none() {
            return Err(MembershipError::UnknownUser(user));
        }
        let added = match self.users.activate_list(user, list).await {
            Err(StorageError::NotFound) => return Err(MembershipError::ListNotFound(list)),
            other => other?,
        };
        tracing::info!(user = %user, list = %list, added, "activated list");
        Ok(added)
    }

    /// Stop tracking a list. Returns `false` if it was not active.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Storage` if repository access fails.
    pub async fn deactivate(
        &self,
        user: UserId,
        list: VocabListId,
    ) -> Result<bool, MembershipError> {
        let removed = self.users.deactivate_list(user, list).await?;
        tracing::info!(user = %user, list = %list, removed, "deactivated list");
        Ok(removed)
    }
}
