use std::sync::Arc;

use forum_client::{AvatarSize, ForumClient, ForumClientError, ForumUser};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::host::{AccountHandler, ContentStore};

/// Account data type holding the forum avatar URL last mirrored into the
/// host, so unchanged avatars are not downloaded again.
pub const AVATAR_ACCOUNT_DATA_TYPE: &str = "xenforo.avatar";

/// Used when the avatar origin sends no `Content-Type`.
pub const DEFAULT_AVATAR_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("avatar download failed: {0}")]
    Fetch(#[from] ForumClientError),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub display_name_updated: bool,
    pub avatar_updated: bool,
}

/// Mirrors the forum display name and avatar into the host profile.
///
/// Best effort: every failure is logged and swallowed, and the display name
/// and avatar steps run independently of each other.
pub struct ProfileSync {
    forum: Arc<ForumClient>,
    accounts: Arc<dyn AccountHandler>,
    content: Arc<dyn ContentStore>,
    avatar_size: AvatarSize,
}

impl ProfileSync {
    pub fn new(
        forum: Arc<ForumClient>,
        accounts: Arc<dyn AccountHandler>,
        content: Arc<dyn ContentStore>,
        avatar_size: AvatarSize,
    ) -> Self {
        Self {
            forum,
            accounts,
            content,
            avatar_size,
        }
    }

    /// `user_id` must name an existing host account.
    pub async fn sync(&self, user_id: &str, user: &ForumUser) -> SyncReport {
        let mut report = SyncReport::default();

        match self.sync_display_name(user_id, &user.username).await {
            Ok(updated) => report.display_name_updated = updated,
            Err(error) => warn!(user_id, %error, "failed to sync display name"),
        }

        match self.sync_avatar(user_id, user).await {
            Ok(updated) => report.avatar_updated = updated,
            Err(error) => warn!(user_id, %error, "failed to sync avatar"),
        }

        report
    }

    async fn sync_display_name(&self, user_id: &str, username: &str) -> Result<bool, SyncError> {
        let current = self.accounts.display_name(user_id).await?;
        if current.as_deref() == Some(username) {
            return Ok(false);
        }

        self.accounts.set_display_name(user_id, username).await?;
        debug!(user_id, display_name = username, "display name updated");
        Ok(true)
    }

    async fn sync_avatar(&self, user_id: &str, user: &ForumUser) -> Result<bool, SyncError> {
        let last_synced = self
            .accounts
            .account_data(user_id, AVATAR_ACCOUNT_DATA_TYPE)
            .await?;

        let Some(source_url) = user.avatar_url(self.avatar_size) else {
            debug!(user_id, size = self.avatar_size.as_key(), "forum user has no avatar");
            return self.clear_avatar(user_id, last_synced.as_deref()).await;
        };
        if last_synced.as_deref() == Some(source_url) {
            return Ok(false);
        }

        let avatar = self.forum.fetch_avatar(source_url).await?;
        let content_type = avatar
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_AVATAR_CONTENT_TYPE);
        let content_uri = self
            .content
            .store(content_type, avatar.bytes, user_id)
            .await?;

        self.accounts.set_avatar_url(user_id, &content_uri).await?;
        // Written last: a failure above leaves the old URL so the next login retries.
        self.accounts
            .set_account_data(user_id, AVATAR_ACCOUNT_DATA_TYPE, source_url)
            .await?;

        info!(user_id, %content_uri, "avatar synced from forum");
        Ok(true)
    }

    /// Drops an avatar this bridge mirrored earlier once the forum no longer
    /// reports one. Avatars the user set on the host directly are left alone.
    async fn clear_avatar(
        &self,
        user_id: &str,
        last_synced: Option<&str>,
    ) -> Result<bool, SyncError> {
        if last_synced.is_none_or(str::is_empty) {
            return Ok(false);
        }

        self.accounts.set_avatar_url(user_id, "").await?;
        self.accounts
            .set_account_data(user_id, AVATAR_ACCOUNT_DATA_TYPE, "")
            .await?;

        info!(user_id, "avatar removed on forum, cleared mirrored copy");
        Ok(true)
    }
}
