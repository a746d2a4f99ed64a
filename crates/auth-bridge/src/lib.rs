//! Password and email login against a XenForo forum for a host account
//! system. Forum members are mapped onto host accounts named `xf-{user_id}`,
//! registered on first login and kept in sync with the forum profile.

mod bridge;
pub mod config;
mod error;
pub mod host;
pub mod identity;
mod profile;

pub use bridge::{AuthBridge, EMAIL_MEDIUM, PASSWORD_LOGIN_TYPE};
pub use config::{BridgeConfig, ConfigError};
pub use error::{AuthError, AuthOutcome, DenyReason};
pub use forum_client::{AvatarSize, ForumUser};
pub use host::{AccountHandler, ContentStore};
pub use profile::{
    AVATAR_ACCOUNT_DATA_TYPE, DEFAULT_AVATAR_CONTENT_TYPE, ProfileSync, SyncError, SyncReport,
};
