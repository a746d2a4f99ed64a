//! Capabilities the host account system lends to the bridge.
//!
//! The bridge never owns account data: it asks the host whether an account
//! exists, asks it to register one, and writes profile fields through it.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait AccountHandler: Send + Sync {
    /// Turns a bare localpart into the host's fully-qualified user id.
    fn qualify_user_id(&self, localpart: &str) -> String;

    async fn user_exists(&self, user_id: &str) -> Result<bool>;

    /// Registers a new account and returns its qualified user id.
    async fn register(&self, localpart: &str, display_name: &str) -> Result<String>;

    async fn display_name(&self, user_id: &str) -> Result<Option<String>>;

    async fn set_display_name(&self, user_id: &str, display_name: &str) -> Result<()>;

    /// An empty `content_uri` clears the avatar.
    async fn set_avatar_url(&self, user_id: &str, content_uri: &str) -> Result<()>;

    /// Per-account key/value storage private to integrations.
    async fn account_data(&self, user_id: &str, data_type: &str) -> Result<Option<String>>;

    async fn set_account_data(&self, user_id: &str, data_type: &str, value: &str) -> Result<()>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persists `bytes` owned by `owner` and returns a durable content URI.
    async fn store(&self, content_type: &str, bytes: Bytes, owner: &str) -> Result<String>;
}
