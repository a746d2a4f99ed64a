use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ForumClientError;

/// Size variants XenForo publishes under `avatar_urls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum AvatarSize {
    #[serde(rename = "o")]
    Original,
    #[serde(rename = "h")]
    High,
    #[default]
    #[serde(rename = "l")]
    Large,
    #[serde(rename = "m")]
    Medium,
    #[serde(rename = "s")]
    Small,
}

impl AvatarSize {
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Original => "o",
            Self::High => "h",
            Self::Large => "l",
            Self::Medium => "m",
            Self::Small => "s",
        }
    }
}

/// A forum member as reported by the API. Always fetched fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumUser {
    pub user_id: u64,
    pub username: String,
    pub avatar_urls: BTreeMap<String, Option<String>>,
}

impl ForumUser {
    /// Avatar URL for the given size, if the member has uploaded one.
    pub fn avatar_url(&self, size: AvatarSize) -> Option<&str> {
        self.avatar_urls
            .get(size.as_key())
            .and_then(|url| url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified(ForumUser),
    Invalid,
}

#[derive(Debug, Clone)]
pub struct AvatarImage {
    /// `Content-Type` as sent by the origin, when present.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub user: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    #[serde(default)]
    pub user: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    user_id: Option<u64>,
    username: Option<String>,
    avatar_urls: Option<BTreeMap<String, Option<String>>>,
}

pub(crate) fn parse_user(user: Option<Value>) -> Result<ForumUser, ForumClientError> {
    let user = user.ok_or_else(|| ForumClientError::Malformed("missing `user` object".into()))?;
    let payload: UserPayload =
        serde_json::from_value(user).map_err(|e| ForumClientError::Malformed(e.to_string()))?;
    payload.try_into()
}

impl TryFrom<UserPayload> for ForumUser {
    type Error = ForumClientError;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        let user_id = value
            .user_id
            .ok_or_else(|| ForumClientError::Malformed("user missing `user_id`".into()))?;
        let username = value.username.ok_or_else(|| {
            ForumClientError::Malformed(format!("user {user_id} missing `username`"))
        })?;
        let avatar_urls = value.avatar_urls.ok_or_else(|| {
            ForumClientError::Malformed(format!("user {user_id} missing `avatar_urls`"))
        })?;

        Ok(Self {
            user_id,
            username,
            avatar_urls,
        })
    }
}
