//! HTTP client for the XenForo REST API endpoints used to authenticate forum
//! members and to look them up by their numeric id.

mod client;
mod error;
mod user;

pub use client::{API_KEY_HEADER, DEFAULT_TIMEOUT, ForumClient, ForumClientConfig};
pub use error::ForumClientError;
pub use user::{AvatarImage, AvatarSize, ForumUser, Verification};
