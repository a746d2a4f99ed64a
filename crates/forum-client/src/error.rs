use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ForumClientError {
    #[error("uid `{0}` is not a non-negative integer")]
    InvalidUid(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status} from {url}")]
    Http { status: u16, url: String },
    #[error("malformed forum response: {0}")]
    Malformed(String),
    #[error("url error: {0}")]
    Url(String),
}

impl ForumClientError {
    /// Caller handed the client data that breaks a precondition. Retrying
    /// with the same input can never succeed.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidUid(_))
    }

    /// The forum could not be reached or answered with something unusable,
    /// including URLs in its payload that do not parse.
    pub fn is_upstream_failure(&self) -> bool {
        !self.is_contract_violation()
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> ForumClientError {
    if e.is_timeout() {
        ForumClientError::Timeout
    } else {
        ForumClientError::Transport(e.to_string())
    }
}
