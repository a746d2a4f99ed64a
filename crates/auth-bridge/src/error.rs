use forum_client::ForumClientError;
use thiserror::Error;

/// Result of a login attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials checked out; carries the host's qualified user id.
    Authenticated(String),
    /// The attempt is not addressed to this provider. The host should offer
    /// it to the next one.
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unknown forum user")]
    UnknownForumUser,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication denied: {0}")]
    Denied(DenyReason),
    #[error("contract violation: {0}")]
    ContractViolation(String),
    #[error("forum unavailable: {0}")]
    Upstream(ForumClientError),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl AuthError {
    /// The host should answer the login with a plain rejection.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::Denied(_) | Self::ContractViolation(_))
    }
}

impl From<DenyReason> for AuthError {
    fn from(reason: DenyReason) -> Self {
        Self::Denied(reason)
    }
}

impl From<ForumClientError> for AuthError {
    fn from(err: ForumClientError) -> Self {
        if err.is_contract_violation() {
            Self::ContractViolation(err.to_string())
        } else {
            Self::Upstream(err)
        }
    }
}
