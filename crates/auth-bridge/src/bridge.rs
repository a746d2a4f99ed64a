use std::{collections::BTreeMap, sync::Arc};

use forum_client::{ForumClient, ForumClientConfig, ForumUser, Verification};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::{
    config::{BridgeConfig, ConfigError},
    error::{AuthError, AuthOutcome, DenyReason},
    host::{AccountHandler, ContentStore},
    identity::{UsernameClaim, claim_username, localpart_for},
    profile::ProfileSync,
};

pub const PASSWORD_LOGIN_TYPE: &str = "m.login.password";
pub const EMAIL_MEDIUM: &str = "email";

const PASSWORD_FIELDS: &[&str] = &["password"];

/// Authenticates host logins against the forum and keeps the matching host
/// accounts provisioned and in sync.
pub struct AuthBridge {
    forum: Arc<ForumClient>,
    accounts: Arc<dyn AccountHandler>,
    profile: ProfileSync,
}

impl AuthBridge {
    /// Fails when the endpoint is missing or no API key can be found in the
    /// config or the environment.
    pub fn new(
        config: BridgeConfig,
        accounts: Arc<dyn AccountHandler>,
        content: Arc<dyn ContentStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let api_key = config.resolve_api_key()?;

        let forum = Arc::new(ForumClient::new(ForumClientConfig {
            endpoint: config.endpoint.clone(),
            api_key,
            timeout: config.request_timeout(),
        })?);
        info!(endpoint = %forum.base_url(), "forum auth provider ready");

        let profile = ProfileSync::new(
            Arc::clone(&forum),
            Arc::clone(&accounts),
            content,
            config.avatar_size,
        );

        Ok(Self {
            forum,
            accounts,
            profile,
        })
    }

    /// Login types this provider handles, with the fields each one needs.
    pub fn supported_login_types(&self) -> BTreeMap<&'static str, &'static [&'static str]> {
        BTreeMap::from([(PASSWORD_LOGIN_TYPE, PASSWORD_FIELDS)])
    }

    /// Third-party identifier media accepted by [`Self::check_3pid_auth`].
    pub fn supported_3pid_media(&self) -> &'static [&'static str] {
        &[EMAIL_MEDIUM]
    }

    /// Password login for a username of the form `@xf-{forum id}:{server}`.
    ///
    /// The forum username is re-derived from the id before the password is
    /// checked, so a stale or forged username in the login never reaches the
    /// forum's credential check.
    pub async fn check_auth(
        &self,
        username: &str,
        login_type: &str,
        password: Option<&SecretString>,
    ) -> Result<AuthOutcome, AuthError> {
        if login_type != PASSWORD_LOGIN_TYPE {
            return Ok(AuthOutcome::NotApplicable);
        }
        let Some(password) = password.filter(|p| !p.expose_secret().is_empty()) else {
            return Ok(AuthOutcome::NotApplicable);
        };

        let forum_id = match claim_username(username) {
            UsernameClaim::Forum(id) => id,
            UsernameClaim::Foreign => return Ok(AuthOutcome::NotApplicable),
            UsernameClaim::Malformed(raw) => {
                warn!(username, raw, "forum-scoped username has a non-numeric id");
                return Ok(AuthOutcome::NotApplicable);
            }
        };

        let resolved = self
            .forum
            .lookup_user(&forum_id.to_string())
            .await?
            .ok_or_else(|| {
                info!(forum_id, "login for unknown forum user");
                DenyReason::UnknownForumUser
            })?;

        let verified = match self
            .forum
            .verify_credentials(&resolved.username, password)
            .await?
        {
            Verification::Verified(user) => user,
            Verification::Invalid => {
                info!(forum_id, "forum rejected password login");
                return Err(DenyReason::InvalidCredentials.into());
            }
        };

        if verified.user_id != forum_id {
            warn!(
                forum_id,
                verified_id = verified.user_id,
                "forum verified a different user than the one requested"
            );
            return Err(AuthError::ContractViolation(format!(
                "login for forum user {forum_id} verified as user {}",
                verified.user_id
            )));
        }

        self.complete_login(verified).await
    }

    /// Login by email address and forum password.
    pub async fn check_3pid_auth(
        &self,
        medium: &str,
        address: &str,
        password: &SecretString,
    ) -> Result<AuthOutcome, AuthError> {
        if medium != EMAIL_MEDIUM {
            return Ok(AuthOutcome::NotApplicable);
        }

        match self.forum.verify_credentials(address, password).await? {
            Verification::Verified(user) => self.complete_login(user).await,
            Verification::Invalid => {
                info!("forum rejected email login");
                Err(DenyReason::InvalidCredentials.into())
            }
        }
    }

    async fn complete_login(&self, user: ForumUser) -> Result<AuthOutcome, AuthError> {
        let user_id = self.ensure_account(&user).await?;
        let report = self.profile.sync(&user_id, &user).await;
        debug!(
            %user_id,
            display_name_updated = report.display_name_updated,
            avatar_updated = report.avatar_updated,
            "profile sync finished"
        );
        Ok(AuthOutcome::Authenticated(user_id))
    }

    /// Registers the host account on first login. Never touches an existing one.
    async fn ensure_account(&self, user: &ForumUser) -> Result<String, AuthError> {
        let localpart = localpart_for(user.user_id);
        let user_id = self.accounts.qualify_user_id(&localpart);

        if self.accounts.user_exists(&user_id).await? {
            return Ok(user_id);
        }

        let user_id = self.accounts.register(&localpart, &user.username).await?;
        info!(%user_id, forum_id = user.user_id, "registered account for forum user");
        Ok(user_id)
    }
}
