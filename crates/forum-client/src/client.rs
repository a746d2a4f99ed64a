use std::time::Duration;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    error::{ForumClientError, map_reqwest_error},
    user::{AuthResponse, AvatarImage, ForumUser, UserResponse, Verification, parse_user},
};

const USER_AGENT: &str = concat!("forum-client/", env!("CARGO_PKG_VERSION"));

/// Header carrying the pre-shared XenForo API key.
pub const API_KEY_HEADER: &str = "xf-api-key";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct ForumClientConfig {
    pub endpoint: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl ForumClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Stateless wrapper around the forum's `/api/auth` and `/api/users/{id}`
/// endpoints. Performs no retries.
#[derive(Debug)]
pub struct ForumClient {
    base: Url,
    http: Client,
    api_key: SecretString,
}

impl ForumClient {
    pub fn new(config: ForumClientConfig) -> Result<Self, ForumClientError> {
        let mut base =
            Url::parse(config.endpoint.trim()).map_err(|e| ForumClientError::Url(e.to_string()))?;
        // Keep any sub-path the forum is mounted under when joining.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ForumClientError::Transport(e.to_string()))?;

        Ok(Self {
            base,
            http,
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Checks a login (username or email) and password against the forum.
    ///
    /// A non-200 status or a body whose `success` flag is not `true` is a
    /// legitimate negative answer and yields [`Verification::Invalid`].
    pub async fn verify_credentials(
        &self,
        login: &str,
        password: &SecretString,
    ) -> Result<Verification, ForumClientError> {
        let url = self.endpoint("api/auth")?;
        let res = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .form(&[("login", login), ("password", password.expose_secret())])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if res.status() != StatusCode::OK {
            debug!(status = res.status().as_u16(), "forum refused credential check");
            return Ok(Verification::Invalid);
        }

        let bytes = res.bytes().await.map_err(map_reqwest_error)?;
        let body: AuthResponse =
            serde_json::from_slice(&bytes).map_err(|e| ForumClientError::Malformed(e.to_string()))?;

        if body.success != Value::Bool(true) {
            return Ok(Verification::Invalid);
        }

        parse_user(body.user).map(Verification::Verified)
    }

    /// Looks a member up by numeric id. `uid` must be a string of ASCII
    /// digits; anything else fails before a request is made.
    pub async fn lookup_user(
        &self,
        uid: &str,
    ) -> Result<Option<ForumUser>, ForumClientError> {
        if uid.is_empty() || !uid.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ForumClientError::InvalidUid(uid.to_string()));
        }

        let url = self.endpoint(&format!("api/users/{uid}"))?;
        let res = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if res.status() != StatusCode::OK {
            debug!(uid, status = res.status().as_u16(), "forum user lookup missed");
            return Ok(None);
        }

        let bytes = res.bytes().await.map_err(map_reqwest_error)?;
        let body: UserResponse =
            serde_json::from_slice(&bytes).map_err(|e| ForumClientError::Malformed(e.to_string()))?;

        parse_user(body.user).map(Some)
    }

    /// Downloads avatar bytes. Avatar URLs are public, so no API key is sent.
    pub async fn fetch_avatar(&self, url: &str) -> Result<AvatarImage, ForumClientError> {
        let url = Url::parse(url).map_err(|e| ForumClientError::Url(e.to_string()))?;
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !res.status().is_success() {
            return Err(ForumClientError::Http {
                status: res.status().as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        let bytes = res.bytes().await.map_err(map_reqwest_error)?;

        Ok(AvatarImage {
            content_type,
            bytes,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ForumClientError> {
        self.base
            .join(path)
            .map_err(|e| ForumClientError::Url(e.to_string()))
    }
}
