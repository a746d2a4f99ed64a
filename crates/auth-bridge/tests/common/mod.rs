#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use auth_bridge::{AccountHandler, AuthBridge, AvatarSize, BridgeConfig, ContentStore};
use bytes::Bytes;
use secrecy::SecretString;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

pub const SERVER_NAME: &str = "homeserver";
pub const API_KEY: &str = "test-api-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub content_type: String,
    pub len: usize,
    pub owner: String,
}

#[derive(Debug, Default)]
pub struct HostState {
    pub accounts: BTreeSet<String>,
    pub display_names: BTreeMap<String, String>,
    pub avatars: BTreeMap<String, String>,
    pub account_data: BTreeMap<(String, String), String>,
    pub registrations: Vec<(String, String)>,
    pub display_name_updates: usize,
    pub stored: Vec<StoredContent>,
    pub fail_display_name: bool,
    pub fail_store: bool,
    pub fail_register: bool,
}

/// In-memory host that records every call the bridge makes.
#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    pub fn add_account(&self, user_id: &str, display_name: &str) {
        let mut state = self.state();
        state.accounts.insert(user_id.to_string());
        state
            .display_names
            .insert(user_id.to_string(), display_name.to_string());
    }

    pub fn cached_avatar(&self, user_id: &str) -> Option<String> {
        self.state()
            .account_data
            .get(&(user_id.to_string(), "xenforo.avatar".to_string()))
            .cloned()
    }
}

#[async_trait]
impl AccountHandler for FakeHost {
    fn qualify_user_id(&self, localpart: &str) -> String {
        format!("@{localpart}:{SERVER_NAME}")
    }

    async fn user_exists(&self, user_id: &str) -> Result<bool> {
        Ok(self.state().accounts.contains(user_id))
    }

    async fn register(&self, localpart: &str, display_name: &str) -> Result<String> {
        let user_id = self.qualify_user_id(localpart);
        let mut state = self.state();
        if state.fail_register {
            bail!("account store read-only");
        }
        if !state.accounts.insert(user_id.clone()) {
            bail!("user {user_id} already registered");
        }
        state
            .display_names
            .insert(user_id.clone(), display_name.to_string());
        state
            .registrations
            .push((localpart.to_string(), display_name.to_string()));
        Ok(user_id)
    }

    async fn display_name(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.state().display_names.get(user_id).cloned())
    }

    async fn set_display_name(&self, user_id: &str, display_name: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_display_name {
            return Err(anyhow!("profile store unavailable"));
        }
        state
            .display_names
            .insert(user_id.to_string(), display_name.to_string());
        state.display_name_updates += 1;
        Ok(())
    }

    async fn set_avatar_url(&self, user_id: &str, content_uri: &str) -> Result<()> {
        self.state()
            .avatars
            .insert(user_id.to_string(), content_uri.to_string());
        Ok(())
    }

    async fn account_data(&self, user_id: &str, data_type: &str) -> Result<Option<String>> {
        Ok(self
            .state()
            .account_data
            .get(&(user_id.to_string(), data_type.to_string()))
            .cloned())
    }

    async fn set_account_data(&self, user_id: &str, data_type: &str, value: &str) -> Result<()> {
        self.state().account_data.insert(
            (user_id.to_string(), data_type.to_string()),
            value.to_string(),
        );
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FakeHost {
    async fn store(&self, content_type: &str, bytes: Bytes, owner: &str) -> Result<String> {
        let mut state = self.state();
        if state.fail_store {
            return Err(anyhow!("media store full"));
        }
        let id = state.stored.len();
        state.stored.push(StoredContent {
            content_type: content_type.to_string(),
            len: bytes.len(),
            owner: owner.to_string(),
        });
        Ok(format!("mxc://{SERVER_NAME}/media{id}"))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn bridge_for(server: &MockServer, host: &Arc<FakeHost>) -> AuthBridge {
    bridge_with_size(server, host, AvatarSize::Large)
}

pub fn bridge_with_size(server: &MockServer, host: &Arc<FakeHost>, size: AvatarSize) -> AuthBridge {
    bridge_at(&server.uri(), host, size)
}

pub fn bridge_at(endpoint: &str, host: &Arc<FakeHost>, size: AvatarSize) -> AuthBridge {
    init_tracing();
    let config = BridgeConfig::new(endpoint)
        .with_api_key(SecretString::new(API_KEY.into()))
        .with_avatar_size(size);
    AuthBridge::new(config, host.clone(), host.clone()).unwrap()
}

/// Nothing listens on port 1, so every request fails to connect.
pub const UNREACHABLE_FORUM: &str = "http://127.0.0.1:1";

pub fn password(value: &str) -> SecretString {
    SecretString::new(value.into())
}

pub fn avatar_url(server: &MockServer, size: &str, forum_id: u64) -> String {
    format!("{}/data/avatars/{size}/{forum_id}.png", server.uri())
}

pub fn forum_user(server: &MockServer, forum_id: u64, username: &str) -> Value {
    json!({
        "user_id": forum_id,
        "username": username,
        "avatar_urls": {
            "o": avatar_url(server, "o", forum_id),
            "l": avatar_url(server, "l", forum_id),
            "s": null
        }
    })
}

pub async fn mount_lookup(server: &MockServer, forum_id: u64, user: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/users/{forum_id}")))
        .and(header("xf-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": user })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_verify(server: &MockServer, login: &str, body: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(header("xf-api-key", API_KEY))
        .and(body_string_contains(format!("login={login}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_avatar(server: &MockServer, size: &str, forum_id: u64, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/data/avatars/{size}/{forum_id}.png")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
        )
        .expect(times)
        .mount(server)
        .await;
}
