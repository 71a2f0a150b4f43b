//! Remote store with a local mirror in front of it.
//!
//! Reads prefer the remote copy: a non-empty remote value replaces the mirror,
//! anything else (empty, signed out, offline, rejected) is answered from the
//! mirror. Writes land in the mirror first and are then pushed to the remote in
//! the background; push failures are logged and otherwise ignored, so remote and
//! local can drift apart until the next successful write.

use super::{DataKey, KeyValueStore, LocalMirror, RemoteStore, StoreError, is_empty_value};
use crate::config::{ClientConfig, users::ClientIdentity};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mirror-backed view of a remote key-value store.
#[derive(Clone)]
pub struct SyncedStore {
    remote: Option<Arc<dyn KeyValueStore>>,
    mirror: LocalMirror,
}

impl SyncedStore {
    /// `remote` is `None` when no session is available; the mirror alone is used then.
    #[must_use]
    pub fn new(remote: Option<Arc<dyn KeyValueStore>>, mirror: LocalMirror) -> Self {
        Self { remote, mirror }
    }

    /// Client-side store from settings: the mirror under `mirror_dir`, plus the
    /// remote API when the identity carries a token.
    pub async fn connect(config: &ClientConfig, identity: &ClientIdentity) -> Result<Self, StoreError> {
        let mirror = LocalMirror::open(&config.mirror_dir).await?;
        let remote = identity.token.clone().map(|token| {
            Arc::new(RemoteStore::new(config.base_url.clone(), Some(token))) as Arc<dyn KeyValueStore>
        });
        if remote.is_none() {
            info!(mirror = %config.mirror_dir, "no API token, working from local mirror only");
        }
        Ok(Self::new(remote, mirror))
    }

    /// Whether writes are also pushed to the remote API.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.remote.is_some()
    }

    /// Local side of the store, for watching.
    #[must_use]
    pub const fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }
}

#[async_trait]
impl KeyValueStore for SyncedStore {
    async fn get(&self, key: DataKey) -> Result<Value, StoreError> {
        let Some(remote) = &self.remote else {
            debug!(key = %key, "no session, reading local mirror");
            return self.mirror.get(key).await;
        };

        match remote.get(key).await {
            Ok(value) if !is_empty_value(&value) => {
                self.mirror.set(key, value.clone()).await?;
                Ok(value)
            }
            Ok(_) => {
                debug!(key = %key, "remote empty, keeping local mirror");
                self.mirror.get(key).await
            }
            Err(e) if e.falls_back_to_cache() => {
                debug!(key = %key, error = %e, "remote read failed, using local mirror");
                self.mirror.get(key).await
            }
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: DataKey, value: Value) -> Result<(), StoreError> {
        self.mirror.set(key, value.clone()).await?;

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            tokio::spawn(async move {
                if let Err(e) = remote.set(key, value).await {
                    warn!(key = %key, error = %e, "failed to sync to remote store");
                }
            });
        }
        Ok(())
    }
}
