//! Key-value persistence for the back office.
//!
//! Every collection (branches, products, transfer plans, ...) is one JSON blob
//! stored under a [`DataKey`]. Backends:
//!
//! - [`RemoteStore`] talks to `/api/data/{key}` with a bearer token.
//! - [`LocalMirror`] keeps the last-known copy of each key on local disk.
//! - [`SyncedStore`] combines the two: remote first on read, mirror first on write.
//! - [`DatabaseStore`] is the server side, over the `app_config` table.
//! - [`MemoryStore`] keeps everything in process.
//!
//! Workflow code only sees the [`KeyValueStore`] trait and is handed a backend.

pub mod database;
pub mod error;
pub mod keys;
pub mod memory;
pub mod mirror;
pub mod remote;
pub mod synced;
pub mod watch;

pub use database::DatabaseStore;
pub use error::StoreError;
pub use keys::DataKey;
pub use memory::MemoryStore;
pub use mirror::LocalMirror;
pub use remote::RemoteStore;
pub use synced::SyncedStore;
pub use watch::watch_mirror;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Get/set of whole JSON documents by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`; never-written keys read as `[]`.
    async fn get(&self, key: DataKey) -> Result<Value, StoreError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: DataKey, value: Value) -> Result<(), StoreError>;
}

/// `null`, `[]` and `{}` count as "nothing stored".
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Reads a collection and parses every record into `T`.
///
/// A `null` or empty object reads as an empty collection; anything else that is
/// not an array of `T` is a [`StoreError::Decode`].
pub async fn load_collection<T>(store: &dyn KeyValueStore, key: DataKey) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
{
    let value = store.get(key).await?;
    decode_collection(key, value)
}

/// Serializes a collection and stores it under `key`.
pub async fn save_collection<T>(
    store: &dyn KeyValueStore,
    key: DataKey,
    items: &[T],
) -> Result<(), StoreError>
where
    T: Serialize + Sync,
{
    let value = serde_json::to_value(items).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value).await
}

pub(crate) fn decode_collection<T>(key: DataKey, value: Value) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
{
    if is_empty_value(&value) {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}
