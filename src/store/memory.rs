//! In-process store. Clones share the same map.

use super::{DataKey, KeyValueStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Key-value store held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<DataKey, Value>>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: DataKey) -> Result<Value, StoreError> {
        Ok(self
            .values
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.empty_value()))
    }

    async fn set(&self, key: DataKey, value: Value) -> Result<(), StoreError> {
        self.values.write().await.insert(key, value);
        Ok(())
    }
}
