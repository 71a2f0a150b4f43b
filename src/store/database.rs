//! Server-side store over the `app_config` table.
//!
//! Values are kept as JSON text, one row per key, and replaced wholesale on
//! write. There is no versioning: the last write to arrive wins.

use super::{DataKey, KeyValueStore, StoreError, is_empty_value};
use crate::entities::{AppConfig, app_config};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// `KeyValueStore` backed by SeaORM.
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    /// Store over the `app_config` table of `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes `value` under `key` only if nothing is stored there yet.
    ///
    /// Returns whether the value was written.
    #[instrument(skip(self, value))]
    pub async fn seed_if_empty(&self, key: DataKey, value: Value) -> Result<bool, StoreError> {
        if is_empty_value(&value) || !is_empty_value(&self.get(key).await?) {
            return Ok(false);
        }
        self.set(key, value).await?;
        info!("seeded initial value");
        Ok(true)
    }

    async fn find_row(&self, key: DataKey) -> Result<Option<app_config::Model>, StoreError> {
        Ok(AppConfig::find()
            .filter(app_config::Column::Key.eq(key.as_str()))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl KeyValueStore for DatabaseStore {
    #[instrument(skip(self))]
    async fn get(&self, key: DataKey) -> Result<Value, StoreError> {
        let Some(row) = self.find_row(key).await? else {
            debug!("no row for key, returning empty value");
            return Ok(key.empty_value());
        };
        serde_json::from_str(&row.value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: DataKey, value: Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(&value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;
        let now = chrono::Utc::now();

        if let Some(row) = self.find_row(key).await? {
            let mut active_model: app_config::ActiveModel = row.into();
            active_model.value = Set(text);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_row = app_config::ActiveModel {
                key: Set(key.as_str().to_string()),
                value: Set(text),
                updated_at: Set(now),
                ..Default::default()
            };
            new_row.insert(&self.db).await?;
        }
        debug!("stored value");
        Ok(())
    }
}
