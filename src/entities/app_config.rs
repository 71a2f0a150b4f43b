//! App config entity - The generic key-value table behind `/api/data/{key}`.
//!
//! Each row holds one named JSON blob (e.g. `rencanaTransferBarang`, `products`).
//! Values are stored as serialized JSON text and replaced wholesale on write.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_config")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Data key (e.g. `"apotiks"`)
    #[sea_orm(unique)]
    pub key: String,
    /// JSON document stored as text
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this key was last written
    pub updated_at: DateTimeUtc,
}

/// `AppConfig` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
