//! Entity module - SeaORM entity definitions for the database.
//! The back office keeps every collection as a JSON blob in one key-value table,
//! so there is a single entity.

pub mod app_config;

pub use app_config::{Entity as AppConfig, Model as AppConfigModel};
