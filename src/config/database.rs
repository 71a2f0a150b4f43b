//! Database configuration module.
//!
//! Handles the `SQLite` connection used by the data API and creates the
//! `app_config` table from its entity definition, so the schema always matches
//! the Rust struct without hand-written SQL.

use crate::entities::AppConfig;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/apotik_backoffice.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the local default.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")?
        .split('?')
        .next()
        .filter(|p| !p.is_empty() && *p != ":memory:")?;
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by [`get_database_url`].
///
/// The database file's directory is created first; `SQLite` only creates the file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&url) {
        tokio::fs::create_dir_all(dir).await?;
    }
    info!("Connecting to {url}");
    Database::connect(&url).await.map_err(Into::into)
}

/// Creates the key-value table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut app_config_table = schema.create_table_from_entity(AppConfig);
    app_config_table.if_not_exists();

    db.execute(builder.build(&app_config_table)).await?;

    Ok(())
}
