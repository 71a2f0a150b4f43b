/// Database connection and table creation
pub mod database;

/// Application settings loaded from config.toml
pub mod settings;

/// Client session identity from environment variables
pub mod users;

pub use settings::{AppConfig, ClientConfig, ServerConfig, TokenConfig, load_app_config};
