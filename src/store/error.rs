//! Errors raised by key-value store backends.

use thiserror::Error;

/// Failure reading or writing a collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No session token is configured
    #[error("not signed in")]
    Unauthenticated,

    /// The server rejected the bearer token (HTTP 401)
    #[error("session token rejected")]
    Unauthorized,

    /// The session's role may not write this key (HTTP 403)
    #[error("role not allowed to write '{key}'")]
    Forbidden { key: String },

    /// The key is not a known collection (HTTP 400)
    #[error("unknown data key '{key}'")]
    UnknownKey { key: String },

    #[error("unexpected HTTP status {status} for '{key}'")]
    Status { key: String, status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Stored value does not have the expected shape
    #[error("cannot decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Local mirror read/write failed
    #[error("local mirror I/O for '{key}': {source}")]
    Mirror {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Server-side storage failed
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl StoreError {
    /// Whether a failed remote read should be answered from the local mirror.
    ///
    /// Auth and transport problems fall back silently; a malformed payload or a
    /// broken mirror is a real fault.
    #[must_use]
    pub const fn falls_back_to_cache(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::Unauthorized
                | Self::Forbidden { .. }
                | Self::Status { .. }
                | Self::Network(_)
        )
    }
}
