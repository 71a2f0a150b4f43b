//! HTTP client for the `/api/data/{key}` endpoint.

use super::{DataKey, KeyValueStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Serialize)]
struct SetBody<'a> {
    value: &'a Value,
}

/// Remote key-value store reached over HTTP with a bearer token.
///
/// No timeouts or retries are configured; callers decide what a failure means.
#[derive(Clone, Debug)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteStore {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// A bearer token will be sent.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, key: DataKey) -> String {
        format!("{}/api/data/{}", self.base_url, key.as_str())
    }

    fn token(&self) -> Result<&str, StoreError> {
        self.token.as_deref().ok_or(StoreError::Unauthenticated)
    }
}

fn status_error(key: DataKey, status: StatusCode) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
        StatusCode::FORBIDDEN => StoreError::Forbidden {
            key: key.to_string(),
        },
        _ => StoreError::Status {
            key: key.to_string(),
            status: status.as_u16(),
        },
    }
}

#[async_trait]
impl KeyValueStore for RemoteStore {
    async fn get(&self, key: DataKey) -> Result<Value, StoreError> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.url(key))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(key = %key, status = status.as_u16(), "remote read refused");
            return Err(status_error(key, status));
        }
        Ok(response.json::<Value>().await?)
    }

    async fn set(&self, key: DataKey, value: Value) -> Result<(), StoreError> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.url(key))
            .bearer_auth(token)
            .json(&SetBody { value: &value })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(key, status));
        }
        Ok(())
    }
}
