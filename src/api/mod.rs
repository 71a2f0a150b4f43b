//! Data API - `GET/POST /api/data/{key}`.
//!
//! Reads need any valid session. Writes to `penjualan` and `products` need any
//! valid session; every other key needs an Admin or Manager. There is no
//! versioning or merge: a POST replaces the stored value.

pub mod auth;

pub use auth::{Role, Session, StaticTokenVerifier, TokenVerifier, authenticate};

use crate::store::{DataKey, DatabaseStore, KeyValueStore, StoreError};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    store: DatabaseStore,
    verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// State backed by the `app_config` table.
    #[must_use]
    pub fn new(db: DatabaseConnection, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            store: DatabaseStore::new(db),
            verifier,
        }
    }
}

/// Errors returned to HTTP callers as `{ "error": "..." }`.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token (401)
    Unauthorized,
    /// Session role may not write this key (403)
    Forbidden { key: DataKey },
    /// Unknown key, malformed body or storage failure (400)
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::Forbidden { key } => (
                StatusCode::FORBIDDEN,
                format!("Role tidak diizinkan menyimpan '{key}'"),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Deserialize)]
struct SetRequest {
    value: Value,
}

/// Builds the router with request tracing and permissive CORS for the browser client.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data/:key", get(get_data).post(set_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_data(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, state.verifier.as_ref())?;
    let key: DataKey = key.parse()?;
    Ok(Json(state.store.get(key).await?))
}

async fn set_data(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let session = authenticate(&headers, state.verifier.as_ref())?;
    let key: DataKey = key.parse()?;

    if key.requires_elevated_role() && !session.role.is_elevated() {
        warn!(key = %key, email = %session.email, "write refused for role {:?}", session.role);
        return Err(ApiError::Forbidden { key });
    }

    let Json(SetRequest { value }) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.store.set(key, value).await?;
    info!(key = %key, email = %session.email, "data stored");

    Ok(Json(json!({ "success": true })))
}
