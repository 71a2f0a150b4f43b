//! Bearer-token sessions for the data API.
//!
//! Tokens are issued by the external auth service. This module only maps a
//! presented token to a [`Session`]; [`StaticTokenVerifier`] does that from the
//! `[[tokens]]` table in config.toml.

use super::ApiError;
use crate::config::TokenConfig;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Back-office role attached to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    /// Admin and Manager may write every key.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

/// Authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Signed-in user
    pub email: String,
    /// Decides which keys the session may write
    pub role: Role,
}

/// Resolves a bearer token to a session.
pub trait TokenVerifier: Send + Sync {
    /// `None` for unknown or expired tokens.
    fn verify(&self, token: &str) -> Option<Session>;
}

/// Fixed token table.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    sessions: HashMap<String, Session>,
}

impl StaticTokenVerifier {
    /// Builds the table from `[[tokens]]` entries; later duplicates win.
    #[must_use]
    pub fn from_config(tokens: &[TokenConfig]) -> Self {
        let sessions = tokens
            .iter()
            .map(|t| {
                (
                    t.token.clone(),
                    Session {
                        email: t.email.clone(),
                        role: t.role,
                    },
                )
            })
            .collect();
        Self { sessions }
    }

    /// No tokens configured; every request will be rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }
}

/// Extracts and verifies `Authorization: Bearer <token>`.
pub fn authenticate(headers: &HeaderMap, verifier: &dyn TokenVerifier) -> Result<Session, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    verifier.verify(token).ok_or(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::test_verifier;
    use axum::http::HeaderValue;

    #[test]
    fn test_authenticate_accepts_known_bearer() {
        let verifier = test_verifier();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer manager-token"));

        let session = authenticate(&headers, &verifier).unwrap();
        assert_eq!(session.role, Role::Manager);
        assert!(session.role.is_elevated());
    }

    #[test]
    fn test_authenticate_rejects_missing_or_unknown() {
        let verifier = test_verifier();
        assert!(matches!(
            authenticate(&HeaderMap::new(), &verifier),
            Err(ApiError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(authenticate(&headers, &verifier).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(authenticate(&headers, &verifier).is_err());
    }
}
