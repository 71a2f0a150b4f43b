//! Client session identity from environment variables.
//!
//! Sign-in itself happens in the external auth service; the back office only
//! needs the resulting access token and the user's email. Both come from the
//! `.env` file. Without a token the client runs against the local mirror only.

/// Who is using the client and how they authenticate to the data API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Bearer token for `/api/data/{key}`, `None` when signed out
    pub token: Option<String>,
    /// Recorded as `createdBy` on new documents
    pub actor: String,
}

/// Actor name used when nobody is signed in.
pub const SYSTEM_ACTOR: &str = "System";

/// Reads `API_TOKEN` and `USER_EMAIL`.
///
/// Blank values count as absent. A missing email falls back to [`SYSTEM_ACTOR`].
#[must_use]
pub fn client_identity() -> ClientIdentity {
    let non_blank = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    ClientIdentity {
        token: non_blank("API_TOKEN"),
        actor: non_blank("USER_EMAIL").unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
    }
}
