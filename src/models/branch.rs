//! Branch (apotik) master data.

use serde::{Deserialize, Serialize};

/// A pharmacy branch/outlet. Referenced by transfer plans, never owned by them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    /// Unique identifier
    pub id: String,
    /// Short branch code shown in lists
    pub code: String,
    /// Display name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Inactive branches stay referenced by old documents but are not offered for new ones
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_branch_defaults_to_active() {
        let branch: Branch =
            serde_json::from_str(r#"{"id":"A1","code":"APT01","name":"Apotik Pusat"}"#).unwrap();
        assert!(branch.active);
        assert!(branch.address.is_none());
    }
}
