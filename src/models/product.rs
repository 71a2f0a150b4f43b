//! Product master data as seen from the transfer workflow.
//!
//! Products are edited elsewhere (price changes, purchasing); here they are only
//! read to fill line items and to show stock per branch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sellable unit of a product (box, strip, tablet, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUnit {
    /// Unit identifier, unique within the product
    pub id: String,
    /// Display name, e.g. "Strip"
    pub name: String,
    /// How many base units one of this unit holds
    #[serde(default = "default_conversion")]
    pub conversion: f64,
}

const fn default_conversion() -> f64 {
    1.0
}

/// Product record stored under the `products` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    /// Short code shown next to the name, e.g. `PCT500`
    pub code: String,
    pub name: String,
    /// Units the product can be planned in
    #[serde(default)]
    pub units: Vec<ProductUnit>,
    /// Stock on hand in base units, keyed by branch id
    #[serde(default)]
    pub stock_by_branch: BTreeMap<String, f64>,
}

impl Product {
    /// Looks up one of this product's units.
    #[must_use]
    pub fn unit(&self, unit_id: &str) -> Option<&ProductUnit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    /// Stock at a branch, zero when the branch has never held this product.
    #[must_use]
    pub fn stock_at(&self, branch_id: &str) -> f64 {
        self.stock_by_branch.get(branch_id).copied().unwrap_or(0.0)
    }
}
