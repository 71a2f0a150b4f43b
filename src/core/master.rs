//! Master-data lookups used while building transfer plans.

use crate::{
    errors::{Error, Result},
    models::{Branch, PlanLineItem, Product},
    store::{DataKey, KeyValueStore, load_collection},
};

/// Branches and products as last loaded from the store.
#[derive(Clone, Debug, Default)]
pub struct MasterData {
    /// Active and inactive branches, in storage order
    pub branches: Vec<Branch>,
    pub products: Vec<Product>,
}

impl MasterData {
    /// Loads the `apotiks` and `products` collections.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(Self {
            branches: load_collection(store, DataKey::Apotiks).await?,
            products: load_collection(store, DataKey::Products).await?,
        })
    }

    /// Branch by id, active or not.
    #[must_use]
    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Branches that can be picked for new documents, sorted by code.
    #[must_use]
    pub fn active_branches(&self) -> Vec<&Branch> {
        let mut active: Vec<&Branch> = self.branches.iter().filter(|b| b.active).collect();
        active.sort_by(|a, b| a.code.cmp(&b.code));
        active
    }

    /// Stock of a product at a branch; unknown products have none.
    #[must_use]
    pub fn stock_at(&self, product_id: &str, branch_id: &str) -> f64 {
        self.product(product_id)
            .map_or(0.0, |p| p.stock_at(branch_id))
    }

    /// Checks that both branches of a plan are known.
    ///
    /// Skipped while no branches are loaded (fresh install, offline first run).
    pub fn ensure_branches(&self, source_id: &str, destination_id: &str) -> Result<()> {
        if self.branches.is_empty() {
            return Ok(());
        }
        for id in [source_id, destination_id] {
            if self.branch(id).is_none() {
                return Err(Error::validation(format!("Apotik '{id}' tidak ditemukan")));
            }
        }
        Ok(())
    }

    /// Builds a plan line from master data, filling in codes and names.
    pub fn line_item(&self, product_id: &str, unit_id: &str, planned_qty: f64) -> Result<PlanLineItem> {
        let product = self
            .product(product_id)
            .ok_or_else(|| Error::validation(format!("Produk '{product_id}' tidak ditemukan")))?;
        let unit = product.unit(unit_id).ok_or_else(|| {
            Error::validation(format!(
                "Unit '{unit_id}' tidak tersedia untuk produk {}",
                product.name
            ))
        })?;

        Ok(PlanLineItem {
            product_id: product.id.clone(),
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            unit_id: unit.id.clone(),
            unit_name: unit.name.clone(),
            planned_qty,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::sample_master_data;

    #[test]
    fn test_line_item_fills_names() {
        let master = sample_master_data();
        let line = master.line_item("P1", "U1", 10.0).unwrap();
        assert_eq!(line.product_code, "PCT500");
        assert_eq!(line.product_name, "Paracetamol 500mg");
        assert_eq!(line.unit_name, "Strip");
        assert_eq!(line.planned_qty, 10.0);
    }

    #[test]
    fn test_line_item_rejects_unknown_product_or_unit() {
        let master = sample_master_data();
        assert!(matches!(
            master.line_item("P404", "U1", 1.0),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            master.line_item("P1", "U404", 1.0),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_stock_and_active_branches() {
        let master = sample_master_data();
        assert_eq!(master.stock_at("P1", "A1"), 120.0);
        assert_eq!(master.stock_at("P1", "A9"), 0.0);
        assert_eq!(master.stock_at("P404", "A1"), 0.0);

        let codes: Vec<&str> = master.active_branches().iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, vec!["APT01", "APT02"]);
    }

    #[test]
    fn test_ensure_branches() {
        let master = sample_master_data();
        assert!(master.ensure_branches("A1", "A2").is_ok());
        assert!(master.ensure_branches("A1", "A404").is_err());
        assert!(MasterData::default().ensure_branches("X", "Y").is_ok());
    }
}
