//! Names of the collections kept in the key-value store.

use super::StoreError;
use serde_json::Value;
use std::{fmt, str::FromStr};

/// A collection key. Remote keys and mirror keys share these names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataKey {
    /// Pharmacy branches
    Apotiks,
    /// Product catalogue with units and per-branch stock
    Products,
    Suppliers,
    /// Purchases
    Pembelian,
    /// Sales
    Penjualan,
    /// Price changes
    PerubahanHarga,
    /// Transfer plans
    RencanaTransferBarang,
    /// Goods transfers
    TransferBarang,
    /// Change requests kept apart from plans; reserved, the workflow stores
    /// requests on the plan itself
    PengajuanRencanaTransferBarang,
    Users,
}

impl DataKey {
    /// Every known key, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Apotiks,
        Self::Products,
        Self::Suppliers,
        Self::Pembelian,
        Self::Penjualan,
        Self::PerubahanHarga,
        Self::RencanaTransferBarang,
        Self::TransferBarang,
        Self::PengajuanRencanaTransferBarang,
        Self::Users,
    ];

    /// Wire name, used in URLs and mirror file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apotiks => "apotiks",
            Self::Products => "products",
            Self::Suppliers => "suppliers",
            Self::Pembelian => "pembelian",
            Self::Penjualan => "penjualan",
            Self::PerubahanHarga => "perubahanHarga",
            Self::RencanaTransferBarang => "rencanaTransferBarang",
            Self::TransferBarang => "transferBarang",
            Self::PengajuanRencanaTransferBarang => "pengajuanRencanaTransferBarang",
            Self::Users => "users",
        }
    }

    /// Whether writes need an Admin or Manager session.
    ///
    /// Sales and the product list are written from the cashier screens, so any
    /// signed-in user may store them.
    #[must_use]
    pub const fn requires_elevated_role(self) -> bool {
        !matches!(self, Self::Penjualan | Self::Products)
    }

    /// Value returned for a key that has never been written.
    #[must_use]
    pub fn empty_value(self) -> Value {
        Value::Array(Vec::new())
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StoreError::UnknownKey { key: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_keys() {
        for key in DataKey::ALL {
            assert_eq!(key.as_str().parse::<DataKey>().unwrap(), key);
        }
        assert!(matches!(
            "rahasia".parse::<DataKey>(),
            Err(StoreError::UnknownKey { key }) if key == "rahasia"
        ));
    }

    #[test]
    fn test_open_write_keys() {
        assert!(!DataKey::Penjualan.requires_elevated_role());
        assert!(!DataKey::Products.requires_elevated_role());
        assert!(DataKey::Apotiks.requires_elevated_role());
        assert!(DataKey::RencanaTransferBarang.requires_elevated_role());
    }
}
