//! Goods transfer (transfer barang) documents.
//!
//! Generated exactly once from a ready transfer plan; from then on it is the
//! system of record for the shipment.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Shipment status, independent of the originating plan's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Status of every freshly converted transfer
    #[serde(rename = "Draft")]
    Draft,
    #[serde(rename = "Dikirim")]
    Shipped,
    #[serde(rename = "Diterima")]
    Received,
    /// Cancelling a transfer does not revive its plan
    #[serde(rename = "Dibatalkan")]
    Cancelled,
}

/// A shipped line. Quantities are carried over 1:1 from the plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsTransferLine {
    /// Row id, generated independently of the plan line
    pub id: String,
    /// Product and unit fields copied from the plan line
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub unit_id: String,
    pub unit_name: String,
    /// Equal to the plan line's `plannedQty`
    pub qty_transfer: f64,
}

/// Goods transfer record stored under the `transferBarang` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsTransfer {
    /// Assigned at conversion, recorded as the plan's `linkedTransferId`
    pub id: String,
    /// `TRF-YYYYMM-NNNN`
    pub transfer_number: String,
    /// `TFB-YYYY-NNNNN`
    pub document_number: String,
    /// Conversion day
    pub transfer_date: NaiveDate,
    pub source_branch_id: String,
    pub destination_branch_id: String,
    pub line_items: Vec<GoodsTransferLine>,
    /// Points back at the originating plan's number
    pub reference_note: String,
    /// Id of the plan this transfer was generated from
    pub source_plan_id: String,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}
