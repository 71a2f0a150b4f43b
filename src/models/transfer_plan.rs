//! Transfer plan (rencana transfer barang) records.
//!
//! A plan proposes moving goods from one branch to another. It is created by the
//! requesting branch in [`PlanStatus::AwaitingPreparation`], staged by warehouse
//! staff, and finally either cancelled or converted into a goods transfer.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a transfer plan. Serialized with the labels users see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Initial state; the only state that allows cancel and change requests
    #[serde(rename = "Menunggu Disiapkan")]
    AwaitingPreparation,
    /// Warehouse is picking the goods
    #[serde(rename = "Sedang Disiapkan")]
    Preparing,
    /// Staged; the only state that can be converted to a goods transfer
    #[serde(rename = "Siap Dikirim")]
    ReadyToShip,
    /// Terminal: a goods transfer now owns the shipment
    #[serde(rename = "Sudah Jadi Transfer")]
    Transferred,
    /// Terminal
    #[serde(rename = "Dibatalkan")]
    Cancelled,
}

impl PlanStatus {
    /// Label as stored and displayed.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AwaitingPreparation => "Menunggu Disiapkan",
            Self::Preparing => "Sedang Disiapkan",
            Self::ReadyToShip => "Siap Dikirim",
            Self::Transferred => "Sudah Jadi Transfer",
            Self::Cancelled => "Dibatalkan",
        }
    }

    /// No further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Transferred | Self::Cancelled)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of change a requester asks approval for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Replace the plan's editable fields
    #[serde(rename = "Edit transaksi")]
    Edit,
    /// Remove the plan entirely
    #[serde(rename = "Hapus transaksi")]
    Delete,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edit => "Edit transaksi",
            Self::Delete => "Hapus transaksi",
        })
    }
}

/// Change-request (pengajuan) overlay carried on a plan.
///
/// All fields are absent when no request is open. Submitting sets
/// `submitted_at`, `request_type` and `note` together; the external approver
/// sets `approved_at`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    /// When the requester submitted
    #[serde(
        rename = "requestSubmittedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Edit or delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<RequestType>,
    /// Requester's reason
    #[serde(rename = "requestNote", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Set by the external approver only
    #[serde(
        rename = "requestApprovedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_at: Option<DateTime<Utc>>,
}

impl ChangeRequest {
    /// A request has been submitted (approved or not).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// Submitted and still waiting for the approver.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.submitted_at.is_some() && self.approved_at.is_none()
    }

    /// Approved for the given kind of change.
    #[must_use]
    pub fn is_approved_for(&self, kind: RequestType) -> bool {
        self.approved_at.is_some() && self.request_type == Some(kind)
    }

    /// Closes the request, removing every overlay field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One planned line: a product, a unit and a quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLineItem {
    pub product_id: String,
    /// Copied from the product when the line is picked
    pub product_code: String,
    pub product_name: String,
    /// One of the product's units
    pub unit_id: String,
    pub unit_name: String,
    /// Must be positive
    pub planned_qty: f64,
}

/// Transfer plan record stored under the `rencanaTransferBarang` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPlan {
    /// Opaque id assigned at creation, never changed
    pub id: String,
    /// `RTR-YYYYMM-NNN`
    pub plan_number: String,
    /// Month of this date drives the plan number
    pub transaction_date: NaiveDate,
    /// Warehouse queue is ordered by this date
    pub planned_ship_date: NaiveDate,
    pub source_branch_id: String,
    /// Never equal to the source
    pub destination_branch_id: String,
    /// At least one line
    pub line_items: Vec<PlanLineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    /// Bumped by every mutation
    pub updated_at: DateTime<Utc>,
    /// Signed-in user's email, or `System`
    pub created_by: String,
    /// Goods transfer generated from this plan, once converted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_transfer_id: Option<String>,
    /// Plans without this are invisible to warehouse staff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_to_warehouse_at: Option<DateTime<Utc>>,
    /// Pending edit/delete request, flattened into the record
    #[serde(flatten)]
    pub change_request: ChangeRequest,
}

impl TransferPlan {
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// User-editable fields of a plan, used both for creation and for approved edits.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanDraft {
    /// Also decides the plan number's month
    pub transaction_date: NaiveDate,
    pub planned_ship_date: NaiveDate,
    /// Branch giving the goods
    pub source_branch_id: String,
    /// Branch receiving the goods
    pub destination_branch_id: String,
    pub line_items: Vec<PlanLineItem>,
    /// Free text; blank notes are stored as absent
    pub note: Option<String>,
}

impl PlanDraft {
    /// Checks the submit-time invariants.
    ///
    /// Both branches must be set and differ, there must be at least one line,
    /// and every line needs a product, a unit and a positive finite quantity.
    pub fn validate(&self) -> Result<()> {
        if self.source_branch_id.trim().is_empty() {
            return Err(Error::validation("Apotik asal harus dipilih"));
        }
        if self.destination_branch_id.trim().is_empty() {
            return Err(Error::validation("Apotik tujuan harus dipilih"));
        }
        if self.source_branch_id == self.destination_branch_id {
            return Err(Error::validation(
                "Apotik asal dan apotik tujuan tidak boleh sama",
            ));
        }
        if self.line_items.is_empty() {
            return Err(Error::validation("Minimal satu barang harus ditambahkan"));
        }
        for (idx, line) in self.line_items.iter().enumerate() {
            let row = idx + 1;
            if line.product_id.trim().is_empty() {
                return Err(Error::validation(format!("Baris {row}: produk harus dipilih")));
            }
            if line.unit_id.trim().is_empty() {
                return Err(Error::validation(format!("Baris {row}: unit harus dipilih")));
            }
            if !line.planned_qty.is_finite() || line.planned_qty <= 0.0 {
                return Err(Error::validation(format!(
                    "Baris {row}: qty rencana harus lebih dari 0"
                )));
            }
        }
        Ok(())
    }

    /// Normalized note: trimmed, `None` when blank.
    pub(crate) fn clean_note(&self) -> Option<String> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string)
    }
}
