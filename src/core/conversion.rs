//! Warehouse conversion - turns a ready transfer plan into a goods transfer.
//!
//! The new document starts as `Draft`, copies the plan's lines in order (the
//! planned quantity becomes the transfer quantity) and points back at the plan.
//! The plan is frozen as `Sudah Jadi Transfer` with `linkedTransferId` set.

use super::numbering::{next_document_number, next_transfer_number, unique_id};
use crate::{
    errors::{Error, Result},
    models::{GoodsTransfer, GoodsTransferLine, PlanStatus, TransferPlan, TransferStatus},
};
use chrono::{DateTime, Local, Utc};
use tracing::info;

/// Builds the goods transfer for `plan` and marks the plan as converted.
///
/// `existing` is the current goods-transfer collection, used for numbering and
/// id uniqueness; the caller appends the returned document to it. Nothing is
/// changed when the plan is not `Siap Dikirim` or has no lines.
pub fn convert_to_transfer(
    plan: &mut TransferPlan,
    existing: &[GoodsTransfer],
    created_by: &str,
    now: DateTime<Utc>,
) -> Result<GoodsTransfer> {
    if plan.status != PlanStatus::ReadyToShip {
        return Err(Error::InvalidTransition {
            plan_number: plan.plan_number.clone(),
            status: plan.status,
            action: "convert to transfer",
        });
    }
    if plan.line_items.is_empty() {
        return Err(Error::EmptyLineItems {
            plan_number: plan.plan_number.clone(),
        });
    }

    let today = now.with_timezone(&Local).date_naive();
    let id = unique_id(now, existing.iter().map(|t| t.id.as_str()));
    let line_items = plan
        .line_items
        .iter()
        .enumerate()
        .map(|(idx, line)| GoodsTransferLine {
            id: format!("{id}-{}", idx + 1),
            product_id: line.product_id.clone(),
            product_code: line.product_code.clone(),
            product_name: line.product_name.clone(),
            unit_id: line.unit_id.clone(),
            unit_name: line.unit_name.clone(),
            qty_transfer: line.planned_qty,
        })
        .collect();

    let transfer = GoodsTransfer {
        transfer_number: next_transfer_number(
            existing.iter().map(|t| t.transfer_number.as_str()),
            today,
        ),
        document_number: next_document_number(
            existing.iter().map(|t| t.document_number.as_str()),
            today,
        ),
        transfer_date: today,
        source_branch_id: plan.source_branch_id.clone(),
        destination_branch_id: plan.destination_branch_id.clone(),
        line_items,
        reference_note: format!("Dari Rencana Transfer {}", plan.plan_number),
        source_plan_id: plan.id.clone(),
        status: TransferStatus::Draft,
        created_at: now,
        updated_at: now,
        created_by: created_by.to_string(),
        id,
    };

    plan.status = PlanStatus::Transferred;
    plan.linked_transfer_id = Some(transfer.id.clone());
    plan.touch(now);
    info!(
        plan = %plan.plan_number,
        transfer = %transfer.transfer_number,
        lines = transfer.line_items.len(),
        "transfer plan converted to goods transfer"
    );

    Ok(transfer)
}
