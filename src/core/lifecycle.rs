//! Transfer-plan status machine and the change-request overlay.
//!
//! ```text
//! Menunggu Disiapkan --begin--> Sedang Disiapkan --ready--> Siap Dikirim --convert--> Sudah Jadi Transfer
//!         |
//!         +--cancel--> Dibatalkan
//! ```
//!
//! Every function checks its precondition before touching the plan, so a
//! refused action leaves the plan exactly as it was. Timestamps are passed in by
//! the caller.
//!
//! The change-request overlay runs beside the status machine and is only valid
//! while the plan is still `Menunggu Disiapkan`: submit, then an external
//! approval, then either the approved edit/delete or a cancellation of the
//! request.

use crate::{
    errors::{Error, Result},
    models::{PlanDraft, PlanStatus, RequestType, TransferPlan},
};
use chrono::{DateTime, Utc};
use tracing::info;

fn transition(
    plan: &mut TransferPlan,
    from: PlanStatus,
    to: PlanStatus,
    action: &'static str,
    now: DateTime<Utc>,
) -> Result<()> {
    if plan.status != from {
        return Err(Error::InvalidTransition {
            plan_number: plan.plan_number.clone(),
            status: plan.status,
            action,
        });
    }
    plan.status = to;
    if from == PlanStatus::AwaitingPreparation && plan.change_request.is_open() {
        // The overlay cannot outlive the status it belongs to.
        info!(plan = %plan.plan_number, "dropping open change request on {action}");
        plan.change_request.clear();
    }
    plan.touch(now);
    info!(plan = %plan.plan_number, from = %from, to = %to, "transfer plan status changed");
    Ok(())
}

/// Warehouse starts picking: `Menunggu Disiapkan` -> `Sedang Disiapkan`.
pub fn begin_preparation(plan: &mut TransferPlan, now: DateTime<Utc>) -> Result<()> {
    transition(
        plan,
        PlanStatus::AwaitingPreparation,
        PlanStatus::Preparing,
        "begin preparing",
        now,
    )
}

/// Goods are staged: `Sedang Disiapkan` -> `Siap Dikirim`.
pub fn mark_ready(plan: &mut TransferPlan, now: DateTime<Utc>) -> Result<()> {
    transition(
        plan,
        PlanStatus::Preparing,
        PlanStatus::ReadyToShip,
        "mark ready",
        now,
    )
}

/// Requester withdraws the plan: `Menunggu Disiapkan` -> `Dibatalkan`.
pub fn cancel(plan: &mut TransferPlan, now: DateTime<Utc>) -> Result<()> {
    transition(
        plan,
        PlanStatus::AwaitingPreparation,
        PlanStatus::Cancelled,
        "cancel",
        now,
    )
}

/// Makes the plan visible in the warehouse queue. Repeating it is a no-op.
pub fn send_to_warehouse(plan: &mut TransferPlan, now: DateTime<Utc>) -> Result<()> {
    if plan.status != PlanStatus::AwaitingPreparation {
        return Err(Error::InvalidTransition {
            plan_number: plan.plan_number.clone(),
            status: plan.status,
            action: "send to warehouse",
        });
    }
    if plan.sent_to_warehouse_at.is_none() {
        plan.sent_to_warehouse_at = Some(now);
        plan.touch(now);
        info!(plan = %plan.plan_number, "transfer plan sent to warehouse");
    }
    Ok(())
}

fn overlay_error(plan: &TransferPlan, message: impl Into<String>) -> Error {
    Error::ChangeRequest {
        plan_number: plan.plan_number.clone(),
        message: message.into(),
    }
}

fn ensure_overlay_allowed(plan: &TransferPlan) -> Result<()> {
    if plan.status == PlanStatus::AwaitingPreparation {
        Ok(())
    } else {
        Err(overlay_error(
            plan,
            format!("pengajuan hanya bisa saat status {}", PlanStatus::AwaitingPreparation),
        ))
    }
}

/// Opens a change request (pengajuan) to edit or delete the plan.
pub fn submit_request(
    plan: &mut TransferPlan,
    kind: RequestType,
    note: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    ensure_overlay_allowed(plan)?;
    if plan.change_request.is_open() {
        return Err(overlay_error(plan, "masih ada pengajuan yang aktif"));
    }
    let note = note.trim();
    if note.is_empty() {
        return Err(Error::validation("Alasan pengajuan harus diisi"));
    }

    plan.change_request.submitted_at = Some(now);
    plan.change_request.request_type = Some(kind);
    plan.change_request.note = Some(note.to_string());
    plan.change_request.approved_at = None;
    plan.touch(now);
    info!(plan = %plan.plan_number, kind = %kind, "change request submitted");
    Ok(())
}

/// Withdraws an open request before it is applied. The plan itself is unchanged.
pub fn cancel_request(plan: &mut TransferPlan, now: DateTime<Utc>) -> Result<()> {
    if !plan.change_request.is_open() {
        return Err(overlay_error(plan, "tidak ada pengajuan untuk dibatalkan"));
    }
    plan.change_request.clear();
    plan.touch(now);
    info!(plan = %plan.plan_number, "change request withdrawn");
    Ok(())
}

/// Records the external approver's decision on a pending request.
pub fn approve_request(plan: &mut TransferPlan, approved_at: DateTime<Utc>) -> Result<()> {
    ensure_overlay_allowed(plan)?;
    if !plan.change_request.is_pending() {
        return Err(overlay_error(plan, "tidak ada pengajuan yang menunggu persetujuan"));
    }
    plan.change_request.approved_at = Some(approved_at);
    plan.touch(approved_at);
    info!(plan = %plan.plan_number, "change request approved");
    Ok(())
}

/// Fails unless an approved request of `kind` is open on a plan that still accepts it.
pub fn ensure_approved(plan: &TransferPlan, kind: RequestType) -> Result<()> {
    ensure_overlay_allowed(plan)?;
    if plan.change_request.is_approved_for(kind) {
        Ok(())
    } else {
        Err(overlay_error(
            plan,
            format!("belum ada persetujuan untuk {kind}"),
        ))
    }
}

/// Commits an approved edit and closes the request.
///
/// Identity, number, status and audit fields are kept; only the draft's fields
/// are replaced.
pub fn apply_edit(plan: &mut TransferPlan, draft: PlanDraft, now: DateTime<Utc>) -> Result<()> {
    ensure_approved(plan, RequestType::Edit)?;
    draft.validate()?;

    plan.note = draft.clean_note();
    plan.transaction_date = draft.transaction_date;
    plan.planned_ship_date = draft.planned_ship_date;
    plan.source_branch_id = draft.source_branch_id;
    plan.destination_branch_id = draft.destination_branch_id;
    plan.line_items = draft.line_items;
    plan.change_request.clear();
    plan.touch(now);
    info!(plan = %plan.plan_number, "approved edit applied");
    Ok(())
}
