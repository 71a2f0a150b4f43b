//! Transfer-plan registry - the in-memory collection of plans.
//!
//! Creation, lookup, filtering and removal. Status changes go through
//! [`super::lifecycle`]; persistence is the workflow's job.

use super::{
    lifecycle,
    numbering::{next_plan_number, unique_id},
};
use crate::{
    errors::{Error, Result},
    models::{ChangeRequest, PlanDraft, PlanStatus, RequestType, TransferPlan},
};
use chrono::{DateTime, Local, Utc};
use tracing::info;

/// Criteria for listing plans. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct PlanFilter {
    /// Exact status
    pub status: Option<PlanStatus>,
    /// Exact source branch id
    pub source_branch_id: Option<String>,
    /// Exact destination branch id
    pub destination_branch_id: Option<String>,
    /// Case-insensitive match on plan number or note
    pub search: Option<String>,
}

impl PlanFilter {
    fn matches(&self, plan: &TransferPlan) -> bool {
        if self.status.is_some_and(|s| s != plan.status) {
            return false;
        }
        if self
            .source_branch_id
            .as_ref()
            .is_some_and(|id| *id != plan.source_branch_id)
        {
            return false;
        }
        if self
            .destination_branch_id
            .as_ref()
            .is_some_and(|id| *id != plan.destination_branch_id)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                plan.plan_number.to_lowercase().contains(&term)
                    || plan
                        .note
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Ordered collection of transfer plans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransferPlanRegistry {
    plans: Vec<TransferPlan>,
}

impl TransferPlanRegistry {
    /// Registry holding `plans` as loaded.
    #[must_use]
    pub const fn new(plans: Vec<TransferPlan>) -> Self {
        Self { plans }
    }

    /// All plans in storage order.
    #[must_use]
    pub fn plans(&self) -> &[TransferPlan] {
        &self.plans
    }

    /// Number of plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// No plans at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Replaces the whole collection (after a reload).
    pub fn replace_all(&mut self, plans: Vec<TransferPlan>) {
        self.plans = plans;
    }

    /// Plan by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TransferPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Mutable lookup, failing with [`Error::PlanNotFound`].
    pub fn get_mut(&mut self, id: &str) -> Result<&mut TransferPlan> {
        self.plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PlanNotFound { id: id.to_string() })
    }

    /// Validates `draft` and appends a new plan in `Menunggu Disiapkan`.
    ///
    /// The plan number continues the current month's sequence.
    pub fn create(
        &mut self,
        draft: PlanDraft,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<&TransferPlan> {
        draft.validate()?;

        let today = now.with_timezone(&Local).date_naive();
        let plan_number = next_plan_number(self.plans.iter().map(|p| p.plan_number.as_str()), today);
        let id = unique_id(now, self.plans.iter().map(|p| p.id.as_str()));

        let plan = TransferPlan {
            id,
            plan_number,
            note: draft.clean_note(),
            transaction_date: draft.transaction_date,
            planned_ship_date: draft.planned_ship_date,
            source_branch_id: draft.source_branch_id,
            destination_branch_id: draft.destination_branch_id,
            line_items: draft.line_items,
            status: PlanStatus::AwaitingPreparation,
            created_at: now,
            updated_at: now,
            created_by: created_by.to_string(),
            linked_transfer_id: None,
            sent_to_warehouse_at: None,
            change_request: ChangeRequest::default(),
        };
        info!(plan = %plan.plan_number, by = created_by, "transfer plan created");

        self.plans.push(plan);
        let idx = self.plans.len() - 1;
        Ok(&self.plans[idx])
    }

    /// Plans matching `filter`, newest first.
    #[must_use]
    pub fn filter(&self, filter: &PlanFilter) -> Vec<&TransferPlan> {
        let mut found: Vec<&TransferPlan> = self.plans.iter().filter(|p| filter.matches(p)).collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// Plans warehouse staff can see: sent to the warehouse and still open, oldest first.
    #[must_use]
    pub fn warehouse_queue(&self) -> Vec<&TransferPlan> {
        let mut queue: Vec<&TransferPlan> = self
            .plans
            .iter()
            .filter(|p| p.sent_to_warehouse_at.is_some() && !p.status.is_terminal())
            .collect();
        queue.sort_by_key(|p| p.sent_to_warehouse_at);
        queue
    }

    /// Removes a plan whose delete request has been approved.
    pub fn delete_approved(&mut self, id: &str) -> Result<TransferPlan> {
        let idx = self
            .plans
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::PlanNotFound { id: id.to_string() })?;
        lifecycle::ensure_approved(&self.plans[idx], RequestType::Delete)?;

        let mut removed = self.plans.remove(idx);
        removed.change_request.clear();
        info!(plan = %removed.plan_number, "transfer plan deleted after approval");
        Ok(removed)
    }

    /// Copies change-request fields from a freshly re-read collection.
    ///
    /// Approvals are recorded by another screen; this pulls them into memory.
    /// Returns how many plans changed. Plans unknown on either side are ignored,
    /// and so are plans that are no longer `Menunggu Disiapkan` or whose status
    /// differs from the re-read copy, since a change request only lives in that
    /// status.
    pub fn sync_overlays(&mut self, latest: &[TransferPlan]) -> usize {
        let mut changed = 0;
        for plan in &mut self.plans {
            if plan.status != PlanStatus::AwaitingPreparation {
                continue;
            }
            let Some(fresh) = latest.iter().find(|p| p.id == plan.id) else {
                continue;
            };
            if fresh.status != plan.status {
                continue;
            }
            if fresh.change_request != plan.change_request {
                plan.change_request = fresh.change_request.clone();
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{line, sample_draft, sample_plan};
    use chrono::{Duration, TimeZone};

    fn mid_january() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap()
    }

    #[test]
    fn test_create_assigns_number_and_initial_state() {
        let mut registry = TransferPlanRegistry::default();
        let plan = registry
            .create(sample_draft(), "apoteker@apotik.local", mid_january())
            .unwrap();

        assert_eq!(plan.plan_number, "RTR-202501-001");
        assert_eq!(plan.status, PlanStatus::AwaitingPreparation);
        assert_eq!(plan.created_by, "apoteker@apotik.local");
        assert_eq!(plan.created_at, plan.updated_at);
        assert!(!plan.change_request.is_open());
        assert!(plan.sent_to_warehouse_at.is_none());
    }

    #[test]
    fn test_sequential_creates_number_strictly_increasing() {
        let mut registry = TransferPlanRegistry::default();
        let now = mid_january();
        for i in 0..5 {
            registry
                .create(sample_draft(), "System", now + Duration::seconds(i))
                .unwrap();
        }
        let numbers: Vec<&str> = registry.plans().iter().map(|p| p.plan_number.as_str()).collect();
        assert_eq!(
            numbers,
            vec![
                "RTR-202501-001",
                "RTR-202501-002",
                "RTR-202501-003",
                "RTR-202501-004",
                "RTR-202501-005"
            ]
        );

        let mut ids: Vec<&str> = registry.plans().iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_same_millisecond_creates_get_distinct_ids() {
        let mut registry = TransferPlanRegistry::default();
        let now = mid_january();
        let first = registry.create(sample_draft(), "System", now).unwrap().id.clone();
        let second = registry.create(sample_draft(), "System", now).unwrap().id.clone();
        assert_ne!(first, second);
    }

    #[test]
    fn test_create_rejects_before_mutation() {
        let mut registry = TransferPlanRegistry::default();

        let mut same_branch = sample_draft();
        same_branch.destination_branch_id = same_branch.source_branch_id.clone();
        assert!(registry.create(same_branch, "System", mid_january()).is_err());

        let mut zero_qty = sample_draft();
        zero_qty.line_items = vec![line("P1", "U1", 0.0)];
        assert!(registry.create(zero_qty, "System", mid_january()).is_err());

        let mut no_unit = sample_draft();
        no_unit.line_items = vec![line("P1", "", 2.0)];
        assert!(registry.create(no_unit, "System", mid_january()).is_err());

        assert!(registry.is_empty());
    }

    #[test]
    fn test_filter_and_search() {
        let mut a = sample_plan("1", "RTR-202501-001");
        a.note = Some("Stok habis di cabang".to_string());
        let mut b = sample_plan("2", "RTR-202501-002");
        b.status = PlanStatus::Preparing;
        b.created_at = a.created_at + Duration::hours(1);
        let mut c = sample_plan("3", "RTR-202501-003");
        c.destination_branch_id = "A3".to_string();
        c.created_at = a.created_at + Duration::hours(2);
        let registry = TransferPlanRegistry::new(vec![a, b, c]);

        let all: Vec<&str> = registry
            .filter(&PlanFilter::default())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(all, vec!["3", "2", "1"]);

        let preparing = registry.filter(&PlanFilter {
            status: Some(PlanStatus::Preparing),
            ..Default::default()
        });
        assert_eq!(preparing.len(), 1);
        assert_eq!(preparing[0].id, "2");

        let to_a3 = registry.filter(&PlanFilter {
            destination_branch_id: Some("A3".to_string()),
            ..Default::default()
        });
        assert_eq!(to_a3.len(), 1);

        let by_note = registry.filter(&PlanFilter {
            search: Some("HABIS".to_string()),
            ..Default::default()
        });
        assert_eq!(by_note.len(), 1);
        assert_eq!(by_note[0].id, "1");

        let by_number = registry.filter(&PlanFilter {
            search: Some("-003".to_string()),
            ..Default::default()
        });
        assert_eq!(by_number[0].id, "3");
    }

    #[test]
    fn test_warehouse_queue_hides_unsent_and_finished() {
        let now = mid_january();
        let unsent = sample_plan("1", "RTR-202501-001");
        let mut sent_late = sample_plan("2", "RTR-202501-002");
        sent_late.sent_to_warehouse_at = Some(now + Duration::hours(2));
        let mut sent_early = sample_plan("3", "RTR-202501-003");
        sent_early.sent_to_warehouse_at = Some(now);
        sent_early.status = PlanStatus::Preparing;
        let mut done = sample_plan("4", "RTR-202501-004");
        done.sent_to_warehouse_at = Some(now);
        done.status = PlanStatus::Transferred;

        let registry = TransferPlanRegistry::new(vec![unsent, sent_late, sent_early, done]);
        let queue: Vec<&str> = registry.warehouse_queue().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(queue, vec!["3", "2"]);
    }

    #[test]
    fn test_delete_requires_approved_delete_request() {
        let now = mid_january();
        let mut registry = TransferPlanRegistry::new(vec![sample_plan("1", "RTR-202501-001")]);

        assert!(registry.delete_approved("1").is_err());

        let plan = registry.get_mut("1").unwrap();
        lifecycle::submit_request(plan, RequestType::Delete, "double", now).unwrap();
        assert!(registry.delete_approved("1").is_err());

        lifecycle::approve_request(registry.get_mut("1").unwrap(), now).unwrap();
        let removed = registry.delete_approved("1").unwrap();

        assert_eq!(removed.id, "1");
        assert!(!removed.change_request.is_open());
        assert!(registry.is_empty());
        assert!(matches!(
            registry.delete_approved("1"),
            Err(Error::PlanNotFound { .. })
        ));
    }

    #[test]
    fn test_sync_overlays_pulls_external_approval() {
        let now = mid_january();
        let mut local = sample_plan("1", "RTR-202501-001");
        lifecycle::submit_request(&mut local, RequestType::Edit, "ubah", now).unwrap();
        let mut registry = TransferPlanRegistry::new(vec![local.clone()]);

        let mut remote = local;
        remote.change_request.approved_at = Some(now + Duration::minutes(3));

        assert_eq!(registry.sync_overlays(std::slice::from_ref(&remote)), 1);
        assert!(registry.get("1").unwrap().change_request.is_approved_for(RequestType::Edit));
        assert_eq!(registry.sync_overlays(&[remote]), 0);
    }

    #[test]
    fn test_sync_overlays_skips_plans_past_awaiting() {
        let now = mid_january();
        let mut local = sample_plan("1", "RTR-202501-001");
        lifecycle::submit_request(&mut local, RequestType::Edit, "ubah", now).unwrap();
        let snapshot = local.clone();

        lifecycle::begin_preparation(&mut local, now + Duration::minutes(1)).unwrap();
        assert!(!local.change_request.is_open());
        let mut registry = TransferPlanRegistry::new(vec![local]);

        assert_eq!(registry.sync_overlays(std::slice::from_ref(&snapshot)), 0);
        let plan = registry.get("1").unwrap();
        assert_eq!(plan.status, PlanStatus::Preparing);
        assert!(!plan.change_request.is_open());
    }

    #[test]
    fn test_sync_overlays_ignores_copy_with_other_status() {
        let now = mid_january();
        let mut registry = TransferPlanRegistry::new(vec![sample_plan("1", "RTR-202501-001")]);

        let mut remote = sample_plan("1", "RTR-202501-001");
        lifecycle::submit_request(&mut remote, RequestType::Delete, "dobel", now).unwrap();
        remote.status = PlanStatus::Cancelled;

        assert_eq!(registry.sync_overlays(&[remote]), 0);
        assert!(!registry.get("1").unwrap().change_request.is_open());
    }
}
