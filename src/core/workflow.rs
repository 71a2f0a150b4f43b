//! Transfer workflow service.
//!
//! Holds the plan registry, the goods-transfer collection and master data in
//! memory, applies user actions through [`super::lifecycle`] and
//! [`super::conversion`], and writes the touched collection back to the
//! injected store after every successful mutation. A refused action writes
//! nothing, and an action whose save fails is rolled back in memory.

use super::{
    conversion,
    lifecycle,
    master::MasterData,
    registry::TransferPlanRegistry,
};
use crate::{
    config::{ClientConfig, users::ClientIdentity},
    errors::Result,
    models::{GoodsTransfer, PlanDraft, RequestType, TransferPlan},
    store::{
        DataKey, KeyValueStore, SyncedStore, decode_collection, load_collection, save_collection,
        watch_mirror,
    },
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Stateful front for the transfer-plan screens.
pub struct TransferWorkflow {
    store: Arc<dyn KeyValueStore>,
    actor: String,
    master: MasterData,
    registry: TransferPlanRegistry,
    transfers: Vec<GoodsTransfer>,
}

impl TransferWorkflow {
    /// Loads plans, goods transfers and master data from `store`.
    ///
    /// `actor` is recorded as `createdBy` on new documents.
    pub async fn load(store: Arc<dyn KeyValueStore>, actor: impl Into<String>) -> Result<Self> {
        let mut workflow = Self {
            store,
            actor: actor.into(),
            master: MasterData::default(),
            registry: TransferPlanRegistry::default(),
            transfers: Vec::new(),
        };
        workflow.reload().await?;
        Ok(workflow)
    }

    /// Client-side workflow: a [`SyncedStore`] built from settings and identity,
    /// plus a watcher on the mirrored plan collection.
    ///
    /// The returned receiver publishes the plan collection every time another
    /// writer changes it; feed it to [`Self::next_external_change`]. The watcher
    /// task stops when the receiver is dropped.
    pub async fn connect(
        config: &ClientConfig,
        identity: &ClientIdentity,
    ) -> Result<(Self, watch::Receiver<Value>)> {
        let store = SyncedStore::connect(config, identity).await?;
        let (plan_changes, _watcher) = watch_mirror(
            store.mirror().clone(),
            DataKey::RencanaTransferBarang,
            config.poll_interval(),
        )
        .await;
        let workflow = Self::load(Arc::new(store), identity.actor.clone()).await?;
        info!(
            actor = %workflow.actor,
            plans = workflow.registry.len(),
            "transfer workflow connected"
        );
        Ok((workflow, plan_changes))
    }

    /// Re-reads every collection, replacing in-memory state.
    pub async fn reload(&mut self) -> Result<()> {
        let store = self.store.as_ref();
        self.master = MasterData::load(store).await?;
        self.registry
            .replace_all(load_collection(store, DataKey::RencanaTransferBarang).await?);
        self.transfers = load_collection(store, DataKey::TransferBarang).await?;
        debug!(
            plans = self.registry.len(),
            transfers = self.transfers.len(),
            "transfer workflow loaded"
        );
        Ok(())
    }

    /// Plans currently held in memory.
    #[must_use]
    pub const fn registry(&self) -> &TransferPlanRegistry {
        &self.registry
    }

    /// Goods transfers currently held in memory.
    #[must_use]
    pub fn transfers(&self) -> &[GoodsTransfer] {
        &self.transfers
    }

    /// Branches and products as last loaded.
    #[must_use]
    pub const fn master(&self) -> &MasterData {
        &self.master
    }

    /// Who new documents are attributed to.
    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    async fn persist_plans(&self) -> Result<()> {
        save_collection(
            self.store.as_ref(),
            DataKey::RencanaTransferBarang,
            self.registry.plans(),
        )
        .await?;
        Ok(())
    }

    async fn persist_transfers(&self) -> Result<()> {
        save_collection(self.store.as_ref(), DataKey::TransferBarang, &self.transfers).await?;
        Ok(())
    }

    /// Saves the plan collection, restoring `before` in memory if the save fails.
    async fn commit_plans(&mut self, before: TransferPlanRegistry) -> Result<()> {
        if let Err(e) = self.persist_plans().await {
            warn!(error = %e, "saving transfer plans failed, changes discarded");
            self.registry = before;
            return Err(e);
        }
        Ok(())
    }

    /// Runs `action` on one plan and saves the plan collection if it succeeds.
    async fn update_plan<F>(&mut self, id: &str, action: F) -> Result<()>
    where
        F: FnOnce(&mut TransferPlan, DateTime<Utc>) -> Result<()>,
    {
        let before = self.registry.clone();
        action(self.registry.get_mut(id)?, Utc::now())?;
        self.commit_plans(before).await
    }

    /// Creates a plan after checking the draft against master data.
    pub async fn create_plan(&mut self, draft: PlanDraft) -> Result<TransferPlan> {
        draft.validate()?;
        self.master
            .ensure_branches(&draft.source_branch_id, &draft.destination_branch_id)?;

        let before = self.registry.clone();
        let plan = self
            .registry
            .create(draft, &self.actor, Utc::now())?
            .clone();
        self.commit_plans(before).await?;
        Ok(plan)
    }

    /// Makes a plan visible in the warehouse queue.
    pub async fn send_to_warehouse(&mut self, id: &str) -> Result<()> {
        self.update_plan(id, lifecycle::send_to_warehouse).await
    }

    /// Warehouse starts picking the plan.
    pub async fn begin_preparation(&mut self, id: &str) -> Result<()> {
        self.update_plan(id, lifecycle::begin_preparation).await
    }

    /// Warehouse has staged the goods.
    pub async fn mark_ready(&mut self, id: &str) -> Result<()> {
        self.update_plan(id, lifecycle::mark_ready).await
    }

    /// Cancels a plan that is still awaiting preparation.
    pub async fn cancel_plan(&mut self, id: &str) -> Result<()> {
        self.update_plan(id, lifecycle::cancel).await
    }

    /// Converts a ready plan into a goods transfer.
    ///
    /// The transfer collection is saved before the plan collection. If either
    /// save fails, memory is put back as it was; if only the plan save failed,
    /// the transfer collection is rewritten without the new document.
    pub async fn convert_to_transfer(&mut self, id: &str) -> Result<GoodsTransfer> {
        let before = self.registry.clone();
        let plan = self.registry.get_mut(id)?;
        let transfer =
            conversion::convert_to_transfer(plan, &self.transfers, &self.actor, Utc::now())?;

        self.transfers.push(transfer.clone());
        if let Err(e) = self.persist_transfers().await {
            warn!(error = %e, "saving goods transfers failed, conversion discarded");
            self.transfers.pop();
            self.registry = before;
            return Err(e);
        }
        if let Err(e) = self.persist_plans().await {
            self.transfers.pop();
            self.registry = before;
            if let Err(undo) = self.persist_transfers().await {
                warn!(
                    error = %undo,
                    transfer = %transfer.transfer_number,
                    "cannot withdraw saved goods transfer"
                );
            }
            return Err(e);
        }
        Ok(transfer)
    }

    /// Opens a change request on a plan.
    pub async fn submit_change_request(
        &mut self,
        id: &str,
        kind: RequestType,
        note: &str,
    ) -> Result<()> {
        self.update_plan(id, |plan, now| {
            lifecycle::submit_request(plan, kind, note, now)
        })
        .await
    }

    /// Withdraws an open change request.
    pub async fn cancel_change_request(&mut self, id: &str) -> Result<()> {
        self.update_plan(id, lifecycle::cancel_request).await
    }

    /// Entry point for the external approver's decision.
    pub async fn approve_change_request(
        &mut self,
        id: &str,
        approved_at: DateTime<Utc>,
    ) -> Result<()> {
        self.update_plan(id, |plan, _| lifecycle::approve_request(plan, approved_at))
            .await
    }

    /// Applies an approved edit.
    pub async fn apply_edit(&mut self, id: &str, draft: PlanDraft) -> Result<()> {
        draft.validate()?;
        self.master
            .ensure_branches(&draft.source_branch_id, &draft.destination_branch_id)?;
        self.update_plan(id, |plan, now| lifecycle::apply_edit(plan, draft, now))
            .await
    }

    /// Removes a plan whose delete request was approved.
    pub async fn apply_delete(&mut self, id: &str) -> Result<TransferPlan> {
        let before = self.registry.clone();
        let removed = self.registry.delete_approved(id)?;
        self.commit_plans(before).await?;
        Ok(removed)
    }

    /// Pulls change-request state from a re-read plan collection (e.g. a value
    /// published by [`watch_mirror`]). Nothing is written back.
    pub fn apply_external_plans(&mut self, value: &Value) -> Result<usize> {
        let latest: Vec<TransferPlan> =
            decode_collection(DataKey::RencanaTransferBarang, value.clone())?;
        let changed = self.registry.sync_overlays(&latest);
        if changed > 0 {
            debug!(changed, "change requests refreshed from store");
        }
        Ok(changed)
    }

    /// Waits for the next published plan collection and applies it.
    ///
    /// Returns how many plans changed, or `None` once the watcher has stopped.
    pub async fn next_external_change(
        &mut self,
        plan_changes: &mut watch::Receiver<Value>,
    ) -> Result<Option<usize>> {
        if plan_changes.changed().await.is_err() {
            return Ok(None);
        }
        let value = plan_changes.borrow_and_update().clone();
        self.apply_external_plans(&value).map(Some)
    }
}
