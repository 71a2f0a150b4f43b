//! Warehouse-side client: keeps the transfer workflow in sync with the local
//! mirror and logs the preparation queue whenever another writer changes it.

use apotik_backoffice::{
    config::{self, users},
    core::TransferWorkflow,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn log_queue(workflow: &TransferWorkflow) {
    let queue = workflow.registry().warehouse_queue();
    info!(count = queue.len(), "Warehouse queue");
    for plan in queue {
        info!(
            plan = %plan.plan_number,
            status = %plan.status,
            ship = %plan.planned_ship_date,
            "  queued"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    let identity = users::client_identity();

    let (mut workflow, mut plan_changes) =
        TransferWorkflow::connect(&app_config.client, &identity)
            .await
            .inspect_err(|e| error!("Failed to open transfer workflow: {}", e))?;
    log_queue(&workflow);

    while let Some(changed) = workflow.next_external_change(&mut plan_changes).await? {
        if changed > 0 {
            info!(changed, "Change requests updated by another writer.");
        }
        log_queue(&workflow);
    }

    info!("Mirror watcher stopped.");
    Ok(())
}
