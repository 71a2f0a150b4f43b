//! Shared test utilities.
//!
//! Fixtures for plans, drafts and master data, plus the in-memory database and
//! token table used by the API tests.

#![allow(clippy::unwrap_used)]

use crate::{
    api::{Role, StaticTokenVerifier},
    config::TokenConfig,
    core::MasterData,
    errors::Result,
    models::{
        Branch, ChangeRequest, PlanDraft, PlanLineItem, PlanStatus, Product, ProductUnit,
        TransferPlan,
    },
    store::{DataKey, MemoryStore, save_collection},
};
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sends tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("apotik_backoffice=debug")
        .with_test_writer()
        .try_init();
}

/// Token table with one token per role: `admin-token`, `manager-token`, `staff-token`.
pub fn test_verifier() -> StaticTokenVerifier {
    let tokens = [
        ("admin-token", "admin@apotik.local", Role::Admin),
        ("manager-token", "manager@apotik.local", Role::Manager),
        ("staff-token", "staff@apotik.local", Role::Staff),
    ]
    .map(|(token, email, role)| TokenConfig {
        token: token.to_string(),
        email: email.to_string(),
        role,
    });
    StaticTokenVerifier::from_config(&tokens)
}

/// Plan line with placeholder code and names derived from the ids.
pub fn line(product_id: &str, unit_id: &str, planned_qty: f64) -> PlanLineItem {
    PlanLineItem {
        product_id: product_id.to_string(),
        product_code: format!("CODE-{product_id}"),
        product_name: format!("Produk {product_id}"),
        unit_id: unit_id.to_string(),
        unit_name: format!("Unit {unit_id}"),
        planned_qty,
    }
}

/// Valid draft from branch `A1` to `A2` with ten of `P1`/`U1`.
pub fn sample_draft() -> PlanDraft {
    PlanDraft {
        transaction_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        planned_ship_date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        source_branch_id: "A1".to_string(),
        destination_branch_id: "A2".to_string(),
        line_items: vec![line("P1", "U1", 10.0)],
        note: None,
    }
}

/// Plan awaiting preparation, created 15 January 2025 by `System`.
pub fn sample_plan(id: &str, plan_number: &str) -> TransferPlan {
    let created = Utc
        .with_ymd_and_hms(2025, 1, 15, 3, 0, 0)
        .unwrap();
    let draft = sample_draft();
    TransferPlan {
        id: id.to_string(),
        plan_number: plan_number.to_string(),
        transaction_date: draft.transaction_date,
        planned_ship_date: draft.planned_ship_date,
        source_branch_id: draft.source_branch_id,
        destination_branch_id: draft.destination_branch_id,
        line_items: draft.line_items,
        note: None,
        status: PlanStatus::AwaitingPreparation,
        created_at: created,
        updated_at: created,
        created_by: "System".to_string(),
        linked_transfer_id: None,
        sent_to_warehouse_at: None,
        change_request: ChangeRequest::default(),
    }
}

fn branch(id: &str, code: &str, name: &str, active: bool) -> Branch {
    Branch {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        address: None,
        city: Some("Bandung".to_string()),
        province: None,
        active,
    }
}

fn unit(id: &str, name: &str, conversion: f64) -> ProductUnit {
    ProductUnit {
        id: id.to_string(),
        name: name.to_string(),
        conversion,
    }
}

/// Two active branches (`A1`, `A2`), one inactive (`A3`), and products `P1`, `P2`.
pub fn sample_master_data() -> MasterData {
    MasterData {
        branches: vec![
            branch("A2", "APT02", "Apotik Dago", true),
            branch("A1", "APT01", "Apotik Pusat", true),
            branch("A3", "APT03", "Apotik Lama", false),
        ],
        products: vec![
            Product {
                id: "P1".to_string(),
                code: "PCT500".to_string(),
                name: "Paracetamol 500mg".to_string(),
                units: vec![unit("U1", "Strip", 10.0), unit("U2", "Box", 100.0)],
                stock_by_branch: BTreeMap::from([("A1".to_string(), 120.0)]),
            },
            Product {
                id: "P2".to_string(),
                code: "AMX500".to_string(),
                name: "Amoxicillin 500mg".to_string(),
                units: vec![unit("U1", "Strip", 10.0)],
                stock_by_branch: BTreeMap::from([
                    ("A1".to_string(), 40.0),
                    ("A2".to_string(), 15.0),
                ]),
            },
        ],
    }
}

/// Memory store holding [`sample_master_data`] under `apotiks` and `products`.
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::default();
    let master = sample_master_data();
    save_collection(&store, DataKey::Apotiks, &master.branches)
        .await
        .unwrap();
    save_collection(&store, DataKey::Products, &master.products)
        .await
        .unwrap();
    store
}
