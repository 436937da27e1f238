//! [tests/scenarios/persister_integration.rs]
//! Integration tests against an in-memory libSQL database: period
//! locking, charge line replacement, audit trail, and reproducibility
//! verification (§4.2).

use chrono::Utc;
use libsql::params;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use charges_domain_models::{
    ApartmentCharge, AuditAction, CalculationOutput, CalculationSettings, CategorySummary,
    CoreError, DistributionMethod, OutputMetadata, CALCULATION_VERSION,
};
use charges_infra_db::{ChargesDbClient, Persister};

async fn new_persister() -> Persister {
    let client = ChargesDbClient::connect(":memory:", None).await.expect("in-memory database");
    Persister::new(client)
}

/// Seeds a period row the way the external storage collaborator would
/// in production (§1 — structural period CRUD is out of scope here).
async fn insert_period(persister: &Persister, period_id: Uuid, building_id: Uuid) {
    let connection = persister.client().connection().expect("connection");
    connection
        .execute(
            "INSERT INTO periods (id, building_id, name, start_date, end_date, due_date, is_locked, version)
             VALUES (?1, ?2, 'January 2026', '2026-01-01', '2026-01-31', '2026-02-10', 0, 0)",
            params![period_id.to_string(), building_id.to_string()],
        )
        .await
        .expect("seed period row");
}

fn sample_output(period_id: Uuid, building_id: Uuid, apartment_id: Uuid, total: Decimal) -> CalculationOutput {
    let settings = CalculationSettings::default();
    CalculationOutput {
        metadata: OutputMetadata {
            timestamp: Utc::now(),
            period_id,
            building_id,
            period_month: 1,
            period_year: 2026,
            settings,
            input_hash: "deadbeef".to_string(),
            calculation_version: CALCULATION_VERSION.to_string(),
        },
        apartment_charges: vec![ApartmentCharge {
            apartment_id,
            apartment_number: "1A".to_string(),
            share_general: 100.0,
            share_heating: 0.0,
            expense_breakdown_items: Vec::new(),
            heating: None,
            reserve_fund: None,
            previous_balance: Decimal::ZERO,
            subtotal: total,
            total_adjustments: Decimal::ZERO,
            total,
        }],
        category_summaries: vec![CategorySummary {
            category_id: Uuid::new_v4(),
            category_name: "MAINTENANCE".to_string(),
            method: DistributionMethod::GeneralShare,
            total_amount: total,
            expense_count: 1,
            apartments_charged: 1,
            total_distributed: total,
            distribution_variance: Decimal::ZERO,
        }],
        reserve_fund_summary: None,
        total_expenses: total,
        total_distributed: total,
        distribution_variance: Decimal::ZERO,
        total_rounding_adjustments: Decimal::ZERO,
        validation_errors: Vec::new(),
        warnings: Vec::new(),
    }
}

#[tokio::test]
async fn store_calculation_writes_charge_lines_and_audit() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let output = sample_output(period_id, building_id, apartment_id, dec!(150.00));
    let actor = Uuid::new_v4();
    persister.store_calculation(&output, actor, false).await.expect("store succeeds");

    let lines = persister.get_apartment_charges(period_id).await.expect("lines readable");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].apartment_id, apartment_id);
    assert_eq!(lines[0].total_charge, dec!(150.00));

    let latest = persister
        .get_latest_calculation(period_id)
        .await
        .expect("query succeeds")
        .expect("a CREATE audit exists");
    assert_eq!(latest.action, AuditAction::Create);
    assert_eq!(latest.actor_id, actor);
}

#[tokio::test]
async fn store_calculation_twice_replaces_charge_lines() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    let first = sample_output(period_id, building_id, apartment_id, dec!(100.00));
    persister.store_calculation(&first, actor, false).await.expect("first store");

    let second = sample_output(period_id, building_id, apartment_id, dec!(200.00));
    persister.store_calculation(&second, actor, false).await.expect("second store");

    let lines = persister.get_apartment_charges(period_id).await.expect("lines readable");
    assert_eq!(lines.len(), 1, "charge lines are destroyed and recreated wholesale");
    assert_eq!(lines[0].total_charge, dec!(200.00));
}

#[tokio::test]
async fn store_calculation_on_locked_period_without_force_fails() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    persister.lock_period(period_id, actor).await.expect("lock succeeds");

    let output = sample_output(period_id, building_id, apartment_id, dec!(100.00));
    let result = persister.store_calculation(&output, actor, false).await;
    assert!(matches!(result, Err(CoreError::PeriodLocked(id)) if id == period_id));
}

#[tokio::test]
async fn store_calculation_on_locked_period_with_force_succeeds() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    persister.lock_period(period_id, actor).await.expect("lock succeeds");

    let output = sample_output(period_id, building_id, apartment_id, dec!(100.00));
    persister
        .store_calculation(&output, actor, true)
        .await
        .expect("force_recalculate bypasses the lock");
}

#[tokio::test]
async fn lock_then_unlock_requires_a_reason() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    persister.lock_period(period_id, actor).await.expect("lock succeeds");

    let empty_reason = persister.unlock_period(period_id, actor, "   ").await;
    assert!(matches!(empty_reason, Err(CoreError::ValidationFailed(_))));

    persister
        .unlock_period(period_id, actor, "reopening for correction")
        .await
        .expect("non-empty reason unlocks");
}

#[tokio::test]
async fn locking_an_already_locked_period_conflicts() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    persister.lock_period(period_id, actor).await.expect("first lock succeeds");
    let second_lock = persister.lock_period(period_id, actor).await;
    assert!(matches!(second_lock, Err(CoreError::ConflictingState(_))));
}

#[tokio::test]
async fn verify_detects_matching_and_diverging_hashes() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    let output = sample_output(period_id, building_id, apartment_id, dec!(100.00));
    persister.store_calculation(&output, actor, false).await.expect("store succeeds");

    let (reproducible, _) = persister.verify(period_id, "deadbeef").await.expect("verify succeeds");
    assert!(reproducible);

    let (diverges, _) = persister.verify(period_id, "cafebabe").await.expect("verify succeeds");
    assert!(!diverges);
}

#[tokio::test]
async fn delete_calculation_removes_lines_but_keeps_history() {
    let persister = new_persister().await;
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();
    insert_period(&persister, period_id, building_id).await;

    let actor = Uuid::new_v4();
    let output = sample_output(period_id, building_id, apartment_id, dec!(100.00));
    persister.store_calculation(&output, actor, false).await.expect("store succeeds");

    persister
        .delete_calculation(period_id, actor, "duplicate entry")
        .await
        .expect("delete succeeds");

    let lines = persister.get_apartment_charges(period_id).await.expect("query succeeds");
    assert!(lines.is_empty());

    // §4.2 `get_history` surfaces CREATE/UPDATE/LOCK/UNLOCK only; the
    // original CREATE entry is preserved even though its charge lines
    // were just deleted — audit records outlive the state they describe.
    let history = persister.get_history(period_id).await.expect("query succeeds");
    assert!(history.iter().any(|record| record.action == AuditAction::Create));
    assert!(!history.iter().any(|record| record.action == AuditAction::Delete));
}

#[tokio::test]
async fn file_backed_database_persists_across_reconnects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = dir.path().join("charges.db").to_str().unwrap().to_string();

    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();

    {
        let client = ChargesDbClient::connect(&url, None).await.expect("connect");
        let persister = Persister::new(client);
        insert_period(&persister, period_id, building_id).await;
        let output = sample_output(period_id, building_id, apartment_id, dec!(75.00));
        persister
            .store_calculation(&output, Uuid::new_v4(), false)
            .await
            .expect("store succeeds");
    }

    let client = ChargesDbClient::connect(&url, None).await.expect("reconnect");
    let persister = Persister::new(client);
    let lines = persister.get_apartment_charges(period_id).await.expect("lines readable");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].total_charge, dec!(75.00));
}
