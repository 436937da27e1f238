//! [tests/scenarios/orchestrator_scenarios.rs]
//! End-to-end orchestrator tests: load -> compute -> persist, against a
//! fake `BuildingDataSource` and a real in-memory libSQL `Persister`.
//! Covers Scenario F (locked period returns the cached result and
//! writes no new audit entry) plus preview/lock/unlock/history.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use libsql::params;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use charges_domain_models::{
    Apartment, AuditAction, CalculationSettings, DistributionMethod, ExpenseItem,
    HeatingConsumption, Period, ReserveFundOperation,
};
use charges_infra_db::{ChargesDbClient, Persister};
use charges_orchestrator::{BuildingDataSource, CalculateOptions, Orchestrator};

/// A fixed-cast-in-memory stand-in for the production storage
/// collaborator (§6): one building, one period, a handful of
/// apartments and expenses, assembled by hand in each test.
struct FakeDataSource {
    period: Mutex<Option<Period>>,
    apartments: Vec<Apartment>,
    expenses: Vec<ExpenseItem>,
    heating_consumptions: Vec<HeatingConsumption>,
    reserve_operations: Vec<ReserveFundOperation>,
    reserve_previous_balance: Decimal,
    settings: CalculationSettings,
}

#[async_trait]
impl BuildingDataSource for FakeDataSource {
    async fn find_period(&self, period_id: Uuid) -> anyhow::Result<Option<Period>> {
        Ok(self
            .period
            .lock()
            .unwrap()
            .clone()
            .filter(|period| period.id == period_id))
    }

    async fn list_apartments(&self, _building_id: Uuid) -> anyhow::Result<Vec<Apartment>> {
        Ok(self.apartments.clone())
    }

    async fn list_expenses(
        &self,
        _building_id: Uuid,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> anyhow::Result<Vec<ExpenseItem>> {
        Ok(self.expenses.clone())
    }

    async fn list_heating_consumptions(&self, _period_id: Uuid) -> anyhow::Result<Vec<HeatingConsumption>> {
        Ok(self.heating_consumptions.clone())
    }

    async fn list_reserve_operations(&self, _period_id: Uuid) -> anyhow::Result<Vec<ReserveFundOperation>> {
        Ok(self.reserve_operations.clone())
    }

    async fn reserve_previous_balance(&self, _building_id: Uuid, _period_id: Uuid) -> anyhow::Result<Decimal> {
        Ok(self.reserve_previous_balance)
    }

    async fn calculation_settings(&self, _building_id: Uuid) -> anyhow::Result<CalculationSettings> {
        Ok(self.settings)
    }
}

fn apartment(building_id: Uuid, number: &str, share_general: f64) -> Apartment {
    Apartment {
        id: Uuid::new_v4(),
        building_id,
        number: number.to_string(),
        floor: "1".to_string(),
        share_general,
        share_heating: 0.0,
        share_elevator: None,
        share_special: None,
        share_owner: None,
        share_other: None,
        is_occupied: true,
        is_excluded: false,
    }
}

fn expense(building_id: Uuid, category_name: &str, amount: Decimal) -> ExpenseItem {
    ExpenseItem {
        id: Uuid::new_v4(),
        building_id,
        category_id: Uuid::new_v4(),
        category_name: category_name.to_string(),
        amount,
        distribution_method: DistributionMethod::GeneralShare,
        description: category_name.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        included_apartment_ids: None,
        custom_distribution: None,
        vat_percentage: None,
    }
}

async fn new_persister() -> Persister {
    let client = ChargesDbClient::connect(":memory:", None).await.expect("in-memory database");
    Persister::new(client)
}

async fn seed_period(persister: &Persister, period_id: Uuid, building_id: Uuid) {
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

fn build_data_source(period_id: Uuid, building_id: Uuid) -> FakeDataSource {
    let apartments = vec![
        apartment(building_id, "1A", 50.0),
        apartment(building_id, "1B", 50.0),
    ];
    let expenses = vec![expense(building_id, "CLEANING", dec!(100.00))];
    let period = Period {
        id: period_id,
        building_id,
        name: "January 2026".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        is_locked: false,
        locked_at: None,
        locked_by: None,
        version: 0,
    };

    FakeDataSource {
        period: Mutex::new(Some(period)),
        apartments,
        expenses,
        heating_consumptions: Vec::new(),
        reserve_operations: Vec::new(),
        reserve_previous_balance: Decimal::ZERO,
        settings: CalculationSettings::default(),
    }
}

#[tokio::test]
async fn calculate_period_loads_computes_and_persists() {
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let persister = new_persister().await;
    seed_period(&persister, period_id, building_id).await;

    let data_source = build_data_source(period_id, building_id);
    let orchestrator = Orchestrator::new(data_source, persister);

    let actor = Uuid::new_v4();
    let output = orchestrator
        .calculate_period(period_id, actor, &CalculateOptions::default(), Utc::now())
        .await
        .expect("calculate succeeds");

    assert_eq!(output.apartment_charges.len(), 2);
    let total: Decimal = output.apartment_charges.iter().map(|c| c.subtotal).sum();
    assert_eq!(total, dec!(100.00));

    let lines = orchestrator.get_apartment_charges(period_id).await.expect("lines readable");
    assert_eq!(lines.len(), 2);

    let history = orchestrator.get_history(period_id).await.expect("history readable");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, AuditAction::Create);
}

#[tokio::test]
async fn preview_period_never_touches_storage() {
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let persister = new_persister().await;
    seed_period(&persister, period_id, building_id).await;

    let data_source = build_data_source(period_id, building_id);
    let orchestrator = Orchestrator::new(data_source, persister);

    let output = orchestrator
        .preview_period(period_id, &CalculateOptions::default(), Utc::now())
        .await
        .expect("preview succeeds");
    assert_eq!(output.apartment_charges.len(), 2);

    let lines = orchestrator.get_apartment_charges(period_id).await.expect("query succeeds");
    assert!(lines.is_empty(), "preview must never write charge lines");

    let history = orchestrator.get_history(period_id).await.expect("query succeeds");
    assert!(history.is_empty(), "preview must never write an audit entry");
}

/// Scenario F — locked period: calculate without `force_recalculate`
/// returns the cached output and writes no new audit entry.
#[tokio::test]
async fn scenario_f_locked_period_returns_cached_result() {
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let persister = new_persister().await;
    seed_period(&persister, period_id, building_id).await;

    let data_source = build_data_source(period_id, building_id);
    let orchestrator = Orchestrator::new(data_source, persister);

    let actor = Uuid::new_v4();
    let first = orchestrator
        .calculate_period(period_id, actor, &CalculateOptions::default(), Utc::now())
        .await
        .expect("first calculate succeeds");

    orchestrator.lock_period(period_id, actor).await.expect("lock succeeds");

    let second = orchestrator
        .calculate_period(period_id, actor, &CalculateOptions::default(), Utc::now())
        .await
        .expect("locked calculate returns cached result");

    assert_eq!(first.metadata.input_hash, second.metadata.input_hash);
    assert_eq!(first.apartment_charges, second.apartment_charges);

    let history = orchestrator.get_history(period_id).await.expect("history readable");
    let creates = history.iter().filter(|record| record.action == AuditAction::Create).count();
    assert_eq!(creates, 1, "a cached read must not append a second CREATE audit");
}

#[tokio::test]
async fn force_recalculate_bypasses_lock_and_rewrites() {
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let persister = new_persister().await;
    seed_period(&persister, period_id, building_id).await;

    let data_source = build_data_source(period_id, building_id);
    let orchestrator = Orchestrator::new(data_source, persister);

    let actor = Uuid::new_v4();
    orchestrator
        .calculate_period(period_id, actor, &CalculateOptions::default(), Utc::now())
        .await
        .expect("first calculate succeeds");
    orchestrator.lock_period(period_id, actor).await.expect("lock succeeds");

    let mut options = CalculateOptions::default();
    options.force_recalculate = true;
    orchestrator
        .calculate_period(period_id, actor, &options, Utc::now())
        .await
        .expect("forced recalculation bypasses the lock");

    let history = orchestrator.get_history(period_id).await.expect("history readable");
    let creates = history.iter().filter(|record| record.action == AuditAction::Create).count();
    assert_eq!(creates, 2, "forcing a recalculation on a locked period appends a new CREATE audit");
}

#[tokio::test]
async fn unlock_then_recalculate_round_trips() {
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let persister = new_persister().await;
    seed_period(&persister, period_id, building_id).await;

    let data_source = build_data_source(period_id, building_id);
    let orchestrator = Orchestrator::new(data_source, persister);

    let actor = Uuid::new_v4();
    orchestrator
        .calculate_period(period_id, actor, &CalculateOptions::default(), Utc::now())
        .await
        .expect("first calculate succeeds");
    orchestrator.lock_period(period_id, actor).await.expect("lock succeeds");

    orchestrator
        .unlock_period(period_id, actor, "recalculating after a correction")
        .await
        .expect("unlock succeeds");

    let output = orchestrator
        .calculate_period(period_id, actor, &CalculateOptions::default(), Utc::now())
        .await
        .expect("calculate after unlock succeeds");
    assert_eq!(output.apartment_charges.len(), 2);
}

#[tokio::test]
async fn category_override_changes_distribution_method() {
    let period_id = Uuid::new_v4();
    let building_id = Uuid::new_v4();
    let persister = new_persister().await;
    seed_period(&persister, period_id, building_id).await;

    let data_source = build_data_source(period_id, building_id);
    let orchestrator = Orchestrator::new(data_source, persister);

    let mut overrides = HashMap::new();
    overrides.insert("CLEANING".to_string(), DistributionMethod::EqualSplit);
    let mut options = CalculateOptions::default();
    options.category_overrides = overrides;

    let output = orchestrator
        .preview_period(period_id, &options, Utc::now())
        .await
        .expect("preview succeeds");

    let cleaning_item = &output.apartment_charges[0].expense_breakdown_items[0];
    assert_eq!(cleaning_item.method, DistributionMethod::EqualSplit);
}
