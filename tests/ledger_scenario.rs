//! End-to-end scenarios through the public library API

use chrono::{NaiveDate, Weekday};
use tempfile::TempDir;

use isavemoney::config::SavePaths;
use isavemoney::models::{
    Currency, EndCondition, Money, RecurrenceRule, RecurrenceTemplate, TransactionAmendment,
    YearMonth,
};
use isavemoney::reports::{BudgetStatus, ForecastSummary, ProjectionMode};
use isavemoney::services::Ledger;
use isavemoney::storage::{JsonStorage, LedgerStorage, MemoryStorage};
use isavemoney::SaveError;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn usd(minor: i64) -> Money {
    Money::new(minor, Currency::USD)
}

#[test]
fn weekly_forecast_with_actual() {
    let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
    let food = ledger.create_category("Food", None, None).unwrap();
    ledger.record_transaction(date(1, 5), usd(-5_000), food.id, "").unwrap();
    ledger
        .create_recurrence_template(RecurrenceTemplate::new(
            usd(-2_000),
            food.id,
            date(1, 1),
            RecurrenceRule::weekly(Weekday::Wed),
        ))
        .unwrap();

    let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let points = ledger.forecast(as_of, date(1, 14), usd(100_000)).unwrap();
    let dates: Vec<_> = points.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![date(1, 1), date(1, 5), date(1, 8)]);

    let summary = ForecastSummary::from_points(usd(100_000), &points).unwrap();
    assert_eq!(summary.closing, usd(91_000));
    assert_eq!(summary.outflow, usd(9_000));
    assert!(!summary.goes_negative());
}

#[test]
fn budget_with_inherited_limits() {
    let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
    let food = ledger.create_category("Food", None, Some(usd(40_000))).unwrap();
    let dining = ledger.create_category("Dining", Some(food.id), None).unwrap();
    let gifts = ledger.create_category("Gifts", None, None).unwrap();

    ledger.record_transaction(date(3, 2), usd(-45_000), dining.id, "").unwrap();
    ledger.record_transaction(date(3, 9), usd(-10_000), food.id, "").unwrap();
    ledger.record_transaction(date(3, 10), usd(2_500), food.id, "refund").unwrap();

    let month = YearMonth::new(2025, 3).unwrap();
    let reports = ledger.evaluate_budget(month, ProjectionMode::ActualOnly).unwrap();
    assert_eq!(reports.len(), 3);

    let food_line = &reports[0];
    assert_eq!(food_line.spent, usd(7_500));
    assert_eq!(food_line.status, BudgetStatus::Under);

    let dining_line = &reports[1];
    assert_eq!(dining_line.limit, Some(usd(40_000)));
    assert_eq!(dining_line.remaining, Some(usd(-5_000)));
    assert!(dining_line.is_over());

    let gifts_line = &reports[2];
    assert_eq!(gifts_line.category_id, gifts.id);
    assert_eq!(gifts_line.spent, usd(0));
    assert_eq!(gifts_line.status, BudgetStatus::Unlimited);
}

#[test]
fn projected_spending_counts_only_when_requested() {
    let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
    let rent = ledger.create_category("Rent", None, Some(usd(100_000))).unwrap();
    let template = ledger
        .create_recurrence_template(
            RecurrenceTemplate::new(usd(-100_000), rent.id, date(1, 1), RecurrenceRule::monthly(1))
                .with_note("Rent"),
        )
        .unwrap();
    ledger.materialize_template(template.id, date(1, 31)).unwrap();

    let january = YearMonth::new(2025, 1).unwrap();
    let february = YearMonth::new(2025, 2).unwrap();

    // Materialized occurrences are actuals and are not projected again
    let with_projected = ledger.evaluate_budget(january, ProjectionMode::IncludeProjected).unwrap();
    assert_eq!(with_projected[0].spent, usd(100_000));
    assert_eq!(with_projected[0].status, BudgetStatus::At);

    let actual_only = ledger.evaluate_budget(february, ProjectionMode::ActualOnly).unwrap();
    assert_eq!(actual_only[0].spent, usd(0));
    let projected = ledger.evaluate_budget(february, ProjectionMode::IncludeProjected).unwrap();
    assert_eq!(projected[0].spent, usd(100_000));
}

#[test]
fn amendments_survive_reload() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SavePaths::with_base_dir(temp_dir.path());

    let (origin, successor) = {
        let ledger = Ledger::open(JsonStorage::new(paths.clone()).unwrap(), Currency::USD).unwrap();
        let food = ledger.create_category("Food", None, None).unwrap();
        let original = ledger
            .record_transaction(date(1, 5), usd(-5_000), food.id, "Dinner")
            .unwrap();
        let fix = TransactionAmendment {
            amount: Some(usd(-4_500)),
            ..Default::default()
        };
        let successor = ledger.amend_transaction(original.id, fix).unwrap();
        (original.id, successor.id)
    };

    let reopened = Ledger::open(JsonStorage::new(paths).unwrap(), Currency::USD).unwrap();
    let history = reopened.history(origin).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].voided);
    assert_eq!(history[1].id, successor);

    let live = reopened.list_transactions(date(1, 1)..=date(1, 31), None).unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].amount, usd(-4_500));
}

#[test]
fn rejected_save_changes_nothing() {
    let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
    let food = ledger.create_category("Food", None, None).unwrap();
    let before = ledger.storage().snapshot().unwrap();

    ledger.storage().reject_saves(true);
    assert!(ledger.record_transaction(date(1, 1), usd(-1), food.id, "").is_err());
    assert!(ledger
        .create_recurrence_template(RecurrenceTemplate::new(
            usd(-1),
            food.id,
            date(1, 1),
            RecurrenceRule::daily().ending(EndCondition::AfterCount(3)),
        ))
        .is_err());

    assert_eq!(ledger.storage().snapshot().unwrap(), before);
    assert!(ledger.templates().unwrap().is_empty());
    assert!(ledger
        .list_transactions(date(1, 1)..=date(12, 31), None)
        .unwrap()
        .is_empty());
    assert_eq!(ledger.storage().load().unwrap(), before);
}

#[test]
fn mixed_currencies_are_rejected_in_reports() {
    let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
    let travel = ledger.create_category("Travel", None, None).unwrap();
    let eur = Currency::new("EUR").unwrap();
    ledger.record_transaction(date(1, 3), usd(-1_000), travel.id, "").unwrap();
    ledger
        .record_transaction(date(1, 4), Money::new(-1_000, eur), travel.id, "")
        .unwrap();

    let result = ledger.forecast(date(1, 1), date(1, 31), usd(0));
    assert!(matches!(result, Err(SaveError::CurrencyMismatch { .. })));
}
