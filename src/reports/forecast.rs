//! Forecast report
//!
//! Merges future-dated actual transactions with projected template
//! occurrences into a running balance curve.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::SaveResult;
use crate::ledger::LedgerStore;
use crate::models::{Money, Transaction};

/// One step of a balance curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Balance after applying `transaction`
    pub balance: Money,
    pub transaction: Transaction,
}

/// Balance curve over `(as_of, horizon_end]`
///
/// Entries are ordered by date, then actual before projected, then by
/// insertion order (transaction sequence or template order). An empty
/// sequence is returned when `horizon_end <= as_of`.
pub fn forecast(
    store: &LedgerStore,
    as_of: NaiveDate,
    horizon_end: NaiveDate,
    starting_balance: Money,
) -> SaveResult<Vec<ForecastPoint>> {
    if horizon_end <= as_of {
        return Ok(Vec::new());
    }
    let Some(first_day) = as_of.succ_opt() else {
        return Ok(Vec::new());
    };

    let actuals = store.query(first_day..=horizon_end, None);
    let projected = store.projections(first_day..=horizon_end);

    // Both inputs are already in (date, insertion) order, so a merge by date
    // that prefers actuals on ties gives the final order.
    let mut merged = Vec::with_capacity(actuals.len() + projected.len());
    let mut actuals = actuals.into_iter().peekable();
    let mut projected = projected.into_iter().peekable();
    loop {
        let take_actual = match (actuals.peek(), projected.peek()) {
            (Some(a), Some(p)) => a.date <= p.date,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_actual {
            actuals.next()
        } else {
            projected.next()
        };
        merged.extend(next);
    }

    running_balance(merged, starting_balance)
}

/// Apply `transactions` in the given order to `opening`
pub fn running_balance(
    transactions: impl IntoIterator<Item = Transaction>,
    opening: Money,
) -> SaveResult<Vec<ForecastPoint>> {
    let mut balance = opening;
    transactions
        .into_iter()
        .map(|transaction| -> SaveResult<ForecastPoint> {
            balance = balance.add(&transaction.amount)?;
            Ok(ForecastPoint {
                date: transaction.date,
                balance,
                transaction,
            })
        })
        .collect()
}

/// Headline figures for a balance curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub opening: Money,
    pub closing: Money,
    /// Lowest balance reached and the first date it was reached
    pub lowest: Option<(NaiveDate, Money)>,
    /// Total of positive amounts
    pub inflow: Money,
    /// Total of negative amounts, as a non-negative magnitude
    pub outflow: Money,
}

impl ForecastSummary {
    pub fn from_points(opening: Money, points: &[ForecastPoint]) -> SaveResult<Self> {
        let currency = opening.currency();
        let mut inflow = Money::zero(currency);
        let mut outflow = Money::zero(currency);
        let mut lowest: Option<(NaiveDate, Money)> = None;

        for point in points {
            let amount = point.transaction.amount;
            if amount.is_negative() {
                outflow = outflow.subtract(&amount)?;
            } else {
                inflow = inflow.add(&amount)?;
            }

            let lower = match lowest {
                Some((_, low)) => point.balance.compare(&low)?.is_lt(),
                None => true,
            };
            if lower {
                lowest = Some((point.date, point.balance));
            }
        }

        Ok(Self {
            opening,
            closing: points.last().map_or(opening, |p| p.balance),
            lowest,
            inflow,
            outflow,
        })
    }

    /// Whether the balance ever drops below zero
    pub fn goes_negative(&self) -> bool {
        self.lowest.map_or(false, |(_, low)| low.is_negative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaveError;
    use crate::models::{CategoryId, Currency, RecurrenceRule, RecurrenceTemplate};
    use chrono::Weekday;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::new("USD").unwrap())
    }

    fn balances(points: &[ForecastPoint]) -> Vec<i64> {
        points.iter().map(|p| p.balance.minor_units()).collect()
    }

    #[test]
    fn test_weekly_template_with_actual() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        store
            .record(Transaction::actual(date(5), usd(-5000), cat))
            .unwrap();
        // 2025-01-01 is a Wednesday
        store
            .add_template(RecurrenceTemplate::new(
                usd(-2000),
                cat,
                date(1),
                RecurrenceRule::weekly(Weekday::Wed),
            ))
            .unwrap();

        let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let points = forecast(&store, as_of, date(14), usd(100_000)).unwrap();

        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(1), date(5), date(8)]);
        assert_eq!(balances(&points), vec![98_000, 93_000, 91_000]);
        assert!(points[0].transaction.is_projected());
        assert!(points[1].transaction.is_actual());
    }

    #[test]
    fn test_empty_when_horizon_not_after_as_of() {
        let mut store = LedgerStore::new();
        store
            .add_template(RecurrenceTemplate::new(
                usd(-100),
                CategoryId::new(),
                date(1),
                RecurrenceRule::daily(),
            ))
            .unwrap();
        assert!(forecast(&store, date(5), date(5), usd(0)).unwrap().is_empty());
        assert!(forecast(&store, date(5), date(4), usd(0)).unwrap().is_empty());
    }

    #[test]
    fn test_window_excludes_as_of_includes_horizon() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        store.record(Transaction::actual(date(5), usd(-1), cat)).unwrap();
        store.record(Transaction::actual(date(10), usd(-2), cat)).unwrap();
        store.record(Transaction::actual(date(11), usd(-4), cat)).unwrap();

        let points = forecast(&store, date(5), date(10), usd(0)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, date(10));
    }

    #[test]
    fn test_actuals_before_projections_on_same_day() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        store
            .add_template(RecurrenceTemplate::new(usd(-100), cat, date(3), RecurrenceRule::daily()))
            .unwrap();
        store.record(Transaction::actual(date(3), usd(500), cat)).unwrap();

        let points = forecast(&store, date(2), date(3), usd(0)).unwrap();
        assert!(points[0].transaction.is_actual());
        assert!(points[1].transaction.is_projected());
        assert_eq!(balances(&points), vec![500, 400]);
    }

    #[test]
    fn test_currency_mismatch() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        store.record(Transaction::actual(date(3), usd(-100), cat)).unwrap();

        let eur = Money::new(10_000, Currency::new("EUR").unwrap());
        assert!(matches!(
            forecast(&store, date(1), date(10), eur),
            Err(SaveError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_forecast_is_repeatable() {
        let mut store = LedgerStore::new();
        store
            .add_template(RecurrenceTemplate::new(
                usd(-100),
                CategoryId::new(),
                date(1),
                RecurrenceRule::monthly(15),
            ))
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let a = forecast(&store, date(1), end, usd(0)).unwrap();
        let b = forecast(&store, date(1), end, usd(0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_summary() {
        let cat = CategoryId::new();
        let txns = vec![
            Transaction::actual(date(1), usd(-300), cat),
            Transaction::actual(date(2), usd(1000), cat),
            Transaction::actual(date(3), usd(-200), cat),
        ];
        let points = running_balance(txns, usd(100)).unwrap();
        assert_eq!(balances(&points), vec![-200, 800, 600]);

        let summary = ForecastSummary::from_points(usd(100), &points).unwrap();
        assert_eq!(summary.closing, usd(600));
        assert_eq!(summary.lowest, Some((date(1), usd(-200))));
        assert_eq!(summary.inflow, usd(1000));
        assert_eq!(summary.outflow, usd(500));
        assert!(summary.goes_negative());

        let empty = ForecastSummary::from_points(usd(100), &[]).unwrap();
        assert_eq!(empty.closing, usd(100));
        assert_eq!(empty.lowest, None);
        assert!(!empty.goes_negative());
    }
}
