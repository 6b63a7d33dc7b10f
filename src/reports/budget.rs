//! Budget evaluation
//!
//! Per-category spending for one calendar month, compared against each
//! category's effective limit.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SaveResult;
use crate::ledger::{CategoryTree, LedgerStore};
use crate::models::{CategoryId, Currency, Money, Transaction, YearMonth};

/// Whether projected occurrences count toward spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    #[default]
    ActualOnly,
    IncludeProjected,
}

/// Spending relative to the effective limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Under,
    At,
    Over,
    /// No limit on the category or any ancestor
    Unlimited,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Under => write!(f, "under"),
            Self::At => write!(f, "at limit"),
            Self::Over => write!(f, "OVER"),
            Self::Unlimited => write!(f, "-"),
        }
    }
}

/// One category's line in a monthly evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudgetReport {
    pub category_id: CategoryId,
    pub name: String,
    pub archived: bool,
    /// Net outflow for the month, never negative
    pub spent: Money,
    /// Effective limit (own or inherited)
    pub limit: Option<Money>,
    /// `limit - spent`; negative when over
    pub remaining: Option<Money>,
    pub status: BudgetStatus,
}

impl CategoryBudgetReport {
    pub fn is_over(&self) -> bool {
        self.status == BudgetStatus::Over
    }
}

/// Evaluate every category for `month`
///
/// Categories are reported in insertion order, archived and inactive ones
/// included. Amounts are summed per category without rolling children up
/// into parents. `spent` is in the limit's currency, or `base_currency`
/// for unlimited categories.
pub fn evaluate(
    tree: &CategoryTree,
    store: &LedgerStore,
    month: YearMonth,
    mode: ProjectionMode,
    base_currency: Currency,
) -> SaveResult<Vec<CategoryBudgetReport>> {
    let range = month.first_day()..=month.last_day();
    let mut activity: HashMap<CategoryId, Vec<Transaction>> = HashMap::new();

    for txn in store.query(range.clone(), None) {
        activity.entry(txn.category_id).or_default().push(txn);
    }
    if mode == ProjectionMode::IncludeProjected {
        for txn in store.projections(range) {
            activity.entry(txn.category_id).or_default().push(txn);
        }
    }

    tree.iter()
        .map(|category| -> SaveResult<CategoryBudgetReport> {
            let limit = tree.effective_limit(category.id)?;
            let currency = limit.map_or(base_currency, |l| l.currency());
            let txns = activity.get(&category.id).map(Vec::as_slice).unwrap_or(&[]);
            let net = Money::sum(currency, txns.iter().map(|t| &t.amount))?;
            let spent = if net.is_negative() {
                net.negate()?
            } else {
                Money::zero(currency)
            };

            let (remaining, status) = match limit {
                Some(limit) => {
                    let status = match spent.compare(&limit)? {
                        std::cmp::Ordering::Less => BudgetStatus::Under,
                        std::cmp::Ordering::Equal => BudgetStatus::At,
                        std::cmp::Ordering::Greater => BudgetStatus::Over,
                    };
                    (Some(limit.subtract(&spent)?), status)
                }
                None => (None, BudgetStatus::Unlimited),
            };

            Ok(CategoryBudgetReport {
                category_id: category.id,
                name: category.name.clone(),
                archived: category.archived,
                spent,
                limit,
                remaining,
                status,
            })
        })
        .collect()
}
