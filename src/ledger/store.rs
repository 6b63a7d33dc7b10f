//! Ledger store
//!
//! Holds every actual transaction version and every recurrence template.
//! Transactions are kept ordered by `(date, seq)` where `seq` is a
//! monotonically assigned insertion number, giving a total order for stable
//! iteration. Nothing is ever removed: amendments void the current version
//! and append a successor.
//!
//! Like the category tree, mutations come as a validating `prepare_*` step
//! and an infallible `commit_*` step.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;

use chrono::NaiveDate;

use super::recurrence;
use crate::error::{SaveError, SaveResult};
use crate::models::{
    CategoryId, RecurrenceTemplate, TemplateId, TemplateUpdate, Transaction,
    TransactionAmendment, TransactionId,
};

type OrderKey = (NaiveDate, u64);

/// Restricts a query to a set of categories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    categories: BTreeSet<CategoryId>,
}

impl CategoryFilter {
    pub fn new(categories: impl IntoIterator<Item = CategoryId>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
        }
    }

    pub fn single(category_id: CategoryId) -> Self {
        Self::new([category_id])
    }

    pub fn matches(&self, category_id: CategoryId) -> bool {
        self.categories.contains(&category_id)
    }
}

/// The two records an amendment writes
#[derive(Debug, Clone, PartialEq)]
pub struct Amendment {
    /// The previous version, now marked void
    pub voided: Transaction,
    /// The new live version
    pub successor: Transaction,
}

/// Ordered store of transaction versions and recurrence templates
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    records: BTreeMap<OrderKey, Transaction>,
    by_id: HashMap<TransactionId, OrderKey>,
    /// origin -> version ids, oldest first
    chains: HashMap<TransactionId, Vec<TransactionId>>,
    next_seq: u64,
    templates: Vec<RecurrenceTemplate>,
    template_index: HashMap<TemplateId, usize>,
    next_template_seq: u64,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            next_template_seq: 1,
            ..Default::default()
        }
    }

    /// Rebuild the store from persisted records
    ///
    /// Records without a sequence number get one in load order.
    pub fn from_records(
        mut transactions: Vec<Transaction>,
        mut templates: Vec<RecurrenceTemplate>,
    ) -> SaveResult<Self> {
        let mut store = Self::new();

        transactions.sort_by_key(|t| (t.seq == 0, t.seq, t.version));
        store.next_seq = transactions.iter().map(|t| t.seq).max().unwrap_or(0) + 1;
        for mut txn in transactions {
            if !txn.is_actual() {
                return Err(SaveError::Storage(format!(
                    "projected transaction {} found in stored data",
                    txn.id
                )));
            }
            if store.by_id.contains_key(&txn.id) {
                return Err(SaveError::Storage(format!(
                    "duplicate transaction record {}",
                    txn.id
                )));
            }
            if txn.seq == 0 {
                txn.seq = store.next_seq;
            }
            if let Some(existing) = store.records.get(&(txn.date, txn.seq)) {
                return Err(SaveError::Storage(format!(
                    "transaction records {} and {} share date {} and sequence {}",
                    existing.id, txn.id, txn.date, txn.seq
                )));
            }
            store.commit_record(txn);
        }

        templates.sort_by_key(|t| (t.seq == 0, t.seq));
        store.next_template_seq = templates.iter().map(|t| t.seq).max().unwrap_or(0) + 1;
        for mut template in templates {
            if store.template_index.contains_key(&template.id) {
                return Err(SaveError::Storage(format!(
                    "duplicate template record {}",
                    template.id
                )));
            }
            if template.seq == 0 {
                template.seq = store.next_template_seq;
            }
            store.commit_template(template);
        }

        Ok(store)
    }

    // === Transactions ===

    /// Number of stored versions, voided ones included
    pub fn version_count(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.by_id.get(&id).and_then(|key| self.records.get(key))
    }

    pub fn require(&self, id: TransactionId) -> SaveResult<&Transaction> {
        self.get(id)
            .ok_or_else(|| SaveError::unknown_transaction(id.to_string()))
    }

    /// Every version in `(date, seq)` order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.records.values()
    }

    /// Live actual transactions dated within `range`, in `(date, seq)` order
    pub fn query(
        &self,
        range: RangeInclusive<NaiveDate>,
        filter: Option<&CategoryFilter>,
    ) -> Vec<Transaction> {
        let (start, end) = range.into_inner();
        if start > end {
            return Vec::new();
        }
        self.records
            .range((start, 0)..=(end, u64::MAX))
            .map(|(_, txn)| txn)
            .filter(|txn| txn.is_live())
            .filter(|txn| filter.map_or(true, |f| f.matches(txn.category_id)))
            .cloned()
            .collect()
    }

    /// Every version of the logical transaction `id` belongs to, oldest first
    pub fn history(&self, id: TransactionId) -> SaveResult<Vec<Transaction>> {
        let origin = self.require(id)?.origin;
        let ids = self.chains.get(&origin).map(Vec::as_slice).unwrap_or(&[]);
        let mut versions: Vec<_> = ids.iter().filter_map(|v| self.get(*v)).cloned().collect();
        versions.sort_by_key(|t| t.version);
        Ok(versions)
    }

    /// The live version of the chain `id` belongs to
    pub fn current(&self, id: TransactionId) -> SaveResult<Transaction> {
        let history = self.history(id)?;
        history
            .into_iter()
            .rev()
            .find(|t| t.is_live())
            .ok_or_else(|| SaveError::unknown_transaction(id.to_string()))
    }

    /// Validate a new entry and assign its sequence number
    pub fn prepare_record(&self, mut txn: Transaction) -> SaveResult<Transaction> {
        if !txn.is_actual() {
            return Err(SaveError::Validation(
                "projected transactions cannot be recorded".into(),
            ));
        }
        if self.by_id.contains_key(&txn.id) {
            return Err(SaveError::Duplicate {
                entity_type: "Transaction",
                identifier: txn.id.to_string(),
            });
        }
        txn.origin = txn.id;
        txn.version = 1;
        txn.voided = false;
        txn.amends = None;
        txn.seq = self.next_seq;
        Ok(txn)
    }

    /// Validate several new entries at once, with consecutive sequence numbers
    pub fn prepare_batch(&self, txns: Vec<Transaction>) -> SaveResult<Vec<Transaction>> {
        let mut prepared = Vec::with_capacity(txns.len());
        for (offset, txn) in txns.into_iter().enumerate() {
            let mut txn = self.prepare_record(txn)?;
            txn.seq += offset as u64;
            prepared.push(txn);
        }
        Ok(prepared)
    }

    /// Build the void marker and successor for amending `id`
    pub fn prepare_amend(
        &self,
        id: TransactionId,
        changes: &TransactionAmendment,
    ) -> SaveResult<Amendment> {
        let current = self.require(id)?;
        if current.voided {
            return Err(SaveError::AmendTargetVoided(id.to_string()));
        }
        if changes.is_empty() {
            return Err(SaveError::Validation("amendment changes nothing".into()));
        }

        let mut successor = current.successor(changes);
        successor.seq = self.next_seq;

        let mut voided = current.clone();
        voided.voided = true;

        Ok(Amendment { voided, successor })
    }

    /// Install a prepared record (new entry or replacement of an existing version)
    pub fn commit_record(&mut self, txn: Transaction) {
        if let Some(old_key) = self.by_id.get(&txn.id).copied() {
            self.records.remove(&old_key);
        } else {
            self.chains.entry(txn.origin).or_default().push(txn.id);
        }
        let key = (txn.date, txn.seq);
        self.next_seq = self.next_seq.max(txn.seq + 1);
        self.by_id.insert(txn.id, key);
        self.records.insert(key, txn);
    }

    pub fn commit_amend(&mut self, amendment: Amendment) {
        self.commit_record(amendment.voided);
        self.commit_record(amendment.successor);
    }

    /// Record a new actual transaction
    pub fn record(&mut self, txn: Transaction) -> SaveResult<Transaction> {
        let txn = self.prepare_record(txn)?;
        self.commit_record(txn.clone());
        Ok(txn)
    }

    /// Amend a live version, returning the successor
    pub fn amend(
        &mut self,
        id: TransactionId,
        changes: &TransactionAmendment,
    ) -> SaveResult<Transaction> {
        let amendment = self.prepare_amend(id, changes)?;
        let successor = amendment.successor.clone();
        self.commit_amend(amendment);
        Ok(successor)
    }

    // === Templates ===

    pub fn template(&self, id: TemplateId) -> Option<&RecurrenceTemplate> {
        self.template_index.get(&id).map(|&i| &self.templates[i])
    }

    pub fn require_template(&self, id: TemplateId) -> SaveResult<&RecurrenceTemplate> {
        self.template(id)
            .ok_or_else(|| SaveError::unknown_template(id.to_string()))
    }

    /// Templates in insertion order
    pub fn templates(&self) -> &[RecurrenceTemplate] {
        &self.templates
    }

    /// Validate a new template and assign its sequence number
    pub fn prepare_template(&self, mut template: RecurrenceTemplate) -> SaveResult<RecurrenceTemplate> {
        template.validate()?;
        if self.template_index.contains_key(&template.id) {
            return Err(SaveError::Duplicate {
                entity_type: "Recurrence template",
                identifier: template.id.to_string(),
            });
        }
        template.seq = self.next_template_seq;
        template.last_materialized = None;
        Ok(template)
    }

    /// Build the updated template without installing it
    pub fn prepare_template_update(
        &self,
        id: TemplateId,
        update: &TemplateUpdate,
    ) -> SaveResult<RecurrenceTemplate> {
        let mut template = self.require_template(id)?.clone();
        template.apply(update);
        template.validate()?;
        Ok(template)
    }

    /// Install a prepared template (new or replacement)
    pub fn commit_template(&mut self, template: RecurrenceTemplate) {
        self.next_template_seq = self.next_template_seq.max(template.seq + 1);
        match self.template_index.get(&template.id) {
            Some(&i) => self.templates[i] = template,
            None => {
                self.template_index.insert(template.id, self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn add_template(&mut self, template: RecurrenceTemplate) -> SaveResult<RecurrenceTemplate> {
        let template = self.prepare_template(template)?;
        self.commit_template(template.clone());
        Ok(template)
    }

    /// Projected occurrences of every active template dated within `range`
    ///
    /// Occurrences on or before a template's `last_materialized` date are
    /// skipped since they already exist as actual transactions. Results are
    /// ordered by date, then template insertion order.
    pub fn projections(&self, range: RangeInclusive<NaiveDate>) -> Vec<Transaction> {
        let (start, end) = range.into_inner();
        if start > end {
            return Vec::new();
        }
        let to = end.succ_opt().unwrap_or(NaiveDate::MAX);

        let mut projected: Vec<(NaiveDate, u64, Transaction)> = Vec::new();
        for template in self.templates.iter().filter(|t| t.active) {
            let from = match template.last_materialized.and_then(|d| d.succ_opt()) {
                Some(after) => after.max(start),
                None if template.last_materialized.is_some() => continue,
                None => start,
            };
            projected.extend(
                recurrence::project(template, from, to).map(|txn| (txn.date, template.seq, txn)),
            );
        }
        projected.sort_by_key(|(date, seq, _)| (*date, *seq));
        projected.into_iter().map(|(_, _, txn)| txn).collect()
    }

    /// Build the actual transactions for every occurrence due through `through`
    ///
    /// Returns the new transactions (sequenced, not yet committed) and the
    /// template with its materialization mark advanced. Occurrences already
    /// materialized are not produced again.
    pub fn prepare_materialize(
        &self,
        id: TemplateId,
        through: NaiveDate,
    ) -> SaveResult<(Vec<Transaction>, RecurrenceTemplate)> {
        let template = self.require_template(id)?;
        if !template.active {
            return Err(SaveError::Validation(format!(
                "template {} is paused",
                template.id
            )));
        }

        let from = match template.last_materialized {
            Some(mark) if mark >= through => return Ok((Vec::new(), template.clone())),
            Some(mark) => mark.succ_opt().unwrap_or(mark),
            None => template.start_date,
        };
        let to = through.succ_opt().unwrap_or(NaiveDate::MAX);

        let due: Vec<Transaction> = recurrence::expand(template, from, to)
            .map(|date| {
                let mut txn = Transaction::actual(date, template.amount, template.category_id)
                    .with_note(template.note.clone());
                txn.template_id = Some(template.id);
                txn
            })
            .collect();
        let due = self.prepare_batch(due)?;

        let mut marked = template.clone();
        marked.last_materialized = Some(through);
        Ok((due, marked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money, RecurrenceRule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::new("USD").unwrap())
    }

    fn txn(day: u32, minor: i64, category: CategoryId) -> Transaction {
        Transaction::actual(date(2025, 1, day), usd(minor), category)
    }

    #[test]
    fn test_record_orders_by_date_then_sequence() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let late = store.record(txn(10, -100, cat)).unwrap();
        let first_on_5 = store.record(txn(5, -200, cat)).unwrap();
        let second_on_5 = store.record(txn(5, -300, cat)).unwrap();

        let ids: Vec<_> = store
            .query(date(2025, 1, 1)..=date(2025, 1, 31), None)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![first_on_5.id, second_on_5.id, late.id]);
        assert!(first_on_5.seq < second_on_5.seq);
    }

    #[test]
    fn test_query_range_and_filter() {
        let food = CategoryId::new();
        let rent = CategoryId::new();
        let mut store = LedgerStore::new();
        store.record(txn(1, -100, food)).unwrap();
        store.record(txn(15, -200, rent)).unwrap();
        store.record(txn(31, -300, food)).unwrap();

        let range = date(2025, 1, 1)..=date(2025, 1, 15);
        assert_eq!(store.query(range.clone(), None).len(), 2);
        let only_food = CategoryFilter::single(food);
        assert_eq!(store.query(range, Some(&only_food)).len(), 1);
        assert_eq!(
            store
                .query(date(2025, 1, 1)..=date(2025, 1, 31), Some(&only_food))
                .len(),
            2
        );
        assert!(store.query(date(2025, 2, 1)..=date(2025, 1, 1), None).is_empty());
    }

    #[test]
    fn test_amend_voids_and_appends() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let original = store.record(txn(5, -5000, cat)).unwrap();

        let changes = TransactionAmendment {
            amount: Some(usd(-4500)),
            ..Default::default()
        };
        let successor = store.amend(original.id, &changes).unwrap();

        assert_eq!(store.version_count(), 2);
        assert!(store.get(original.id).unwrap().voided);
        assert_eq!(successor.amends, Some(original.id));
        assert_eq!(successor.version, 2);

        // Queries only see the live version
        let live = store.query(date(2025, 1, 1)..=date(2025, 1, 31), None);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, successor.id);

        // History keeps both, reachable from either id
        let history = store.history(original.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(store.history(successor.id).unwrap(), history);
        assert_eq!(store.current(original.id).unwrap().id, successor.id);
    }

    #[test]
    fn test_amend_voided_version_rejected() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let original = store.record(txn(5, -5000, cat)).unwrap();
        let changes = TransactionAmendment {
            note: Some("fixed".into()),
            ..Default::default()
        };
        store.amend(original.id, &changes).unwrap();

        let err = store.amend(original.id, &changes).unwrap_err();
        assert!(matches!(err, SaveError::AmendTargetVoided(_)));
        assert_eq!(store.version_count(), 2);
    }

    #[test]
    fn test_amend_unknown_and_empty() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let original = store.record(txn(5, -5000, cat)).unwrap();

        let changes = TransactionAmendment {
            note: Some("x".into()),
            ..Default::default()
        };
        assert!(store
            .amend(TransactionId::new(), &changes)
            .unwrap_err()
            .is_unknown_reference());
        assert!(store
            .amend(original.id, &TransactionAmendment::default())
            .unwrap_err()
            .is_validation());
        assert_eq!(store.version_count(), 1);
    }

    #[test]
    fn test_amend_moving_date_keeps_order() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let a = store.record(txn(5, -100, cat)).unwrap();
        let b = store.record(txn(10, -200, cat)).unwrap();

        let changes = TransactionAmendment {
            date: Some(date(2025, 1, 20)),
            ..Default::default()
        };
        let a2 = store.amend(a.id, &changes).unwrap();
        let ids: Vec<_> = store
            .query(date(2025, 1, 1)..=date(2025, 1, 31), None)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![b.id, a2.id]);
    }

    #[test]
    fn test_record_rejects_projected() {
        let usd_cur = Currency::new("USD").unwrap();
        let template = RecurrenceTemplate::new(
            Money::new(-100, usd_cur),
            CategoryId::new(),
            date(2025, 1, 1),
            RecurrenceRule::daily(),
        );
        let mut store = LedgerStore::new();
        assert!(store.record(template.occurrence(date(2025, 1, 1))).is_err());
    }

    #[test]
    fn test_templates_keep_insertion_order() {
        let mut store = LedgerStore::new();
        let make = || {
            RecurrenceTemplate::new(
                usd(-100),
                CategoryId::new(),
                date(2025, 1, 1),
                RecurrenceRule::daily(),
            )
        };
        let a = store.add_template(make()).unwrap();
        let b = store.add_template(make()).unwrap();
        assert!(a.seq < b.seq);
        let ids: Vec<_> = store.templates().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        let invalid = RecurrenceTemplate::new(
            usd(-100),
            CategoryId::new(),
            date(2025, 1, 1),
            RecurrenceRule::daily().every(0),
        );
        assert!(matches!(
            store.add_template(invalid),
            Err(SaveError::InvalidRecurrenceRule(_))
        ));
        assert_eq!(store.templates().len(), 2);
    }

    #[test]
    fn test_template_update_validated_before_commit() {
        let mut store = LedgerStore::new();
        let template = store
            .add_template(RecurrenceTemplate::new(
                usd(-100),
                CategoryId::new(),
                date(2025, 1, 1),
                RecurrenceRule::daily(),
            ))
            .unwrap();

        let bad = TemplateUpdate {
            rule: Some(RecurrenceRule::monthly(40)),
            ..Default::default()
        };
        assert!(store.prepare_template_update(template.id, &bad).is_err());

        let good = TemplateUpdate {
            amount: Some(usd(-250)),
            ..Default::default()
        };
        let updated = store.prepare_template_update(template.id, &good).unwrap();
        store.commit_template(updated);
        assert_eq!(store.template(template.id).unwrap().amount, usd(-250));
        assert_eq!(store.templates().len(), 1);
    }

    #[test]
    fn test_projections_skip_materialized_and_paused() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let daily = store
            .add_template(RecurrenceTemplate::new(
                usd(-100),
                cat,
                date(2025, 1, 1),
                RecurrenceRule::daily(),
            ))
            .unwrap();
        let mut paused = RecurrenceTemplate::new(usd(-1), cat, date(2025, 1, 1), RecurrenceRule::daily());
        paused.active = false;
        store.add_template(paused).unwrap();

        let window = date(2025, 1, 1)..=date(2025, 1, 10);
        assert_eq!(store.projections(window.clone()).len(), 10);

        let (due, marked) = store.prepare_materialize(daily.id, date(2025, 1, 3)).unwrap();
        assert_eq!(due.len(), 3);
        assert!(due.iter().all(|t| t.is_actual() && t.template_id == Some(daily.id)));
        for txn in due {
            store.commit_record(txn);
        }
        store.commit_template(marked);

        let projected = store.projections(window);
        assert_eq!(projected.len(), 7);
        assert_eq!(projected[0].date, date(2025, 1, 4));

        // Materializing again through the same date is a no-op
        let (again, _) = store.prepare_materialize(daily.id, date(2025, 1, 3)).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_projections_order_same_day_by_template() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let first = store
            .add_template(RecurrenceTemplate::new(usd(-1), cat, date(2025, 1, 1), RecurrenceRule::daily()))
            .unwrap();
        let second = store
            .add_template(RecurrenceTemplate::new(usd(-2), cat, date(2025, 1, 1), RecurrenceRule::daily()))
            .unwrap();
        let projected = store.projections(date(2025, 1, 2)..=date(2025, 1, 2));
        let templates: Vec<_> = projected.iter().map(|t| t.template_id).collect();
        assert_eq!(templates, vec![Some(first.id), Some(second.id)]);
    }

    #[test]
    fn test_from_records_round_trip() {
        let cat = CategoryId::new();
        let mut store = LedgerStore::new();
        let a = store.record(txn(3, -100, cat)).unwrap();
        store
            .amend(
                a.id,
                &TransactionAmendment {
                    amount: Some(usd(-150)),
                    ..Default::default()
                },
            )
            .unwrap();
        store.record(txn(1, -50, cat)).unwrap();

        let transactions: Vec<_> = store.iter().cloned().collect();
        let rebuilt =
            LedgerStore::from_records(transactions.clone(), store.templates().to_vec()).unwrap();
        let again: Vec<_> = rebuilt.iter().cloned().collect();
        assert_eq!(again, transactions);
        assert_eq!(rebuilt.history(a.id).unwrap().len(), 2);

        // New records continue the sequence
        let mut rebuilt = rebuilt;
        let next = rebuilt.record(txn(1, -1, cat)).unwrap();
        assert!(transactions.iter().all(|t| t.seq < next.seq));
    }

    #[test]
    fn test_from_records_rejects_shared_order_key() {
        let cat = CategoryId::new();
        let mut first = txn(4, -100, cat);
        first.origin = first.id;
        first.seq = 7;
        let mut clash = txn(4, -200, cat);
        clash.origin = clash.id;
        clash.seq = 7;

        let result = LedgerStore::from_records(vec![first.clone(), clash], Vec::new());
        assert!(matches!(result, Err(SaveError::Storage(_))));

        // Same sequence on another day is fine
        let mut elsewhere = txn(5, -200, cat);
        elsewhere.origin = elsewhere.id;
        elsewhere.seq = 7;
        let store = LedgerStore::from_records(vec![first.clone(), elsewhere], Vec::new()).unwrap();
        assert_eq!(store.get(first.id).unwrap().id, first.id);
    }
}
