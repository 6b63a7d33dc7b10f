//! Recurrence template commands and queries

use chrono::NaiveDate;
use tracing::debug;

use super::ledger::Ledger;
use crate::audit::{AuditEntry, EntityType};
use crate::error::{SaveError, SaveResult};
use crate::ledger::recurrence;
use crate::models::{RecurrenceTemplate, TemplateId, TemplateUpdate, Transaction};
use crate::storage::{Changeset, LedgerStorage};

impl<S: LedgerStorage> Ledger<S> {
    /// Register a recurring cash flow
    pub fn create_recurrence_template(
        &self,
        template: RecurrenceTemplate,
    ) -> SaveResult<RecurrenceTemplate> {
        let mut state = self.write()?;
        state.tree.ensure_accepts_activity(template.category_id)?;
        let template = state.store.prepare_template(template)?;

        self.persist(&Changeset::new().template(template.clone()))?;
        state.store.commit_template(template.clone());
        drop(state);

        debug!(template = %template.id, rule = %template.rule, "created recurrence template");
        self.audit(vec![AuditEntry::create(
            EntityType::RecurrenceTemplate,
            template.id.to_string(),
            Some(template.note.clone()),
            &template,
        )]);
        Ok(template)
    }

    /// Change a template; already-materialized transactions are not touched
    pub fn update_recurrence_template(
        &self,
        id: TemplateId,
        update: TemplateUpdate,
    ) -> SaveResult<RecurrenceTemplate> {
        let mut state = self.write()?;
        if let Some(category_id) = update.category_id {
            state.tree.ensure_accepts_activity(category_id)?;
        }

        let before = state.store.require_template(id)?.clone();
        let template = state.store.prepare_template_update(id, &update)?;
        if template == before {
            return Ok(before);
        }

        self.persist(&Changeset::new().template(template.clone()))?;
        state.store.commit_template(template.clone());
        drop(state);

        debug!(template = %id, "updated recurrence template");
        self.audit(vec![AuditEntry::update(
            EntityType::RecurrenceTemplate,
            id.to_string(),
            Some(template.note.clone()),
            &before,
            &template,
        )]);
        Ok(template)
    }

    /// Turn every occurrence due on or before `through` into an actual
    /// transaction and advance the template's materialization mark
    ///
    /// Returns the transactions created; occurrences materialized earlier
    /// are never produced twice.
    pub fn materialize_template(
        &self,
        id: TemplateId,
        through: NaiveDate,
    ) -> SaveResult<Vec<Transaction>> {
        let mut state = self.write()?;
        let before = state.store.require_template(id)?.clone();
        state.tree.ensure_accepts_activity(before.category_id)?;

        let (created, template) = state.store.prepare_materialize(id, through)?;
        if created.is_empty() && template == before {
            return Ok(created);
        }

        self.persist(
            &Changeset::new()
                .transactions(created.iter().cloned())
                .template(template.clone()),
        )?;
        for txn in &created {
            state.store.commit_record(txn.clone());
        }
        state.store.commit_template(template.clone());
        drop(state);

        debug!(template = %id, count = created.len(), through = %through, "materialized template");
        let summary = format!("{} occurrence(s) through {}", created.len(), through);
        let mut entries = vec![AuditEntry::materialize(
            id.to_string(),
            Some(template.note.clone()),
            &template,
            summary,
        )];
        entries.extend(created.iter().map(|txn| {
            AuditEntry::create(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(txn.note.clone()),
                txn,
            )
        }));
        self.audit(entries);
        Ok(created)
    }

    // === Queries ===

    /// Templates in creation order
    pub fn templates(&self) -> SaveResult<Vec<RecurrenceTemplate>> {
        Ok(self.read()?.store.templates().to_vec())
    }

    pub fn template(&self, id: TemplateId) -> SaveResult<RecurrenceTemplate> {
        Ok(self.read()?.store.require_template(id)?.clone())
    }

    /// Resolve a full id or a short `tpl-xxxxxxxx` form
    pub fn find_template(&self, identifier: &str) -> SaveResult<RecurrenceTemplate> {
        let identifier = identifier.trim();
        let state = self.read()?;
        let found = match identifier.parse::<TemplateId>() {
            Ok(id) => state.store.template(id),
            Err(_) => state
                .store
                .templates()
                .iter()
                .find(|t| t.id.short() == identifier),
        };
        found
            .cloned()
            .ok_or_else(|| SaveError::unknown_template(identifier))
    }

    /// First occurrence of `id` on or after `date`, ignoring materialization
    pub fn next_occurrence(&self, id: TemplateId, date: NaiveDate) -> SaveResult<Option<NaiveDate>> {
        let state = self.read()?;
        let template = state.store.require_template(id)?;
        if !template.active {
            return Ok(None);
        }
        Ok(recurrence::next_occurrence(template, date))
    }
}
