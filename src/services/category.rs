//! Category commands and queries

use tracing::debug;

use super::ledger::Ledger;
use crate::audit::{AuditEntry, EntityType};
use crate::error::{SaveError, SaveResult};
use crate::ledger::CategoryTree;
use crate::models::{Category, CategoryId, Money};
use crate::storage::{Changeset, LedgerStorage};

impl<S: LedgerStorage> Ledger<S> {
    /// Create a category, optionally under `parent_id` and with a monthly limit
    pub fn create_category(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
        monthly_limit: Option<Money>,
    ) -> SaveResult<Category> {
        let mut state = self.write()?;

        let name = name.trim();
        ensure_unique_name(&state.tree, name, None)?;

        let mut category = match parent_id {
            Some(parent_id) => Category::with_parent(name, parent_id),
            None => Category::new(name),
        };
        category.monthly_limit = monthly_limit;
        let category = state.tree.prepare_insert(category)?;

        self.persist(&Changeset::new().category(category.clone()))?;
        state.tree.commit(category.clone());
        drop(state);

        debug!(category = %category.id, name = %category.name, "created category");
        self.audit(vec![AuditEntry::create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )]);
        Ok(category)
    }

    pub fn rename_category(&self, id: CategoryId, name: &str) -> SaveResult<Category> {
        self.update_category(id, |tree| {
            ensure_unique_name(tree, name.trim(), Some(id))?;
            tree.prepare_rename(id, name)
        })
    }

    /// Set or clear a category's own monthly limit
    pub fn set_category_limit(&self, id: CategoryId, limit: Option<Money>) -> SaveResult<Category> {
        self.update_category(id, |tree| tree.prepare_limit(id, limit))
    }

    /// Move a category under another parent, or to the top level
    pub fn move_category(&self, id: CategoryId, parent_id: Option<CategoryId>) -> SaveResult<Category> {
        self.update_category(id, |tree| tree.prepare_reparent(id, parent_id))
    }

    /// Archive a category; its live children must be archived first
    pub fn archive_category(&self, id: CategoryId) -> SaveResult<Category> {
        let mut state = self.write()?;
        let before = state.tree.require(id)?.clone();
        let category = state.tree.prepare_archive(id)?;
        if before.archived {
            return Ok(category);
        }

        self.persist(&Changeset::new().category(category.clone()))?;
        state.tree.commit(category.clone());
        drop(state);

        debug!(category = %id, "archived category");
        self.audit(vec![AuditEntry::archive(
            id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )]);
        Ok(category)
    }

    fn update_category<F>(&self, id: CategoryId, prepare: F) -> SaveResult<Category>
    where
        F: FnOnce(&CategoryTree) -> SaveResult<Category>,
    {
        let mut state = self.write()?;
        let before = state.tree.require(id)?.clone();
        let category = prepare(&state.tree)?;
        let unchanged = Category {
            updated_at: before.updated_at,
            ..category.clone()
        } == before;
        if unchanged {
            return Ok(before);
        }

        self.persist(&Changeset::new().category(category.clone()))?;
        state.tree.commit(category.clone());
        drop(state);

        debug!(category = %id, "updated category");
        self.audit(vec![AuditEntry::update(
            EntityType::Category,
            id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )]);
        Ok(category)
    }

    // === Queries ===

    /// A copy of the category hierarchy
    pub fn category_tree(&self) -> SaveResult<CategoryTree> {
        Ok(self.read()?.tree.clone())
    }

    pub fn get_category(&self, id: CategoryId) -> SaveResult<Category> {
        Ok(self.read()?.tree.require(id)?.clone())
    }

    /// Find a category by name (case-insensitive) or by id
    pub fn find_category(&self, identifier: &str) -> SaveResult<Category> {
        let state = self.read()?;
        if let Some(category) = state.tree.find_by_name(identifier) {
            return Ok(category.clone());
        }

        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<CategoryId>() {
            return Ok(state.tree.require(id)?.clone());
        }
        let found = state
            .tree
            .iter()
            .find(|c| c.id.short() == identifier)
            .cloned()
            .ok_or_else(|| SaveError::unknown_category(identifier));
        found
    }

    /// Own limit, else the nearest ancestor's
    pub fn effective_limit(&self, id: CategoryId) -> SaveResult<Option<Money>> {
        self.read()?.tree.effective_limit(id)
    }
}

/// Category names are unique (case-insensitive) across the tree
fn ensure_unique_name(tree: &CategoryTree, name: &str, current: Option<CategoryId>) -> SaveResult<()> {
    match tree.find_by_name(name) {
        Some(existing) if Some(existing.id) != current => Err(SaveError::Duplicate {
            entity_type: "Category",
            identifier: name.to_string(),
        }),
        _ => Ok(()),
    }
}
