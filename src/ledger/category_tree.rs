//! Category tree
//!
//! Categories live in an arena keyed by id; parent links are plain ids that
//! are checked for existence and acyclicity whenever they are set.
//!
//! Mutations are split into a `prepare_*` step that validates against the
//! current tree and returns the record as it would be stored, and an
//! infallible [`CategoryTree::commit`] that installs it. The ledger service
//! persists the prepared record in between so a failed save never leaves a
//! half-applied change behind.

use std::collections::HashMap;

use crate::error::{SaveError, SaveResult};
use crate::models::{Category, CategoryId, Money};

/// Arena of categories with insertion order preserved
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<CategoryId, Category>,
    order: Vec<CategoryId>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from stored records, in any order
    pub fn from_records(categories: Vec<Category>) -> SaveResult<Self> {
        let mut tree = Self::new();
        for category in categories {
            if tree.nodes.contains_key(&category.id) {
                return Err(SaveError::Storage(format!(
                    "duplicate category record {}",
                    category.id
                )));
            }
            tree.order.push(category.id);
            tree.nodes.insert(category.id, category);
        }

        for category in tree.nodes.values() {
            if let Some(parent_id) = category.parent_id {
                if !tree.nodes.contains_key(&parent_id) {
                    return Err(SaveError::unknown_category(parent_id.to_string()));
                }
                tree.check_acyclic(category.id, parent_id)?;
            }
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.nodes.get(&id)
    }

    /// Look up a category, failing with `UnknownReference`
    pub fn require(&self, id: CategoryId) -> SaveResult<&Category> {
        self.get(id)
            .ok_or_else(|| SaveError::unknown_category(id.to_string()))
    }

    /// Find a category by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let name = name.trim().to_lowercase();
        self.iter().find(|c| c.name.to_lowercase() == name)
    }

    /// All categories in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Category> {
        self.iter().filter(|c| c.is_root())
    }

    pub fn children(&self, id: CategoryId) -> impl Iterator<Item = &Category> {
        self.iter().filter(move |c| c.parent_id == Some(id))
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: CategoryId) -> Ancestors<'_> {
        let next = self.get(id).and_then(|c| c.parent_id);
        Ancestors {
            tree: self,
            next,
            remaining: self.len(),
        }
    }

    /// Number of ancestors above `id`
    pub fn depth(&self, id: CategoryId) -> usize {
        self.ancestors(id).count()
    }

    /// `id` and every category below it
    pub fn subtree(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(self.children(current).map(|c| c.id));
            i += 1;
        }
        out
    }

    /// The category's own limit, else the nearest ancestor's
    pub fn effective_limit(&self, id: CategoryId) -> SaveResult<Option<Money>> {
        let category = self.require(id)?;
        if category.monthly_limit.is_some() {
            return Ok(category.monthly_limit);
        }
        Ok(self.ancestors(id).find_map(|a| a.monthly_limit))
    }

    /// Check that a category exists and still takes new activity
    pub fn ensure_accepts_activity(&self, id: CategoryId) -> SaveResult<&Category> {
        let category = self.require(id)?;
        if category.archived {
            return Err(SaveError::CategoryArchived(category.name.clone()));
        }
        Ok(category)
    }

    // === Mutations ===

    /// Validate a new category against the tree
    pub fn prepare_insert(&self, category: Category) -> SaveResult<Category> {
        category
            .validate()
            .map_err(|e| SaveError::Validation(e.to_string()))?;

        if self.contains(category.id) {
            return Err(SaveError::Duplicate {
                entity_type: "Category",
                identifier: category.id.to_string(),
            });
        }

        if let Some(parent_id) = category.parent_id {
            self.check_parent(category.id, parent_id)?;
        }

        Ok(category)
    }

    /// Validate moving `id` under `new_parent` (or to the top level)
    pub fn prepare_reparent(
        &self,
        id: CategoryId,
        new_parent: Option<CategoryId>,
    ) -> SaveResult<Category> {
        let mut category = self.require(id)?.clone();
        if let Some(parent_id) = new_parent {
            self.check_parent(id, parent_id)?;
        }
        category.parent_id = new_parent;
        category.updated_at = chrono::Utc::now();
        Ok(category)
    }

    pub fn prepare_rename(&self, id: CategoryId, name: &str) -> SaveResult<Category> {
        let mut category = self.require(id)?.clone();
        category.rename(name.trim());
        category
            .validate()
            .map_err(|e| SaveError::Validation(e.to_string()))?;
        Ok(category)
    }

    pub fn prepare_limit(&self, id: CategoryId, limit: Option<Money>) -> SaveResult<Category> {
        let mut category = self.require(id)?.clone();
        category.set_limit(limit);
        category
            .validate()
            .map_err(|e| SaveError::Validation(e.to_string()))?;
        Ok(category)
    }

    /// Validate archiving; children must be archived first
    pub fn prepare_archive(&self, id: CategoryId) -> SaveResult<Category> {
        let mut category = self.require(id)?.clone();
        let live_children = self.children(id).filter(|c| !c.archived).count();
        if live_children > 0 {
            return Err(SaveError::CategoryHasChildren {
                category: category.name,
                live_children,
            });
        }
        if !category.archived {
            category.archive();
        }
        Ok(category)
    }

    /// Install a prepared record
    pub fn commit(&mut self, category: Category) {
        if !self.nodes.contains_key(&category.id) {
            self.order.push(category.id);
        }
        self.nodes.insert(category.id, category);
    }

    /// Insert a new category
    pub fn insert(&mut self, category: Category) -> SaveResult<CategoryId> {
        let category = self.prepare_insert(category)?;
        let id = category.id;
        self.commit(category);
        Ok(id)
    }

    /// Archive a category; archiving twice is a no-op
    pub fn archive(&mut self, id: CategoryId) -> SaveResult<()> {
        let category = self.prepare_archive(id)?;
        self.commit(category);
        Ok(())
    }

    pub fn reparent(&mut self, id: CategoryId, new_parent: Option<CategoryId>) -> SaveResult<()> {
        let category = self.prepare_reparent(id, new_parent)?;
        self.commit(category);
        Ok(())
    }

    fn check_parent(&self, id: CategoryId, parent_id: CategoryId) -> SaveResult<()> {
        let parent = self.require(parent_id)?;
        if parent.archived {
            return Err(SaveError::CategoryArchived(parent.name.clone()));
        }
        self.check_acyclic(id, parent_id)
    }

    /// Walk up from `parent_id`; reaching `id` means a cycle
    ///
    /// The walk is bounded by the number of nodes, so corrupt data that
    /// already contains a loop is reported instead of spinning forever.
    fn check_acyclic(&self, id: CategoryId, parent_id: CategoryId) -> SaveResult<()> {
        let cycle = || SaveError::CycleDetected {
            category: id.to_string(),
            parent: parent_id.to_string(),
        };

        let mut current = Some(parent_id);
        let mut steps = 0;
        while let Some(cursor) = current {
            if cursor == id {
                return Err(cycle());
            }
            steps += 1;
            if steps > self.len() + 1 {
                return Err(cycle());
            }
            current = self.get(cursor).and_then(|c| c.parent_id);
        }
        Ok(())
    }
}

/// Iterator over a category's ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a CategoryTree,
    next: Option<CategoryId>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Category;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let category = self.tree.get(self.next?)?;
        self.next = category.parent_id;
        Some(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::new("USD").unwrap())
    }

    /// Housing > Rent > Deposit, plus a separate Food root
    fn sample() -> (CategoryTree, CategoryId, CategoryId, CategoryId, CategoryId) {
        let mut tree = CategoryTree::new();
        let housing = tree.insert(Category::new("Housing")).unwrap();
        let rent = tree.insert(Category::with_parent("Rent", housing)).unwrap();
        let deposit = tree.insert(Category::with_parent("Deposit", rent)).unwrap();
        let food = tree.insert(Category::new("Food")).unwrap();
        (tree, housing, rent, deposit, food)
    }

    #[test]
    fn test_effective_limit_none_without_limits() {
        let (tree, _, _, deposit, _) = sample();
        assert_eq!(tree.effective_limit(deposit).unwrap(), None);
    }

    #[test]
    fn test_effective_limit_inherits_from_root() {
        let (mut tree, housing, rent, deposit, food) = sample();
        let updated = tree.prepare_limit(housing, Some(usd(150_000))).unwrap();
        tree.commit(updated);

        assert_eq!(tree.effective_limit(rent).unwrap(), Some(usd(150_000)));
        assert_eq!(tree.effective_limit(deposit).unwrap(), Some(usd(150_000)));
        assert_eq!(tree.effective_limit(food).unwrap(), None);

        // Nearest ancestor wins
        let updated = tree.prepare_limit(rent, Some(usd(120_000))).unwrap();
        tree.commit(updated);
        assert_eq!(tree.effective_limit(deposit).unwrap(), Some(usd(120_000)));
        assert_eq!(tree.effective_limit(housing).unwrap(), Some(usd(150_000)));
    }

    #[test]
    fn test_effective_limit_unknown_id() {
        let (tree, ..) = sample();
        assert!(tree
            .effective_limit(CategoryId::new())
            .unwrap_err()
            .is_unknown_reference());
    }

    #[test]
    fn test_insert_unknown_parent() {
        let mut tree = CategoryTree::new();
        let err = tree
            .insert(Category::with_parent("Orphan", CategoryId::new()))
            .unwrap_err();
        assert!(err.is_unknown_reference());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_reparent_cycle_detected() {
        let (mut tree, housing, _, deposit, _) = sample();
        let err = tree.reparent(housing, Some(deposit)).unwrap_err();
        assert!(matches!(err, SaveError::CycleDetected { .. }));
        assert!(tree.get(housing).unwrap().is_root());

        let err = tree.reparent(housing, Some(housing)).unwrap_err();
        assert!(matches!(err, SaveError::CycleDetected { .. }));
    }

    #[test]
    fn test_reparent_ok() {
        let (mut tree, _, rent, deposit, food) = sample();
        tree.reparent(deposit, Some(food)).unwrap();
        assert_eq!(tree.depth(deposit), 1);
        assert_eq!(tree.children(rent).count(), 0);
    }

    #[test]
    fn test_archive_requires_bottom_up() {
        let (mut tree, housing, rent, deposit, _) = sample();

        let err = tree.archive(housing).unwrap_err();
        assert!(matches!(
            err,
            SaveError::CategoryHasChildren { live_children: 1, .. }
        ));

        tree.archive(deposit).unwrap();
        tree.archive(rent).unwrap();
        tree.archive(housing).unwrap();
        assert!(tree.get(housing).unwrap().archived);

        // Idempotent
        tree.archive(housing).unwrap();
    }

    #[test]
    fn test_archived_category_rejects_activity_and_children() {
        let (mut tree, _, _, _, food) = sample();
        tree.archive(food).unwrap();

        assert!(matches!(
            tree.ensure_accepts_activity(food),
            Err(SaveError::CategoryArchived(_))
        ));
        assert!(matches!(
            tree.insert(Category::with_parent("Snacks", food)),
            Err(SaveError::CategoryArchived(_))
        ));
    }

    #[test]
    fn test_traversal() {
        let (tree, housing, rent, deposit, food) = sample();
        let roots: Vec<_> = tree.roots().map(|c| c.id).collect();
        assert_eq!(roots, vec![housing, food]);

        let ancestors: Vec<_> = tree.ancestors(deposit).map(|c| c.id).collect();
        assert_eq!(ancestors, vec![rent, housing]);
        assert_eq!(tree.depth(deposit), 2);
        assert_eq!(tree.subtree(housing), vec![housing, rent, deposit]);
        assert_eq!(tree.find_by_name("food").unwrap().id, food);
    }

    #[test]
    fn test_from_records_rejects_cycles() {
        let mut a = Category::new("A");
        let mut b = Category::new("B");
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let err = CategoryTree::from_records(vec![a, b]).unwrap_err();
        assert!(matches!(err, SaveError::CycleDetected { .. }));
    }

    #[test]
    fn test_from_records_accepts_child_before_parent() {
        let parent = Category::new("Parent");
        let child = Category::with_parent("Child", parent.id);
        let tree = CategoryTree::from_records(vec![child.clone(), parent.clone()]).unwrap();
        assert_eq!(tree.depth(child.id), 1);
    }
}
