//! Category model
//!
//! Categories form a tree through optional parent references. A category may
//! carry its own monthly limit; when it does not, the nearest ancestor's
//! limit applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;

const MAX_NAME_LEN: usize = 50;

/// A budget category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// Parent category, if any
    pub parent_id: Option<CategoryId>,

    /// Monthly spending cap; `None` inherits from the nearest ancestor
    pub monthly_limit: Option<Money>,

    /// Archived categories keep their history but take no new activity
    #[serde(default)]
    pub archived: bool,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new top-level category
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            parent_id: None,
            monthly_limit: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new category under `parent_id`
    pub fn with_parent(name: impl Into<String>, parent_id: CategoryId) -> Self {
        let mut category = Self::new(name);
        category.parent_id = Some(parent_id);
        category
    }

    /// Builder-style limit setter
    pub fn with_limit(mut self, limit: Money) -> Self {
        self.monthly_limit = Some(limit);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn set_limit(&mut self, limit: Option<Money>) {
        self.monthly_limit = limit;
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(CategoryValidationError::NameTooLong(self.name.chars().count()));
        }

        if let Some(limit) = self.monthly_limit {
            if limit.is_negative() {
                return Err(CategoryValidationError::NegativeLimit);
            }
        }

        if self.parent_id == Some(self.id) {
            return Err(CategoryValidationError::OwnParent);
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeLimit,
    OwnParent,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
            Self::NegativeLimit => write!(f, "Monthly limit cannot be negative"),
            Self::OwnParent => write!(f, "Category cannot be its own parent"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
