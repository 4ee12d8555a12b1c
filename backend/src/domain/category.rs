//! Category data model.
//!
//! Categories form a forest: every category holds an optional parent
//! reference and children are discovered by back-reference lookup. The
//! parent relation must stay acyclic; writes are guarded by the store and
//! traversals in [`crate::domain::hierarchy`] tolerate corrupt data anyway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CategoryId;
use super::slug::is_valid_slug;

const NAME_MAX: usize = 100;
const SLUG_MAX: usize = 120;

/// Validation errors returned by [`Category`] constructors and setters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    /// Name is empty after trimming.
    #[error("category name must not be empty")]
    EmptyName,
    /// Name exceeds the storage limit.
    #[error("category name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Slug is empty, padded, or contains characters outside `[a-z0-9-]`.
    #[error("slug must contain only lowercase letters, digits, and hyphens")]
    InvalidSlug,
    /// Slug exceeds the storage limit.
    #[error("slug must be at most {max} characters")]
    SlugTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// A node in the catalog's category forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// URL-safe unique slug.
    pub slug: String,
    /// Parent category, `None` for roots.
    pub parent: Option<CategoryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Validate inputs and construct a category with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        slug: impl Into<String>,
        parent: Option<CategoryId>,
    ) -> Result<Self, CategoryValidationError> {
        let name = name.into();
        let slug = slug.into();
        validate_name(&name)?;
        validate_slug(&slug)?;
        let now = Utc::now();
        Ok(Self {
            id: CategoryId::random(),
            name,
            description,
            slug,
            parent,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the category sits at the root of the forest.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CategoryValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Replace the slug.
    pub fn set_slug(&mut self, slug: impl Into<String>) -> Result<(), CategoryValidationError> {
        let slug = slug.into();
        validate_slug(&slug)?;
        self.slug = slug;
        self.touch();
        Ok(())
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Refresh the modification timestamp after a field change.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX {
        return Err(CategoryValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), CategoryValidationError> {
    if !is_valid_slug(slug) {
        return Err(CategoryValidationError::InvalidSlug);
    }
    if slug.len() > SLUG_MAX {
        return Err(CategoryValidationError::SlugTooLong { max: SLUG_MAX });
    }
    Ok(())
}

/// A category with its children, as returned by the tree endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTreeNode {
    /// The category at this position in the forest.
    pub category: Category,
    /// Child nodes, sorted by name.
    pub children: Vec<CategoryTreeNode>,
}
