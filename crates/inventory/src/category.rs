//! Client-local category registry.
//!
//! Categories are plain labels with no identity of their own. The registry is
//! an ordered, deduplicated set used for tagging and filtering; it is never
//! persisted, and removing a label does not touch items that carry it.

use stocktrack_core::{DomainError, DomainResult};

use crate::item::InventoryItem;

/// Sentinel shown for the "no category filter" chip.
pub const ALL_LABEL: &str = "All";

/// Labels the registry is seeded with on every load.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["ATK", "Elektronik", "Kebersihan", "Pantry", "Lainnya"];

/// Active category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn only(label: impl Into<String>) -> Self {
        Self::Only(label.into())
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(label) => item.category == *label,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_LABEL,
            CategoryFilter::Only(label) => label,
        }
    }
}

/// Ordered set of category labels plus the currently active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    labels: Vec<String>,
    active: CategoryFilter,
}

impl CategoryRegistry {
    /// Registry seeded with [`DEFAULT_CATEGORIES`].
    pub fn new() -> Self {
        Self::with_labels(DEFAULT_CATEGORIES)
    }

    /// Registry seeded with the given labels (duplicates and blanks dropped).
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self {
            labels: Vec::new(),
            active: CategoryFilter::All,
        };
        for label in labels {
            // Seeds are trusted; a blank seed is simply skipped.
            let _ = registry.add(label);
        }
        registry
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Append `label` unless already present (case-sensitive exact match).
    ///
    /// Returns `Ok(true)` when the label was added.
    pub fn add(&mut self, label: impl Into<String>) -> DomainResult<bool> {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if self.contains(label) {
            return Ok(false);
        }
        self.labels.push(label.to_string());
        Ok(true)
    }

    /// Remove `label`; resets the active filter to "All" if it pointed at it.
    ///
    /// Returns `true` when the label was present.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        let removed = self.labels.len() != before;

        if matches!(&self.active, CategoryFilter::Only(active) if active == label) {
            self.active = CategoryFilter::All;
        }

        removed
    }

    pub fn active_filter(&self) -> &CategoryFilter {
        &self.active
    }

    /// Activate a filter. Only registered labels (or "All") are selectable.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> DomainResult<()> {
        if let CategoryFilter::Only(label) = &filter {
            if !self.contains(label) {
                return Err(DomainError::validation(format!("unknown category: {label}")));
            }
        }
        self.active = filter;
        Ok(())
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
