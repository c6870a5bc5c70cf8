use serde::{Deserialize, Serialize};

use stocktrack_core::{DomainError, DomainResult, ItemId};

/// Minimum stock assumed when the user does not state one.
pub const DEFAULT_MIN_STOCK: u32 = 5;

/// A stock item as confirmed by the remote store.
///
/// `quantity` and `min_stock` are unsigned, so the non-negative invariant holds
/// by construction; every decrement goes through [`clamp_quantity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    /// Soft reference into the category registry; may name a removed category.
    pub category: String,
    pub quantity: u32,
    pub unit: String,
    pub min_stock: u32,
}

impl InventoryItem {
    pub fn from_draft(id: ItemId, draft: ItemDraft) -> Self {
        Self {
            id,
            name: draft.name,
            category: draft.category,
            quantity: draft.quantity,
            unit: draft.unit,
            min_stock: draft.min_stock,
        }
    }

    /// Low-stock flag: quantity at or below the configured minimum.
    ///
    /// Never stored; recomputed on every call.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// Merge the set fields of `patch` into this item.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = &patch.unit {
            self.unit = unit.clone();
        }
        if let Some(min_stock) = patch.min_stock {
            self.min_stock = min_stock;
        }
    }

    /// Strip the identifier, e.g. to write the item back as a document.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            category: self.category.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            min_stock: self.min_stock,
        }
    }
}

/// Apply a signed stock delta, clamping at zero instead of failing.
///
/// Saturates at `u32::MAX` on the way up.
pub fn clamp_quantity(quantity: u32, delta: i64) -> u32 {
    let next = i64::from(quantity).saturating_add(delta);
    next.clamp(0, i64::from(u32::MAX)) as u32
}

/// Candidate item that has not been persisted yet (no id).
///
/// Produced by the AI extractor or by manual entry. Not validated until
/// [`ItemDraft::validate`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub unit: String,
    pub min_stock: u32,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity: 0,
            unit: String::new(),
            min_stock: DEFAULT_MIN_STOCK,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_min_stock(mut self, min_stock: u32) -> Self {
        self.min_stock = min_stock;
        self
    }

    /// Client-side checks that run before any gateway call.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        Ok(())
    }

    /// Trim surrounding whitespace from the text fields.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.unit = self.unit.trim().to_string();
        self
    }

    /// Merge the set fields of `patch` into this draft (preview edits).
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = &patch.unit {
            self.unit = unit.clone();
        }
        if let Some(min_stock) = patch.min_stock {
            self.min_stock = min_stock;
        }
    }
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<u32>,
}

impl ItemPatch {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn min_stock(min_stock: u32) -> Self {
        Self {
            min_stock: Some(min_stock),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.min_stock.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("patch has no fields"));
        }
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if matches!(&self.category, Some(category) if category.trim().is_empty()) {
            return Err(DomainError::validation("category cannot be empty"));
        }
        Ok(())
    }
}
