use serde::{Deserialize, Serialize};

use stocktrack_core::ItemId;
use stocktrack_inventory::{clamp_quantity, InventoryItem, ItemDraft, ItemPatch};

/// Stored document shape: the item fields minus `id`.
///
/// The store keeps the id alongside the document, never inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub unit: String,
    pub min_stock: u32,
}

impl ItemDocument {
    pub fn into_item(self, id: ItemId) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            min_stock: self.min_stock,
        }
    }

    /// Field-level merge; unset patch fields leave the document untouched.
    pub fn merge(&mut self, patch: &ItemPatch) {
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

    pub fn increment_quantity(&mut self, delta: i64) {
        self.quantity = clamp_quantity(self.quantity, delta);
    }
}

impl From<&ItemDraft> for ItemDocument {
    fn from(draft: &ItemDraft) -> Self {
        Self {
            name: draft.name.clone(),
            category: draft.category.clone(),
            quantity: draft.quantity,
            unit: draft.unit.clone(),
            min_stock: draft.min_stock,
        }
    }
}
