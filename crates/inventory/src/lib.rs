//! Inventory domain module.
//!
//! This crate contains the item model, the category registry and the derived
//! read-side selectors, implemented purely as deterministic logic (no IO, no
//! async, no gateway calls).

pub mod category;
pub mod item;
pub mod selectors;

pub use category::{CategoryFilter, CategoryRegistry, ALL_LABEL, DEFAULT_CATEGORIES};
pub use item::{clamp_quantity, InventoryItem, ItemDraft, ItemPatch, DEFAULT_MIN_STOCK};
