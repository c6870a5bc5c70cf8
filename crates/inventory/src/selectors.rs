//! Derived read-side selectors.
//!
//! Pure functions over a snapshot; nothing here is cached, so results always
//! reflect the list they are given.

use crate::category::CategoryFilter;
use crate::item::InventoryItem;

pub fn filter_by_category<'a>(
    items: &'a [InventoryItem],
    filter: &CategoryFilter,
) -> Vec<&'a InventoryItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Case-insensitive substring match on the item name.
///
/// A blank query matches everything.
pub fn search_by_name<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    items.iter().filter(|item| name_matches(item, query)).collect()
}

/// Category filter and name search combined (what the list view renders).
pub fn visible_items<'a>(
    items: &'a [InventoryItem],
    filter: &CategoryFilter,
    query: &str,
) -> Vec<&'a InventoryItem> {
    items
        .iter()
        .filter(|item| filter.matches(item) && name_matches(item, query))
        .collect()
}

pub fn count_total(items: &[InventoryItem]) -> usize {
    items.len()
}

pub fn count_low_stock(items: &[InventoryItem]) -> usize {
    items.iter().filter(|item| item.is_low_stock()).count()
}

fn name_matches(item: &InventoryItem, query: &str) -> bool {
    let needle = query.trim();
    if needle.is_empty() {
        return true;
    }
    item.name.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;
    use stocktrack_core::ItemId;

    fn item(id: &str, name: &str, category: &str, quantity: u32, min_stock: u32) -> InventoryItem {
        InventoryItem::from_draft(
            ItemId::from(id),
            ItemDraft::new(name, category)
                .with_quantity(quantity)
                .with_unit("Pcs")
                .with_min_stock(min_stock),
        )
    }

    fn sample() -> Vec<InventoryItem> {
        vec![
            item("1", "Kertas A4", "ATK", 10, 5),
            item("2", "Sapu Lantai", "Kebersihan", 1, 2),
            item("3", "Kertas Folio", "ATK", 3, 5),
            item("4", "Mouse Wireless", "Elektronik", 8, 2),
        ]
    }

    #[test]
    fn category_filter_all_returns_everything() {
        let items = sample();
        assert_eq!(filter_by_category(&items, &CategoryFilter::All).len(), 4);
    }

    #[test]
    fn category_filter_only_matches_exact_label() {
        let items = sample();
        let atk = filter_by_category(&items, &CategoryFilter::only("ATK"));
        assert_eq!(atk.len(), 2);
        assert!(atk.iter().all(|i| i.category == "ATK"));
        assert!(filter_by_category(&items, &CategoryFilter::only("atk")).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let items = sample();
        let hits = search_by_name(&items, "KERTAS");
        assert_eq!(hits.len(), 2);
        assert_eq!(search_by_name(&items, "wire").len(), 1);
        assert_eq!(search_by_name(&items, "  ").len(), 4);
    }

    #[test]
    fn visible_items_combines_filter_and_search() {
        let items = sample();
        let hits = visible_items(&items, &CategoryFilter::only("ATK"), "folio");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ItemId::from("3"));
    }

    #[test]
    fn counts_total_and_low_stock() {
        let items = sample();
        assert_eq!(count_total(&items), 4);
        assert_eq!(count_low_stock(&items), 2);
    }

    #[test]
    fn counts_on_empty_list_are_zero() {
        assert_eq!(count_total(&[]), 0);
        assert_eq!(count_low_stock(&[]), 0);
    }
}
