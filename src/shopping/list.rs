use serde::{Deserialize, Serialize};

use crate::models::ShoppingListEntry;

/// Shopping list with at most one entry per case-insensitive (name, unit).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ShoppingListEntry>", into = "Vec<ShoppingListEntry>")]
pub struct ShoppingList {
    entries: Vec<ShoppingListEntry>,
}

fn same_key(entry: &ShoppingListEntry, name: &str, unit: &str) -> bool {
    entry.name.to_lowercase() == name.to_lowercase()
        && entry.unit.to_lowercase() == unit.to_lowercase()
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored entries, folding any duplicate keys.
    pub fn from_entries(entries: impl IntoIterator<Item = ShoppingListEntry>) -> Self {
        let mut list = Self::new();
        list.add_all(entries);
        list
    }

    pub fn entries(&self) -> &[ShoppingListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sums into an existing entry with the same key; the incoming
    /// alternatives replace the stored ones only when non-empty.
    pub fn add(&mut self, entry: ShoppingListEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| same_key(e, &entry.name, &entry.unit))
        {
            Some(existing) => {
                existing.quantity += entry.quantity;
                if !entry.alternatives.is_empty() {
                    existing.alternatives = entry.alternatives;
                }
            }
            None => self.entries.push(entry),
        }
    }

    pub fn add_all(&mut self, entries: impl IntoIterator<Item = ShoppingListEntry>) {
        for entry in entries {
            self.add(entry);
        }
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, name: &str, unit: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !same_key(e, name, unit));
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_entries(self) -> Vec<ShoppingListEntry> {
        self.entries
    }
}

impl From<Vec<ShoppingListEntry>> for ShoppingList {
    fn from(entries: Vec<ShoppingListEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<ShoppingList> for Vec<ShoppingListEntry> {
    fn from(list: ShoppingList) -> Self {
        list.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, unit: &str, quantity: f64, alternatives: &[&str]) -> ShoppingListEntry {
        ShoppingListEntry {
            name: name.into(),
            quantity,
            unit: unit.into(),
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn duplicate_key_sums_quantity() {
        let mut list = ShoppingList::new();
        list.add(entry("Tomato", "pcs", 2.0, &[]));
        list.add(entry("tomato", "PCS", 3.0, &[]));
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].quantity, 5.0);
        assert_eq!(list.entries()[0].name, "Tomato");
    }

    #[test]
    fn newer_alternatives_win_only_when_present() {
        let mut list = ShoppingList::new();
        list.add(entry("Pork", "g", 200.0, &["Chicken"]));
        list.add(entry("pork", "g", 100.0, &[]));
        assert_eq!(list.entries()[0].alternatives, vec!["Chicken"]);
        list.add(entry("PORK", "G", 50.0, &["Tofu", "Beef"]));
        assert_eq!(list.entries()[0].alternatives, vec!["Tofu", "Beef"]);
        assert_eq!(list.entries()[0].quantity, 350.0);
    }

    #[test]
    fn different_unit_is_a_different_entry() {
        let mut list = ShoppingList::new();
        list.add(entry("Rice", "g", 500.0, &[]));
        list.add(entry("Rice", "cup", 2.0, &[]));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_ignores_case_and_touches_only_the_match() {
        let mut list = ShoppingList::from_entries(vec![
            entry("Garlic", "bulb", 1.0, &[]),
            entry("Garlic", "clove", 3.0, &[]),
            entry("Sugar", "tsp", 1.0, &[]),
        ]);
        assert!(list.remove("GARLIC", "Bulb"));
        assert_eq!(list.len(), 2);
        assert!(!list.remove("garlic", "bulb"));
        assert_eq!(list.entries()[0].unit, "clove");
    }

    #[test]
    fn from_entries_folds_duplicates() {
        let list = ShoppingList::from_entries(vec![
            entry("Milk", "l", 1.0, &[]),
            entry("milk", "L", 1.0, &[]),
        ]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].quantity, 2.0);
    }

    #[test]
    fn serializes_as_plain_array() {
        let list = ShoppingList::from_entries(vec![entry("Salt", "tsp", 0.5, &[])]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        let back: ShoppingList = serde_json::from_value(json).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn clear_empties() {
        let mut list = ShoppingList::from_entries(vec![entry("Salt", "tsp", 0.5, &[])]);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn deserializing_folds_duplicate_keys() {
        let raw = r#"[
            {"name": "Milk", "quantity": 1, "unit": "L", "alternatives": []},
            {"name": "milk", "quantity": 2, "unit": "l", "alternatives": []}
        ]"#;
        let list: ShoppingList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].quantity, 3.0);

        let round: ShoppingList =
            serde_json::from_str(&serde_json::to_string(&list).unwrap()).unwrap();
        assert_eq!(round, list);
    }
}
