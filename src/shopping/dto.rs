use serde::Deserialize;

use crate::models::ShoppingListEntry;

#[derive(Debug, Deserialize)]
pub struct AddEntriesRequest {
    pub items: Vec<ShoppingListEntry>,
}

impl AddEntriesRequest {
    /// Trims names and units and drops entries without a name.
    pub fn into_entries(self) -> Result<Vec<ShoppingListEntry>, String> {
        let mut out = Vec::with_capacity(self.items.len());
        for mut item in self.items {
            item.name = item.name.trim().to_string();
            item.unit = item.unit.trim().to_string();
            if item.name.is_empty() {
                continue;
            }
            if !item.quantity.is_finite() || item.quantity < 0.0 {
                return Err(format!("invalid quantity for {}", item.name));
            }
            out.push(item);
        }
        Ok(out)
    }
}

/// Identifies one entry; matching is case-insensitive.
#[derive(Debug, Deserialize)]
pub struct EntryKey {
    pub name: String,
    #[serde(default)]
    pub unit: String,
}
