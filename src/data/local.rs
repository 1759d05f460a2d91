use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::samples::{sample_family, sample_inventory};
use super::store::FridgeStore;
use crate::models::{
    Family, InventoryItem, InventoryPatch, NewFamily, NewInventoryItem, ShoppingListEntry,
};
use crate::storage::{LocalStorage, FAMILY_KEY, SHOPPING_LIST_KEY};

/// Fallback store: the family and shopping list come from local blobs,
/// everything else from the bundled samples.
///
/// Shopping list writes are owned by the session's persistence effects,
/// so the mutating shopping calls here only acknowledge.
#[derive(Clone)]
pub struct LocalStore {
    storage: LocalStorage,
}

impl LocalStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl FridgeStore for LocalStore {
    async fn get_family(&self) -> anyhow::Result<Option<Family>> {
        Ok(Some(
            self.storage
                .get_json::<Family>(FAMILY_KEY)
                .unwrap_or_else(sample_family),
        ))
    }

    async fn create_family(&self, family: NewFamily) -> anyhow::Result<Family> {
        let family = family.into_family(Uuid::new_v4(), OffsetDateTime::now_utc());
        self.storage.set_json(FAMILY_KEY, &family)?;
        Ok(family)
    }

    async fn update_family(&self, family: &Family) -> anyhow::Result<Family> {
        self.storage.set_json(FAMILY_KEY, family)?;
        Ok(family.clone())
    }

    async fn get_inventory(&self) -> anyhow::Result<Vec<InventoryItem>> {
        Ok(sample_inventory())
    }

    async fn add_inventory_item(&self, _item: &NewInventoryItem) -> anyhow::Result<InventoryItem> {
        anyhow::bail!("local storage does not hold inventory")
    }

    async fn add_inventory_items(
        &self,
        _items: &[NewInventoryItem],
    ) -> anyhow::Result<Vec<InventoryItem>> {
        anyhow::bail!("local storage does not hold inventory")
    }

    async fn update_inventory_item(
        &self,
        _item_id: Uuid,
        _patch: &InventoryPatch,
    ) -> anyhow::Result<Option<InventoryItem>> {
        Ok(None)
    }

    async fn remove_inventory_item(&self, _item_id: Uuid) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_shopping_list(&self) -> anyhow::Result<Vec<ShoppingListEntry>> {
        Ok(self
            .storage
            .get_json::<Vec<ShoppingListEntry>>(SHOPPING_LIST_KEY)
            .unwrap_or_default())
    }

    async fn add_to_shopping_list(&self, _entries: &[ShoppingListEntry]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove_from_shopping_list(&self, _name: &str, _unit: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn mark_purchased(&self, _name: &str, _unit: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear_shopping_list(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
