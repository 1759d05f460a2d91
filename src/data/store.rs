use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Family, InventoryItem, InventoryPatch, NewFamily, NewInventoryItem, ShoppingListEntry,
};

/// One place the household's data can live.
///
/// `PgStore` talks to the managed backend; `LocalStore` serves the JSON
/// blobs and bundled sample data. `DataService` decides which one answers.
#[async_trait]
pub trait FridgeStore: Send + Sync {
    /// `None` when no family has been stored yet.
    async fn get_family(&self) -> anyhow::Result<Option<Family>>;
    async fn create_family(&self, family: NewFamily) -> anyhow::Result<Family>;
    async fn update_family(&self, family: &Family) -> anyhow::Result<Family>;

    async fn get_inventory(&self) -> anyhow::Result<Vec<InventoryItem>>;
    async fn add_inventory_item(&self, item: &NewInventoryItem) -> anyhow::Result<InventoryItem>;
    /// Saves all of `items` or none of them.
    async fn add_inventory_items(
        &self,
        items: &[NewInventoryItem],
    ) -> anyhow::Result<Vec<InventoryItem>>;
    /// `None` when the item does not exist.
    async fn update_inventory_item(
        &self,
        item_id: Uuid,
        patch: &InventoryPatch,
    ) -> anyhow::Result<Option<InventoryItem>>;
    async fn remove_inventory_item(&self, item_id: Uuid) -> anyhow::Result<()>;

    async fn get_shopping_list(&self) -> anyhow::Result<Vec<ShoppingListEntry>>;
    async fn add_to_shopping_list(&self, entries: &[ShoppingListEntry]) -> anyhow::Result<()>;
    async fn remove_from_shopping_list(&self, name: &str, unit: &str) -> anyhow::Result<()>;
    async fn mark_purchased(&self, name: &str, unit: &str) -> anyhow::Result<()>;
    async fn clear_shopping_list(&self) -> anyhow::Result<()>;
}
