use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::store::FridgeStore;
use crate::family::repo as family_repo;
use crate::inventory::repo as inventory_repo;
use crate::models::{
    Family, InventoryItem, InventoryPatch, NewFamily, NewInventoryItem, ShoppingListEntry,
    DEFAULT_FAMILY_ID,
};
use crate::shopping::repo as shopping_repo;

/// Managed Postgres backend. Inventory and shopping rows hang off the
/// single household id.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    family_id: Uuid,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            family_id: DEFAULT_FAMILY_ID,
        }
    }
}

#[async_trait]
impl FridgeStore for PgStore {
    async fn get_family(&self) -> anyhow::Result<Option<Family>> {
        family_repo::find_default(&self.db).await
    }

    async fn create_family(&self, family: NewFamily) -> anyhow::Result<Family> {
        family_repo::create(&self.db, &family).await
    }

    async fn update_family(&self, family: &Family) -> anyhow::Result<Family> {
        family_repo::update(&self.db, family).await
    }

    async fn get_inventory(&self) -> anyhow::Result<Vec<InventoryItem>> {
        inventory_repo::list_by_family(&self.db, self.family_id).await
    }

    async fn add_inventory_item(&self, item: &NewInventoryItem) -> anyhow::Result<InventoryItem> {
        inventory_repo::insert(&self.db, self.family_id, item).await
    }

    async fn add_inventory_items(
        &self,
        items: &[NewInventoryItem],
    ) -> anyhow::Result<Vec<InventoryItem>> {
        inventory_repo::insert_many(&self.db, self.family_id, items).await
    }

    async fn update_inventory_item(
        &self,
        item_id: Uuid,
        patch: &InventoryPatch,
    ) -> anyhow::Result<Option<InventoryItem>> {
        inventory_repo::update(&self.db, item_id, patch).await
    }

    async fn remove_inventory_item(&self, item_id: Uuid) -> anyhow::Result<()> {
        inventory_repo::delete(&self.db, item_id).await
    }

    async fn get_shopping_list(&self) -> anyhow::Result<Vec<ShoppingListEntry>> {
        shopping_repo::list_open(&self.db, self.family_id).await
    }

    async fn add_to_shopping_list(&self, entries: &[ShoppingListEntry]) -> anyhow::Result<()> {
        shopping_repo::upsert_many(&self.db, self.family_id, entries).await
    }

    async fn remove_from_shopping_list(&self, name: &str, unit: &str) -> anyhow::Result<()> {
        shopping_repo::delete_one(&self.db, self.family_id, name, unit).await
    }

    async fn mark_purchased(&self, name: &str, unit: &str) -> anyhow::Result<()> {
        if !shopping_repo::mark_purchased(&self.db, self.family_id, name, unit).await? {
            debug!(%name, %unit, "no open shopping entry to mark purchased");
        }
        Ok(())
    }

    async fn clear_shopping_list(&self) -> anyhow::Result<()> {
        shopping_repo::delete_all(&self.db, self.family_id).await
    }
}
