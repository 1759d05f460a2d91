//! Data access facade.
//!
//! Every call picks a store on its own: the managed backend when one is
//! configured, otherwise (or when the backend call fails) the local store.
//! Inventory writes are the exception and never fall back.

pub mod local;
pub mod remote;
pub mod samples;
pub mod store;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{RecipeModel, RecipeRequest};
use crate::models::{
    Family, InventoryItem, InventoryPatch, NewFamily, NewInventoryItem, Recipe, ShoppingListEntry,
};
use self::store::FridgeStore;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("managed backend not configured")]
    BackendNotConfigured,
    #[error("backend error: {0}")]
    Backend(anyhow::Error),
    #[error("local storage error: {0}")]
    Local(anyhow::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InitializeOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct DataService {
    remote: Option<Arc<dyn FridgeStore>>,
    local: Arc<dyn FridgeStore>,
    recipes: Arc<dyn RecipeModel>,
}

impl DataService {
    pub fn new(
        remote: Option<Arc<dyn FridgeStore>>,
        local: Arc<dyn FridgeStore>,
        recipes: Arc<dyn RecipeModel>,
    ) -> Self {
        Self {
            remote,
            local,
            recipes,
        }
    }

    pub fn backend_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn get_family(&self) -> Result<Family, DataError> {
        if let Some(remote) = &self.remote {
            match remote.get_family().await {
                Ok(Some(family)) => return Ok(family),
                Ok(None) => info!("no family in backend; using local family"),
                Err(e) => warn!(error = %e, "backend get_family failed; using local data"),
            }
        }
        self.local
            .get_family()
            .await
            .map_err(DataError::Local)?
            .ok_or_else(|| DataError::Local(anyhow::anyhow!("no family stored")))
    }

    pub async fn create_family(&self, family: NewFamily) -> Result<Family, DataError> {
        if let Some(remote) = &self.remote {
            match remote.create_family(family.clone()).await {
                Ok(created) => return Ok(created),
                Err(e) => warn!(error = %e, "backend create_family failed; using local data"),
            }
        }
        self.local.create_family(family).await.map_err(DataError::Local)
    }

    pub async fn update_family(&self, family: &Family) -> Result<Family, DataError> {
        if let Some(remote) = &self.remote {
            match remote.update_family(family).await {
                Ok(updated) => return Ok(updated),
                Err(e) => warn!(error = %e, family_id = %family.id, "backend update_family failed; using local data"),
            }
        }
        self.local.update_family(family).await.map_err(DataError::Local)
    }

    pub async fn get_inventory(&self) -> Result<Vec<InventoryItem>, DataError> {
        if let Some(remote) = &self.remote {
            match remote.get_inventory().await {
                Ok(items) => return Ok(items),
                Err(e) => warn!(error = %e, "backend get_inventory failed; using local data"),
            }
        }
        self.local.get_inventory().await.map_err(DataError::Local)
    }

    /// Sensor integration placeholder; always reports success.
    pub async fn initialize_fridge(&self) -> InitializeOutcome {
        InitializeOutcome {
            success: true,
            message: "Fridge initialized successfully".to_string(),
        }
    }

    pub async fn add_inventory_item(
        &self,
        item: &NewInventoryItem,
    ) -> Result<InventoryItem, DataError> {
        let remote = self.remote.as_ref().ok_or(DataError::BackendNotConfigured)?;
        remote.add_inventory_item(item).await.map_err(|e| {
            warn!(error = %e, name = %item.name, "backend add_inventory_item failed");
            DataError::Backend(e)
        })
    }

    /// Saves a whole batch in one backend transaction. Like single adds,
    /// there is no local fallback.
    pub async fn add_inventory_items(
        &self,
        items: &[NewInventoryItem],
    ) -> Result<Vec<InventoryItem>, DataError> {
        let remote = self.remote.as_ref().ok_or(DataError::BackendNotConfigured)?;
        remote.add_inventory_items(items).await.map_err(|e| {
            warn!(error = %e, count = items.len(), "backend add_inventory_items failed");
            DataError::Backend(e)
        })
    }

    /// `Ok(None)` without a backend, or when the backend has no such item.
    pub async fn update_inventory_item(
        &self,
        item_id: Uuid,
        patch: &InventoryPatch,
    ) -> Result<Option<InventoryItem>, DataError> {
        let Some(remote) = &self.remote else {
            return Ok(None);
        };
        remote
            .update_inventory_item(item_id, patch)
            .await
            .map_err(|e| {
                warn!(error = %e, %item_id, "backend update_inventory_item failed");
                DataError::Backend(e)
            })
    }

    /// A no-op without a backend.
    pub async fn remove_inventory_item(&self, item_id: Uuid) -> Result<(), DataError> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };
        remote.remove_inventory_item(item_id).await.map_err(|e| {
            warn!(error = %e, %item_id, "backend remove_inventory_item failed");
            DataError::Backend(e)
        })
    }

    /// Model recipes when a credential is configured and the call works,
    /// sample recipes otherwise. Never fails.
    pub async fn generate_recipes(&self, request: &RecipeRequest) -> Vec<Recipe> {
        if self.recipes.is_configured() {
            match self.recipes.generate_recipes(request).await {
                Ok(recipes) => return recipes,
                Err(e) => warn!(error = %e, "recipe generation failed; using sample recipes"),
            }
        }
        samples::sample_recipes_with_random_scores()
    }

    pub async fn get_shopping_list(&self) -> Result<Vec<ShoppingListEntry>, DataError> {
        if let Some(remote) = &self.remote {
            match remote.get_shopping_list().await {
                Ok(list) => return Ok(list),
                Err(e) => warn!(error = %e, "backend get_shopping_list failed; using local data"),
            }
        }
        self.local.get_shopping_list().await.map_err(DataError::Local)
    }

    pub async fn add_to_shopping_list(&self, entries: &[ShoppingListEntry]) -> Result<(), DataError> {
        if let Some(remote) = &self.remote {
            match remote.add_to_shopping_list(entries).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(error = %e, "backend add_to_shopping_list failed; using local data"),
            }
        }
        self.local
            .add_to_shopping_list(entries)
            .await
            .map_err(DataError::Local)
    }

    pub async fn remove_from_shopping_list(&self, name: &str, unit: &str) -> Result<(), DataError> {
        if let Some(remote) = &self.remote {
            match remote.remove_from_shopping_list(name, unit).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(error = %e, %name, %unit, "backend remove_from_shopping_list failed; using local data"),
            }
        }
        self.local
            .remove_from_shopping_list(name, unit)
            .await
            .map_err(DataError::Local)
    }

    pub async fn mark_purchased(&self, name: &str, unit: &str) -> Result<(), DataError> {
        if let Some(remote) = &self.remote {
            match remote.mark_purchased(name, unit).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(error = %e, %name, %unit, "backend mark_purchased failed; using local data"),
            }
        }
        self.local
            .mark_purchased(name, unit)
            .await
            .map_err(DataError::Local)
    }

    pub async fn clear_shopping_list(&self) -> Result<(), DataError> {
        if let Some(remote) = &self.remote {
            match remote.clear_shopping_list().await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(error = %e, "backend clear_shopping_list failed; using local data"),
            }
        }
        self.local.clear_shopping_list().await.map_err(DataError::Local)
    }
}
