//! Household session state.
//!
//! Transitions go through [`reduce`], which returns the next state together
//! with the persistence effects to run. Running them is best-effort: a failed
//! write is logged and the in-memory state stands.

pub mod handlers;

use serde::Serialize;
use tracing::{debug, warn};

use uuid::Uuid;

use crate::models::{
    Family, InterfaceLanguage, InventoryItem, InventoryPatch, Recipe, ShoppingListEntry,
};
use crate::shopping::list::ShoppingList;
use crate::storage::{
    LocalStorage, FAMILY_KEY, INITIALIZED_KEY, ONBOARDING_KEY, PREFERENCES_KEY, SHOPPING_LIST_KEY,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FridgeState {
    pub preferred_language: InterfaceLanguage,
    pub family: Option<Family>,
    pub inventory: Vec<InventoryItem>,
    pub current_recipes: Vec<Recipe>,
    pub shopping_list: ShoppingList,
    pub is_loading: bool,
    pub error: Option<String>,
    pub onboarding_completed: bool,
    pub fridge_initialized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFamily(Family),
    SetInventory(Vec<InventoryItem>),
    AddInventoryItems(Vec<InventoryItem>),
    RemoveInventoryItem(Uuid),
    PatchInventoryItem { id: Uuid, patch: InventoryPatch },
    SetRecipes(Vec<Recipe>),
    SetLoading(bool),
    SetError(Option<String>),
    ClearError,
    CompleteOnboarding,
    InitializeFridge,
    SetLanguage(InterfaceLanguage),
    AddToShoppingList(Vec<ShoppingListEntry>),
    RemoveFromShoppingList { name: String, unit: String },
    ClearShoppingList,
    SetShoppingList(Vec<ShoppingListEntry>),
}

/// A local-storage write requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SaveFamily(Family),
    SetFlag(&'static str),
    SaveLanguage(InterfaceLanguage),
    SaveShoppingList(Vec<ShoppingListEntry>),
}

#[derive(Debug, Serialize, serde::Deserialize)]
struct StoredPreferences {
    language: InterfaceLanguage,
}

pub fn reduce(state: &FridgeState, action: Action) -> (FridgeState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::SetFamily(family) => {
            effects.push(Effect::SaveFamily(family.clone()));
            next.family = Some(family);
        }
        Action::SetInventory(items) => next.inventory = items,
        Action::AddInventoryItems(items) => next.inventory.extend(items),
        Action::RemoveInventoryItem(id) => next.inventory.retain(|i| i.id != id),
        Action::PatchInventoryItem { id, patch } => {
            if let Some(item) = next.inventory.iter_mut().find(|i| i.id == id) {
                item.apply_patch(&patch);
            }
        }
        Action::SetRecipes(recipes) => next.current_recipes = recipes,
        Action::SetLoading(loading) => next.is_loading = loading,
        Action::SetError(error) => {
            next.error = error;
            next.is_loading = false;
        }
        Action::ClearError => next.error = None,
        Action::CompleteOnboarding => {
            next.onboarding_completed = true;
            effects.push(Effect::SetFlag(ONBOARDING_KEY));
        }
        Action::InitializeFridge => {
            next.fridge_initialized = true;
            effects.push(Effect::SetFlag(INITIALIZED_KEY));
        }
        Action::SetLanguage(language) => {
            next.preferred_language = language;
            effects.push(Effect::SaveLanguage(language));
        }
        Action::AddToShoppingList(entries) => {
            next.shopping_list.add_all(entries);
            effects.push(Effect::SaveShoppingList(next.shopping_list.entries().to_vec()));
        }
        Action::RemoveFromShoppingList { name, unit } => {
            next.shopping_list.remove(&name, &unit);
            effects.push(Effect::SaveShoppingList(next.shopping_list.entries().to_vec()));
        }
        Action::ClearShoppingList => {
            next.shopping_list.clear();
            effects.push(Effect::SaveShoppingList(Vec::new()));
        }
        Action::SetShoppingList(entries) => {
            next.shopping_list = ShoppingList::from_entries(entries);
            effects.push(Effect::SaveShoppingList(next.shopping_list.entries().to_vec()));
        }
    }

    (next, effects)
}

pub fn apply_effects(storage: &LocalStorage, effects: Vec<Effect>) {
    for effect in effects {
        let result = match &effect {
            Effect::SaveFamily(family) => storage.set_json(FAMILY_KEY, family),
            Effect::SetFlag(key) => storage.set_item(key, "true"),
            Effect::SaveLanguage(language) => storage.set_json(
                PREFERENCES_KEY,
                &StoredPreferences {
                    language: *language,
                },
            ),
            Effect::SaveShoppingList(entries) => storage.set_json(SHOPPING_LIST_KEY, entries),
        };
        match result {
            Ok(()) => debug!(?effect, "session effect applied"),
            Err(e) => warn!(error = %e, "session persistence failed; keeping in-memory state"),
        }
    }
}

/// Rebuilds the persisted slice of the state: flags, family, language and
/// shopping list.
pub fn restore(storage: &LocalStorage) -> FridgeState {
    FridgeState {
        preferred_language: storage
            .get_json::<StoredPreferences>(PREFERENCES_KEY)
            .map(|p| p.language)
            .unwrap_or_default(),
        family: storage.get_json(FAMILY_KEY),
        shopping_list: storage
            .get_json::<Vec<ShoppingListEntry>>(SHOPPING_LIST_KEY)
            .map(ShoppingList::from_entries)
            .unwrap_or_default(),
        onboarding_completed: storage.get_flag(ONBOARDING_KEY),
        fridge_initialized: storage.get_flag(INITIALIZED_KEY),
        ..FridgeState::default()
    }
}
