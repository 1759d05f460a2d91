use serde::{Deserialize, Serialize};

use crate::ai::RecipeRequest;
use crate::models::{Cuisine, Family, InterfaceLanguage, ShoppingListEntry};

const DEFAULT_SERVINGS: u32 = 4;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Empty means the family's favorite cuisines.
    #[serde(default)]
    pub cuisines: Vec<Cuisine>,
    #[serde(default)]
    pub servings: Option<u32>,
}

impl GenerateRequest {
    /// Restrictions and allergies are the family-wide unions in member order.
    pub fn into_model_request(
        self,
        inventory_names: Vec<String>,
        family: Option<&Family>,
    ) -> RecipeRequest {
        let cuisine_types = match (self.cuisines.is_empty(), family) {
            (true, Some(f)) => f.favorite_cuisines(),
            _ => self.cuisines,
        };
        let servings = self
            .servings
            .filter(|s| *s > 0)
            .or_else(|| {
                family
                    .map(|f| f.members.len() as u32)
                    .filter(|n| *n > 0)
            })
            .unwrap_or(DEFAULT_SERVINGS);

        RecipeRequest {
            available_ingredients: inventory_names,
            cuisine_types,
            dietary_restrictions: family.map(Family::dietary_restrictions).unwrap_or_default(),
            allergies: family.map(Family::allergies).unwrap_or_default(),
            servings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShoppingListAdded {
    pub added: Vec<ShoppingListEntry>,
    pub shopping_list: Vec<ShoppingListEntry>,
}

#[derive(Debug, Serialize)]
pub struct ShareText {
    pub language: InterfaceLanguage,
    pub text: String,
}
