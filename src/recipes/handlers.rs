use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::app::{data_error, ApiError};
use crate::family::handlers::current_family;
use crate::models::{Recipe, ShoppingListEntry};
use crate::recipes::dto::{GenerateRequest, ShareText, ShoppingListAdded};
use crate::session::Action;
use crate::state::AppState;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/generate", post(generate_recipes))
        .route("/recipes/:id", get(get_recipe))
        .route("/recipes/:id/shopping-list", post(add_missing_to_shopping_list))
        .route("/recipes/:id/share", get(share_recipe))
}

/// Asks the recipe model (or the samples) for recipes from the current
/// inventory and makes them the session's current recipes.
#[instrument(skip(state, payload))]
pub async fn generate_recipes(
    State(state): State<AppState>,
    payload: Option<Json<GenerateRequest>>,
) -> Json<Vec<Recipe>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let family = match current_family(&state).await {
        Ok(f) => Some(f),
        Err((status, msg)) => {
            warn!(%status, error = %msg, "no family for recipe generation");
            None
        }
    };
    let inventory_names: Vec<String> = state
        .snapshot()
        .await
        .inventory
        .into_iter()
        .map(|i| i.name)
        .collect();
    let request = payload.into_model_request(inventory_names, family.as_ref());

    state.dispatch(Action::SetLoading(true)).await;
    let recipes = state.data.generate_recipes(&request).await;
    state.dispatch(Action::SetRecipes(recipes.clone())).await;
    state.dispatch(Action::SetLoading(false)).await;

    info!(
        count = recipes.len(),
        ingredients = request.available_ingredients.len(),
        "recipes generated"
    );
    Json(recipes)
}

#[instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<Recipe>> {
    Json(state.snapshot().await.current_recipes)
}

async fn find_recipe(state: &AppState, id: &str) -> Result<Recipe, ApiError> {
    state
        .snapshot()
        .await
        .current_recipes
        .into_iter()
        .find(|r| r.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    find_recipe(&state, &id).await.map(Json)
}

/// Recipe as chat-ready text in the session's interface language.
#[instrument(skip(state))]
pub async fn share_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShareText>, ApiError> {
    let recipe = find_recipe(&state, &id).await?;
    let language = state.snapshot().await.preferred_language;
    Ok(Json(ShareText {
        language,
        text: recipe.share_text(language),
    }))
}

/// Puts every ingredient the fridge lacks for this recipe on the list.
#[instrument(skip(state))]
pub async fn add_missing_to_shopping_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShoppingListAdded>, ApiError> {
    let recipe = find_recipe(&state, &id).await?;
    let added: Vec<ShoppingListEntry> = recipe
        .missing_ingredients()
        .into_iter()
        .map(ShoppingListEntry::from)
        .collect();

    if !added.is_empty() {
        state
            .data
            .add_to_shopping_list(&added)
            .await
            .map_err(data_error)?;
    }
    let next = state.dispatch(Action::AddToShoppingList(added.clone())).await;

    info!(recipe_id = %recipe.id, added = added.len(), "missing ingredients listed");
    Ok(Json(ShoppingListAdded {
        added,
        shopping_list: next.shopping_list.into_entries(),
    }))
}
