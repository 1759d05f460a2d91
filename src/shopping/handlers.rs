use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::app::{data_error, ApiError};
use crate::models::ShoppingListEntry;
use crate::session::Action;
use crate::shopping::dto::{AddEntriesRequest, EntryKey};
use crate::state::AppState;

pub fn shopping_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shopping-list",
            get(get_list).post(add_entries).delete(clear_list),
        )
        .route("/shopping-list/item", delete(remove_entry))
        .route("/shopping-list/item/purchased", post(mark_purchased))
}

#[instrument(skip(state))]
pub async fn get_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShoppingListEntry>>, ApiError> {
    let entries = state.data.get_shopping_list().await.map_err(data_error)?;
    let next = state.dispatch(Action::SetShoppingList(entries)).await;
    Ok(Json(next.shopping_list.into_entries()))
}

#[instrument(skip(state, payload))]
pub async fn add_entries(
    State(state): State<AppState>,
    Json(payload): Json<AddEntriesRequest>,
) -> Result<Json<Vec<ShoppingListEntry>>, ApiError> {
    let entries = payload
        .into_entries()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    state
        .data
        .add_to_shopping_list(&entries)
        .await
        .map_err(data_error)?;
    let count = entries.len();
    let next = state.dispatch(Action::AddToShoppingList(entries)).await;

    info!(count, total = next.shopping_list.len(), "shopping list extended");
    Ok(Json(next.shopping_list.into_entries()))
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    Query(key): Query<EntryKey>,
) -> Result<StatusCode, ApiError> {
    state
        .data
        .remove_from_shopping_list(&key.name, &key.unit)
        .await
        .map_err(data_error)?;
    state
        .dispatch(Action::RemoveFromShoppingList {
            name: key.name,
            unit: key.unit,
        })
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Bought entries leave the open list.
#[instrument(skip(state))]
pub async fn mark_purchased(
    State(state): State<AppState>,
    Query(key): Query<EntryKey>,
) -> Result<StatusCode, ApiError> {
    state
        .data
        .mark_purchased(&key.name, &key.unit)
        .await
        .map_err(data_error)?;
    info!(name = %key.name, unit = %key.unit, "entry purchased");
    state
        .dispatch(Action::RemoveFromShoppingList {
            name: key.name,
            unit: key.unit,
        })
        .await;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn clear_list(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.data.clear_shopping_list().await.map_err(data_error)?;
    state.dispatch(Action::ClearShoppingList).await;
    info!("shopping list cleared");
    Ok(StatusCode::NO_CONTENT)
}
