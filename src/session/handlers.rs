use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::app::{data_error, ApiError};
use crate::models::InterfaceLanguage;
use crate::session::Action;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/language", put(set_language))
        .route("/onboarding/complete", post(complete_onboarding))
        .route("/fridge/initialize", post(initialize_fridge))
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub preferred_language: InterfaceLanguage,
    pub onboarding_completed: bool,
    pub fridge_initialized: bool,
    pub has_family: bool,
    pub inventory_count: usize,
    pub recipe_count: usize,
    pub shopping_list_count: usize,
    pub is_loading: bool,
    pub error: Option<String>,
    pub backend_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: InterfaceLanguage,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub message: String,
    pub inventory_count: usize,
}

#[instrument(skip(state))]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSummary> {
    let s = state.snapshot().await;
    Json(SessionSummary {
        preferred_language: s.preferred_language,
        onboarding_completed: s.onboarding_completed,
        fridge_initialized: s.fridge_initialized,
        has_family: s.family.is_some(),
        inventory_count: s.inventory.len(),
        recipe_count: s.current_recipes.len(),
        shopping_list_count: s.shopping_list.len(),
        is_loading: s.is_loading,
        error: s.error,
        backend_configured: state.data.backend_configured(),
    })
}

#[instrument(skip(state))]
pub async fn set_language(
    State(state): State<AppState>,
    Json(body): Json<LanguageRequest>,
) -> Json<SessionSummary> {
    state.dispatch(Action::SetLanguage(body.language)).await;
    info!(language = ?body.language, "language changed");
    get_session(State(state)).await
}

#[instrument(skip(state))]
pub async fn complete_onboarding(State(state): State<AppState>) -> Json<SessionSummary> {
    state.dispatch(Action::CompleteOnboarding).await;
    info!("onboarding completed");
    get_session(State(state)).await
}

/// Runs the (placeholder) sensor calibration, loads the inventory and marks
/// the fridge initialized.
#[instrument(skip(state))]
pub async fn initialize_fridge(
    State(state): State<AppState>,
) -> Result<Json<InitializeResponse>, ApiError> {
    state.dispatch(Action::SetLoading(true)).await;

    let outcome = state.data.initialize_fridge().await;
    if !outcome.success {
        warn!(message = %outcome.message, "fridge initialization failed");
        state
            .dispatch(Action::SetError(Some("Failed to initialize fridge".into())))
            .await;
        return Err((axum::http::StatusCode::BAD_GATEWAY, outcome.message));
    }

    let inventory = match state.data.get_inventory().await {
        Ok(items) => items,
        Err(e) => {
            state
                .dispatch(Action::SetError(Some("Failed to initialize fridge".into())))
                .await;
            return Err(data_error(e));
        }
    };
    let inventory_count = inventory.len();

    state.dispatch(Action::SetInventory(inventory)).await;
    state.dispatch(Action::InitializeFridge).await;
    state.dispatch(Action::SetLoading(false)).await;

    info!(inventory_count, "fridge initialized");
    Ok(Json(InitializeResponse {
        success: outcome.success,
        message: outcome.message,
        inventory_count,
    }))
}
