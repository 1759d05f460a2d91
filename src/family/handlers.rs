use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::app::{data_error, ApiError};
use crate::family::dto::FamilyRequest;
use crate::models::Family;
use crate::session::Action;
use crate::state::AppState;

pub fn family_routes() -> Router<AppState> {
    Router::new().route("/family", get(get_family).post(create_family).put(update_family))
}

/// The session's family, loaded through the data service on first use.
pub(crate) async fn current_family(state: &AppState) -> Result<Family, ApiError> {
    if let Some(family) = state.snapshot().await.family {
        return Ok(family);
    }
    let family = state.data.get_family().await.map_err(data_error)?;
    state.dispatch(Action::SetFamily(family.clone())).await;
    Ok(family)
}

#[instrument(skip(state))]
pub async fn get_family(State(state): State<AppState>) -> Result<Json<Family>, ApiError> {
    current_family(&state).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn create_family(
    State(state): State<AppState>,
    Json(payload): Json<FamilyRequest>,
) -> Result<(StatusCode, Json<Family>), ApiError> {
    let new_family = payload.into_new_family().map_err(|e| {
        warn!(error = %e, "invalid family");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let family = match state.data.create_family(new_family).await {
        Ok(f) => f,
        Err(e) => {
            state
                .dispatch(Action::SetError(Some("Failed to create family profile".into())))
                .await;
            return Err(data_error(e));
        }
    };

    state.dispatch(Action::SetFamily(family.clone())).await;
    info!(family_id = %family.id, members = family.members.len(), "family created");
    Ok((StatusCode::CREATED, Json(family)))
}

#[instrument(skip(state, payload))]
pub async fn update_family(
    State(state): State<AppState>,
    Json(payload): Json<FamilyRequest>,
) -> Result<Json<Family>, ApiError> {
    let existing = current_family(&state).await?;
    let family = payload.apply_to(&existing).map_err(|e| {
        warn!(error = %e, "invalid family");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let family = state.data.update_family(&family).await.map_err(data_error)?;
    state.dispatch(Action::SetFamily(family.clone())).await;
    info!(family_id = %family.id, "family updated");
    Ok(Json(family))
}

#[cfg(test)]
mod tests {
    use crate::app::test_support::call;
    use crate::state::AppState;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    fn family_body(name: &str, ages: &[i64]) -> Value {
        let members: Vec<Value> = ages
            .iter()
            .enumerate()
            .map(|(i, age)| {
                json!({
                    "name": format!("Member {}", i + 1),
                    "age": age,
                    "dietary_restrictions": ["low-sugar"],
                    "preferences": { "spice_level": "none" }
                })
            })
            .collect();
        json!({
            "name": name,
            "members": members,
            "preferences": { "cooking_skill_level": "advanced", "budget_range": "high" }
        })
    }

    #[tokio::test]
    async fn get_without_profile_serves_sample_family() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(&state, Method::GET, "/api/v1/family", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "The Lees");
    }

    #[tokio::test]
    async fn onboarding_creates_and_persists_family() {
        let (dir, state) = AppState::fake();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/family",
            Some(family_body("The Lams", &[44, 12])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["members"].as_array().unwrap().len(), 2);

        let (_, got) = call(&state, Method::GET, "/api/v1/family", None).await;
        assert_eq!(got["id"], body["id"]);

        let restored =
            crate::session::restore(&crate::storage::LocalStorage::open(dir.path()).unwrap());
        assert_eq!(restored.family.unwrap().name, "The Lams");
    }

    #[tokio::test]
    async fn invalid_family_is_400() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/family",
            Some(family_body("The Lams", &[44, 0])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.as_str().unwrap().contains("age"));
        assert!(state.snapshot().await.family.is_none());
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let (_dir, state) = AppState::fake();
        let (_, created) = call(
            &state,
            Method::POST,
            "/api/v1/family",
            Some(family_body("The Lams", &[44])),
        )
        .await;
        let (status, updated) = call(
            &state,
            Method::PUT,
            "/api/v1/family",
            Some(family_body("The Lam-Chows", &[44, 41])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert_eq!(updated["name"], "The Lam-Chows");
        assert_eq!(updated["members"].as_array().unwrap().len(), 2);
    }
}
