use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::ai::vision::analyze_photos;
use crate::app::{data_error, ApiError};
use crate::inventory::dto::{
    validate_patch, AddItemRequest, ConfirmRequest, ConfirmResponse, ScanRequest, ScanResponse,
};
use crate::models::{InventoryItem, InventoryPatch, NewInventoryItem};
use crate::session::Action;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/inventory", get(list_inventory))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", post(add_item))
        .route("/inventory/:id", patch(update_item).delete(remove_item))
        .route("/inventory/scan", post(scan_photos))
        .route("/inventory/confirm", post(confirm_items))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let items = state.data.get_inventory().await.map_err(data_error)?;
    state.dispatch(Action::SetInventory(items.clone())).await;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn add_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    let new_item = payload
        .into_new_item()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let item = state
        .data
        .add_inventory_item(&new_item)
        .await
        .map_err(data_error)?;

    state
        .dispatch(Action::AddInventoryItems(vec![item.clone()]))
        .await;

    info!(item_id = %item.id, name = %item.name, "inventory item added");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .data
        .remove_inventory_item(id)
        .await
        .map_err(data_error)?;

    state.dispatch(Action::RemoveInventoryItem(id)).await;

    info!(item_id = %id, "inventory item removed");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /inventory/:id: new quantity and/or expiry date.
#[instrument(skip(state, patch))]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<InventoryPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
    validate_patch(&patch).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let saved = state
        .data
        .update_inventory_item(id, &patch)
        .await
        .map_err(data_error)?;
    if saved.is_none() && state.data.backend_configured() {
        return Err((StatusCode::NOT_FOUND, "Item not found".to_string()));
    }

    let next = state
        .dispatch(Action::PatchInventoryItem { id, patch })
        .await;
    let item = saved
        .or_else(|| next.inventory.into_iter().find(|i| i.id == id))
        .ok_or((StatusCode::NOT_FOUND, "Item not found".to_string()))?;

    info!(item_id = %id, quantity = item.quantity, "inventory item updated");
    Ok(Json(item))
}

/// Accepts bare base64 or a `data:image/...;base64,` URL and checks it decodes.
fn normalize_b64(raw: &str) -> Result<String, ApiError> {
    let payload = match raw.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => raw,
    };
    let payload = payload.trim();
    STANDARD
        .decode(payload)
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64".to_string()))?;
    Ok(payload.to_string())
}

async fn photos_from_multipart(mut mp: Multipart) -> Result<Vec<String>, ApiError> {
    let mut photos = Vec::new();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?
    {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("files") || name.as_deref() == Some("files[]") {
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
            photos.push(STANDARD.encode(&data));
        }
    }
    Ok(photos)
}

/// POST /inventory/scan, either JSON `{ images_b64: [...] }` or multipart
/// `files[]`. Photos are analyzed one at a time and merged; nothing is saved.
#[instrument(skip(state, req))]
pub async fn scan_photos(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ScanResponse>, ApiError> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let photos = if is_multipart {
        let mp = Multipart::from_request(req, &state)
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
        photos_from_multipart(mp).await?
    } else {
        let Json(body) = Json::<ScanRequest>::from_request(req, &state)
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        body.images_b64
            .iter()
            .map(|raw| normalize_b64(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    if photos.is_empty() {
        warn!("scan without photos");
        return Err((StatusCode::BAD_REQUEST, "at least one photo is required".into()));
    }

    state.dispatch(Action::SetLoading(true)).await;
    let items = analyze_photos(state.vision.as_ref(), &photos).await;
    state.dispatch(Action::SetLoading(false)).await;

    info!(photos = photos.len(), items = items.len(), "photos scanned");
    Ok(Json(ScanResponse {
        photos: photos.len(),
        items,
    }))
}

/// Saves the confirmed items as one batch. The session inventory only
/// changes when the whole batch was saved.
#[instrument(skip(state, payload))]
pub async fn confirm_items(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let items: Vec<NewInventoryItem> = payload
        .items
        .into_iter()
        .map(NewInventoryItem::from)
        .collect();

    let saved = if items.is_empty() {
        Ok(Vec::new())
    } else {
        state.data.add_inventory_items(&items).await
    };
    let added = match saved {
        Ok(added) => added,
        Err(e) => {
            warn!(error = %e, count = items.len(), "confirm aborted");
            state
                .dispatch(Action::SetError(Some(format!("Failed to save items: {}", e))))
                .await;
            return Err(data_error(e));
        }
    };

    let next = state
        .dispatch(Action::AddInventoryItems(added.clone()))
        .await;
    let inventory_count = next.inventory.len();

    info!(added = added.len(), "scan confirmed");
    Ok(Json(ConfirmResponse {
        added,
        inventory_count,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::app::test_support::{call, send};
    use crate::state::fakes::MemoryStore;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn list_without_backend_serves_samples_into_session() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(&state, Method::GET, "/api/v1/inventory", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 8);
        assert_eq!(state.snapshot().await.inventory.len(), 8);
    }

    #[tokio::test]
    async fn manual_add_without_backend_is_503() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/inventory",
            Some(json!({ "name": "Milk", "category": "dairy", "unit": "l" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn manual_add_validates_first() {
        let (_dir, state) = AppState::fake();
        let (status, _) = call(
            &state,
            Method::POST,
            "/api/v1/inventory",
            Some(json!({ "name": " ", "unit": "l" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn remove_without_backend_is_noop_on_store_but_drops_from_session() {
        let (_dir, state) = AppState::fake();
        call(&state, Method::GET, "/api/v1/inventory", None).await;
        let first = state.snapshot().await.inventory[0].id;

        let (status, _) = call(
            &state,
            Method::DELETE,
            &format!("/api/v1/inventory/{}", first),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let inventory = state.snapshot().await.inventory;
        assert_eq!(inventory.len(), 7);
        assert!(inventory.iter().all(|i| i.id != first));
    }

    #[tokio::test]
    async fn json_scan_merges_across_photos() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/scan",
            Some(json!({ "images_b64": ["QUJD", "data:image/jpeg;base64,REVG"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["photos"], 2);
        let items = body["items"].as_array().unwrap();
        // the fake sees Egg and Milk in every photo
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Egg");
        assert_eq!(items[0]["quantity"], 6.0);
        assert!(!state.snapshot().await.is_loading);
    }

    #[tokio::test]
    async fn json_scan_rejects_bad_input() {
        let (_dir, state) = AppState::fake();
        let (status, _) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/scan",
            Some(json!({ "images_b64": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/scan",
            Some(json!({ "images_b64": ["not base64!!"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid base64");
    }

    #[tokio::test]
    async fn multipart_scan_reads_files_field() {
        let (_dir, state) = AppState::fake();
        let boundary = "XfridgeX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files[]\"; filename=\"a.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nJPEGDATA\r\n--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/inventory/scan")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["photos"], 1);
    }

    #[tokio::test]
    async fn confirm_without_backend_leaves_session_untouched() {
        let (_dir, state) = AppState::fake();
        call(&state, Method::GET, "/api/v1/inventory", None).await;

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/confirm",
            Some(json!({ "items": [
                { "name": "Egg", "category": "dairy", "quantity": 6, "unit": "pcs", "confidence": 0.8 }
            ] })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.inventory.len(), 8);
        assert!(snapshot.error.unwrap().contains("Failed to save"));
    }

    fn item_json(name: &str) -> serde_json::Value {
        json!({ "name": name, "category": "dairy", "quantity": 1, "unit": "pcs" })
    }

    #[tokio::test]
    async fn confirm_saves_the_batch_and_extends_session() {
        let store = Arc::new(MemoryStore::default());
        let (_dir, state) = AppState::fake_with_backend(store.clone());
        call(&state, Method::GET, "/api/v1/inventory", None).await;

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/confirm",
            Some(json!({ "items": [item_json("Yogurt"), item_json("Butter")] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added"].as_array().unwrap().len(), 2);
        assert_eq!(body["inventory_count"], 10);
        assert_eq!(store.inventory.lock().unwrap().len(), 10);
        assert_eq!(state.snapshot().await.inventory.len(), 10);
    }

    #[tokio::test]
    async fn failed_confirm_saves_nothing_so_a_retry_does_not_duplicate() {
        let store = Arc::new(MemoryStore::default());
        let (_dir, state) = AppState::fake_with_backend(store.clone());
        call(&state, Method::GET, "/api/v1/inventory", None).await;

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/confirm",
            Some(json!({ "items": [item_json("Yogurt"), item_json("Spoiled")] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(store.inventory.lock().unwrap().len(), 8);
        assert_eq!(state.snapshot().await.inventory.len(), 8);

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/confirm",
            Some(json!({ "items": [item_json("Yogurt")] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let yogurts = store
            .inventory
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.name == "Yogurt")
            .count();
        assert_eq!(yogurts, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_never_resurrect_items() {
        for _ in 0..200 {
            let (_dir, state) = AppState::fake();
            call(&state, Method::GET, "/api/v1/inventory", None).await;
            let ids: Vec<_> = state.snapshot().await.inventory.iter().map(|i| i.id).collect();

            let tasks: Vec<_> = ids
                .into_iter()
                .map(|id| {
                    let state = state.clone();
                    tokio::spawn(async move {
                        call(&state, Method::DELETE, &format!("/api/v1/inventory/{}", id), None)
                            .await
                            .0
                    })
                })
                .collect();
            for task in tasks {
                assert_eq!(task.await.unwrap(), StatusCode::NO_CONTENT);
            }
            assert!(state.snapshot().await.inventory.is_empty());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_and_deletes_keep_every_change() {
        let store = Arc::new(MemoryStore::default());
        let (_dir, state) = AppState::fake_with_backend(store);
        call(&state, Method::GET, "/api/v1/inventory", None).await;
        let ids: Vec<_> = state.snapshot().await.inventory.iter().map(|i| i.id).collect();

        let mut tasks = Vec::new();
        for (n, id) in ids.into_iter().enumerate() {
            let deleter = state.clone();
            tasks.push(tokio::spawn(async move {
                call(&deleter, Method::DELETE, &format!("/api/v1/inventory/{}", id), None)
                    .await
                    .0
            }));
            let adder = state.clone();
            tasks.push(tokio::spawn(async move {
                call(
                    &adder,
                    Method::POST,
                    "/api/v1/inventory",
                    Some(json!({ "name": format!("Item {}", n), "unit": "pcs" })),
                )
                .await
                .0
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_success());
        }

        let inventory = state.snapshot().await.inventory;
        assert_eq!(inventory.len(), 8);
        assert!(inventory.iter().all(|i| i.name.starts_with("Item ")));
    }

    #[tokio::test]
    async fn patch_without_backend_edits_session_item() {
        let (_dir, state) = AppState::fake();
        call(&state, Method::GET, "/api/v1/inventory", None).await;
        let eggs = state.snapshot().await.inventory[4].clone();
        assert_eq!(eggs.name, "Eggs");

        let (status, body) = call(
            &state,
            Method::PATCH,
            &format!("/api/v1/inventory/{}", eggs.id),
            Some(json!({ "quantity": 2, "expiry_date": "2024-02-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 2.0);
        assert_eq!(body["expiry_date"], "2024-02-01");

        // leaving out the expiry date clears it, quantity stays
        let (_, body) = call(
            &state,
            Method::PATCH,
            &format!("/api/v1/inventory/{}", eggs.id),
            Some(json!({})),
        )
        .await;
        assert_eq!(body["quantity"], 2.0);
        assert!(body.get("expiry_date").is_none());
        assert_eq!(state.snapshot().await.inventory[4].expiry_date, None);
    }

    #[tokio::test]
    async fn patch_with_backend_writes_through_and_404s_unknown_ids() {
        let store = Arc::new(MemoryStore::default());
        let (_dir, state) = AppState::fake_with_backend(store.clone());
        call(&state, Method::GET, "/api/v1/inventory", None).await;
        let rice = state.snapshot().await.inventory[2].clone();

        let (status, _) = call(
            &state,
            Method::PATCH,
            &format!("/api/v1/inventory/{}", rice.id),
            Some(json!({ "quantity": 250 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.inventory.lock().unwrap()[2].quantity, 250.0);
        assert_eq!(state.snapshot().await.inventory[2].quantity, 250.0);

        let (status, _) = call(
            &state,
            Method::PATCH,
            &format!("/api/v1/inventory/{}", uuid::Uuid::new_v4()),
            Some(json!({ "quantity": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_rejects_negative_quantity() {
        let (_dir, state) = AppState::fake();
        let (status, _) = call(
            &state,
            Method::PATCH,
            &format!("/api/v1/inventory/{}", uuid::Uuid::new_v4()),
            Some(json!({ "quantity": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_confirm_is_ok() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/inventory/confirm",
            Some(json!({ "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added"].as_array().unwrap().len(), 0);
    }
}
