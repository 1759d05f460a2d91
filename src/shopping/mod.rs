pub mod dto;
pub mod handlers;
pub mod list;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::shopping_routes()
}
