pub mod dto;
pub mod handlers;
pub mod matching;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
