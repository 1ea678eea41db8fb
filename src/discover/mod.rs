pub mod controller;
mod dto;
pub mod handlers;
pub mod sessions;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::discover_routes())
}
