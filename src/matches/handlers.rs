use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::{error, instrument};

use crate::{auth::AuthUser, profiles::dto::ProfileCard, state::AppState, store::bounded};

pub fn matches_routes() -> Router<AppState> {
    Router::new().route("/matches", get(list_matches))
}

/// Everyone who shares a right/super swipe with the caller, both ways.
#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn list_matches(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<Vec<ProfileCard>>, (StatusCode, String)> {
    let limit = state.config.discover.store_timeout();
    let profiles = bounded(limit, state.store.list_matches(session.user_id))
        .await
        .map_err(|e| {
            error!(error = %e, "list_matches failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to load matches".to_string(),
            )
        })?;

    let today = OffsetDateTime::now_utc().date();
    Ok(Json(
        profiles
            .iter()
            .map(|p| ProfileCard::from_profile(p, today))
            .collect(),
    ))
}
