use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::controller::FeedSettings;
use super::dto::{DecideRequest, DecideResponse, FeedSnapshot};
use crate::{auth::AuthUser, state::AppState};

pub fn discover_routes() -> Router<AppState> {
    Router::new()
        .route("/discover/session", post(open_session).delete(close_session))
        .route("/discover/current", get(current))
        .route("/discover/decide", post(decide))
}

fn no_session() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "no active discover session".into())
}

fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn open_session(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Json<FeedSnapshot> {
    let settings = FeedSettings::from(&state.config.discover);
    let (feed, health) = state
        .feeds
        .open(session, state.store.clone(), settings)
        .await;
    if health.is_degraded() {
        warn!(warnings = ?health.warnings(), "discover session opened degraded");
    }
    let feed = feed.lock().await;
    Json(FeedSnapshot::capture(&feed, today()))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn current(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<FeedSnapshot>, (StatusCode, String)> {
    let feed = state
        .feeds
        .get(session.user_id)
        .await
        .ok_or_else(no_session)?;
    let feed = feed.lock().await;
    Ok(Json(FeedSnapshot::capture(&feed, today())))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn decide(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, (StatusCode, String)> {
    let feed = state
        .feeds
        .get(session.user_id)
        .await
        .ok_or_else(no_session)?;
    // held for the whole decision: one in-flight decide per user
    let mut feed = feed.lock().await;
    let outcome = feed.decide(payload.direction).await;
    if let Some(name) = outcome.matched.as_deref() {
        info!(matched_with = %name, "match surfaced to client");
    }
    if outcome.health.is_degraded() {
        warn!(warnings = ?outcome.health.warnings(), "decision completed degraded");
    }
    Ok(Json(DecideResponse::new(outcome, &feed, today())))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn close_session(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> StatusCode {
    state.feeds.close(session.user_id).await;
    StatusCode::NO_CONTENT
}
