use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod discover;
mod error;
mod matches;
mod profiles;
mod state;
mod store;

use crate::config::AppConfig;
use crate::profiles::repo::PgInteractionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "swipedeck=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = db::connect(&config).await?;
    db::migrate(&db).await;

    let store = Arc::new(PgInteractionStore::new(db));
    let app_state = AppState::new(config, store);
    let sweep_every = app_state.config.discover.session_idle() / 4;
    discover::sessions::spawn_idle_sweeper(app_state.feeds.clone(), sweep_every);

    app::serve(app::build_app(app_state)).await
}
