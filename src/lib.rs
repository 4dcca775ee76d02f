pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod engine;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, redis::RedisHandle, state::AppState, telemetry};
use crate::services::deepseek::AiClient;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let redis = RedisHandle::new(settings.redis().redis_url());
    if let Err(err) = redis.connect().await {
        tracing::error!(error = %err, "Failed to connect to Redis; continuing without sessions");
    } else {
        tracing::info!("Redis connected successfully");
    }

    let ai = AiClient::from_settings(&settings)?;
    if ai.is_none() {
        tracing::warn!("DeepSeek is not configured; AI features fall back to local checks");
    }
    let state = AppState::new(settings, db_pool, redis.clone(), ai);

    if let Err(err) = core::bootstrap::ensure_default_teacher(&state).await {
        tracing::error!(error = %err, "Failed to ensure default teacher account");
    }
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Orish API listening"
    );

    let result =
        axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await;

    redis.disconnect().await;
    tracing::info!("Redis disconnected");

    result?;

    Ok(())
}
