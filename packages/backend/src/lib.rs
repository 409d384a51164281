pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Router with request tracing and CORS applied.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(state.config());

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Connects to Postgres and applies migrations. Only a missing
/// `DATABASE_URL` selects the in-memory store; any other database failure is
/// returned to the caller.
pub async fn create_app(config: Config) -> Result<axum::Router, db::DbInitError> {
    let state = match db::DatabaseProxy::connect(&config).await {
        Ok(proxy) => {
            db::migrate::run_migrations(proxy.pool()).await?;
            AppState::with_database(config, proxy)
        }
        Err(db::DbInitError::Missing { key }) => {
            tracing::warn!(key, "database not configured, using in-memory store");
            AppState::in_memory(config, Default::default())
        }
        Err(err) => return Err(err),
    };

    Ok(build_router(state))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let Some(origin) = config.cors_allow_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(%origin, "invalid CORS_ALLOW_ORIGIN, allowing any origin");
            CorsLayer::permissive()
        }
    }
}
