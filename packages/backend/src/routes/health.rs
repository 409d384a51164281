use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/info", get(info))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

async fn root(State(state): State<AppState>) -> Response {
    let store = store_check(&state).await;
    let ok = matches!(store, StoreCheckStatus::Connected { .. });

    let response = CompatHealthResponse {
        store: store.label(),
        backend: store_backend(&state),
        timestamp: now_iso(),
        status: if ok { "ok" } else { "degraded" },
    };

    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let response = HealthInfoResponse {
        service: "edemy-backend",
        version: env!("CARGO_PKG_VERSION"),
        store: store_backend(&state),
        auth_mode: match state.config().auth_mode {
            crate::config::AuthMode::Jwt => "jwt",
            crate::config::AuthMode::TrustedHeader => "trusted-header",
        },
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
    };

    Json(response).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    let response = LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn ready(State(state): State<AppState>) -> Response {
    let store = store_check(&state).await;

    let (status, latency_ms) = match store {
        StoreCheckStatus::Connected { latency_ms } => ("healthy", Some(latency_ms)),
        StoreCheckStatus::Timeout => ("degraded", None),
        StoreCheckStatus::Disconnected => ("unhealthy", None),
    };

    let response = ReadinessResponse {
        status,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        checks: ReadinessChecks {
            store: store.label(),
            backend: store_backend(&state),
            store_latency: latency_ms,
        },
    };

    let status_code = match status {
        "healthy" => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

#[derive(Debug, Clone, Copy)]
enum StoreCheckStatus {
    Connected { latency_ms: u64 },
    Timeout,
    Disconnected,
}

impl StoreCheckStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Timeout => "timeout",
            Self::Disconnected => "disconnected",
        }
    }
}

async fn store_check(state: &AppState) -> StoreCheckStatus {
    let started = Instant::now();
    match tokio::time::timeout(STORE_CHECK_TIMEOUT, state.store().ping()).await {
        Ok(Ok(())) => StoreCheckStatus::Connected {
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "progress store ping failed");
            StoreCheckStatus::Disconnected
        }
        Err(_) => StoreCheckStatus::Timeout,
    }
}

fn store_backend(state: &AppState) -> &'static str {
    if state.db_proxy().is_some() {
        "postgresql"
    } else {
        "memory"
    }
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[derive(Serialize)]
struct CompatHealthResponse {
    store: &'static str,
    backend: &'static str,
    timestamp: String,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    store: &'static str,
    auth_mode: &'static str,
    start_time: String,
    uptime: u64,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: ReadinessChecks,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessChecks {
    store: &'static str,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_latency: Option<u64>,
}
