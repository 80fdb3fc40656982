use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub database: String,
    pub identity: String,
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (db_ok, identity_result) = tokio::join!(
        db::health_check(&state.db),
        state.identity.health_check(),
    );

    let db_status = if db_ok { "ok" } else { "error" };
    let identity_status = if identity_result.is_ok() { "ok" } else { "error" };

    // The database is critical; the identity service only degrades creates
    let status = if db_ok && identity_result.is_ok() {
        "healthy"
    } else if db_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    let status_code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                database: db_status.to_string(),
                identity: identity_status.to_string(),
            },
        }),
    )
}
