use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::config::StoreBackend;
use crate::core::shared::state::AppState;

/// Liveness plus a cheap read against the ticket store.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store_ok = match state.directory.list_departments().await {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Health check could not reach the store: {}", e);
            false
        }
    };

    let status = if store_ok { "healthy" } else { "degraded" };
    let code = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let backend = match state.config.database.backend {
        StoreBackend::Postgres => "postgres",
        StoreBackend::Memory => "memory",
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "service": "helpdesk",
            "version": env!("CARGO_PKG_VERSION"),
            "store": backend,
            "database": store_ok
        })),
    )
}
