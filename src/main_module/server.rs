//! HTTP server initialization and routing

use axum::{middleware, routing::get, Router};
use log::{error, info};
use tower_http::trace::TraceLayer;

use crate::core::shared::state::AppState;
use crate::core::urls::{ApiUrls, PageUrls};
use crate::directory::{configure_directory_routes, configure_directory_ui_routes};
use crate::security::auth_api::resolve_session_middleware;
use crate::tickets::forms::upload_body_limit;
use crate::tickets::{
    configure_admin_tickets_routes, configure_admin_tickets_ui_routes, configure_tickets_routes,
    configure_tickets_ui_routes,
};
use crate::web::{index_page, not_found_page, static_asset};

use super::{health_check, shutdown_signal};

/// The full application. Every request first has its session resolved; each
/// route group then applies its own gate.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = upload_body_limit(&state.uploads);

    let api_router = Router::new()
        .route(ApiUrls::HEALTH, get(health_check))
        .merge(configure_directory_routes())
        .merge(configure_tickets_routes(upload_limit))
        .merge(configure_admin_tickets_routes());

    let page_router = Router::new()
        .route(PageUrls::INDEX, get(index_page))
        .route(PageUrls::STATIC, get(static_asset))
        .merge(configure_directory_ui_routes())
        .merge(configure_tickets_ui_routes(upload_limit))
        .merge(configure_admin_tickets_ui_routes());

    Router::new()
        .merge(api_router)
        .merge(page_router)
        .fallback(not_found_page)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_axum_server(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_address();
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
