//! # metron-api
//!
//! REST API layer for Metron. Provides the catalog CRUD endpoints, authentication,
//! the reprint-sync and credit-duplication actions, and the home/statistics views.

pub mod auth;
pub mod middleware;
pub mod routes;

use axum::Router;
use metron_db::Database;
use std::sync::Arc;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::health::router())
        // Catalog
        .merge(routes::publishers::router())
        .merge(routes::imprints::router())
        .merge(routes::series::router())
        .merge(routes::series_types::router())
        .merge(routes::genres::router())
        .merge(routes::issues::router())
        .merge(routes::variants::router())
        .merge(routes::characters::router())
        .merge(routes::creators::router())
        .merge(routes::teams::router())
        .merge(routes::arcs::router())
        .merge(routes::universes::router())
        .merge(routes::credits::router())
        .merge(routes::roles::router())
        // Personal lists
        .merge(routes::reading_lists::router())
        .merge(routes::collections::router())
        // Dashboards
        .merge(routes::home::router())
        .merge(routes::statistics::router());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
