//! sharespace server: workspaces, their members, and workspace-scoped items
//! behind bearer-token auth.

pub mod access;
pub mod config;
pub mod db_helpers;
pub mod error;
pub mod routes;
pub mod storage;

use axum::{
    Router,
    extract::FromRef,
    http::HeaderValue,
    routing::{delete, get},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
use storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Health
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        // Identity
        .route("/me", get(routes::auth::me))
        // Workspaces
        .route(
            "/workspaces",
            get(routes::workspaces::list_workspaces).post(routes::workspaces::create_workspace),
        )
        .route(
            "/workspaces/{id}",
            get(routes::workspaces::get_workspace).delete(routes::workspaces::delete_workspace),
        )
        // Members
        .route(
            "/workspaces/{id}/members",
            get(routes::workspaces::list_members).post(routes::workspaces::add_member),
        )
        .route(
            "/workspaces/{id}/members/{member_id}",
            delete(routes::workspaces::remove_member),
        )
        // Items
        .route(
            "/items",
            get(routes::items::list_items).post(routes::items::create_item),
        )
        .route(
            "/items/{id}",
            get(routes::items::get_item)
                .put(routes::items::update_item)
                .delete(routes::items::delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
