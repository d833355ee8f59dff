use axum::Json;
use sharespace_api::{HealthResponse, WelcomeResponse};

/// GET /health: server liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /: unauthenticated greeting.
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the sharespace API".to_string(),
    })
}
