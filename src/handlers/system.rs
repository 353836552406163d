use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::doc::ErrorBody;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service description
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service name, version and endpoint map")),
    tag = "system"
)]
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Pokedex API",
        "version": version,
        "description": "Pokemon catalog with list, lookup, create, update and delete",
        "endpoints": {
            "home": "/",
            "health": "/health",
            "pokemons": "GET|POST|PUT|DELETE /pokemons[?name=]",
            "docs": "/v1",
            "openapi": "/openapi.json",
        }
    }))
}

/// GET /health - store connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "store": backend,
            "timestamp": now,
        }))),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", backend, e);
            Err(ApiError::service_unavailable(format!("{} store unavailable", backend)))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::testing::TestApp;

    #[tokio::test]
    async fn health_reports_memory_store() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["pokemons"].is_string());
    }
}
