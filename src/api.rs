// 🌐 Read API - blog records over HTTP
// GET /blogs returns at most READ_LIMIT records; GET /health for probes

use crate::db::{BlogStore, READ_LIMIT};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: BlogStore,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: &'static str,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /blogs - Up to 31 blog records
async fn list_blogs(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.find_all(READ_LIMIT) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!("Error getting blogs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    message: "Server error",
                }),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Router / Server
// ============================================================================

pub fn router(store: BlogStore) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/health", get(health_check))
        .route("/blogs", get(list_blogs))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Serve the read API until `shutdown` resolves
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    store: BlogStore,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Server running on http://{}", addr);
        info!("   API: http://{}/blogs", addr);
    }

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BlogRecord;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn seeded_store(n: usize) -> BlogStore {
        let store = BlogStore::open_in_memory().unwrap();
        for i in 0..n {
            store
                .save(&BlogRecord::new(
                    format!("Practice {}", i),
                    1000.0,
                    500.0,
                    "Generated post".to_string(),
                ))
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_array() {
        let (status, body) = get_json(router(seeded_store(0)), "/blogs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_list_is_capped_at_31() {
        let (status, body) = get_json(router(seeded_store(45)), "/blogs").await;

        assert_eq!(status, StatusCode::OK);
        let blogs = body.as_array().unwrap();
        assert_eq!(blogs.len(), 31);
        assert_eq!(blogs[0]["name"], "Practice 0");
        assert_eq!(blogs[0]["average_revenue"], 1000.0);
        assert_eq!(blogs[0]["average_cost_to_start"], 500.0);
        assert_eq!(blogs[0]["blog_content"], "Generated post");
        assert!(blogs[0]["date"].is_string());
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_server_error() {
        let store = seeded_store(1);
        store.break_schema_for_test();

        let (status, body) = get_json(router(store), "/blogs").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Server error" }));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(router(seeded_store(0)), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
