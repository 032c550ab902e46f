//! Router setup and configuration.

use axum::{
    Router,
    http::HeaderName,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{export, health, issuer};
use crate::api::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(health::metrics));

    let issuer_routes = Router::new()
        .route("/issuers", get(issuer::list_issuers))
        .route(
            "/issuer",
            get(issuer::get_issuer)
                .post(issuer::create_issuer)
                .put(issuer::replace_issuer)
                .delete(issuer::delete_issuer),
        )
        .route("/issuer/validate", post(issuer::validate_issuer));

    let export_routes = Router::new()
        .route("/export", get(export::get_export).post(export::start_export))
        .route("/export/pause", post(export::pause_export))
        .route("/export/resume", post(export::resume_export))
        .route("/export/cancel", post(export::cancel_export))
        .route("/export/estimate", get(export::estimate_export));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(health_routes)
        .nest("/v1", issuer_routes.merge(export_routes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::storage::create_catalog;

    async fn test_app(dir: &TempDir) -> Router {
        let mut config = AppConfig::default();
        config.export.output_dir = dir.path().to_path_buf();
        config.export.chunk_size = 64;
        config.export.pause_poll_ms = 10;
        config.export.max_count = 1_000_000;
        config.export.estimate_samples = 50;

        let catalog = create_catalog(&config.catalog).await.unwrap();
        let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        create_router(AppState::new(Arc::new(config), catalog, Some(metrics)))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");

        let (status, body) = call(&app, Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["ready"], true);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_issuer_crud() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let (status, body) = call(&app, Method::GET, "/v1/issuers", None).await;
        assert_eq!(status, StatusCode::OK);
        let preset_total = body["data"]["total"].as_u64().unwrap();
        assert!(preset_total > 0);

        let record = json!({"label": "Test", "length": 12, "prefixes": "99,100-120"});
        let (status, body) = call(&app, Method::POST, "/v1/issuer", Some(record.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["ranges"][1]["end"], 120);

        let (status, body) = call(&app, Method::POST, "/v1/issuer", Some(record)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 1002);

        let replacement = json!({"label": "Test", "length": 13, "prefixes": "99"});
        let (status, _) = call(&app, Method::PUT, "/v1/issuer", Some(replacement)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::GET, "/v1/issuer?label=Test", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["length"], 13);

        let (status, _) = call(&app, Method::DELETE, "/v1/issuer?label=Test", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::GET, "/v1/issuer?label=Test", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1001);
    }

    #[tokio::test]
    async fn test_validate_reports_offending_token() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let record = json!({"label": "Bad", "length": 16, "prefixes": "1,5-3"});
        let (status, body) = call(&app, Method::POST, "/v1/issuer/validate", Some(record)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 3002);
        assert!(body["message"].as_str().unwrap().contains("5-3"));

        let record = json!({"label": "Good", "length": 16, "prefixes": "4"});
        let (status, _) = call(&app, Method::POST, "/v1/issuer/validate", Some(record)).await;
        assert_eq!(status, StatusCode::OK);

        // Nothing was stored.
        let (status, _) = call(&app, Method::GET, "/v1/issuer?label=Good", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_lifecycle() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let (status, body) = call(&app, Method::GET, "/v1/export", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 4003);

        let start = json!({"issuers": ["Visa"], "count": 1_000_000, "output": "visa.txt", "seed": 1});
        let (status, body) = call(&app, Method::POST, "/v1/export", Some(start.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "running");

        let (status, body) = call(&app, Method::POST, "/v1/export", Some(start)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 4002);

        let (status, body) = call(&app, Method::POST, "/v1/export/pause", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "paused");

        let (status, body) = call(&app, Method::POST, "/v1/export/pause", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 4004);

        let (status, _) = call(&app, Method::POST, "/v1/export/resume", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::POST, "/v1/export/cancel", None).await;
        assert_eq!(status, StatusCode::OK);

        let mut state = Value::Null;
        for _ in 0..200 {
            let (_, body) = call(&app, Method::GET, "/v1/export", None).await;
            state = body["data"]["state"].clone();
            if state == "stopped" {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(state, "stopped");
    }

    #[tokio::test]
    async fn test_export_rejects_bad_requests() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let zero = json!({"count": 0, "output": "x.txt"});
        let (status, body) = call(&app, Method::POST, "/v1/export", Some(zero)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 3001);

        let unknown = json!({"issuers": ["Nope"], "count": 5, "output": "x.txt"});
        let (status, body) = call(&app, Method::POST, "/v1/export", Some(unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1001);

        let too_many = json!({"count": 2_000_000, "output": "x.txt"});
        let (status, _) = call(&app, Method::POST, "/v1/export", Some(too_many)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_estimate() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let (status, body) =
            call(&app, Method::GET, "/v1/export/estimate?count=1000&issuers=Visa", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["bytes"], 17_000);
        assert_eq!(body["data"]["size"], "16.60 KB");

        let (status, _) = call(&app, Method::GET, "/v1/export/estimate?count=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
