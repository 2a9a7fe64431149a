use crate::{
    cmd::build_service,
    modules::handlers::{handle_message, liveness},
};
use anyhow::Result;
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use contest_grouping_libs::ContestService;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let service = build_service().await?;
    let app = create_router(Arc::new(service));

    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("Message endpoint will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Server start at {}", addr);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to bind server.");

    Ok(())
}

fn create_router(service: Arc<ContestService>) -> Router {
    Router::new()
        .route("/api/message", routing::post(handle_message))
        .route("/api/liveness", routing::get(liveness))
        .layer(Extension(service))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown.");
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use contest_grouping_libs::{
        clock::SystemClock,
        codeforces::{client::CodeforcesClient, limiter::RateLimiter},
        options::OptionsStore,
        store::{KeyValueStore, MemoryStore},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Router over an in-memory store. The client points at a closed port and is never reached.
    fn router() -> Router {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let limiter = Arc::new(RateLimiter::new(OptionsStore::new(store.clone())));
        let client = CodeforcesClient::new("http://127.0.0.1:1", limiter).unwrap();
        let service = ContestService::new(store, Arc::new(client), Arc::new(SystemClock));
        create_router(Arc::new(service))
    }

    async fn post(router: Router, message: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/message")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(message.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_liveness() {
        let request = Request::builder()
            .uri("/api/liveness")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_options_message() {
        let (status, body) = post(router(), json!({"type": "getOptions"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["options"]["rateLimitMs"], json!(1100.0));
    }

    #[tokio::test]
    async fn test_classify_message_without_contest() {
        let (_, body) = post(
            router(),
            json!({"type": "classifySubmission", "payload": {"timestamp": 100}}),
        )
        .await;

        assert_eq!(body, json!({"ok": true, "label": "Practice"}));
    }

    #[tokio::test]
    async fn test_invalid_messages() {
        let (status, body) = post(router(), json!({"contestId": "1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": false, "error": "invalid-message"}));

        let (_, body) = post(router(), json!({"type": "explode"})).await;
        assert_eq!(body, json!({"ok": false, "error": "unknown-type"}));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/message")
            .header("origin", "chrome-extension://abcdef")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
