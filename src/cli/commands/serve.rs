//! HTTP API server for the browser extension.
//!
//! Every pipeline outcome, failures included, is a 200 whose `response` field
//! carries the text to show. Only malformed requests get a 400.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

const MISSING_FIELDS: &str = "Missing videoId or question";

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Arc::new(Orchestrator::new(settings)?);
    let app = router(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("vidask API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /ask_video");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the API router around a shared orchestrator.
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %Uuid::new_v4(),
        )
    });

    Router::new()
        .route("/health", get(health))
        .route("/ask_video", post(ask_video))
        .layer(trace)
        .layer(cors)
        .with_state(orchestrator)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskVideoRequest {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
    question: Option<String>,
}

#[derive(Serialize)]
struct AskVideoResponse {
    response: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask_video(
    State(orchestrator): State<Arc<Orchestrator>>,
    payload: Result<Json<AskVideoRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return missing_fields();
    };
    let (Some(video_id), Some(question)) = (present(request.video_id), present(request.question))
    else {
        return missing_fields();
    };

    let span = info_span!("ask_video", video_id = %video_id);
    let response = orchestrator
        .respond(&video_id, &question)
        .instrument(span)
        .await;

    Json(AskVideoResponse { response }).into_response()
}

/// Absent, empty and whitespace-only fields all count as missing.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

fn missing_fields() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: MISSING_FIELDS.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Prompts, UNKNOWN_ANSWER};
    use crate::testing::{GroundedGenerator, HashingEmbedder, StaticEntry, StaticTranscripts};
    use axum::http::header::CONTENT_TYPE;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let transcripts = StaticTranscripts::default()
            .with_text("sky123", "Today we look up. The sky is blue on a clear day.")
            .with_text("cook", "Whisk the eggs with sugar. Fold in the flour and bake.")
            .with("quiet", StaticEntry::Disabled);

        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(transcripts),
            Arc::new(HashingEmbedder::default()),
            Arc::new(GroundedGenerator::default()),
        )
        .unwrap();
        router(Arc::new(orchestrator))
    }

    async fn post_json(body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/ask_video")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_grounded_answer() {
        let (status, body) =
            post_json(r#"{"videoId": "sky123", "question": "What color is the sky?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("blue"));
    }

    #[tokio::test]
    async fn test_unrelated_question() {
        let (status, body) = post_json(
            r#"{"videoId": "cook", "question": "What is the capital of France?"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], UNKNOWN_ANSWER);
    }

    #[tokio::test]
    async fn test_disabled_transcripts_are_a_200() {
        let (status, body) = post_json(r#"{"videoId": "quiet", "question": "Anything?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("disabled"));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        for body in [
            r#"{"question": "What color is the sky?"}"#,
            r#"{"videoId": "sky123"}"#,
            r#"{"videoId": "", "question": "What color is the sky?"}"#,
            r#"{"videoId": "sky123", "question": "   "}"#,
            r#"{"videoId": null, "question": "q"}"#,
            r#"{"videoId": 42, "question": "q"}"#,
            r#"["sky123"]"#,
            "not json",
        ] {
            let (status, json) = post_json(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json, serde_json::json!({ "error": MISSING_FIELDS }));
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_is_a_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/ask_video")
            .body(Body::from(r#"{"videoId": "sky123", "question": "q"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::builder()
            .method("POST")
            .uri("/ask_video")
            .header(CONTENT_TYPE, "application/json")
            .header("origin", "chrome-extension://abcdef")
            .body(Body::from(r#"{"videoId": "sky123", "question": "What color is the sky?"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
