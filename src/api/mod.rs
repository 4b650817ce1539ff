//! HTTP API for the agency.
//!
//! ## Endpoints
//!
//! - `POST /api/analyze` - Run the agency for `{brandTask, userTask}` and return the strategy
//! - `GET /health` - Health check
//! - `GET /` - Landing page

mod error;
pub mod types;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::agency::Agency;
use crate::config::Config;
use types::{AnalyzeRequest, AnalyzeResponse, HealthResponse, NotFoundResponse};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared state for all handlers.
pub struct AppState {
    pub agency: Agency,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the agency from `config` and serve until the process exits.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agency = Agency::from_config(&config)?;
    let app = router(Arc::new(AppState { agency }));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Recurso no encontrado".to_string(),
            status: StatusCode::NOT_FOUND.as_u16(),
        }),
    )
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request: AnalyzeRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "Unparsable analysis request body");
            return Err(ApiError::MissingFields);
        }
    };

    let (brand_task, user_task) = request.tasks().ok_or(ApiError::MissingFields)?;

    let classification = state.agency.develop_strategy(brand_task, user_task).await?;
    if !classification.strategy.has_content() {
        return Err(ApiError::EmptyStrategy);
    }

    Ok(Json(AnalyzeResponse {
        success: true,
        strategy: classification.strategy,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ChatSettings, GroupChat};
    use crate::llm::testing::ScriptedLlm;
    use crate::llm::LlmError;
    use crate::tools::{Language, SearchError, SearchProvider, ToolRegistry};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct NoSearch;

    #[async_trait]
    impl SearchProvider for NoSearch {
        async fn search(&self, _query: &str, _language: Language) -> Result<Value, SearchError> {
            Err(SearchError::MissingApiKey)
        }
    }

    fn app(llm: ScriptedLlm) -> Router {
        let chat = GroupChat::new(
            Arc::new(llm),
            ToolRegistry::new(Arc::new(NoSearch)),
            ChatSettings::default(),
        );
        router(Arc::new(AppState {
            agency: Agency::new(chat, 10),
        }))
    }

    async fn post_analyze(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post("/api/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn empty_body_is_a_bad_request() {
        let (status, body) = post_analyze(app(ScriptedLlm::new("ok")), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Se requieren tanto la marca como el objetivo");
    }

    #[tokio::test]
    async fn blank_or_malformed_input_is_a_bad_request() {
        let (status, _) = post_analyze(
            app(ScriptedLlm::new("ok")),
            r#"{"brandTask": "", "userTask": "Awareness"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_analyze(app(ScriptedLlm::new("ok")), "{brandTask").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn successful_run_returns_strategy() {
        let llm = ScriptedLlm::new("ok")
            .then_text("Resumen ejecutivo: campaña de lanzamiento")
            .then_text("Tres competidores clave. TERMINATE");

        let (status, body) = post_analyze(
            app(llm),
            r#"{"brandTask": "Acme", "userTask": "Awareness"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["strategy"]["resumen"],
            "Resumen ejecutivo: campaña de lanzamiento"
        );
        assert_eq!(
            body["strategy"]["investigacion"],
            json!(["Tres competidores clave. TERMINATE"])
        );
        assert_eq!(body["strategy"]["pasos"], json!([]));
    }

    #[tokio::test]
    async fn run_without_classifiable_content_is_a_server_error() {
        let llm = ScriptedLlm::new("ok").then_text("Hola equipo. TERMINATE");

        let (status, body) = post_analyze(
            app(llm),
            r#"{"brandTask": "Acme", "userTask": "Awareness"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No se pudo generar la estrategia");
    }

    #[tokio::test]
    async fn model_failure_is_a_generic_server_error() {
        let llm = ScriptedLlm::new("ok").then_error(LlmError::Api {
            status: 401,
            message: "Incorrect API key provided: sk-secret".to_string(),
        });

        let (status, body) = post_analyze(
            app(llm),
            r#"{"brandTask": "Acme", "userTask": "Awareness"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(!body["error"].as_str().unwrap().contains("sk-secret"));
        assert!(body.get("strategy").is_none());
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = app(ScriptedLlm::new("ok"))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let response = app(ScriptedLlm::new("ok"))
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"error": "Recurso no encontrado", "status": 404}));
    }

    #[tokio::test]
    async fn landing_page_is_served() {
        let response = app(ScriptedLlm::new("ok"))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
