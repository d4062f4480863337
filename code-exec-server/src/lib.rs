use axum::{
    routing::{get, post},
    Router,
};
use code_exec::CodeExecutionService;
use doc_service::DocumentClient;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod handlers;
mod types;

pub use handlers::{is_truthy, RunError};
pub use types::{
    ErrorResponse, ExecutionRequest, LivenessResponse, OutputExpectations, RunResponse,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

#[derive(Clone)]
pub struct AppState {
    service: CodeExecutionService,
    documents: Arc<DocumentClient>,
    info: Arc<ServiceInfo>,
}

impl AppState {
    pub fn new(
        service: CodeExecutionService,
        documents: DocumentClient,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            service,
            documents: Arc::new(documents),
            info: Arc::new(ServiceInfo {
                name: service_name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
        }
    }

    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/health", get(handlers::health_check))
        .route("/run_python", post(handlers::run_script))
        .route("/run", post(handlers::run_script))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, app).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    info!(
        "Starting script runner on {}",
        listener.local_addr().map_err(ServerError::Serve)?
    );
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use code_exec::ScriptLimits;
    use doc_service::DocumentServiceConfig;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_app(document_service_url: &str) -> Router {
        let service = CodeExecutionService::new(2, ScriptLimits::default());
        let documents = DocumentClient::new(
            DocumentServiceConfig::new(document_service_url).with_timeout(Duration::from_secs(2)),
        )
        .expect("Failed to create document client");
        create_app(AppState::new(service, documents, "test-runner"))
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        post_raw(app, serde_json::to_string(&body).unwrap()).await
    }

    async fn post_raw(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/run_python")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app("http://127.0.0.1:9");

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_liveness() {
        let app = create_test_app("http://127.0.0.1:9");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let liveness: LivenessResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(liveness.status, "ok");
        assert_eq!(liveness.service, "test-runner");
        assert_eq!(liveness.version, env!("CARGO_PKG_VERSION"));
        assert!(!liveness.timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_missing_script() {
        for body in [json!({}), json!({"script": ""}), json!({"script": null, "inputs": {}})] {
            let app = create_test_app("http://127.0.0.1:9");
            let (status, value) = post_json(app, body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value["error"], "No script was provided for execution.");
            assert!(value.get("stdout").is_none());
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = create_test_app("http://127.0.0.1:9");
        let (status, value) = post_raw(app, "{not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_context_must_be_an_object() {
        let app = create_test_app("http://127.0.0.1:9");
        let (status, _) = post_json(
            app,
            json!({"script": "let result = 1;", "execution_context": [1, 2]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_execute_without_export() {
        let app = create_test_app("http://127.0.0.1:9");
        let (status, value) = post_json(
            app,
            json!({
                "script": "let result = #{a: 1, b: 2};",
                "inputs": {},
                "output_expectations": {"send_to_document_service": false}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["stdout"], "");
        assert_eq!(value["stderr"], "");
        assert_eq!(value["result"], json!({"a": 1, "b": 2}));
        assert!(value.get("document_service").is_none());
        assert_eq!(value["service"], "test-runner");
    }

    #[tokio::test]
    async fn test_stdout_and_context_echo() {
        let app = create_test_app("http://127.0.0.1:9");
        let (status, value) = post_json(
            app,
            json!({
                "script": "print(`hello ${inputs.name}`); let result = inputs.n * 2;",
                "inputs": {"name": "auditor", "n": 21},
                "execution_context": {"task_name": "ratio check", "tags": ["q3"]}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["stdout"], "hello auditor\n");
        assert_eq!(value["result"], 42);
        assert_eq!(
            value["execution_context"],
            json!({"task_name": "ratio check", "tags": ["q3"]})
        );
    }

    #[tokio::test]
    async fn test_script_error() {
        let app = create_test_app("http://127.0.0.1:9");
        let (status, value) = post_json(
            app,
            json!({"script": "print(\"partial\");\nthrow \"bad ledger\";"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(value["error"].as_str().unwrap().contains("bad ledger"));
        assert!(value["traceback"]
            .as_str()
            .unwrap()
            .contains("throw \"bad ledger\";"));
        assert!(value.get("stdout").is_none());
    }

    #[tokio::test]
    async fn test_csv_export() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_csv"))
            .and(body_json(json!({"headers": ["a", "b"], "rows": [["1", "2"]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": "report.csv"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = create_test_app(&mock_server.uri());
        let (status, value) = post_json(
            app,
            json!({
                "script": "let result = #{a: 1, b: 2};",
                "output_expectations": {"send_to_document_service": true, "format": "CSV"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["document_service"], json!({"file": "report.csv"}));
    }

    #[tokio::test]
    async fn test_export_keeps_field_order() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_csv"))
            .and(body_json(json!({
                "headers": ["revenue", "cost", "margin"],
                "rows": [["900", "600", "300"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = create_test_app(&mock_server.uri());
        let (status, value) = post_json(
            app,
            json!({
                "script": "let result = inputs; result.margin = inputs.revenue - inputs.cost;",
                "inputs": {"revenue": 900, "cost": 600},
                "output_expectations": {"send_to_document_service": true, "format": "csv"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["document_service"], json!({"ok": true}));
        let keys: Vec<_> = value["result"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["revenue", "cost", "margin"]);
    }

    #[tokio::test]
    async fn test_default_format_is_excel() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_excel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = create_test_app(&mock_server.uri());
        let (_, value) = post_json(
            app,
            json!({
                "script": "let result = [1, 2];",
                "output_expectations": {"send_to_document_service": true}
            }),
        )
        .await;

        assert_eq!(value["document_service"], json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_falsy_result_skips_export() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        for script in ["let result = 0;", "let result = #{};", "print(1);"] {
            let app = create_test_app(&mock_server.uri());
            let (status, value) = post_json(
                app,
                json!({
                    "script": script,
                    "output_expectations": {"send_to_document_service": true, "format": "pdf"}
                }),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert!(value.get("document_service").is_none());
        }
    }

    #[tokio::test]
    async fn test_export_failure_is_embedded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_pptx"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let app = create_test_app(&mock_server.uri());
        let (status, value) = post_json(
            app,
            json!({
                "script": "let result = #{kpi: 3};",
                "output_expectations": {"send_to_document_service": true, "format": "pptx"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["result"], json!({"kpi": 3}));
        assert_eq!(
            value["document_service"]["error"],
            "Document generation failed (503)"
        );
        assert_eq!(
            value["document_service"]["endpoint"],
            format!("{}/generate_pptx", mock_server.uri())
        );
    }

    #[tokio::test]
    async fn test_unreachable_document_service() {
        let app = create_test_app("http://127.0.0.1:9");
        let (status, value) = post_json(
            app,
            json!({
                "script": "let result = \"done\";",
                "output_expectations": {"send_to_document_service": true, "format": "word"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(value["document_service"]["error"].is_string());
        assert_eq!(
            value["document_service"]["endpoint"],
            "http://127.0.0.1:9/generate_word"
        );
    }
}
