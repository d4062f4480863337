use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use code_exec::ScriptRequest;
use doc_service::FormatTag;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    types::{ErrorResponse, ExecutionRequest, LivenessResponse, RunResponse},
    AppState,
};

const DEFAULT_FORMAT: &str = "excel";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("No script was provided for execution.")]
    MissingScript,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Execution(#[from] code_exec::Error),
}

impl RunError {
    fn status(&self) -> StatusCode {
        match self {
            RunError::MissingScript | RunError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RunError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_envelope(self, service: &str) -> Response {
        let traceback = match &self {
            RunError::Execution(e) => Some(e.traceback()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            traceback,
            service: service.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
        service: state.info.name.clone(),
        version: state.info.version.clone(),
        message: "Script runner is up. POST a script to /run_python to execute it.".to_string(),
        timestamp: timestamp(),
    })
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn run_script(State(state): State<AppState>, body: Bytes) -> Response {
    match execute_request(&state, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            match &e {
                RunError::Execution(inner) => error!("Script request failed: {}", inner),
                other => info!("Rejected script request: {}", other),
            }
            e.into_envelope(&state.info.name)
        }
    }
}

async fn execute_request(state: &AppState, body: &[u8]) -> Result<RunResponse, RunError> {
    let request: ExecutionRequest =
        serde_json::from_slice(body).map_err(|e| RunError::InvalidBody(e.to_string()))?;

    let script = request.script.unwrap_or_default();
    if script.is_empty() {
        return Err(RunError::MissingScript);
    }
    if !request.document_service.is_empty() {
        debug!("Ignoring per-request document_service settings");
    }

    let outcome = state
        .service
        .execute(ScriptRequest::new(script, request.inputs))
        .await?;
    let result = outcome.result.unwrap_or(Value::Null);

    let expectations = request.output_expectations;
    let document_service = if expectations.send_to_document_service && is_truthy(&result) {
        let format: FormatTag = expectations
            .format
            .as_deref()
            .unwrap_or(DEFAULT_FORMAT)
            .parse()
            .unwrap_or_default();
        Some(
            state
                .documents
                .export(&format, &result, &request.execution_context)
                .await,
        )
    } else {
        None
    };

    Ok(RunResponse {
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        result,
        execution_context: request.execution_context,
        document_service,
        timestamp: timestamp(),
        service: state.info.name.clone(),
    })
}

/// Falsy: null, `false`, zero, empty string, empty array, empty object.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
