use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /run_python`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Free-form, echoed back verbatim
    #[serde(default)]
    pub execution_context: Map<String, Value>,
    #[serde(default)]
    pub output_expectations: OutputExpectations,
    /// Accepted for compatibility; the document service address is deployment config
    #[serde(default)]
    pub document_service: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputExpectations {
    #[serde(default)]
    pub send_to_document_service: bool,
    /// Defaults to `excel` when absent
    #[serde(default)]
    pub format: Option<String>,
}

/// Reply for a script that ran to completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub stdout: String,
    pub stderr: String,
    pub result: Value,
    pub execution_context: Map<String, Value>,
    /// Present only when an export was attempted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_service: Option<Value>,
    pub timestamp: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub message: String,
    pub timestamp: String,
}
