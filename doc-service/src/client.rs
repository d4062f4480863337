use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::{
    config::DocumentServiceConfig,
    error::Error,
    payload::build_payload,
    types::{DocumentPayload, FormatTag},
};

/// Client for the external document-generation service
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: Client,
    base_url: String,
}

impl DocumentClient {
    /// Create a new DocumentClient with the given configuration
    pub fn new(config: DocumentServiceConfig) -> Result<Self, Error> {
        let base_url = config.normalized_base_url()?.to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/generate_{format}`
    pub fn endpoint(&self, format: &FormatTag) -> String {
        format!("{}/generate_{}", self.base_url, format)
    }

    /// Send one payload. Only a 200 answer counts as success.
    pub async fn generate(
        &self,
        format: &FormatTag,
        payload: &DocumentPayload,
    ) -> Result<Value, Error> {
        let endpoint = self.endpoint(format);
        debug!(%endpoint, "Sending payload to document service");

        let response = self.client.post(&endpoint).json(payload).send().await?;

        if response.status() != StatusCode::OK {
            return Err(Error::Api {
                status_code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response.json::<Value>().await.map_err(Error::HttpClient)
    }

    /// Build the payload for `result`, send it, and fold every failure into data.
    ///
    /// Returns the service's JSON on success, `{error, endpoint, payload}` when the
    /// service answers with a non-200 status, and `{error, endpoint}` when the call
    /// itself fails.
    pub async fn export(
        &self,
        format: &FormatTag,
        result: &Value,
        execution_context: &Map<String, Value>,
    ) -> Value {
        let endpoint = self.endpoint(format);
        let payload = build_payload(format, result, execution_context);

        match self.generate(format, &payload).await {
            Ok(document) => {
                info!(%endpoint, "Document generated");
                document
            }
            Err(e @ Error::Api { .. }) => {
                warn!(%endpoint, "Document service rejected payload: {}", e);
                json!({
                    "error": e.to_string(),
                    "endpoint": endpoint,
                    "payload": payload,
                })
            }
            Err(e) => {
                warn!(%endpoint, "Document service call failed: {}", e);
                json!({
                    "error": e.to_string(),
                    "endpoint": endpoint,
                })
            }
        }
    }
}
