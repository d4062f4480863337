use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "https://universal-creador-documentos.onrender.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentServiceConfig {
    /// Base URL of the document-generation service
    pub base_url: String,

    /// Timeout for the single outbound call
    #[serde(with = "secs")]
    pub timeout: Duration,
}

impl DocumentServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash
    pub(crate) fn normalized_base_url(&self) -> Result<&str, Error> {
        let base = self.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "document service URL must be http(s): {:?}",
                self.base_url
            )));
        }
        Ok(base)
    }
}

impl Default for DocumentServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
