use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Script execution request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptRequest {
    /// Rhai source to evaluate
    pub script: String,
    /// Bound as `inputs` inside the script
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

impl ScriptRequest {
    pub fn new(script: impl Into<String>, inputs: Map<String, Value>) -> Self {
        Self {
            script: script.into(),
            inputs,
        }
    }
}

/// Everything observed from one script run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Text written with `print`
    pub stdout: String,
    /// Text written with `eprint` and `debug`
    pub stderr: String,
    /// Value bound to `result` when the script finished; `None` when never bound
    pub result: Option<Value>,
    pub stats: ExecutionStats,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Engine operations performed
    pub operations: u64,
    /// Wall-clock time spent evaluating
    #[serde(with = "duration_serde")]
    pub execution_time: Duration,
}

/// Ceilings applied to every script engine. Zero disables a size/operation ceiling.
#[derive(Debug, Clone)]
pub struct ScriptLimits {
    /// Maximum number of engine operations
    pub max_operations: u64,
    /// Maximum function call nesting depth
    pub max_call_levels: usize,
    /// Maximum expression nesting depth
    pub max_expr_depth: usize,
    /// Maximum string length in characters
    pub max_string_size: usize,
    /// Maximum number of array elements
    pub max_array_size: usize,
    /// Maximum number of object map entries
    pub max_map_size: usize,
    /// Wall-clock deadline for one run
    pub timeout: Duration,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_operations: 50_000_000,
            max_call_levels: 64,
            max_expr_depth: 128,
            max_string_size: 1024 * 1024, // 1MB
            max_array_size: 100_000,
            max_map_size: 100_000,
            timeout: Duration::from_secs(30),
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
