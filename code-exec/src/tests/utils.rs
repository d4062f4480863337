pub mod defaults {
    use crate::{ScriptLimits, ScriptRequest};
    use serde_json::{Map, Value};
    use std::time::Duration;

    pub fn default_test_limits() -> ScriptLimits {
        ScriptLimits {
            max_operations: 1_000_000,
            timeout: Duration::from_secs(5),
            ..ScriptLimits::default()
        }
    }

    pub fn tight_limits() -> ScriptLimits {
        ScriptLimits {
            max_operations: 0,
            max_string_size: 64,
            max_array_size: 16,
            max_map_size: 16,
            timeout: Duration::from_millis(200),
            ..ScriptLimits::default()
        }
    }

    pub fn request(script: &str, inputs: Value) -> ScriptRequest {
        let inputs = match inputs {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ScriptRequest::new(script, inputs)
    }
}
