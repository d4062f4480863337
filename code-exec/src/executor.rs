use rhai::{Dynamic, EvalAltResult, Scope};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;
use tracing::debug;

use crate::{
    capture::OutputCapture,
    convert::{dynamic_to_json, object_to_record},
    engine::{create_engine, DEADLINE_TOKEN},
    error::Error,
    traceback::{format_parse_traceback, format_traceback, root_cause},
    types::{ExecutionOutcome, ExecutionStats, ScriptLimits, ScriptRequest},
    INPUTS_BINDING, RESULT_BINDING,
};

/// Evaluates scripts synchronously, one fresh engine and capture per call
#[derive(Debug, Clone, Default)]
pub struct ScriptExecutor {
    limits: ScriptLimits,
}

impl ScriptExecutor {
    pub fn new(limits: ScriptLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ScriptLimits {
        &self.limits
    }

    /// Run a script to completion and collect its output and `result` binding
    pub fn execute(&self, request: &ScriptRequest) -> Result<ExecutionOutcome, Error> {
        let start = Instant::now();
        let capture = OutputCapture::new();
        let operations = Arc::new(AtomicU64::new(0));
        let engine = create_engine(
            &self.limits,
            &capture,
            start + self.limits.timeout,
            operations.clone(),
        );

        let inputs = object_to_record(&request.inputs)?;

        let mut scope = Scope::new();
        scope.push(INPUTS_BINDING, inputs);

        let ast = engine
            .compile(&request.script)
            .map_err(|e| Error::Compilation {
                message: e.to_string(),
                traceback: format_parse_traceback(&e, &request.script),
            })?;

        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| self.classify(&e, &request.script))?;

        let result = scope
            .get_value::<Dynamic>(RESULT_BINDING)
            .map(|value| dynamic_to_json(&value))
            .transpose()?;

        let stats = ExecutionStats {
            operations: operations.load(Ordering::Relaxed),
            execution_time: start.elapsed(),
        };
        debug!(
            operations = stats.operations,
            elapsed_ms = stats.execution_time.as_millis() as u64,
            has_result = result.is_some(),
            "Script finished"
        );

        Ok(ExecutionOutcome {
            stdout: capture.stdout(),
            stderr: capture.stderr(),
            result,
            stats,
        })
    }

    fn classify(&self, err: &EvalAltResult, script: &str) -> Error {
        let traceback = format_traceback(err, script);
        match root_cause(err) {
            EvalAltResult::ErrorTerminated(token, _)
                if token.clone().into_string().ok().as_deref() == Some(DEADLINE_TOKEN) =>
            {
                Error::Timeout {
                    timeout: self.limits.timeout,
                    traceback,
                }
            }
            EvalAltResult::ErrorTooManyOperations(_)
            | EvalAltResult::ErrorDataTooLarge(..)
            | EvalAltResult::ErrorStackOverflow(_) => Error::ResourceLimit {
                message: root_cause(err).to_string(),
                traceback,
            },
            _ => Error::Runtime {
                message: err.to_string(),
                traceback,
            },
        }
    }
}
