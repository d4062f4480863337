use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    executor::ScriptExecutor,
    types::{ExecutionOutcome, ScriptLimits, ScriptRequest},
};

#[derive(Clone)]
pub struct CodeExecutionService {
    executor: Arc<ScriptExecutor>,
    semaphore: Arc<Semaphore>,
}

impl CodeExecutionService {
    pub fn new(max_concurrent_executions: usize, limits: ScriptLimits) -> Self {
        Self {
            executor: Arc::new(ScriptExecutor::new(limits)),
            semaphore: Arc::new(Semaphore::new(max_concurrent_executions)),
        }
    }

    pub async fn execute(&self, request: ScriptRequest) -> Result<ExecutionOutcome, Error> {
        // Acquire execution permit
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::System(format!("Failed to acquire execution permit: {}", e)))?;

        debug!(
            script_bytes = request.script.len(),
            inputs = request.inputs.len(),
            "Starting script execution"
        );

        // The engine is synchronous; keep it off the async workers
        let executor = self.executor.clone();
        let result = tokio::task::spawn_blocking(move || executor.execute(&request))
            .await
            .map_err(|e| Error::System(format!("Script worker failed: {}", e)))?;

        match &result {
            Ok(outcome) => info!(
                operations = outcome.stats.operations,
                elapsed_ms = outcome.stats.execution_time.as_millis() as u64,
                "Script execution completed successfully"
            ),
            Err(e) => warn!("Script execution failed: {}", e),
        }

        result
    }

    pub fn get_available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn limits(&self) -> &ScriptLimits {
        self.executor.limits()
    }
}
