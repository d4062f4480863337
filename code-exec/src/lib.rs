//! # Code Execution Service
//!
//! Runs caller-supplied Rhai scripts in-process against a namespace holding a single
//! `inputs` binding. Every call gets its own engine and its own output capture, so
//! concurrent executions never observe each other's `print` output.
//!
//! A script publishes its result by declaring `result` at the top level:
//!
//! ```rhai
//! print(`processing ${inputs.len()} fields`);
//! let result = #{ total: inputs.a + inputs.b };
//! ```
//!
//! `inputs` is bound as a [`Record`], which keeps the caller's key order. Maps written
//! as `#{...}` iterate in key order; a script that needs its own field order builds a
//! record instead:
//!
//! ```rhai
//! let result = record();
//! result.revenue = inputs.revenue;
//! result.cost = inputs.cost;
//! ```

mod capture;
mod convert;
mod engine;
mod error;
mod executor;
mod record;
mod service;
mod traceback;
mod types;

#[cfg(test)]
mod tests;

pub use capture::OutputCapture;
pub use engine::create_engine;
pub use error::Error;
pub use executor::ScriptExecutor;
pub use record::Record;
pub use service::CodeExecutionService;
pub use traceback::format_traceback;
pub use types::{ExecutionOutcome, ExecutionStats, ScriptLimits, ScriptRequest};

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;

/// Name of the single binding pre-declared in every script namespace.
pub const INPUTS_BINDING: &str = "inputs";

/// Name the executed script must bind for its value to be observed.
pub const RESULT_BINDING: &str = "result";
