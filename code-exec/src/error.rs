use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Compilation failed: {message}")]
    Compilation { message: String, traceback: String },

    #[error("{message}")]
    Runtime { message: String, traceback: String },

    #[error("Timeout after {} ms", timeout.as_millis())]
    Timeout { timeout: Duration, traceback: String },

    #[error("Resource limit exceeded: {message}")]
    ResourceLimit { message: String, traceback: String },

    #[error("Invalid inputs: {0}")]
    InvalidInputs(String),

    #[error("Result is not JSON-serializable: {0}")]
    Conversion(String),

    #[error("System error: {0}")]
    System(String),
}

impl Error {
    /// Full trace for the failure. Variants raised outside the script body have no
    /// frames, so their trace is the error line alone.
    pub fn traceback(&self) -> String {
        match self {
            Error::Compilation { traceback, .. }
            | Error::Runtime { traceback, .. }
            | Error::Timeout { traceback, .. }
            | Error::ResourceLimit { traceback, .. } => traceback.clone(),
            other => format!("Traceback (most recent call last):\n{}", other),
        }
    }
}
