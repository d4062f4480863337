//! # Document Service
//!
//! Turns a script result into one of the payload shapes accepted by the external
//! document-generation service and forwards it with a single `POST {base}/generate_{format}`.
//!
//! ## Features
//!
//! - Closed set of format tags (`excel`, `pdf`, `word`, `pptx`, `csv`) with a generic fallback
//! - Pure, deterministic payload builder
//! - One outbound call per export, no retries
//! - Export failures are returned as data, never as errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use doc_service::{DocumentClient, DocumentServiceConfig, FormatTag};
//! use serde_json::{json, Map};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DocumentClient::new(DocumentServiceConfig::default())?;
//!
//!     let format: FormatTag = "csv".parse()?;
//!     let outcome = client
//!         .export(&format, &json!({"a": 1, "b": 2}), &Map::new())
//!         .await;
//!
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! [`DocumentClient::generate`] reports transport failures, non-200 answers and bad
//! configuration through [`Error`]. [`DocumentClient::export`] folds all of those into
//! an `{error, endpoint}` object so callers can embed it in an otherwise successful reply.

mod client;
mod config;
mod error;
mod payload;
mod types;

pub use client::DocumentClient;
pub use config::{DocumentServiceConfig, DEFAULT_BASE_URL};
pub use error::Error;
pub use payload::{build_payload, stringify};
pub use types::*;

/// Result type for document service operations
pub type Result<T> = std::result::Result<T, Error>;
