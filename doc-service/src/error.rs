use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Document generation failed ({status_code})")]
    Api { status_code: u16, message: String },
}
