use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Record processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
