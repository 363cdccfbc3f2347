use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be between 1 and {max} ms, got {value}")]
    InvalidDelay {
        field: &'static str,
        value: u64,
        max: u64,
    },
}
