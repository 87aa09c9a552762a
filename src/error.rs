use thiserror::Error;

/// Errors raised while loading inputs or configuring the fusion pipeline.
///
/// Algorithmic outcomes (dropped points, unmatched regions, non-approaching
/// objects) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No frames found in {0}")]
    EmptySequence(String),
}

pub type Result<T> = std::result::Result<T, FusionError>;
