use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid criterion: {0}")]
    InvalidCriterion(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown record id: {0}")]
    UnknownRecord(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
