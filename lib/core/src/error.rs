use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Not fitted: {0}")]
    NotFitted(String),

    #[error("Mismatched lengths for query '{query}': {expected} true labels, {actual} predictions")]
    MismatchedLengths {
        query: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric already registered: {0}")]
    DuplicateMetric(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' has type {actual}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No query group left to evaluate for metric '{0}'")]
    EmptyEvaluation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
