//! Ошибки подготовки признаков

use thiserror::Error;

use crate::preprocessing::mappings::BucketDomain;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(
        "No fallback derivable for {domain}: none of {rows} fitting rows maps to a known bucket"
    )]
    NoFallback { domain: BucketDomain, rows: usize },

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Row count mismatch for column '{column}': expected {expected}, got {got}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Unknown labels in column '{column}': {labels:?}")]
    UnknownLabels { column: String, labels: Vec<String> },

    #[error("Classes of column '{column}' must be sorted and unique")]
    UnsortedClasses { column: String },

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;
