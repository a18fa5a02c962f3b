// ⚠️ Error Types
// Typed failures for lookups, filter criteria and exports.
// Loaders and binaries use anyhow at the I/O edges.

use thiserror::Error;

// ============================================================================
// LOOKUP ERRORS (non-fatal: reported, then None)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Input error: designation cannot be empty")]
    EmptyDesignation,

    #[error("Input error: name cannot be empty")]
    EmptyName,

    #[error("Search error: NEO with designation '{0}' not found")]
    DesignationNotFound(String),

    #[error("Search error: NEO with name '{0}' not found")]
    NameNotFound(String),
}

impl LookupError {
    /// True for bad input, false for a plain miss
    pub fn is_input_error(&self) -> bool {
        matches!(self, LookupError::EmptyDesignation | LookupError::EmptyName)
    }
}

// ============================================================================
// FILTER ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A criterion with no attribute accessor behind it
    #[error("Filter criterion '{0}' is unsupported")]
    UnsupportedCriterion(String),

    #[error("Invalid operator in criterion '{0}' (expected one of =, >=, <=)")]
    InvalidOperator(String),

    #[error("Invalid value '{value}' for {kind} filter")]
    InvalidValue { kind: String, value: String },
}

// ============================================================================
// EXPORT ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported output format: {0:?} (expected .csv or .json)")]
    UnsupportedFormat(std::path::PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
