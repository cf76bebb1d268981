use std::collections::BTreeMap;
use thiserror::Error;

/// Everything that can stop a seating plan from being produced or saved.
#[derive(Debug, Error)]
pub enum SeatingError {
    #[error("{0}")]
    InvalidSelection(String),
    #[error("{0}")]
    NotFound(String),
    #[error(
        "Selected batches contain students from only one department ({}). Please select batches from at least two departments.",
        .departments.join(", ")
    )]
    HomogeneousSelection { departments: Vec<String> },
    #[error(
        "Cannot form mixed pair for room \"{room}\". Not enough students from other departments to pair with \"{department}\"."
    )]
    UnpairableDepartment {
        room: String,
        department: String,
        remaining: BTreeMap<String, usize>,
    },
    #[error("No seats were assigned (not enough students or capacity).")]
    NoSeatsAssigned,
    #[error("Failed to save seating plan: {0}")]
    PersistenceFailure(#[source] rusqlite::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl SeatingError {
    /// Stable name of the failure kind, as reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            SeatingError::InvalidSelection(_) => "InvalidSelection",
            SeatingError::NotFound(_) => "NotFound",
            SeatingError::HomogeneousSelection { .. } => "HomogeneousSelection",
            SeatingError::UnpairableDepartment { .. } => "UnpairableDepartment",
            SeatingError::NoSeatsAssigned => "NoSeatsAssigned",
            SeatingError::PersistenceFailure(_) => "PersistenceFailure",
            SeatingError::Database(_) => "Database",
            SeatingError::Internal(_) => "Internal",
        }
    }
}

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
