use thiserror::Error;

/// Core error types for Pokedex operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Pokemon not found: {0}")]
    NotFound(String),

    #[error("Invalid page query: {0}")]
    InvalidQuery(String),

    #[error("Snapshot I/O error: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("Snapshot JSON error: {0}")]
    SnapshotJson(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new NotFound error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a new InvalidQuery error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
