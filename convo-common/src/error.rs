//! Errors raised while loading the dataset, reading configuration and
//! persisting viewed state

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure in dataset, configuration or key/value store handling
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite key/value store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Dataset, config or database file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset or stored value could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config unreadable, or a resolved setting out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// No conversation or character with the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed query, filter or identifier
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_converts() {
        let err: Error = serde_json::from_str::<Vec<String>>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
