//! Backend errors shared by every storage capability.

use super::error_code::{self, GatekeeperErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("{backend} unavailable: {message}")]
    Unavailable { backend: String, message: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("unique constraint violated on {field} = {value}")]
    UniqueConstraint { field: String, value: String },
}

impl GatekeeperErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => error_code::STORAGE_UNAVAILABLE,
            Self::Io { .. } => error_code::STORAGE_IO,
            Self::Serialization { .. } => error_code::STORAGE_SERIALIZATION,
            Self::Sqlite { .. } => error_code::STORAGE_SQLITE,
            Self::UniqueConstraint { .. } => error_code::UNIQUE_CONSTRAINT,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
