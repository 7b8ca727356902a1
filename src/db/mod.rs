//! Persistence collaborator: store a record, look it up by patient id.

pub mod sqlite;
pub mod repository;
pub mod store;
pub mod rest;

pub use sqlite::*;
pub use repository::*;
pub use store::*;
pub use rest::RestStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidRow { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Store accepted the insert but returned no record")]
    EmptyResponse,

    #[error("Store lock poisoned")]
    LockPoisoned,
}
