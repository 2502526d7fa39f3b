//! # Tec - Technical-Engineering Complex Directory
//!
//! Local lookup database of the complex's staff members and study interests.
//!
//! Tec provides:
//! - `Member` and `Interest` records with role derived from the stored tri-state
//! - SQLite-backed storage with locale-aware collation
//! - An async query facade whose reads are live subscriptions
//! - Static reference data (history, facilities, former deans, groups)
//! - Composite home and group overviews

pub mod member;
pub mod interest;
pub mod collation;
pub mod storage;
pub mod repository;
pub mod reference;
pub mod overview;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use member::{Contact, Member, Role};
pub use interest::Interest;
pub use storage::TecStore;
pub use repository::{Repository, Subscription};
pub use reference::Group;

use std::path::PathBuf;

/// Result type alias for Tec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tec operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Member not found: {0}")]
    MemberNotFound(i64),

    #[error("Collation error: {0}")]
    Collation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Integrity(msg.unwrap_or_else(|| e.to_string()))
            }
            other => Error::Storage(other),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}
