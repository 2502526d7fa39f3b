//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - members(id, first_name, last_name, field, interest, title, contact_info, dean_of_faculty, image_bytes)
//! - interests(id, name, field, stage)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, TecStore};
