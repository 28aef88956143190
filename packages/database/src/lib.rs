#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `SQLite` storage for quotes and projects.
//!
//! Uses `switchy_database` for all database operations. Timestamps are
//! stored as RFC 3339 text (see
//! [`quote_vision_database_models::dates::format_timestamp`]) so date range
//! filters can be pushed down as plain string comparisons.

pub mod db;
pub mod queries;
pub mod seed;

use quote_vision_database_models::ValidationError;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database file could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An insert payload failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
