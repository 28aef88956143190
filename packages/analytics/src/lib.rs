#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard statistics aggregation and CSV export.
//!
//! Both operate on an already-loaded slice of [`ProjectRow`]s and perform
//! no I/O of their own beyond writing to the supplied sink, so handlers can
//! call them directly on data fetched from the database.
//!
//! [`ProjectRow`]: quote_vision_database_models::ProjectRow

pub mod export;
pub mod stats;

use thiserror::Error;

/// Errors that can occur while exporting project data.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The generated output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
