#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the quote vision server.
//!
//! Every JSON endpoint wraps its payload in [`ApiResponse`] on success and
//! [`ApiError`] on failure, so the frontend can branch on `success`.
//! Query parameter structs are kept as raw strings and converted into
//! database filters with `into_filter`, which is where malformed values
//! are rejected.

use std::str::FromStr as _;

use chrono::{DateTime, SubsecRound as _, Utc};
use quote_vision_database_models::dates::parse_date;
use quote_vision_database_models::{ProjectFilter, QuoteFilter};
use quote_vision_roofing_models::RoofType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Number of items in `data`, present on list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// The payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wraps a single payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            count: None,
            data,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wraps a list payload and records its length in `count`.
    #[must_use]
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            data,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
}

impl ApiError {
    /// Creates a failure envelope with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiHealth {
    /// `"ok"` while the server is up.
    pub status: &'static str,
}

/// `GET /` response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiWelcome {
    /// Greeting.
    pub message: &'static str,
    /// Server version.
    pub version: &'static str,
}

/// A query parameter that couldn't be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    /// `roofType` is not one of the known materials.
    #[error("Invalid roof type: {value}")]
    RoofType {
        /// The rejected value.
        value: String,
    },

    /// A date bound is not a recognized date or timestamp.
    #[error("Invalid {field}: {value}")]
    Date {
        /// Query parameter name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Query parameters for `GET /api/quotes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQueryParams {
    /// State abbreviation.
    pub state: Option<String>,
    /// Roofing material label.
    pub roof_type: Option<String>,
}

impl QuoteQueryParams {
    /// Converts the raw parameters into a [`QuoteFilter`]. Empty values are
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`FilterParseError`] if `roofType` is unknown.
    pub fn into_filter(self) -> Result<QuoteFilter, FilterParseError> {
        Ok(QuoteFilter {
            state: present(self.state),
            roof_type: parse_roof_type(self.roof_type)?,
        })
    }
}

/// Query parameters for the project list, stats and export endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQueryParams {
    /// State abbreviation.
    pub state: Option<String>,
    /// Roofing material label.
    pub roof_type: Option<String>,
    /// Earliest project date (inclusive).
    pub date_from: Option<String>,
    /// Latest project date (inclusive).
    pub date_to: Option<String>,
}

impl ProjectQueryParams {
    /// Converts the raw parameters into a [`ProjectFilter`]. Empty values
    /// are treated as absent. A bare `YYYY-MM-DD` bound means midnight UTC
    /// of that day. Bounds are truncated to milliseconds, the precision
    /// timestamps are stored with.
    ///
    /// # Errors
    ///
    /// Returns [`FilterParseError`] if `roofType` is unknown or a date
    /// bound cannot be parsed.
    pub fn into_filter(self) -> Result<ProjectFilter, FilterParseError> {
        Ok(ProjectFilter {
            state: present(self.state),
            roof_type: parse_roof_type(self.roof_type)?,
            date_from: parse_bound(self.date_from, "dateFrom")?,
            date_to: parse_bound(self.date_to, "dateTo")?,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_roof_type(value: Option<String>) -> Result<Option<RoofType>, FilterParseError> {
    present(value)
        .map(|v| RoofType::from_str(&v).map_err(|_| FilterParseError::RoofType { value: v }))
        .transpose()
}

fn parse_bound(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, FilterParseError> {
    present(value)
        .map(|v| {
            parse_date(&v)
                .map(|dt| dt.trunc_subsecs(3))
                .ok_or(FilterParseError::Date { field, value: v })
        })
        .transpose()
}
