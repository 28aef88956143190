#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Stored row types, insert payloads and query filters.
//!
//! These types represent quotes and projects as stored in and retrieved
//! from the `SQLite` database. [`ProjectRow`] is also the record type the
//! dashboard statistics are computed over.

pub mod dates;

use chrono::{DateTime, Utc};
use quote_vision_roofing_models::RoofType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contractor quote request as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRow {
    /// Primary key (UUID v4).
    pub id: String,
    /// Name of the contractor requesting the quote.
    pub contractor_name: String,
    /// Contractor's company.
    pub company: String,
    /// Roof area in square feet.
    pub roof_size: f64,
    /// Roofing material.
    pub roof_type: RoofType,
    /// City of the prospective project.
    pub project_city: String,
    /// Two-letter state abbreviation.
    pub project_state: String,
    /// Planned project date.
    pub project_date: DateTime<Utc>,
    /// When the quote was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// An installed or in-progress project with recorded performance metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    /// Primary key (UUID v4).
    pub id: String,
    /// Name of the installing contractor.
    pub contractor_name: String,
    /// Contractor's company.
    pub company: String,
    /// Roof area in square feet.
    pub roof_size: f64,
    /// Roofing material.
    pub roof_type: RoofType,
    /// City of the project.
    pub project_city: String,
    /// Two-letter state abbreviation.
    pub project_state: String,
    /// Project date, used for date range filtering.
    pub project_date: DateTime<Utc>,
    /// Whether installation has finished.
    pub completed: bool,
    /// Annual energy savings in kWh.
    pub energy_savings: f64,
    /// Annual cost savings in dollars.
    pub cost_savings: f64,
    /// Roof surface temperature reduction in degrees Fahrenheit.
    pub temperature_reduction: f64,
    /// When the coating was installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_date: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Errors raised when an insert payload breaks a field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty after trimming.
    #[error("{field} is required")]
    Missing {
        /// Human-readable field name.
        field: &'static str,
    },

    /// A numeric field was NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite {
        /// Human-readable field name.
        field: &'static str,
    },

    /// A numeric field that must be non-negative was negative.
    #[error("{field} must not be negative")]
    Negative {
        /// Human-readable field name.
        field: &'static str,
    },

    /// A date fell outside the years 0000 to 9999.
    #[error("{field} must be between years 0000 and 9999")]
    DateOutOfRange {
        /// Human-readable field name.
        field: &'static str,
    },
}

/// Payload for submitting a new quote.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    /// Name of the contractor requesting the quote.
    pub contractor_name: String,
    /// Contractor's company.
    pub company: String,
    /// Roof area in square feet.
    pub roof_size: f64,
    /// Roofing material.
    pub roof_type: RoofType,
    /// City of the prospective project.
    pub project_city: String,
    /// Two-letter state abbreviation.
    pub project_state: String,
    /// Planned project date.
    #[serde(with = "dates::flexible")]
    pub project_date: DateTime<Utc>,
    /// Submission time; defaults to now when absent.
    #[serde(default, with = "dates::flexible::option")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl NewQuote {
    /// Trims text fields and checks field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for the first field that is empty,
    /// non-finite, negative or out of the storable date range.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.contractor_name = required(&self.contractor_name, "Contractor name")?;
        self.company = required(&self.company, "Company name")?;
        self.project_city = required(&self.project_city, "Project city")?;
        self.project_state = required(&self.project_state, "Project state")?;
        non_negative(self.roof_size, "Roof size")?;
        storable(Some(&self.project_date), "Project date")?;
        storable(self.submitted_at.as_ref(), "Submission date")?;
        Ok(self)
    }
}

/// Payload for recording a new project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    /// Name of the installing contractor.
    pub contractor_name: String,
    /// Contractor's company.
    pub company: String,
    /// Roof area in square feet.
    pub roof_size: f64,
    /// Roofing material.
    pub roof_type: RoofType,
    /// City of the project.
    pub project_city: String,
    /// Two-letter state abbreviation.
    pub project_state: String,
    /// Project date.
    #[serde(with = "dates::flexible")]
    pub project_date: DateTime<Utc>,
    /// Whether installation has finished.
    #[serde(default)]
    pub completed: bool,
    /// Annual energy savings in kWh.
    pub energy_savings: f64,
    /// Annual cost savings in dollars.
    pub cost_savings: f64,
    /// Roof surface temperature reduction in degrees Fahrenheit.
    pub temperature_reduction: f64,
    /// When the coating was installed.
    #[serde(default, with = "dates::flexible::option")]
    pub installation_date: Option<DateTime<Utc>>,
}

impl NewProject {
    /// Trims text fields and checks field constraints.
    ///
    /// `temperature_reduction` may be negative but must be finite.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for the first field that is empty,
    /// non-finite, negative or out of the storable date range.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.contractor_name = required(&self.contractor_name, "Contractor name")?;
        self.company = required(&self.company, "Company name")?;
        self.project_city = required(&self.project_city, "Project city")?;
        self.project_state = required(&self.project_state, "Project state")?;
        non_negative(self.roof_size, "Roof size")?;
        non_negative(self.energy_savings, "Energy savings")?;
        non_negative(self.cost_savings, "Cost savings")?;
        if !self.temperature_reduction.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "Temperature reduction",
            });
        }
        storable(Some(&self.project_date), "Project date")?;
        storable(self.installation_date.as_ref(), "Installation date")?;
        Ok(self)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(trimmed.to_string())
}

fn non_negative(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

fn storable(value: Option<&DateTime<Utc>>, field: &'static str) -> Result<(), ValidationError> {
    if value.is_some_and(|dt| !dates::is_storable(dt)) {
        return Err(ValidationError::DateOutOfRange { field });
    }
    Ok(())
}

/// Filter for listing quotes. Absent fields do not narrow the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFilter {
    /// Exact state abbreviation.
    pub state: Option<String>,
    /// Exact roofing material.
    pub roof_type: Option<RoofType>,
}

/// Filter for listing projects and computing dashboard statistics.
///
/// All present fields must hold (logical AND). Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    /// Exact state abbreviation.
    pub state: Option<String>,
    /// Exact roofing material.
    pub roof_type: Option<RoofType>,
    /// Earliest project date (inclusive).
    pub date_from: Option<DateTime<Utc>>,
    /// Latest project date (inclusive).
    pub date_to: Option<DateTime<Utc>>,
}

impl ProjectFilter {
    /// Returns `true` if no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.roof_type.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// Returns `true` if `project` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, project: &ProjectRow) -> bool {
        self.state
            .as_deref()
            .is_none_or(|state| project.project_state == state)
            && self
                .roof_type
                .is_none_or(|roof_type| project.roof_type == roof_type)
            && self
                .date_from
                .is_none_or(|from| project.project_date >= from)
            && self.date_to.is_none_or(|to| project.project_date <= to)
    }
}
