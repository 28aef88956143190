#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard statistics and filter option result types.
//!
//! Group-by breakdowns use [`BTreeMap`] so the JSON the dashboard receives
//! has a stable key order.

use std::collections::BTreeMap;

use quote_vision_roofing_models::RoofType;
use serde::{Deserialize, Serialize};

/// Summary statistics over a filtered set of projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    /// Number of projects matching the filter.
    pub total_projects: u64,
    /// Number of matching projects marked completed.
    pub completed_projects: u64,
    /// Mean roof size in square feet, rounded to the nearest integer.
    pub average_roof_size: f64,
    /// Sum of energy savings in kWh.
    pub total_energy_savings: f64,
    /// Sum of cost savings in dollars.
    pub total_cost_savings: f64,
    /// Mean temperature reduction, rounded to one decimal place.
    pub average_temperature_reduction: f64,
    /// Project count per state abbreviation.
    pub projects_by_state: BTreeMap<String, u64>,
    /// Project count per roofing material.
    pub projects_by_roof_type: BTreeMap<RoofType, u64>,
    /// Count of installed projects per `YYYY-MM` installation month.
    pub projects_by_month: BTreeMap<String, u64>,
    /// Sum of energy savings per roofing material.
    pub energy_savings_by_roof_type: BTreeMap<RoofType, f64>,
}

/// A selectable state in the dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOption {
    /// Two-letter abbreviation.
    pub code: String,
    /// Full state name, or the abbreviation when unknown.
    pub name: String,
}

/// Distinct filter values present in the submitted quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// States, sorted by abbreviation.
    pub states: Vec<StateOption>,
    /// Roofing materials, in taxonomy order.
    pub roof_types: Vec<RoofType>,
}
