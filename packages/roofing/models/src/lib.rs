#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Roof type taxonomy and US state helpers.
//!
//! This crate defines the fixed set of roofing materials that quotes and
//! installed projects are classified by. Every layer of the system (storage,
//! aggregation, HTTP) uses [`RoofType`] rather than free-form strings so that
//! an unknown material is rejected at the boundary.

pub mod states;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Roofing material category.
///
/// The string form (used in JSON, `SQLite` and query parameters) is the
/// human-readable label, e.g. `"Modified Bitumen"`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RoofType {
    /// Standing-seam or corrugated metal
    Metal,
    /// Thermoplastic polyolefin single-ply membrane
    #[serde(rename = "TPO")]
    #[strum(serialize = "TPO")]
    Tpo,
    /// Spray polyurethane foam
    Foam,
    /// Ethylene propylene diene monomer rubber membrane
    #[serde(rename = "EPDM")]
    #[strum(serialize = "EPDM")]
    Epdm,
    /// Asphalt-based modified bitumen sheets
    #[serde(rename = "Modified Bitumen")]
    #[strum(serialize = "Modified Bitumen")]
    ModifiedBitumen,
    /// Asphalt shingles
    #[serde(rename = "Asphalt Shingle")]
    #[strum(serialize = "Asphalt Shingle")]
    AsphaltShingle,
    /// Clay or concrete tile
    Tile,
}

impl RoofType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Metal,
            Self::Tpo,
            Self::Foam,
            Self::Epdm,
            Self::ModifiedBitumen,
            Self::AsphaltShingle,
            Self::Tile,
        ]
    }

    /// Returns the display label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metal => "Metal",
            Self::Tpo => "TPO",
            Self::Foam => "Foam",
            Self::Epdm => "EPDM",
            Self::ModifiedBitumen => "Modified Bitumen",
            Self::AsphaltShingle => "Asphalt Shingle",
            Self::Tile => "Tile",
        }
    }

    /// Fraction of roof area (in kWh per sq ft) saved per year by a
    /// coated roof of this material.
    ///
    /// Used when generating demo performance data.
    #[must_use]
    pub const fn energy_efficiency_factor(self) -> f64 {
        match self {
            Self::Metal => 0.25,
            Self::Tpo => 0.28,
            Self::Foam => 0.32,
            Self::Epdm => 0.22,
            Self::ModifiedBitumen => 0.18,
            Self::AsphaltShingle => 0.15,
            Self::Tile => 0.2,
        }
    }
}
