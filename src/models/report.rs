use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::domain::{Coordinates, Location, PricedLocation};

/// Non-fatal events raised while building the working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An added or custom address did not resolve and was left out
    AddressSkipped { label: String, address: String },
    /// An explicitly added city lies beyond the max distance; it was still added
    OutOfRangeWarning {
        address: String,
        distance_miles: f64,
        max_distance_miles: f64,
        suggested_max_distance_miles: f64,
    },
    /// A custom location line had no `label,address` separator
    MalformedCustomLocationLine { line_number: usize, line: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressSkipped { label, address } if label == address => {
                write!(f, "Skipped '{}': address could not be geocoded", address)
            }
            Self::AddressSkipped { label, address } => write!(
                f,
                "Skipped '{}': address '{}' could not be geocoded",
                label, address
            ),
            Self::OutOfRangeWarning {
                address,
                distance_miles,
                max_distance_miles,
                suggested_max_distance_miles,
            } => write!(
                f,
                "{} is {:.1} miles away, which exceeds the max distance of {} miles \
                 (raise max distance to {} to include it)",
                address, distance_miles, max_distance_miles, suggested_max_distance_miles
            ),
            Self::MalformedCustomLocationLine { line_number, line } => write!(
                f,
                "Ignored custom location line {}: '{}' (expected Label,Address)",
                line_number, line
            ),
        }
    }
}

/// Output of the location set builder
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildOutcome {
    pub locations: Vec<Location>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything one computation run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(rename = "runId")]
    pub run_id: Uuid,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "homeAddress")]
    pub home_address: String,
    pub home: Coordinates,
    pub rows: Vec<PricedLocation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::OutOfRangeWarning { .. }))
    }
}
