//! Take Home Pay - location-aware take-home pay estimator
//!
//! This library resolves a home address, assembles a working set of
//! candidate work locations around it and prices each one: commute miles,
//! fuel, car costs, taxes and the resulting annual net pay.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_financials, geodesic_miles, Engine, EngineError, LocationSetBuilder};
pub use models::{Coordinates, Diagnostic, FinancialBreakdown, Location, Parameters, PricedLocation, RunReport, TaxMode};
pub use services::{AddressResolver, Geocoder, NominatimClient, RetryPolicy, StaticGeocoder};
