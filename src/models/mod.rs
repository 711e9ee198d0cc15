// Model exports
pub mod domain;
pub mod params;
pub mod report;

pub use domain::{Coordinates, FinancialBreakdown, Location, LocationOrigin, PricedLocation, REMOTE_LOCATION_NAME};
pub use params::{Parameters, TaxMode, TaxRule};
pub use report::{BuildOutcome, Diagnostic, RunReport};
