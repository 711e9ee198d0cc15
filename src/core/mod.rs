// Core algorithm exports
pub mod distance;
pub mod engine;
pub mod financials;
pub mod location_set;
pub mod ranking;

pub use distance::geodesic_miles;
pub use engine::{price_locations, Engine, EngineError};
pub use financials::calculate_financials;
pub use location_set::{parse_custom_locations, LocationSetBuilder};
pub use ranking::{rank, SortKey};
