// Service exports
pub mod dataset;
pub mod geocoder;
pub mod resolver;

pub use dataset::{builtin_locations, load_csv, read_csv, DatasetError};
pub use geocoder::{GeocodeError, Geocoder, NominatimClient, StaticGeocoder};
pub use resolver::{AddressResolver, RetryPolicy};
