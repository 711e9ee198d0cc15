use crate::models::{Coordinates, Location};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the base dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the cities CSV
#[derive(Debug, Deserialize)]
struct CityRecord {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Latitude", default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(rename = "AverageSalary", default, deserialize_with = "csv::invalid_option")]
    average_salary: Option<f64>,
}

impl From<CityRecord> for Location {
    fn from(record: CityRecord) -> Self {
        let coordinates = match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) => Coordinates::try_new(lat, lon),
            _ => None,
        };
        Location::from_dataset(record.city.trim(), coordinates, record.average_salary)
    }
}

/// Load base locations from a CSV file
///
/// Expects a header row with `City`, `Latitude` and `Longitude`;
/// `AverageSalary` and any other columns are optional. Blank or
/// non-numeric coordinates are kept as `None` and dropped later by the
/// location set builder.
pub fn load_csv(path: &Path) -> Result<Vec<Location>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let locations = read_csv(file)?;
    tracing::info!("Loaded {} base locations from {}", locations.len(), path.display());
    Ok(locations)
}

/// Parse base locations from any CSV reader
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Location>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut locations = Vec::new();
    for result in rdr.deserialize::<CityRecord>() {
        locations.push(result?.into());
    }

    Ok(locations)
}

const BUILTIN_CITIES: &[(&str, f64, f64)] = &[
    ("Washington, DC", 38.9072, -77.0369),
    ("Baltimore, MD", 39.2904, -76.6122),
    ("Richmond, VA", 37.5407, -77.4360),
    ("Philadelphia, PA", 39.9526, -75.1652),
    ("Annapolis, MD", 38.9784, -76.4922),
    ("Alexandria, VA", 38.8048, -77.0469),
    ("Frederick, MD", 39.4143, -77.4105),
    ("Wilmington, DE", 39.7391, -75.5398),
    ("Harrisburg, PA", 40.2732, -76.8867),
    ("New York, NY", 40.7128, -74.0060),
];

/// Built-in Mid-Atlantic dataset used when no CSV is configured
pub fn builtin_locations() -> Vec<Location> {
    BUILTIN_CITIES
        .iter()
        .map(|(name, lat, lon)| Location::from_dataset(*name, Some(Coordinates::new(*lat, *lon)), None))
        .collect()
}
