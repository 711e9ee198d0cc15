use crate::config::GeocoderSettings;
use crate::models::{Coordinates, Location};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to a geocoding service
///
/// All of these are treated as transient by the address resolver.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned status {0}")]
    Status(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Turns a free-text address into coordinates
///
/// `Ok(None)` means the service answered and has no match for the address.
/// `Err` means the lookup itself failed and may succeed if retried.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

#[derive(Deserialize, Debug, Clone)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// OpenStreetMap Nominatim search client
pub struct NominatimClient {
    base_url: String,
    client: Client,
}

impl NominatimClient {
    /// Create a new Nominatim client
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn from_settings(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        Self::new(
            settings.endpoint.clone(),
            &settings.user_agent,
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding via: {}", url);

        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json()?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = place
            .lat
            .trim()
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude '{}'", place.lat)))?;
        let lon: f64 = place
            .lon
            .trim()
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude '{}'", place.lon)))?;

        let coords = Coordinates::try_new(lat, lon).ok_or_else(|| {
            GeocodeError::InvalidResponse(format!("coordinates out of range: {}, {}", lat, lon))
        })?;

        tracing::debug!(
            "Resolved '{}' to {:.4}, {:.4} ({})",
            address,
            coords.latitude,
            coords.longitude,
            place.display_name.as_deref().unwrap_or("no display name")
        );

        Ok(Some(coords))
    }
}

/// Geocoder backed by a fixed name table, for offline runs
///
/// Lookups are case-insensitive on the trimmed address.
#[derive(Debug, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinates>,
    lookups: Cell<usize>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, coordinates: Coordinates) -> Self {
        self.insert(name, coordinates);
        self
    }

    pub fn insert(&mut self, name: &str, coordinates: Coordinates) {
        self.places.insert(normalize(name), coordinates);
    }

    /// Seed the table from every dataset row that has coordinates
    pub fn from_locations(locations: &[Location]) -> Self {
        let mut geocoder = Self::new();
        for location in locations {
            if let Some(coords) = location.coordinates {
                geocoder.insert(&location.name, coords);
            }
        }
        geocoder
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.lookups.set(self.lookups.get() + 1);
        Ok(self.places.get(&normalize(address)).copied())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
