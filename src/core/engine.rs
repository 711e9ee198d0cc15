use crate::core::{financials::calculate_financials, location_set::LocationSetBuilder};
use crate::models::{Location, Parameters, PricedLocation, RunReport};
use crate::services::{AddressResolver, Geocoder, RetryPolicy};
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Errors that abort a computation run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Home address could not be geocoded: '{0}'")]
    HomeAddressUnresolvable(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] validator::ValidationErrors),
}

/// Runs one full pass: resolve home, build the working set, price every row
pub struct Engine<'g> {
    geocoder: &'g dyn Geocoder,
    retry: RetryPolicy,
    builder: LocationSetBuilder,
}

impl<'g> Engine<'g> {
    pub fn new(geocoder: &'g dyn Geocoder, retry: RetryPolicy) -> Self {
        Self {
            geocoder,
            retry,
            builder: LocationSetBuilder::new(),
        }
    }

    pub fn with_builder(mut self, builder: LocationSetBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Compute the priced working set for `params` over `base`
    ///
    /// Fails only when the parameters are out of bounds or the home address
    /// cannot be geocoded; every other problem is reported in the
    /// returned diagnostics.
    pub fn run(&self, base: &[Location], params: &Parameters) -> Result<RunReport, EngineError> {
        params.validate()?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id);
        let _guard = span.enter();

        // A fresh resolver per run keeps memoized lookups from leaking across runs
        let mut resolver = AddressResolver::new(self.geocoder, self.retry);

        let home = resolver.resolve(&params.home_address).ok_or_else(|| {
            tracing::error!("Home address '{}' could not be geocoded", params.home_address);
            EngineError::HomeAddressUnresolvable(params.home_address.clone())
        })?;

        tracing::info!(
            "Home '{}' resolved to {:.4}, {:.4}",
            params.home_address,
            home.latitude,
            home.longitude
        );

        let outcome = self.builder.build(base, params, home, &mut resolver);
        let rows = price_locations(outcome.locations, params);

        tracing::info!(
            "Priced {} locations ({} diagnostics)",
            rows.len(),
            outcome.diagnostics.len()
        );

        Ok(RunReport {
            run_id,
            generated_at: Utc::now(),
            home_address: params.home_address.clone(),
            home,
            rows,
            diagnostics: outcome.diagnostics,
        })
    }
}

/// Attach a financial breakdown to every location that has coordinates
pub fn price_locations(locations: Vec<Location>, params: &Parameters) -> Vec<PricedLocation> {
    locations
        .into_iter()
        .filter_map(|location| {
            let breakdown = calculate_financials(&location, params);
            PricedLocation::new(location, breakdown)
        })
        .collect()
}
