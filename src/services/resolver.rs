use crate::config::GeocoderSettings;
use crate::models::Coordinates;
use crate::services::geocoder::Geocoder;
use std::collections::HashMap;
use std::time::Duration;

/// Bounded retry with a fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// No pause between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }
}

impl From<&GeocoderSettings> for RetryPolicy {
    fn from(settings: &GeocoderSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            delay: Duration::from_secs(settings.retry_delay_secs),
        }
    }
}

/// Resolves addresses for one computation run
///
/// Transient geocoder failures are retried per the [`RetryPolicy`]; a
/// definitive "no match" is not. Every outcome, hit or miss, is remembered
/// so an address reaches the geocoder at most once per run. Create a fresh
/// resolver for each run.
pub struct AddressResolver<'g> {
    geocoder: &'g dyn Geocoder,
    policy: RetryPolicy,
    resolved: HashMap<String, Option<Coordinates>>,
}

impl<'g> AddressResolver<'g> {
    pub fn new(geocoder: &'g dyn Geocoder, policy: RetryPolicy) -> Self {
        Self {
            geocoder,
            policy,
            resolved: HashMap::new(),
        }
    }

    /// Resolve an address; `None` covers both "unknown" and "service down"
    pub fn resolve(&mut self, address: &str) -> Option<Coordinates> {
        if let Some(outcome) = self.resolved.get(address) {
            tracing::trace!("Resolver memo hit: {}", address);
            return *outcome;
        }

        let outcome = self.resolve_with_retries(address);
        self.resolved.insert(address.to_string(), outcome);
        outcome
    }

    fn resolve_with_retries(&self, address: &str) -> Option<Coordinates> {
        let attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.geocoder.geocode(address) {
                Ok(Some(coords)) => return Some(coords),
                Ok(None) => {
                    tracing::debug!("No geocoding match for '{}'", address);
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        "Geocoding '{}' failed (attempt {}/{}): {}",
                        address,
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts && !self.policy.delay.is_zero() {
                        std::thread::sleep(self.policy.delay);
                    }
                }
            }
        }

        tracing::warn!("Giving up on '{}' after {} attempts", address, attempts);
        None
    }
}
