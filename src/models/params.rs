use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A flat-rate tax with a fixed deduction: `max(rate * salary - offset, 0)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    pub rate: f64,
    pub offset: f64,
}

impl TaxRule {
    pub fn new(rate: f64, offset: f64) -> Self {
        Self { rate, offset }
    }

    pub fn apply(&self, salary: f64) -> f64 {
        (self.rate * salary - self.offset).max(0.0)
    }
}

/// How federal and state tax are obtained for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TaxMode {
    /// Use the annual amounts given in the parameters as-is
    #[default]
    Direct,
    /// Derive each tax from the salary
    RateWithOffset { federal: TaxRule, state: TaxRule },
}

impl TaxMode {
    pub fn default_federal_rule() -> TaxRule {
        TaxRule::new(0.10, 1000.0)
    }

    pub fn default_state_rule() -> TaxRule {
        TaxRule::new(0.05, 500.0)
    }

    /// Rate-with-offset mode using the stock federal and state rules
    pub fn standard_rates() -> Self {
        Self::RateWithOffset {
            federal: Self::default_federal_rule(),
            state: Self::default_state_rule(),
        }
    }

    /// Returns `(federal, state)` annual tax
    pub fn annual_taxes(&self, params: &Parameters) -> (f64, f64) {
        match self {
            Self::Direct => (params.federal_tax_annual, params.state_tax_annual),
            Self::RateWithOffset { federal, state } => (
                federal.apply(params.annual_salary),
                state.apply(params.annual_salary),
            ),
        }
    }
}

/// Inputs for a single computation run. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Parameters {
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub annual_salary: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub gas_price_per_gallon: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub vehicle_mpg: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub annual_car_payment: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub annual_car_insurance: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub annual_healthcare: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub federal_tax_annual: f64,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub state_tax_annual: f64,
    #[validate(length(min = 1))]
    pub home_address: String,
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub max_distance_miles: f64,
    #[validate(range(max = 5))]
    pub commute_days_selected: u8,
    #[serde(default)]
    pub remove_city_name: Option<String>,
    #[serde(default)]
    pub add_city_address: Option<String>,
    #[serde(default)]
    pub custom_locations_raw: Option<String>,
    #[serde(default)]
    pub tax_mode: TaxMode,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            annual_salary: 100_000.0,
            gas_price_per_gallon: 3.00,
            vehicle_mpg: 30.0,
            annual_car_payment: 5_000.0,
            annual_car_insurance: 1_500.0,
            annual_healthcare: 9_000.0,
            federal_tax_annual: 15_500.0,
            state_tax_annual: 7_750.0,
            home_address: "1600 Pennsylvania Ave NW, Washington, DC".to_string(),
            max_distance_miles: 150.0,
            commute_days_selected: 5,
            remove_city_name: None,
            add_city_address: None,
            custom_locations_raw: None,
            tax_mode: TaxMode::Direct,
        }
    }
}

impl Parameters {
    /// City name to drop from the base rows, ignoring blank input
    pub fn remove_city(&self) -> Option<&str> {
        non_blank(self.remove_city_name.as_deref())
    }

    /// Address to append to the working set, ignoring blank input
    pub fn add_city(&self) -> Option<&str> {
        non_blank(self.add_city_address.as_deref())
    }

    pub fn custom_locations(&self) -> Option<&str> {
        non_blank(self.custom_locations_raw.as_deref())
    }
}

// range() lets NaN through
fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
