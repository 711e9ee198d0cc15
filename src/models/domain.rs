use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build coordinates only if both components are finite and in range
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        let coords = Self::new(latitude, longitude);
        coords.is_valid().then_some(coords)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Which step of the location set pipeline produced a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationOrigin {
    Remote,
    Custom,
    Added,
    Dataset,
}

/// A candidate work location in the working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "baselineSalaryHint", default)]
    pub baseline_salary_hint: Option<f64>,
    #[serde(rename = "distanceMiles", default)]
    pub distance_miles: f64,
    #[serde(rename = "isRemote", default)]
    pub is_remote: bool,
    pub origin: LocationOrigin,
}

/// Name given to the synthetic no-commute row
pub const REMOTE_LOCATION_NAME: &str = "Remote";

impl Location {
    /// A row from the base dataset; distance is filled in later
    pub fn from_dataset(
        name: impl Into<String>,
        coordinates: Option<Coordinates>,
        baseline_salary_hint: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates,
            baseline_salary_hint,
            distance_miles: 0.0,
            is_remote: false,
            origin: LocationOrigin::Dataset,
        }
    }

    /// A row whose address was geocoded during the current run
    pub fn resolved(
        name: impl Into<String>,
        coordinates: Coordinates,
        distance_miles: f64,
        baseline_salary_hint: f64,
        origin: LocationOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates: Some(coordinates),
            baseline_salary_hint: Some(baseline_salary_hint),
            distance_miles,
            is_remote: false,
            origin,
        }
    }

    /// The synthetic remote-work row, pinned to the home coordinates
    pub fn remote(home: Coordinates, baseline_salary_hint: f64) -> Self {
        Self {
            name: REMOTE_LOCATION_NAME.to_string(),
            coordinates: Some(home),
            baseline_salary_hint: Some(baseline_salary_hint),
            distance_miles: 0.0,
            is_remote: true,
            origin: LocationOrigin::Remote,
        }
    }
}

/// Annual financial breakdown for one location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialBreakdown {
    #[serde(rename = "commuteMilesAnnual")]
    pub commute_miles_annual: f64,
    #[serde(rename = "gasCostAnnual")]
    pub gas_cost_annual: f64,
    #[serde(rename = "federalTaxAnnual")]
    pub federal_tax_annual: f64,
    #[serde(rename = "stateTaxAnnual")]
    pub state_tax_annual: f64,
    #[serde(rename = "ficaAnnual")]
    pub fica_annual: f64,
    #[serde(rename = "carPaymentAnnual")]
    pub car_payment_annual: f64,
    #[serde(rename = "carInsuranceAnnual")]
    pub car_insurance_annual: f64,
    #[serde(rename = "healthcareAnnual")]
    pub healthcare_annual: f64,
    #[serde(rename = "netPayAnnual")]
    pub net_pay_annual: f64,
}

impl FinancialBreakdown {
    /// Sum of every deduction from gross salary
    pub fn total_deductions(&self) -> f64 {
        self.gas_cost_annual
            + self.federal_tax_annual
            + self.state_tax_annual
            + self.fica_annual
            + self.car_payment_annual
            + self.car_insurance_annual
            + self.healthcare_annual
    }
}

/// A priced row handed to presentation. Coordinates are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLocation {
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(rename = "distanceMiles")]
    pub distance_miles: f64,
    #[serde(rename = "isRemote")]
    pub is_remote: bool,
    pub origin: LocationOrigin,
    #[serde(rename = "baselineSalaryHint")]
    pub baseline_salary_hint: Option<f64>,
    #[serde(flatten)]
    pub breakdown: FinancialBreakdown,
}

impl PricedLocation {
    /// Returns None for rows that never got coordinates
    pub fn new(location: Location, breakdown: FinancialBreakdown) -> Option<Self> {
        let coordinates = location.coordinates?;
        Some(Self {
            name: location.name,
            coordinates,
            distance_miles: location.distance_miles,
            is_remote: location.is_remote,
            origin: location.origin,
            baseline_salary_hint: location.baseline_salary_hint,
            breakdown,
        })
    }
}
