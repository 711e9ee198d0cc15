use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::{Parameters, TaxMode, TaxRule};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub defaults: DefaultsSettings,
    #[serde(default)]
    pub tax: TaxSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { "take_home_pay_app".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_delay_secs() -> u64 { 2 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatasetSettings {
    /// CSV of base locations; the built-in dataset is used when unset
    pub path: Option<PathBuf>,
}

/// Default value for every run parameter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsSettings {
    pub annual_salary: f64,
    pub gas_price_per_gallon: f64,
    pub vehicle_mpg: f64,
    pub annual_car_payment: f64,
    pub annual_car_insurance: f64,
    pub annual_healthcare: f64,
    pub federal_tax_annual: f64,
    pub state_tax_annual: f64,
    pub home_address: String,
    pub max_distance_miles: f64,
    pub commute_days_selected: u8,
}

impl Default for DefaultsSettings {
    fn default() -> Self {
        let params = Parameters::default();
        Self {
            annual_salary: params.annual_salary,
            gas_price_per_gallon: params.gas_price_per_gallon,
            vehicle_mpg: params.vehicle_mpg,
            annual_car_payment: params.annual_car_payment,
            annual_car_insurance: params.annual_car_insurance,
            annual_healthcare: params.annual_healthcare,
            federal_tax_annual: params.federal_tax_annual,
            state_tax_annual: params.state_tax_annual,
            home_address: params.home_address,
            max_distance_miles: params.max_distance_miles,
            commute_days_selected: params.commute_days_selected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TaxModeKind {
    #[default]
    Direct,
    RateWithOffset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxSettings {
    #[serde(default)]
    pub mode: TaxModeKind,
    #[serde(default = "TaxMode::default_federal_rule")]
    pub federal: TaxRule,
    #[serde(default = "TaxMode::default_state_rule")]
    pub state: TaxRule,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            mode: TaxModeKind::default(),
            federal: TaxMode::default_federal_rule(),
            state: TaxMode::default_state_rule(),
        }
    }
}

impl TaxSettings {
    pub fn tax_mode(&self, kind: TaxModeKind) -> TaxMode {
        match kind {
            TaxModeKind::Direct => TaxMode::Direct,
            TaxModeKind::RateWithOffset => TaxMode::RateWithOffset {
                federal: self.federal,
                state: self.state,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "warn".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TAKEHOME__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Build run parameters from the configured defaults
    pub fn parameters(&self) -> Parameters {
        let d = &self.defaults;
        Parameters {
            annual_salary: d.annual_salary,
            gas_price_per_gallon: d.gas_price_per_gallon,
            vehicle_mpg: d.vehicle_mpg,
            annual_car_payment: d.annual_car_payment,
            annual_car_insurance: d.annual_car_insurance,
            annual_healthcare: d.annual_healthcare,
            federal_tax_annual: d.federal_tax_annual,
            state_tax_annual: d.state_tax_annual,
            home_address: d.home_address.clone(),
            max_distance_miles: d.max_distance_miles,
            commute_days_selected: d.commute_days_selected,
            remove_city_name: None,
            add_city_address: None,
            custom_locations_raw: None,
            tax_mode: self.tax.tax_mode(self.tax.mode),
        }
    }
}

// e.g., TAKEHOME__GEOCODER__ENDPOINT -> geocoder.endpoint
fn env_source() -> Environment {
    Environment::with_prefix("TAKEHOME")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Honor the conventional variable names used by deployments of this tool
///
/// `NOMINATIM_URL` overrides the geocoder endpoint and `HOME_ADDRESS` the
/// default home address.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(endpoint) = env::var("NOMINATIM_URL") {
        builder = builder.set_override("geocoder.endpoint", endpoint)?;
    }
    if let Ok(home) = env::var("HOME_ADDRESS") {
        builder = builder.set_override("defaults.home_address", home)?;
    }

    builder.build()
}
