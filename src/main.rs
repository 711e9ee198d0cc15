use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use take_home_pay::config::{Settings, TaxModeKind};
use take_home_pay::core::{rank, Engine, EngineError, SortKey};
use take_home_pay::models::{Diagnostic, Parameters, PricedLocation, RunReport};
use take_home_pay::services::{builtin_locations, load_csv, Geocoder, NominatimClient, RetryPolicy, StaticGeocoder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Take Home Pay - compare annual net pay across nearby work locations
///
/// Examples:
///   take-home-pay --home "1600 Pennsylvania Ave NW, Washington, DC"
///   take-home-pay --salary 120000 --commute-days 3 --sort net-pay
///   take-home-pay --remove-city "Baltimore, MD" --add-city "Towson, MD"
///   take-home-pay --custom "My Job,123 Main St, Annapolis, MD" --json
#[derive(Parser)]
#[command(name = "take-home-pay", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default.toml + config/local.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Home address to measure commutes from
    #[arg(long)]
    home: Option<String>,

    /// Annual salary ($)
    #[arg(long)]
    salary: Option<f64>,

    /// Gas price ($/gallon)
    #[arg(long)]
    gas_price: Option<f64>,

    /// Vehicle fuel efficiency (MPG)
    #[arg(long)]
    mpg: Option<f64>,

    /// Car payment ($/year)
    #[arg(long)]
    car_payment: Option<f64>,

    /// Car insurance ($/year)
    #[arg(long)]
    car_insurance: Option<f64>,

    /// Healthcare premiums ($/year)
    #[arg(long)]
    healthcare: Option<f64>,

    /// Federal tax ($/year), used with --tax-mode direct
    #[arg(long)]
    federal_tax: Option<f64>,

    /// State tax ($/year), used with --tax-mode direct
    #[arg(long)]
    state_tax: Option<f64>,

    /// How taxes are derived
    #[arg(long, value_enum)]
    tax_mode: Option<TaxModeKind>,

    /// Maximum distance from home (miles)
    #[arg(long)]
    max_distance: Option<f64>,

    /// Days per week spent commuting (0-5)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=5))]
    commute_days: Option<u8>,

    /// Drop the dataset city with exactly this name
    #[arg(long)]
    remove_city: Option<String>,

    /// Geocode this address and add it to the list
    #[arg(long)]
    add_city: Option<String>,

    /// Custom labeled location "Label,Address" (repeatable)
    #[arg(long = "custom")]
    custom: Vec<String>,

    /// File with one "Label,Address" per line
    #[arg(long)]
    custom_file: Option<PathBuf>,

    /// Base dataset CSV (City, Latitude, Longitude[, AverageSalary])
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Resolve addresses against the dataset names only, without network access
    #[arg(long)]
    offline: bool,

    /// Row order in the output
    #[arg(long, value_enum, default_value_t = SortKey::Input)]
    sort: SortKey,

    /// Print the full run report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings);

    let params = match build_parameters(&cli, &settings) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dataset_path = cli.dataset.clone().or_else(|| settings.dataset.path.clone());
    let base = match &dataset_path {
        Some(path) => match load_csv(path) {
            Ok(rows) => rows,
            Err(e) => {
                error!("{}", e);
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => builtin_locations(),
    };

    let geocoder: Box<dyn Geocoder> = if cli.offline {
        info!("Offline mode: geocoding against {} dataset names", base.len());
        Box::new(StaticGeocoder::from_locations(&base))
    } else {
        match NominatimClient::from_settings(&settings.geocoder) {
            Ok(client) => Box::new(client),
            Err(e) => {
                error!("Failed to create geocoder: {}", e);
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    let engine = Engine::new(geocoder.as_ref(), RetryPolicy::from(&settings.geocoder));

    let mut report = match engine.run(&base, &params) {
        Ok(report) => report,
        Err(e @ EngineError::HomeAddressUnresolvable(_)) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for diagnostic in &report.diagnostics {
        eprintln!("Warning: {}", diagnostic_line(diagnostic));
    }

    rank(&mut report.rows, cli.sort);

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render_table(&report));
    }

    ExitCode::SUCCESS
}

fn init_logging(settings: &Settings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Merge configured defaults with command line overrides
fn build_parameters(cli: &Cli, settings: &Settings) -> Result<Parameters, String> {
    let mut params = settings.parameters();

    if let Some(home) = &cli.home {
        params.home_address = home.clone();
    }
    if let Some(v) = cli.salary {
        params.annual_salary = v;
    }
    if let Some(v) = cli.gas_price {
        params.gas_price_per_gallon = v;
    }
    if let Some(v) = cli.mpg {
        params.vehicle_mpg = v;
    }
    if let Some(v) = cli.car_payment {
        params.annual_car_payment = v;
    }
    if let Some(v) = cli.car_insurance {
        params.annual_car_insurance = v;
    }
    if let Some(v) = cli.healthcare {
        params.annual_healthcare = v;
    }
    if let Some(v) = cli.federal_tax {
        params.federal_tax_annual = v;
    }
    if let Some(v) = cli.state_tax {
        params.state_tax_annual = v;
    }
    if let Some(kind) = cli.tax_mode {
        params.tax_mode = settings.tax.tax_mode(kind);
    }
    if let Some(v) = cli.max_distance {
        params.max_distance_miles = v;
    }
    if let Some(v) = cli.commute_days {
        params.commute_days_selected = v;
    }

    params.remove_city_name = cli.remove_city.clone();
    params.add_city_address = cli.add_city.clone();

    let mut custom_lines = cli.custom.clone();
    if let Some(path) = &cli.custom_file {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        custom_lines.push(contents);
    }
    if !custom_lines.is_empty() {
        params.custom_locations_raw = Some(custom_lines.join("\n"));
    }

    Ok(params)
}

/// Diagnostic text for the terminal, with the flag that addresses it
fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::OutOfRangeWarning {
            suggested_max_distance_miles,
            ..
        } => format!("{} [--max-distance {}]", diagnostic, suggested_max_distance_miles),
        other => other.to_string(),
    }
}

const COLUMNS: [&str; 11] = [
    "City", "Distance", "Commute Miles", "Gas Cost", "Federal Tax", "State Tax",
    "FICA", "Car Payment", "Car Insurance", "Healthcare", "Net Pay",
];

/// Render the take-home pay comparison table
fn render_table(report: &RunReport) -> String {
    let rows: Vec<[String; 11]> = report.rows.iter().map(table_row).collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!(
        "Take-home pay from {} ({:.4}, {:.4})\n\n",
        report.home_address, report.home.latitude, report.home.longitude
    );

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (name, &w))| if i == 0 { format!("{:<w$}", name) } else { format!("{:>w$}", name) })
        .collect();
    out.push_str(&header.join("  "));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    out.push('\n');

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, &w))| if i == 0 { format!("{:<w$}", cell) } else { format!("{:>w$}", cell) })
            .collect();
        out.push_str(&cells.join("  "));
        out.push('\n');
    }

    out
}

fn table_row(row: &PricedLocation) -> [String; 11] {
    let b = &row.breakdown;
    let name = if row.is_remote { format!("{} *", row.name) } else { row.name.clone() };
    [
        name,
        format!("{:.1}", row.distance_miles),
        format!("{:.2}", b.commute_miles_annual),
        money(b.gas_cost_annual),
        money(b.federal_tax_annual),
        money(b.state_tax_annual),
        money(b.fica_annual),
        money(b.car_payment_annual),
        money(b.car_insurance_annual),
        money(b.healthcare_annual),
        money(b.net_pay_annual),
    ]
}

fn money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
