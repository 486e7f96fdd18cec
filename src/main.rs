//! salesdash - command-line front end for the retail sales pipeline
//!
//! Loads the configured sales export, applies the filters given on the
//! command line and prints KPIs, chart series, forecast and anomalies.

use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use salesdash::dashboard::NO_EXPORT_DATA;
use salesdash::io::write_csv;
use salesdash::{ChartOutcome, Dashboard, DashboardConfig, DashboardView, DateSelection};

#[derive(Parser, Debug)]
#[command(
    name = "salesdash",
    version,
    about = "Retail sales analytics: KPIs, trends, forecast and anomalies"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sales export to read (overrides source.path)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Cities to include (repeatable; default all)
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Customer types to include (repeatable; default all)
    #[arg(long = "customer-type")]
    customer_types: Vec<String>,

    /// Genders to include (repeatable; default all)
    #[arg(long = "gender")]
    genders: Vec<String>,

    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date of the range (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Write the filtered rows as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Write the filtered rows as an xlsx workbook
    #[arg(long)]
    export_xlsx: Option<PathBuf>,

    /// Print the whole view as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = LevelFilter::from_str(&args.log_level).unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_toml_file(path)?,
        None => DashboardConfig::with_defaults(),
    };
    if let Some(source) = &args.source {
        config.source.path = source.clone();
    }

    let dataset = salesdash::dataset::load_cached(&config)?;
    let dashboard = Dashboard::new(dataset, config);

    let mut criteria = dashboard.default_criteria();
    if !args.cities.is_empty() {
        criteria = criteria.with_cities(args.cities.clone());
    }
    if !args.customer_types.is_empty() {
        criteria = criteria.with_customer_types(args.customer_types.clone());
    }
    if !args.genders.is_empty() {
        criteria = criteria.with_genders(args.genders.clone());
    }
    criteria.date_range = match (args.from, args.to) {
        (Some(from), Some(to)) => DateSelection::Range(from, to),
        (Some(date), None) | (None, Some(date)) => DateSelection::Single(date),
        (None, None) => criteria.date_range,
    };

    let view = dashboard.run(&criteria);

    if args.json {
        println!("{}", view.to_json()?);
    } else {
        print_view(&view);
    }

    let wants_export = args.export_csv.is_some() || args.export_xlsx.is_some();
    if wants_export && !view.export_available {
        println!("{}", NO_EXPORT_DATA);
        return Ok(());
    }
    if let Some(path) = &args.export_csv {
        write_csv(&view.selection, path)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.export_xlsx {
        #[cfg(feature = "excel")]
        {
            let sheet_name = &dashboard.config().export.sheet_name;
            salesdash::io::write_workbook(&view.selection, sheet_name, path)?;
            println!("Wrote {}", path.display());
        }
        #[cfg(not(feature = "excel"))]
        return Err(format!("cannot write {}: built without the excel feature", path.display()).into());
    }

    Ok(())
}

fn print_view(view: &DashboardView<'_>) {
    println!("--- KPIs ({} transactions) ---", view.row_count);
    println!("{}", view.kpis);
    println!();

    println!("--- Sales By Product Line ---");
    for point in &view.sales_by_product_line.points {
        println!("{:<24} {:>12.2}", point.key, point.value);
    }
    println!();

    println!("--- Sales By Hour ---");
    for point in &view.sales_by_hour.points {
        println!("{:>2}:00 {:>12.2}", point.key, point.value);
    }
    println!();

    println!("--- Sales Trend Over Time ---");
    for point in &view.sales_trend.points {
        println!("{} {:>12.2}", point.key, point.value);
    }
    println!();

    println!("--- Profit Trend Over Time ---");
    for point in &view.profit_trend.points {
        println!("{} {:>12.2}", point.key, point.value);
    }
    println!();

    println!("--- Sales by Branch Location ---");
    for branch in &view.sales_by_city {
        let location = match (branch.lat, branch.lon) {
            (Some(lat), Some(lon)) => format!("({:.4}, {:.4})", lat, lon),
            _ => "(unknown location)".to_string(),
        };
        println!(
            "{:<12} {:>12.2}  rating {:.2}  {}",
            branch.city, branch.total, branch.rating, location
        );
    }
    println!();

    println!("--- Sales Forecast ---");
    match &view.forecast {
        ChartOutcome::Rendered(forecast) => {
            for point in forecast.future() {
                println!("{} {:>12.2}", point.date, point.estimate);
            }
        }
        ChartOutcome::NotReady(message) => println!("{}", message),
        ChartOutcome::Failed(message) => println!("Forecast unavailable: {}", message),
    }
    println!();

    println!("--- Anomaly Detection ---");
    match &view.anomalies {
        ChartOutcome::Rendered(flagged) => {
            if flagged.anomaly_count() == 0 {
                println!("No anomalies above |z| > {}", flagged.threshold);
            }
            for point in flagged.anomalies() {
                println!(
                    "{} {:>12.2}  z = {:.2}",
                    point.date,
                    point.total,
                    point.z_score.unwrap_or_default()
                );
            }
        }
        ChartOutcome::NotReady(message) => println!("{}", message),
        ChartOutcome::Failed(message) => println!("Anomaly detection unavailable: {}", message),
    }
}
