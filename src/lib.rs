//! Retail sales analytics pipeline
//!
//! Loads a sales export once, filters it by city, customer type, gender and
//! date range, and derives the KPIs, chart series, forecast and anomaly
//! flags a dashboard displays.
//!
//! ```no_run
//! use salesdash::{Dashboard, DashboardConfig};
//!
//! let config = DashboardConfig::with_defaults();
//! let dataset = salesdash::dataset::load_cached(&config).unwrap();
//! let dashboard = Dashboard::new(dataset, config);
//! let view = dashboard.run(&dashboard.default_criteria());
//! println!("{}", view.kpis);
//! ```

pub mod anomaly;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod io;
pub mod kpi;
pub mod readiness;
pub mod series;

// Re-export commonly used types
pub use anomaly::{detect, AnomalyFlaggedSeries, AnomalyPoint};
pub use config::DashboardConfig;
pub use dashboard::{ChartOutcome, Dashboard, DashboardView};
pub use dataset::{CityCoordinates, Dataset, SalesRecord};
pub use error::{Error, Result};
pub use filter::{apply, DateSelection, FilterCriteria, FilterState, Selection};
pub use forecast::{forecast_with, FitMethod, ForecastSeries, Forecaster, TrendSeasonalForecaster};
pub use kpi::{summarize, Kpis};
pub use readiness::{is_ready, Gated};
pub use series::{AggregatedSeries, BranchSales, SalesTrend, SeriesPoint};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
