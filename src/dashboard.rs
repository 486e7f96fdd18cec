//! One full pipeline run per filter submission
//!
//! Filter, KPIs, the five chart series, forecast and anomaly flags are all
//! recomputed from the shared read-only dataset on every call to
//! [`Dashboard::run`]. The daily sales series is computed once per run and
//! handed to both the forecaster and the anomaly detector.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::anomaly::{self, AnomalyFlaggedSeries};
use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{self, FilterCriteria, FilterState, Selection};
use crate::forecast::{forecast_with, ForecastSeries, Forecaster, TrendSeasonalForecaster};
use crate::kpi::{self, Kpis};
use crate::readiness::Gated;
use crate::series::{self, AggregatedSeries, BranchSales, SalesTrend};

pub const FORECAST_NOT_READY: &str =
    "Not enough data to generate a forecast. Please select a broader date range or more filters.";
pub const ANOMALY_NOT_READY: &str =
    "Not enough data to detect anomalies. Please select a broader date range or more filters.";
pub const NO_EXPORT_DATA: &str = "No data available for download with current filters";

/// What a chart slot shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ChartOutcome<T> {
    Rendered(T),
    /// Informational message shown instead of the chart
    NotReady(String),
    /// The computation failed; the rest of the dashboard is unaffected
    Failed(String),
}

impl<T> ChartOutcome<T> {
    fn from_gated(gated: Gated<T>, message: &str) -> Self {
        match gated {
            Gated::Ready(value) => ChartOutcome::Rendered(value),
            Gated::NotReady { .. } => ChartOutcome::NotReady(message.to_string()),
        }
    }

    pub fn rendered(&self) -> Option<&T> {
        match self {
            ChartOutcome::Rendered(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, ChartOutcome::Rendered(_))
    }
}

/// Everything the presentation layer needs for one filter state
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    #[serde(skip)]
    pub selection: Selection<'a>,
    pub row_count: usize,
    pub kpis: Kpis,
    pub sales_by_product_line: AggregatedSeries<String>,
    pub sales_by_hour: AggregatedSeries<u32>,
    pub sales_trend: SalesTrend,
    pub sales_by_city: Vec<BranchSales>,
    pub profit_trend: AggregatedSeries<NaiveDate>,
    pub forecast: ChartOutcome<ForecastSeries>,
    pub anomalies: ChartOutcome<AnomalyFlaggedSeries>,
    /// Exports are offered only for a non-empty selection
    pub export_available: bool,
}

impl DashboardView<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Shared dataset plus the settings every run uses
#[derive(Debug, Clone)]
pub struct Dashboard<F = TrendSeasonalForecaster> {
    dataset: Arc<Dataset>,
    config: DashboardConfig,
    forecaster: F,
}

impl Dashboard {
    /// Dashboard with the default trend/seasonality forecaster
    pub fn new(dataset: Arc<Dataset>, config: DashboardConfig) -> Self {
        let forecaster = TrendSeasonalForecaster::from_config(&config.forecast);
        Self::with_forecaster(dataset, config, forecaster)
    }
}

impl<F: Forecaster> Dashboard<F> {
    /// Dashboard with a custom forecast strategy
    pub fn with_forecaster(dataset: Arc<Dataset>, config: DashboardConfig, forecaster: F) -> Self {
        Dashboard {
            dataset,
            config,
            forecaster,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Reset-to-defaults criteria for this dataset
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria::full_domain(&self.dataset)
    }

    /// Run the pipeline only when `criteria` differs from the previous
    /// submission recorded in `state`
    pub fn run_if_changed(
        &self,
        state: &mut FilterState,
        criteria: &FilterCriteria,
    ) -> Option<DashboardView<'_>> {
        if state.submit(criteria) {
            Some(self.run(criteria))
        } else {
            None
        }
    }

    /// Run the whole pipeline for one filter state
    pub fn run(&self, criteria: &FilterCriteria) -> DashboardView<'_> {
        let selection = filter::apply(&self.dataset, criteria);
        log::debug!(
            "filter selected {} of {} rows",
            selection.len(),
            self.dataset.len()
        );

        let kpis = kpi::summarize(&selection);
        let sales_trend = series::sales_trend(&selection);
        let min_rows = self.config.readiness.min_rows;

        let forecast = match forecast_with(
            &self.forecaster,
            &sales_trend,
            self.config.forecast.horizon_days,
            min_rows,
        ) {
            Ok(gated) => ChartOutcome::from_gated(gated, FORECAST_NOT_READY),
            Err(e) => {
                log::warn!("forecast chart failed: {}", e);
                ChartOutcome::Failed(e.to_string())
            }
        };
        let anomalies = ChartOutcome::from_gated(
            anomaly::detect(&sales_trend, self.config.anomaly.z_threshold, min_rows),
            ANOMALY_NOT_READY,
        );

        DashboardView {
            row_count: selection.len(),
            kpis,
            sales_by_product_line: series::sales_by_product_line(&selection),
            sales_by_hour: series::sales_by_hour(&selection),
            sales_by_city: series::sales_by_city(&selection),
            profit_trend: series::profit_trend(&selection),
            sales_trend,
            forecast,
            anomalies,
            export_available: !selection.is_empty(),
            selection,
        }
    }
}
