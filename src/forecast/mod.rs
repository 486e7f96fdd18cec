//! Sales forecasting
//!
//! The forecast model is a pluggable strategy behind the [`Forecaster`]
//! trait: `fit` learns a model from a gap-free daily series, `predict`
//! returns the in-sample fit plus a projection. [`forecast_with`] wires a
//! strategy to the readiness gate, fills days without sales with zero and
//! builds the overlay of fitted curve and actual points.
//!
//! # Example
//!
//! ```ignore
//! use salesdash::forecast::{forecast_with, TrendSeasonalForecaster};
//!
//! let strategy = TrendSeasonalForecaster::default();
//! match forecast_with(&strategy, &trend, 30, 2)? {
//!     Gated::Ready(forecast) => println!("{} points", forecast.predicted.len()),
//!     Gated::NotReady { .. } => println!("not enough data"),
//! }
//! ```

mod trend_seasonal;

pub use self::trend_seasonal::{FitMethod, TrendSeasonalForecaster, TrendSeasonalModel};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::readiness::{complete_rows, Completeness, Gated};
use crate::series::{SalesTrend, SeriesPoint};

/// Default number of days projected past the last observation
pub const DEFAULT_HORIZON_DAYS: usize = 30;

/// A trend/seasonality model that can be fitted to a daily series
pub trait Forecaster {
    type Model;

    /// Learn a model from one value per consecutive day, oldest first
    fn fit(&self, daily: &[f64]) -> Result<Self::Model>;

    /// Fitted values for every training day followed by `horizon` projected
    /// days
    fn predict(&self, model: &Self::Model, horizon: usize) -> Result<Vec<f64>>;
}

/// A point estimate for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub estimate: f64,
    /// `true` for dates after the last observation
    pub is_future: bool,
}

/// Fitted and projected curve paired with the observed points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    /// Estimates for every observed date followed by the horizon
    pub predicted: Vec<ForecastPoint>,
    /// Observed `(date, total)` points for overlay
    pub actual: Vec<SeriesPoint<NaiveDate>>,
    pub horizon_days: usize,
}

impl ForecastSeries {
    /// Only the projected part of the curve
    pub fn future(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.predicted.iter().filter(|point| point.is_future)
    }
}

/// Fit `strategy` on the daily sales series and project `horizon_days`
/// beyond the last observed date.
///
/// Returns `Ok(NotReady)` when fewer than `min_rows` days have a total, and
/// `Err(Error::Forecast)` when the model cannot be fitted despite passing
/// the gate.
pub fn forecast_with<F: Forecaster>(
    strategy: &F,
    series: &SalesTrend,
    horizon_days: usize,
    min_rows: usize,
) -> Result<Gated<ForecastSeries>> {
    let complete = complete_rows(&series.points);
    if complete < min_rows {
        return Ok(Gated::NotReady {
            complete_rows: complete,
            min_rows,
        });
    }

    let actual: Vec<SeriesPoint<NaiveDate>> = series
        .points
        .iter()
        .filter(|point| point.is_complete())
        .cloned()
        .collect();
    let dates = actual.iter().map(|point| point.key);
    let (first, last) = match (dates.clone().min(), dates.max()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::Forecast("no observations".to_string())),
    };

    // Days without a total count as zero sales
    let days = (last - first).num_days() as usize + 1;
    let mut daily = vec![0.0; days];
    for point in &actual {
        daily[(point.key - first).num_days() as usize] = point.value;
    }

    let model = strategy.fit(&daily)?;
    let estimates = strategy.predict(&model, horizon_days)?;
    if estimates.len() != days + horizon_days
        || estimates.iter().any(|value| !value.is_finite())
    {
        return Err(Error::Forecast(
            "model produced missing or non-finite estimates".to_string(),
        ));
    }

    let fitted = actual.iter().map(|point| ForecastPoint {
        date: point.key,
        estimate: estimates[(point.key - first).num_days() as usize],
        is_future: false,
    });
    let projected = (1..=horizon_days).map(|offset| ForecastPoint {
        date: last + Duration::days(offset as i64),
        estimate: estimates[days + offset - 1],
        is_future: true,
    });
    let predicted = fitted.chain(projected).collect();

    Ok(Gated::Ready(ForecastSeries {
        predicted,
        actual,
        horizon_days,
    }))
}
