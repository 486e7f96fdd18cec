use std::fmt;

use augurs::ets::AutoETS;
use augurs::mstl::MSTLModel;
use augurs::{Fit, Predict};
use linregress::{FormulaRegressionBuilder, RegressionDataBuilder};

use super::Forecaster;
use crate::config::ForecastConfig;
use crate::error::{Error, Result};

/// Series shorter than this get no weekly component
const MIN_WEEKLY_DAYS: usize = 14;

/// Series shorter than this are fitted with a straight trend line
const MIN_ETS_DAYS: usize = 10;

const WEEK: usize = 7;

/// Which model a series ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    /// Least-squares trend line
    Linear,
    /// Non-seasonal exponential smoothing, model picked by AutoETS
    Ets,
    /// Weekly MSTL decomposition with an AutoETS trend
    Mstl,
}

/// Trend plus weekly seasonality, chosen by series length
///
/// Two weeks or more of history get an MSTL model with a period of 7 days
/// and an AutoETS trend. Shorter series fall back to plain AutoETS, and
/// series too short for ETS to pick a model get a least-squares line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeasonalForecaster {
    weekly_seasonality: bool,
    daily_seasonality: bool,
}

/// A fitted model over `days` consecutive days
pub struct TrendSeasonalModel {
    method: FitMethod,
    days: usize,
    curve: Curve,
}

enum Curve {
    Line { intercept: f64, slope: f64 },
    Fitted(Box<dyn FittedCurve>),
}

/// Object-safe view over the fitted augurs models
trait FittedCurve {
    fn in_sample(&self) -> Result<Vec<f64>>;
    fn ahead(&self, horizon: usize) -> Result<Vec<f64>>;
}

impl<P> FittedCurve for P
where
    P: Predict,
    P::Error: fmt::Display,
{
    fn in_sample(&self) -> Result<Vec<f64>> {
        self.predict_in_sample(None::<f64>)
            .map(|forecast| forecast.point)
            .map_err(model_error)
    }

    fn ahead(&self, horizon: usize) -> Result<Vec<f64>> {
        self.predict(horizon, None::<f64>)
            .map(|forecast| forecast.point)
            .map_err(model_error)
    }
}

fn model_error<E: fmt::Display>(error: E) -> Error {
    Error::Forecast(error.to_string())
}

impl fmt::Debug for TrendSeasonalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrendSeasonalModel")
            .field("method", &self.method)
            .field("days", &self.days)
            .finish()
    }
}

impl TrendSeasonalModel {
    pub fn method(&self) -> FitMethod {
        self.method
    }

    /// Length of the training series
    pub fn days(&self) -> usize {
        self.days
    }
}

impl Default for TrendSeasonalForecaster {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl TrendSeasonalForecaster {
    pub fn new(weekly_seasonality: bool, daily_seasonality: bool) -> Self {
        TrendSeasonalForecaster {
            weekly_seasonality,
            daily_seasonality,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.weekly_seasonality, config.daily_seasonality)
    }

    fn method_for(&self, days: usize) -> FitMethod {
        if self.weekly_seasonality && days >= MIN_WEEKLY_DAYS {
            FitMethod::Mstl
        } else if days >= MIN_ETS_DAYS {
            FitMethod::Ets
        } else {
            FitMethod::Linear
        }
    }
}

/// Intercept and slope of `y ~ t` with `t` the day offset
fn trend_line(daily: &[f64]) -> Result<(f64, f64)> {
    let offsets: Vec<f64> = (0..daily.len()).map(|t| t as f64).collect();
    let data = RegressionDataBuilder::new()
        .build_from(vec![
            ("Y".to_string(), daily.to_vec()),
            ("X".to_string(), offsets),
        ])
        .map_err(model_error)?;
    let parameters = FormulaRegressionBuilder::new()
        .data(&data)
        .formula("Y ~ X")
        .fit_without_statistics()
        .map_err(model_error)?;

    match parameters.as_slice() {
        [intercept, slope] => Ok((*intercept, *slope)),
        other => Err(Error::Forecast(format!(
            "expected intercept and slope, got {} parameters",
            other.len()
        ))),
    }
}

impl Forecaster for TrendSeasonalForecaster {
    type Model = TrendSeasonalModel;

    fn fit(&self, daily: &[f64]) -> Result<TrendSeasonalModel> {
        if daily.len() < 2 {
            return Err(Error::Forecast(format!(
                "need at least 2 days, got {}",
                daily.len()
            )));
        }
        if daily.iter().any(|value| !value.is_finite()) {
            return Err(Error::Forecast("series contains non-finite values".into()));
        }
        if self.daily_seasonality {
            log::warn!("daily seasonality requested on a date-granular series; it has no effect");
        }

        let method = self.method_for(daily.len());
        let curve = match method {
            FitMethod::Mstl => {
                let trend = AutoETS::non_seasonal().into_trend_model();
                let fitted = MSTLModel::new(vec![WEEK], trend)
                    .fit(daily)
                    .map_err(model_error)?;
                Curve::Fitted(Box::new(fitted))
            }
            FitMethod::Ets => {
                let fitted = AutoETS::non_seasonal().fit(daily).map_err(model_error)?;
                Curve::Fitted(Box::new(fitted))
            }
            FitMethod::Linear => {
                let (intercept, slope) = trend_line(daily)?;
                Curve::Line { intercept, slope }
            }
        };

        log::debug!("fitted {:?} model on {} days", method, daily.len());

        Ok(TrendSeasonalModel {
            method,
            days: daily.len(),
            curve,
        })
    }

    fn predict(&self, model: &TrendSeasonalModel, horizon: usize) -> Result<Vec<f64>> {
        match &model.curve {
            Curve::Line { intercept, slope } => Ok((0..model.days + horizon)
                .map(|t| intercept + slope * t as f64)
                .collect()),
            Curve::Fitted(fitted) => {
                let mut values = fitted.in_sample()?;
                if horizon > 0 {
                    values.extend(fitted.ahead(horizon)?);
                }
                Ok(values)
            }
        }
    }
}
