mod common;

use std::cell::RefCell;

use chrono::{Duration, NaiveDate};
use common::{date, sample_dataset};
use salesdash::forecast::DEFAULT_HORIZON_DAYS;
use salesdash::readiness::DEFAULT_MIN_ROWS;
use salesdash::{
    apply, forecast_with, series, AggregatedSeries, FilterCriteria, Forecaster, Gated,
    SalesTrend, SeriesPoint, TrendSeasonalForecaster,
};

fn daily(start: &str, values: &[f64]) -> SalesTrend {
    let start = date(start);
    AggregatedSeries::new(
        "Total",
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint::new(start + Duration::days(i as i64), value))
            .collect(),
    )
}

#[test]
fn test_horizon_is_consecutive_days_after_last_observation() {
    let dataset = sample_dataset();
    let selection = apply(&dataset, &FilterCriteria::full_domain(&dataset));
    let trend = series::sales_trend(&selection);

    let forecast = forecast_with(
        &TrendSeasonalForecaster::default(),
        &trend,
        DEFAULT_HORIZON_DAYS,
        DEFAULT_MIN_ROWS,
    )
    .unwrap()
    .ready()
    .expect("seven days is enough data");

    assert_eq!(forecast.horizon_days, 30);
    assert_eq!(forecast.predicted.len(), 7 + 30);

    let future: Vec<NaiveDate> = forecast.future().map(|point| point.date).collect();
    assert_eq!(future.len(), 30);
    assert_eq!(future[0], date("2019-01-08"));
    assert_eq!(future[29], date("2019-02-06"));
    assert!(future.windows(2).all(|pair| pair[1] - pair[0] == Duration::days(1)));
    assert!(forecast.predicted.iter().all(|point| point.estimate.is_finite()));
}

#[test]
fn test_actual_points_overlay_the_fit() {
    let trend = daily("2019-03-01", &[10.0, 12.0, 14.0, 16.0]);
    let forecast = forecast_with(&TrendSeasonalForecaster::default(), &trend, 5, 2)
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(forecast.actual, trend.points);
    let fitted: Vec<_> = forecast
        .predicted
        .iter()
        .filter(|point| !point.is_future)
        .map(|point| point.date)
        .collect();
    assert_eq!(fitted, trend.keys().copied().collect::<Vec<_>>());

    // A perfect line extrapolates exactly
    let last = forecast.future().last().unwrap();
    assert_eq!(last.date, date("2019-03-09"));
    assert!((last.estimate - 26.0).abs() < 1e-9);
}

#[test]
fn test_missing_days_count_as_zero() {
    let start = date("2019-01-01");
    let trend = AggregatedSeries::new(
        "Total",
        vec![
            SeriesPoint::new(start, 100.0),
            SeriesPoint::new(start + Duration::days(3), 130.0),
        ],
    );
    let forecast = forecast_with(&TrendSeasonalForecaster::default(), &trend, 2, 2)
        .unwrap()
        .ready()
        .unwrap();

    // Line through 100, 0, 0, 130 is 44 + 9t
    let points: Vec<(NaiveDate, f64)> = forecast
        .predicted
        .iter()
        .map(|point| (point.date, point.estimate))
        .collect();
    assert_eq!(points.len(), 4);
    let expected = [(0, 44.0), (3, 71.0), (4, 80.0), (5, 89.0)];
    for ((date, estimate), (offset, value)) in points.iter().zip(expected) {
        assert_eq!(*date, start + Duration::days(offset));
        assert!((estimate - value).abs() < 1e-9);
    }
}

/// Remembers the series it was fitted on
#[derive(Default)]
struct RecordingForecaster {
    seen: RefCell<Vec<f64>>,
}

impl Forecaster for RecordingForecaster {
    type Model = usize;

    fn fit(&self, daily: &[f64]) -> salesdash::Result<usize> {
        *self.seen.borrow_mut() = daily.to_vec();
        Ok(daily.len())
    }

    fn predict(&self, days: &usize, horizon: usize) -> salesdash::Result<Vec<f64>> {
        Ok((0..days + horizon).map(|t| t as f64).collect())
    }
}

#[test]
fn test_strategy_sees_gap_free_days() {
    let start = date("2019-01-01");
    let trend = AggregatedSeries::new(
        "Total",
        vec![
            SeriesPoint::new(start, 5.0),
            SeriesPoint::new(start + Duration::days(2), 7.0),
            SeriesPoint::new(start + Duration::days(4), 9.0),
        ],
    );
    let strategy = RecordingForecaster::default();
    let forecast = forecast_with(&strategy, &trend, 2, 2).unwrap().ready().unwrap();

    assert_eq!(*strategy.seen.borrow(), vec![5.0, 0.0, 7.0, 0.0, 9.0]);
    let estimates: Vec<f64> = forecast.predicted.iter().map(|point| point.estimate).collect();
    assert_eq!(estimates, vec![0.0, 2.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_four_weeks_render_a_weekly_forecast() {
    let values: Vec<f64> = (0..28)
        .map(|t| 400.0 + 3.0 * t as f64 + if t % 7 >= 5 { 120.0 } else { 0.0 } + (t % 3) as f64)
        .collect();
    let trend = daily("2019-01-07", &values);
    let forecast = forecast_with(
        &TrendSeasonalForecaster::default(),
        &trend,
        DEFAULT_HORIZON_DAYS,
        DEFAULT_MIN_ROWS,
    )
    .unwrap()
    .ready()
    .unwrap();

    assert_eq!(forecast.predicted.len(), 28 + 30);
    assert_eq!(forecast.future().next().unwrap().date, date("2019-02-04"));
    assert!(forecast.predicted.iter().all(|point| point.estimate.is_finite()));
}

#[test]
fn test_not_ready_below_min_rows() {
    let trend = daily("2019-01-01", &[42.0]);
    let outcome = forecast_with(&TrendSeasonalForecaster::default(), &trend, 30, 2).unwrap();
    assert_eq!(
        outcome,
        Gated::NotReady {
            complete_rows: 1,
            min_rows: 2
        }
    );

    let empty = daily("2019-01-01", &[]);
    assert!(!forecast_with(&TrendSeasonalForecaster::default(), &empty, 30, 2)
        .unwrap()
        .is_ready());
}

#[test]
fn test_non_finite_days_do_not_count() {
    let trend = daily("2019-01-01", &[10.0, f64::NAN, 30.0]);
    let forecast = forecast_with(&TrendSeasonalForecaster::default(), &trend, 1, 2)
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(forecast.actual.len(), 2);
    // Estimates only for the two observed days, the NaN day is fitted as zero
    assert_eq!(forecast.predicted.len(), 3);
    assert!((forecast.predicted[2].estimate - 100.0 / 3.0).abs() < 1e-9);
}

/// Returns fewer estimates than requested
struct ShortForecaster;

impl Forecaster for ShortForecaster {
    type Model = ();

    fn fit(&self, _daily: &[f64]) -> salesdash::Result<()> {
        Ok(())
    }

    fn predict(&self, _model: &(), _horizon: usize) -> salesdash::Result<Vec<f64>> {
        Ok(vec![1.0])
    }
}

#[test]
fn test_malformed_strategy_output_is_an_error() {
    let trend = daily("2019-01-01", &[1.0, 2.0, 3.0]);
    assert!(matches!(
        forecast_with(&ShortForecaster, &trend, 3, 2),
        Err(salesdash::Error::Forecast(_))
    ));
}
