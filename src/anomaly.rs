//! Z-score anomaly flagging over the daily sales series

use chrono::NaiveDate;
use serde::Serialize;

use crate::readiness::{Completeness, Gated};
use crate::series::SalesTrend;

/// Default |z| above which a day is flagged
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// One day of the daily series with its anomaly flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyPoint {
    pub date: NaiveDate,
    pub total: f64,
    /// Standardized deviation; `None` when it is undefined (missing total
    /// or a zero-variance series)
    pub z_score: Option<f64>,
    pub is_anomaly: bool,
}

/// Daily series with anomaly flags, ordered by date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFlaggedSeries {
    pub points: Vec<AnomalyPoint>,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    pub threshold: f64,
}

impl AnomalyFlaggedSeries {
    /// Flagged days only
    pub fn anomalies(&self) -> impl Iterator<Item = &AnomalyPoint> {
        self.points.iter().filter(|point| point.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }
}

/// Mean and sample standard deviation of the finite values
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, variance.sqrt())
}

/// Flag days whose standardized total exceeds `z_threshold` in magnitude.
///
/// Returns `NotReady` when fewer than `min_rows` days have a total. A
/// series whose totals are all identical has no defined z-scores and is
/// reported with no anomalies.
pub fn detect(series: &SalesTrend, z_threshold: f64, min_rows: usize) -> Gated<AnomalyFlaggedSeries> {
    Gated::check(&series.points, min_rows, || {
        let values: Vec<f64> = series
            .points
            .iter()
            .filter(|point| point.is_complete())
            .map(|point| point.value)
            .collect();
        let (mean, std_dev) = mean_std(&values);
        let degenerate = !(std_dev > 0.0) || !std_dev.is_finite();
        if degenerate {
            log::debug!("zero-variance sales series, no anomalies flagged");
        }

        let points = series
            .points
            .iter()
            .map(|point| {
                let z_score = if degenerate || !point.is_complete() {
                    None
                } else {
                    Some((point.value - mean) / std_dev)
                };
                AnomalyPoint {
                    date: point.key,
                    total: point.value,
                    z_score,
                    is_anomaly: z_score.is_some_and(|z| z.abs() > z_threshold),
                }
            })
            .collect();

        AnomalyFlaggedSeries {
            points,
            mean,
            std_dev,
            threshold: z_threshold,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{AggregatedSeries, SeriesPoint};

    fn trend(values: &[f64]) -> SalesTrend {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        AggregatedSeries::new(
            "Total",
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| SeriesPoint::new(start + chrono::Duration::days(i as i64), v))
                .collect(),
        )
    }

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((mean - 3.0).abs() < 1e-10);
        assert!((std - 1.5811388300841898).abs() < 1e-10);
    }

    #[test]
    fn test_flags_spike() {
        let mut values = vec![100.0; 9];
        values.push(1000.0);
        let flagged = detect(&trend(&values), DEFAULT_Z_THRESHOLD, 2).ready().unwrap();
        assert_eq!(flagged.anomaly_count(), 1);
        let spike = flagged.anomalies().next().unwrap();
        assert_eq!(spike.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        // (1000 - 190) / 284.6... = 2.846
        assert!((spike.z_score.unwrap() - 2.8460498941515415).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_has_no_anomalies() {
        for threshold in [0.0, 0.5, 2.0] {
            let flagged = detect(&trend(&[50.0, 50.0, 50.0]), threshold, 2).ready().unwrap();
            assert_eq!(flagged.anomaly_count(), 0);
            assert!(flagged.points.iter().all(|p| p.z_score.is_none()));
        }
    }

    #[test]
    fn test_not_ready_below_min_rows() {
        assert!(!detect(&trend(&[]), DEFAULT_Z_THRESHOLD, 2).is_ready());
        assert!(!detect(&trend(&[10.0]), DEFAULT_Z_THRESHOLD, 2).is_ready());
        assert!(!detect(&trend(&[10.0, f64::NAN]), DEFAULT_Z_THRESHOLD, 2).is_ready());
    }

    #[test]
    fn test_missing_total_is_never_flagged() {
        let flagged = detect(&trend(&[1.0, f64::NAN, 3.0]), 0.1, 2).ready().unwrap();
        assert_eq!(flagged.points.len(), 3);
        assert!(!flagged.points[1].is_anomaly);
        assert_eq!(flagged.points[1].z_score, None);
        assert_eq!(flagged.anomaly_count(), 2);
    }
}
