//! Minimum-data precondition shared by the forecaster and anomaly detector

use serde::Serialize;

use crate::series::{BranchSales, SeriesPoint};

/// Default number of complete rows needed before a model is attempted
pub const DEFAULT_MIN_ROWS: usize = 2;

/// A row that may have missing fields
pub trait Completeness {
    /// `true` when no field of the row is missing
    fn is_complete(&self) -> bool;
}

impl<K> Completeness for SeriesPoint<K> {
    fn is_complete(&self) -> bool {
        self.value.is_finite()
    }
}

impl Completeness for BranchSales {
    fn is_complete(&self) -> bool {
        self.total.is_finite()
            && self.rating.is_finite()
            && self.lat.is_some_and(f64::is_finite)
            && self.lon.is_some_and(f64::is_finite)
    }
}

/// Number of rows with no missing values
pub fn complete_rows<T: Completeness>(rows: &[T]) -> usize {
    rows.iter().filter(|row| row.is_complete()).count()
}

/// Ready iff at least `min_rows` rows have no missing values
pub fn is_ready<T: Completeness>(rows: &[T], min_rows: usize) -> bool {
    complete_rows(rows) >= min_rows
}

/// Result of a gated computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Gated<T> {
    Ready(T),
    /// Too few complete rows to compute anything meaningful
    NotReady { complete_rows: usize, min_rows: usize },
}

impl<T> Gated<T> {
    /// Run `compute` only when `rows` passes the readiness check
    pub fn check<R, F>(rows: &[R], min_rows: usize, compute: F) -> Gated<T>
    where
        R: Completeness,
        F: FnOnce() -> T,
    {
        let complete = complete_rows(rows);
        if complete >= min_rows {
            Gated::Ready(compute())
        } else {
            log::debug!(
                "readiness gate closed: {} complete rows, {} required",
                complete,
                min_rows
            );
            Gated::NotReady {
                complete_rows: complete,
                min_rows,
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Gated::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Gated::Ready(value) => Some(value),
            Gated::NotReady { .. } => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Gated::Ready(value) => Some(value),
            Gated::NotReady { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ready_counts_complete_rows() {
        let empty: Vec<SeriesPoint<u32>> = Vec::new();
        assert!(!is_ready(&empty, DEFAULT_MIN_ROWS));

        let one = vec![SeriesPoint::new(1, 10.0)];
        assert!(!is_ready(&one, DEFAULT_MIN_ROWS));

        let with_gap = vec![SeriesPoint::new(1, 10.0), SeriesPoint::new(2, f64::NAN)];
        assert!(!is_ready(&with_gap, DEFAULT_MIN_ROWS));
        assert_eq!(complete_rows(&with_gap), 1);

        let two = vec![SeriesPoint::new(1, 10.0), SeriesPoint::new(2, 0.0)];
        assert!(is_ready(&two, DEFAULT_MIN_ROWS));
        assert!(!is_ready(&two, 3));
    }

    #[test]
    fn test_branch_completeness() {
        let mut branch = BranchSales {
            city: "Yangon".into(),
            total: 10.0,
            rating: 7.0,
            lat: Some(16.8),
            lon: Some(96.1),
        };
        assert!(branch.is_complete());
        branch.lon = None;
        assert!(!branch.is_complete());
    }

    #[test]
    fn test_gated_check() {
        let rows = vec![SeriesPoint::new(1, 1.0)];
        let gated: Gated<usize> = Gated::check(&rows, 2, || unreachable!());
        assert_eq!(
            gated,
            Gated::NotReady {
                complete_rows: 1,
                min_rows: 2
            }
        );
        assert_eq!(Gated::check(&rows, 1, || 42).ready(), Some(42));
    }
}
