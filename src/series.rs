//! Chart-ready aggregations of a selection
//!
//! Each function groups the selection along one key and returns an ordered
//! series. All of them return an empty series for an empty selection.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::SalesRecord;
use crate::filter::Selection;

/// One `(key, value)` pair of an aggregated series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint<K> {
    pub key: K,
    pub value: f64,
}

impl<K> SeriesPoint<K> {
    pub fn new(key: K, value: f64) -> Self {
        SeriesPoint { key, value }
    }
}

/// Ordered sequence of aggregated values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries<K> {
    /// Name of the aggregated column
    pub name: String,
    pub points: Vec<SeriesPoint<K>>,
}

impl<K> AggregatedSeries<K> {
    pub fn new(name: impl Into<String>, points: Vec<SeriesPoint<K>>) -> Self {
        AggregatedSeries {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.points.iter().map(|point| &point.key)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|point| point.value)
    }
}

impl<K: Clone> AggregatedSeries<K> {
    /// Pairs as tuples
    pub fn to_pairs(&self) -> Vec<(K, f64)> {
        self.points
            .iter()
            .map(|point| (point.key.clone(), point.value))
            .collect()
    }
}

/// Daily total sales; the shared input of the forecaster and anomaly detector
pub type SalesTrend = AggregatedSeries<NaiveDate>;

/// Sales and rating for one branch city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchSales {
    pub city: String,
    /// Sum of `Total`
    pub total: f64,
    /// Mean `Rating`
    pub rating: f64,
    /// First non-missing latitude seen for the city
    pub lat: Option<f64>,
    /// First non-missing longitude seen for the city
    pub lon: Option<f64>,
}

impl BranchSales {
    /// Whether the branch can be placed on a map
    pub fn is_located(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

fn sum_by<K, F, V>(selection: &Selection<'_>, key: F, value: V) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
    V: Fn(&SalesRecord) -> f64,
{
    let mut sums = BTreeMap::new();
    for record in selection.iter() {
        *sums.entry(key(record)).or_insert(0.0) += value(record);
    }
    sums
}

fn into_points<K>(sums: BTreeMap<K, f64>) -> Vec<SeriesPoint<K>> {
    sums.into_iter()
        .map(|(key, value)| SeriesPoint::new(key, value))
        .collect()
}

/// Total sales per product line, ascending by total
pub fn sales_by_product_line(selection: &Selection<'_>) -> AggregatedSeries<String> {
    let mut points = into_points(sum_by(
        selection,
        |record| record.product_line.clone(),
        |record| record.total,
    ));
    // Stable sort keeps equal totals in key order
    points.sort_by(|a, b| a.value.total_cmp(&b.value));
    AggregatedSeries::new("Total", points)
}

/// Total sales per hour of day; only hours present in the selection appear
pub fn sales_by_hour(selection: &Selection<'_>) -> AggregatedSeries<u32> {
    AggregatedSeries::new(
        "Total",
        into_points(sum_by(selection, |record| record.hour, |record| record.total)),
    )
}

/// Total sales per calendar date, ascending by date
pub fn sales_trend(selection: &Selection<'_>) -> SalesTrend {
    AggregatedSeries::new(
        "Total",
        into_points(sum_by(selection, |record| record.date, |record| record.total)),
    )
}

/// Gross income per calendar date, ascending by date
pub fn profit_trend(selection: &Selection<'_>) -> AggregatedSeries<NaiveDate> {
    AggregatedSeries::new(
        "gross income",
        into_points(sum_by(
            selection,
            |record| record.date,
            |record| record.gross_income,
        )),
    )
}

/// Per-city totals, mean rating and coordinates, ordered by city name
pub fn sales_by_city(selection: &Selection<'_>) -> Vec<BranchSales> {
    struct Acc {
        total: f64,
        rating: f64,
        count: usize,
        lat: Option<f64>,
        lon: Option<f64>,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for record in selection.iter() {
        let acc = groups.entry(record.city.as_str()).or_insert(Acc {
            total: 0.0,
            rating: 0.0,
            count: 0,
            lat: None,
            lon: None,
        });
        acc.total += record.total;
        acc.rating += record.rating;
        acc.count += 1;
        acc.lat = acc.lat.or(record.lat);
        acc.lon = acc.lon.or(record.lon);
    }

    groups
        .into_iter()
        .map(|(city, acc)| BranchSales {
            city: city.to_string(),
            total: acc.total,
            rating: acc.rating / acc.count as f64,
            lat: acc.lat,
            lon: acc.lon,
        })
        .collect()
}
