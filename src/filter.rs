//! Filter engine
//!
//! Applies a categorical and date-range predicate to a [`Dataset`] and yields
//! a borrowed [`Selection`]. Filtering is pure: the same dataset and criteria
//! always give the same selection.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, SalesRecord, Schema};

/// Date input as it arrives from the user: a full range, a single pick made
/// while a range is still being chosen, or nothing at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateSelection {
    Range(NaiveDate, NaiveDate),
    Single(NaiveDate),
    Unset,
}

impl DateSelection {
    /// Resolve to an inclusive `(start, end)` range.
    ///
    /// Reversed ranges, single dates and unset input fall back to the full
    /// `span` of the dataset. Returns `None` only when the dataset is empty.
    pub fn resolve(&self, span: Option<(NaiveDate, NaiveDate)>) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            DateSelection::Range(start, end) if start <= end => Some((start, end)),
            _ => {
                if !matches!(self, DateSelection::Unset) {
                    log::debug!("date selection {:?} is incomplete or reversed, using full span", self);
                }
                span
            }
        }
    }
}

impl From<(NaiveDate, NaiveDate)> for DateSelection {
    fn from((start, end): (NaiveDate, NaiveDate)) -> Self {
        DateSelection::Range(start, end)
    }
}

/// What the user asked to see
///
/// Equality is structural: category sets compare as sets, the date input
/// compares as a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub cities: BTreeSet<String>,
    pub customer_types: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub date_range: DateSelection,
}

impl FilterCriteria {
    /// Reset-to-defaults value: every distinct category and the full date span
    pub fn full_domain(dataset: &Dataset) -> Self {
        FilterCriteria {
            cities: dataset.cities().into_iter().collect(),
            customer_types: dataset.customer_types().into_iter().collect(),
            genders: dataset.genders().into_iter().collect(),
            date_range: match dataset.date_span() {
                Some((start, end)) => DateSelection::Range(start, end),
                None => DateSelection::Unset,
            },
        }
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_customer_types<I, S>(mut self, customer_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.customer_types = customer_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genders<I, S>(mut self, genders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genders = genders.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date_range<D: Into<DateSelection>>(mut self, date_range: D) -> Self {
        self.date_range = date_range.into();
        self
    }

    fn matches(&self, record: &SalesRecord, start: NaiveDate, end: NaiveDate) -> bool {
        self.cities.contains(&record.city)
            && self.customer_types.contains(&record.customer_type)
            && self.genders.contains(&record.gender)
            && start <= record.date
            && record.date <= end
    }
}

/// Rows of a dataset that satisfy a [`FilterCriteria`]; possibly empty
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    schema: &'a Schema,
    records: Vec<&'a SalesRecord>,
}

impl<'a> Selection<'a> {
    /// Every row of the dataset
    pub fn all(dataset: &'a Dataset) -> Self {
        Selection {
            schema: dataset.schema(),
            records: dataset.records().iter().collect(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn records(&self) -> &[&'a SalesRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Select the rows matching `criteria`.
///
/// Row membership requires the city, customer type and gender to be in their
/// respective sets and the date to lie in the resolved inclusive range. An
/// empty category set selects nothing.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Selection<'a> {
    let records = match criteria.date_range.resolve(dataset.date_span()) {
        Some((start, end)) => dataset
            .records()
            .iter()
            .filter(|record| criteria.matches(record, start, end))
            .collect(),
        None => Vec::new(),
    };

    Selection {
        schema: dataset.schema(),
        records,
    }
}

/// Remembers the last applied criteria so a caller can tell whether a
/// submission actually changed anything
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    previous: Option<FilterCriteria>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `criteria` as applied; returns `true` if it differs from the
    /// previous submission (the first submission always counts as a change)
    pub fn submit(&mut self, criteria: &FilterCriteria) -> bool {
        let changed = self.previous.as_ref() != Some(criteria);
        if changed {
            self.previous = Some(criteria.clone());
        }
        changed
    }

    pub fn previous(&self) -> Option<&FilterCriteria> {
        self.previous.as_ref()
    }

    /// Forget the previous submission
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
