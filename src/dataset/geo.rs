use std::collections::BTreeMap;

use crate::config::{default_coordinates, DashboardConfig};

/// Static city to (latitude, longitude) lookup used to place branches on a map
#[derive(Debug, Clone, PartialEq)]
pub struct CityCoordinates {
    entries: BTreeMap<String, (f64, f64)>,
}

impl CityCoordinates {
    pub fn new(entries: BTreeMap<String, (f64, f64)>) -> Self {
        CityCoordinates { entries }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.coordinates.clone())
    }

    /// Coordinates of a city; unknown cities yield `(None, None)`
    pub fn lookup(&self, city: &str) -> (Option<f64>, Option<f64>) {
        match self.entries.get(city) {
            Some(&(lat, lon)) => (Some(lat), Some(lon)),
            None => (None, None),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CityCoordinates {
    fn default() -> Self {
        Self::new(default_coordinates())
    }
}
