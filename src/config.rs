//! Dashboard configuration
//!
//! All settings have defaults matching the supermarket sales export, so an
//! empty TOML document is a valid configuration.
//!
//! ```toml
//! [source]
//! path = "supermarkt_sales.xlsx"
//! sheet_name = "Sales"
//! header_offset = 3
//! first_column = "B"
//! last_column = "R"
//! row_cap = 1000
//!
//! [coordinates]
//! Yangon = [16.8409, 96.1735]
//!
//! [forecast]
//! horizon_days = 30
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Where the sales export lives and which part of it to read
    pub source: SourceConfig,
    /// City name to (latitude, longitude)
    pub coordinates: BTreeMap<String, (f64, f64)>,
    pub forecast: ForecastConfig,
    pub anomaly: AnomalyConfig,
    pub readiness: ReadinessConfig,
    pub export: ExportConfig,
}

/// Ingestion boundary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Spreadsheet or CSV file
    pub path: PathBuf,
    /// Worksheet to read (ignored for CSV sources)
    pub sheet_name: String,
    /// Number of leading non-data rows before the header row
    pub header_offset: usize,
    /// First column of the data block, as a spreadsheet letter
    pub first_column: String,
    /// Last column of the data block (inclusive)
    pub last_column: String,
    /// Maximum number of data rows read
    pub row_cap: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            path: PathBuf::from("supermarkt_sales.xlsx"),
            sheet_name: "Sales".to_string(),
            header_offset: 3,
            first_column: "B".to_string(),
            last_column: "R".to_string(),
            row_cap: 1000,
        }
    }
}

impl SourceConfig {
    /// Zero-based inclusive column range
    pub fn column_range(&self) -> Result<(usize, usize)> {
        let first = column_index(&self.first_column)?;
        let last = column_index(&self.last_column)?;
        if first > last {
            return Err(Error::Config(format!(
                "column range {}:{} is reversed",
                self.first_column, self.last_column
            )));
        }
        Ok((first, last))
    }
}

/// Forecaster settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of days projected past the last observed date
    pub horizon_days: usize,
    /// Fit a day-of-week component when the series spans two weeks or more
    pub weekly_seasonality: bool,
    /// Fit a sub-daily component. Date-granular input has no intra-day
    /// signal, so enabling this only logs a warning.
    pub daily_seasonality: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            horizon_days: 30,
            weekly_seasonality: true,
            daily_seasonality: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Points with |z| strictly above this are flagged
    pub z_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        AnomalyConfig { z_threshold: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub min_rows: usize,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        ReadinessConfig { min_rows: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub csv_file_name: String,
    pub workbook_file_name: String,
    /// Name of the single data sheet in exported workbooks
    pub sheet_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            csv_file_name: "filtered_data.csv".to_string(),
            workbook_file_name: "filtered_data.xlsx".to_string(),
            sheet_name: "FilteredData".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: DashboardConfig = toml::from_str(text)?;
        if config.coordinates.is_empty() {
            config.coordinates = default_coordinates();
        }
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Defaults with the built-in branch coordinates
    pub fn with_defaults() -> Self {
        DashboardConfig {
            coordinates: default_coordinates(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast.horizon_days == 0 {
            return Err(Error::Config("forecast.horizon_days must be at least 1".into()));
        }
        if !(self.anomaly.z_threshold > 0.0) {
            return Err(Error::Config(format!(
                "anomaly.z_threshold must be positive, got {}",
                self.anomaly.z_threshold
            )));
        }
        if self.readiness.min_rows == 0 {
            return Err(Error::Config("readiness.min_rows must be at least 1".into()));
        }
        self.source.column_range()?;
        Ok(())
    }
}

/// Branch locations of the three supermarket cities
pub fn default_coordinates() -> BTreeMap<String, (f64, f64)> {
    [
        ("Yangon", (16.8409, 96.1735)),
        ("Naypyitaw", (19.7633, 96.0785)),
        ("Mandalay", (21.9588, 96.0891)),
    ]
    .into_iter()
    .map(|(city, coords)| (city.to_string(), coords))
    .collect()
}

/// Convert a spreadsheet column letter ("A", "R", "AA") to a zero-based index
pub fn column_index(letters: &str) -> Result<usize> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Config(format!("invalid column letter '{}'", letters)));
    }
    let index = letters
        .chars()
        .map(|c| c.to_ascii_uppercase() as usize - 'A' as usize + 1)
        .try_fold(0usize, |acc, digit| acc.checked_mul(26)?.checked_add(digit))
        .ok_or_else(|| Error::Config(format!("column letter '{}' is out of range", letters)))?;
    Ok(index - 1)
}
