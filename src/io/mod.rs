//! Ingestion and export boundary
//!
//! Sources are read into a [`RawTable`] (header plus untyped cells) which the
//! dataset module turns into typed rows. Exports serialize a
//! [`Selection`](crate::filter::Selection) to CSV or xlsx bytes.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;

use std::path::Path;

use serde::Serialize;

use crate::config::SourceConfig;
use crate::error::{Error, Result};

// Re-export commonly used functions
pub use self::csv::{read_csv, read_csv_shape, to_csv, write_csv};
#[cfg(feature = "excel")]
pub use self::excel::{read_excel, to_workbook, write_workbook};

/// Untyped cell as it comes out of a source file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    /// Text form of the cell; numbers print without a trailing `.0`
    pub fn text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(text) => text.trim().to_string(),
            RawCell::Number(value) => value.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    /// Trimmed copy; blank text becomes `Empty`
    pub fn normalized(&self) -> RawCell {
        match self {
            RawCell::Number(value) => RawCell::Number(*value),
            cell if cell.is_empty() => RawCell::Empty,
            cell => RawCell::Text(cell.text()),
        }
    }
}

/// Header row plus data rows restricted to the configured block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Apply the shared layout policy to a full cell grid: skip
    /// `header_offset` rows, take the header, keep the column block, drop
    /// blank rows and stop after `row_cap` data rows.
    pub(crate) fn from_grid<I>(grid: I, source: &SourceConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<RawCell>>,
    {
        let (first, last) = source.column_range()?;
        let block = |row: Vec<RawCell>| -> Vec<RawCell> {
            row.into_iter()
                .skip(first)
                .take(last - first + 1)
                .collect()
        };

        let mut rows = grid.into_iter().skip(source.header_offset);
        let header_row = rows.next().ok_or_else(|| {
            Error::EmptyData(format!(
                "no header row after skipping {} rows",
                source.header_offset
            ))
        })?;
        let mut header: Vec<String> = block(header_row).iter().map(RawCell::text).collect();
        while header.last().is_some_and(|name| name.is_empty()) {
            header.pop();
        }

        let rows = rows
            .map(block)
            .filter(|row| !row.iter().all(RawCell::is_empty))
            .take(source.row_cap)
            .collect();

        Ok(RawTable { header, rows })
    }
}

/// Read the configured source, choosing the reader by file extension
pub fn read_source(source: &SourceConfig) -> Result<RawTable> {
    match extension(&source.path).as_deref() {
        Some("csv") => read_csv(source),
        #[cfg(feature = "excel")]
        Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => read_excel(source),
        _ => Err(Error::InvalidInput(format!(
            "unsupported source file: {}",
            source.path.display()
        ))),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
