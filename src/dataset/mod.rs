//! In-memory sales table
//!
//! A [`Dataset`] is built once from the ingestion boundary and never mutated
//! afterwards. Every row is one transaction with typed core fields, the
//! derived `hour`/`lat`/`lon` columns and any passthrough columns kept as
//! the source typed them.

mod cache;
mod geo;
mod parse;

use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::io::{RawCell, RawTable};

pub use self::cache::{clear_cache, load_cached};
pub use self::geo::CityCoordinates;
pub use self::parse::{parse_date, parse_number, parse_time};

/// Columns every source must provide
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Date",
    "Time",
    "City",
    "Customer_type",
    "Gender",
    "Product line",
    "Total",
    "Rating",
    "gross income",
    "gross margin percentage",
];

/// What a column of the table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Time,
    City,
    CustomerType,
    Gender,
    ProductLine,
    Total,
    Rating,
    GrossIncome,
    GrossMarginPercentage,
    /// Derived from Time
    Hour,
    /// Derived from City
    Lat,
    /// Derived from City
    Lon,
    /// Source column carried through verbatim; index into `SalesRecord::passthrough`
    Passthrough(usize),
}

impl Field {
    fn from_header(name: &str) -> Option<Field> {
        let field = match name {
            "Date" => Field::Date,
            "Time" => Field::Time,
            "City" => Field::City,
            "Customer_type" => Field::CustomerType,
            "Gender" => Field::Gender,
            "Product line" => Field::ProductLine,
            "Total" => Field::Total,
            "Rating" => Field::Rating,
            "gross income" => Field::GrossIncome,
            "gross margin percentage" => Field::GrossMarginPercentage,
            _ => return None,
        };
        Some(field)
    }
}

/// Ordered column set: source header order followed by the derived columns
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, Field)>,
}

impl Schema {
    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn columns(&self) -> &[(String, Field)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    pub total: f64,
    pub rating: f64,
    pub gross_income: f64,
    pub gross_margin_percentage: f64,
    /// Hour of day (0-23) taken from `time`
    pub hour: u32,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Non-core source cells, numbers stay numbers
    pub passthrough: Vec<RawCell>,
}

/// A single cell rendered for export
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    Text(std::borrow::Cow<'a, str>),
    Number(f64),
    Empty,
}

impl<'a> CellValue<'a> {
    /// Text form used by the CSV writer
    pub fn to_text(&self) -> std::borrow::Cow<'a, str> {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => value.to_string().into(),
            CellValue::Empty => "".into(),
        }
    }
}

impl SalesRecord {
    /// Value of the given column for this row
    pub fn cell(&self, field: Field) -> CellValue<'_> {
        match field {
            Field::Date => CellValue::Text(self.date.format("%Y-%m-%d").to_string().into()),
            Field::Time => CellValue::Text(self.time.format("%H:%M:%S").to_string().into()),
            Field::City => CellValue::Text(self.city.as_str().into()),
            Field::CustomerType => CellValue::Text(self.customer_type.as_str().into()),
            Field::Gender => CellValue::Text(self.gender.as_str().into()),
            Field::ProductLine => CellValue::Text(self.product_line.as_str().into()),
            Field::Total => CellValue::Number(self.total),
            Field::Rating => CellValue::Number(self.rating),
            Field::GrossIncome => CellValue::Number(self.gross_income),
            Field::GrossMarginPercentage => CellValue::Number(self.gross_margin_percentage),
            Field::Hour => CellValue::Number(self.hour as f64),
            Field::Lat => self.lat.map_or(CellValue::Empty, CellValue::Number),
            Field::Lon => self.lon.map_or(CellValue::Empty, CellValue::Number),
            Field::Passthrough(index) => match self.passthrough.get(index) {
                Some(RawCell::Number(value)) => CellValue::Number(*value),
                Some(RawCell::Text(text)) if !text.is_empty() => {
                    CellValue::Text(text.as_str().into())
                }
                _ => CellValue::Empty,
            },
        }
    }
}

/// Immutable sales table
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    records: Vec<SalesRecord>,
}

impl Dataset {
    /// Read the configured source file and build the table
    pub fn load(source: &SourceConfig, coordinates: &CityCoordinates) -> Result<Self> {
        let table = crate::io::read_source(source)?;
        let dataset = Self::from_raw(table, coordinates)?;
        log::info!(
            "loaded {} sales rows from {}",
            dataset.len(),
            source.path.display()
        );
        Ok(dataset)
    }

    /// Shorthand for loading a file with default layout settings
    pub fn from_path<P: AsRef<Path>>(path: P, coordinates: &CityCoordinates) -> Result<Self> {
        let source = SourceConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        };
        Self::load(&source, coordinates)
    }

    /// Build the table from a raw cell grid, parsing the core columns and
    /// deriving `hour`, `lat` and `lon`
    pub fn from_raw(table: RawTable, coordinates: &CityCoordinates) -> Result<Self> {
        let mut columns = Vec::with_capacity(table.header.len() + 3);
        let mut positions = Vec::with_capacity(table.header.len());
        let mut seen = HashSet::new();
        let mut passthrough_count = 0;

        for name in &table.header {
            let name = name.trim().to_string();
            let field = match Field::from_header(&name) {
                Some(field) if seen.insert(field) => field,
                _ => {
                    passthrough_count += 1;
                    Field::Passthrough(passthrough_count - 1)
                }
            };
            positions.push(field);
            columns.push((name, field));
        }

        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|(name, _)| name == required) {
                return Err(Error::ColumnNotFound(required.to_string()));
            }
        }

        columns.push(("hour".to_string(), Field::Hour));
        columns.push(("lat".to_string(), Field::Lat));
        columns.push(("lon".to_string(), Field::Lon));

        let mut records = Vec::with_capacity(table.rows.len());
        for (row_index, row) in table.rows.iter().enumerate() {
            records.push(build_record(
                row_index + 1,
                row,
                &positions,
                passthrough_count,
                coordinates,
            )?);
        }

        Ok(Dataset {
            schema: Schema { columns },
            records,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct cities in first-seen order
    pub fn cities(&self) -> Vec<String> {
        self.distinct(|record| &record.city)
    }

    /// Distinct customer types in first-seen order
    pub fn customer_types(&self) -> Vec<String> {
        self.distinct(|record| &record.customer_type)
    }

    /// Distinct genders in first-seen order
    pub fn genders(&self) -> Vec<String> {
        self.distinct(|record| &record.gender)
    }

    /// Earliest and latest transaction date
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|record| record.date).min()?;
        let last = self.records.iter().map(|record| record.date).max()?;
        Some((first, last))
    }

    fn distinct<F>(&self, key: F) -> Vec<String>
    where
        F: Fn(&SalesRecord) -> &String,
    {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(key)
            .filter(|value| seen.insert(value.as_str()))
            .cloned()
            .collect()
    }
}

fn build_record(
    row: usize,
    cells: &[RawCell],
    positions: &[Field],
    passthrough_count: usize,
    coordinates: &CityCoordinates,
) -> Result<SalesRecord> {
    let mut date = None;
    let mut time = None;
    let mut city = String::new();
    let mut customer_type = String::new();
    let mut gender = String::new();
    let mut product_line = String::new();
    let mut total = None;
    let mut rating = None;
    let mut gross_income = None;
    let mut gross_margin_percentage = None;
    let mut passthrough = vec![RawCell::Empty; passthrough_count];

    let empty = RawCell::Empty;
    for (index, field) in positions.iter().enumerate() {
        let cell = cells.get(index).unwrap_or(&empty);
        match field {
            Field::Date => date = Some(parse_date(cell).ok_or_else(|| parse_error(row, "Date", cell))?),
            Field::Time => time = Some(parse_time(cell).ok_or_else(|| parse_error(row, "Time", cell))?),
            Field::City => city = cell.text(),
            Field::CustomerType => customer_type = cell.text(),
            Field::Gender => gender = cell.text(),
            Field::ProductLine => product_line = cell.text(),
            Field::Total => total = Some(required_number(row, "Total", cell)?),
            Field::Rating => rating = Some(required_number(row, "Rating", cell)?),
            Field::GrossIncome => gross_income = Some(required_number(row, "gross income", cell)?),
            Field::GrossMarginPercentage => {
                gross_margin_percentage =
                    Some(required_number(row, "gross margin percentage", cell)?)
            }
            Field::Passthrough(slot) => passthrough[*slot] = cell.normalized(),
            Field::Hour | Field::Lat | Field::Lon => {}
        }
    }

    // Presence of every core column was checked against the header already.
    let missing = |column: &str| Error::ColumnNotFound(column.to_string());
    let time = time.ok_or_else(|| missing("Time"))?;
    let (lat, lon) = coordinates.lookup(&city);

    Ok(SalesRecord {
        date: date.ok_or_else(|| missing("Date"))?,
        time,
        city,
        customer_type,
        gender,
        product_line,
        total: total.ok_or_else(|| missing("Total"))?,
        rating: rating.ok_or_else(|| missing("Rating"))?,
        gross_income: gross_income.ok_or_else(|| missing("gross income"))?,
        gross_margin_percentage: gross_margin_percentage
            .ok_or_else(|| missing("gross margin percentage"))?,
        hour: time.hour(),
        lat,
        lon,
        passthrough,
    })
}

fn required_number(row: usize, column: &str, cell: &RawCell) -> Result<f64> {
    parse_number(cell).ok_or_else(|| parse_error(row, column, cell))
}

fn parse_error(row: usize, column: &str, cell: &RawCell) -> Error {
    Error::Parse {
        row,
        column: column.to_string(),
        value: cell.text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        [
            "Invoice ID",
            "City",
            "Customer_type",
            "Gender",
            "Product line",
            "Total",
            "Date",
            "Time",
            "gross margin percentage",
            "gross income",
            "Rating",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn row(invoice: &str, city: &str, date: &str, time: &str, total: f64) -> Vec<RawCell> {
        vec![
            RawCell::Text(invoice.into()),
            RawCell::Text(city.into()),
            RawCell::Text("Member".into()),
            RawCell::Text("Female".into()),
            RawCell::Text("Health and beauty".into()),
            RawCell::Number(total),
            RawCell::Text(date.into()),
            RawCell::Text(time.into()),
            RawCell::Number(4.761904762),
            RawCell::Number(total * 0.05),
            RawCell::Number(9.1),
        ]
    }

    #[test]
    fn test_from_raw_derives_columns() {
        let table = RawTable {
            header: header(),
            rows: vec![
                row("750-67-8428", "Yangon", "1/5/2019", "13:08:00", 548.9715),
                row("226-31-3081", "Atlantis", "2019-03-08", "10:29", 80.22),
            ],
        };
        let dataset = Dataset::from_raw(table, &CityCoordinates::default()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.schema().column_names(),
            vec![
                "Invoice ID",
                "City",
                "Customer_type",
                "Gender",
                "Product line",
                "Total",
                "Date",
                "Time",
                "gross margin percentage",
                "gross income",
                "Rating",
                "hour",
                "lat",
                "lon"
            ]
        );

        let first = &dataset.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2019, 1, 5).unwrap());
        assert_eq!(first.hour, 13);
        assert_eq!(first.lat, Some(16.8409));
        assert_eq!(first.lon, Some(96.1735));
        assert_eq!(first.passthrough, vec![RawCell::Text("750-67-8428".into())]);

        // Unknown cities resolve to missing coordinates, not an error
        let second = &dataset.records()[1];
        assert_eq!(second.hour, 10);
        assert_eq!(second.lat, None);
        assert_eq!(second.lon, None);
        assert_eq!(second.cell(Field::Lat), CellValue::Empty);
    }

    #[test]
    fn test_missing_required_column() {
        let mut header = header();
        header.retain(|name| name != "Rating");
        let table = RawTable {
            header,
            rows: Vec::new(),
        };
        match Dataset::from_raw(table, &CityCoordinates::default()) {
            Err(Error::ColumnNotFound(column)) => assert_eq!(column, "Rating"),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_date_is_fatal() {
        let table = RawTable {
            header: header(),
            rows: vec![row("1", "Yangon", "not a date", "13:08:00", 10.0)],
        };
        match Dataset::from_raw(table, &CityCoordinates::default()) {
            Err(Error::Parse { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "Date");
                assert_eq!(value, "not a date");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_domains_in_first_seen_order() {
        let table = RawTable {
            header: header(),
            rows: vec![
                row("1", "Yangon", "2019-01-03", "10:00", 1.0),
                row("2", "Mandalay", "2019-01-01", "11:00", 2.0),
                row("3", "Yangon", "2019-01-02", "12:00", 3.0),
            ],
        };
        let dataset = Dataset::from_raw(table, &CityCoordinates::default()).unwrap();
        assert_eq!(dataset.cities(), vec!["Yangon", "Mandalay"]);
        assert_eq!(dataset.genders(), vec!["Female"]);
        assert_eq!(
            dataset.date_span(),
            Some((
                NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2019, 1, 3).unwrap()
            ))
        );
    }
}
