use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use simple_excel_writer::{Row, Workbook};

use crate::config::SourceConfig;
use crate::dataset::CellValue;
use crate::error::{Error, Result};
use crate::filter::Selection;
use crate::io::{RawCell, RawTable};

/// Read the configured worksheet into a raw table
///
/// # Arguments
///
/// * `source` - file path, sheet name, header offset, column block and row
///   cap. Rows and columns are addressed from cell A1, not from the first
///   non-empty cell of the sheet.
///
/// # Errors
///
/// Fails when the file cannot be opened or the sheet does not exist.
pub fn read_excel(source: &SourceConfig) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(&source.path).map_err(|e| {
        Error::Excel(format!(
            "could not open workbook {}: {}",
            source.path.display(),
            e
        ))
    })?;

    let range = workbook
        .worksheet_range(&source.sheet_name)
        .map_err(|e| Error::Excel(format!("could not read sheet '{}': {}", source.sheet_name, e)))?;

    let (end_row, end_col) = match range.end() {
        Some(end) => end,
        None => return RawTable::from_grid(Vec::new(), source),
    };

    let grid = (0..=end_row).map(|row| {
        (0..=end_col)
            .map(|col| match range.get_value((row, col)) {
                Some(cell) => raw_cell(cell),
                None => RawCell::Empty,
            })
            .collect::<Vec<_>>()
    });

    RawTable::from_grid(grid, source)
}

fn raw_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::Empty => RawCell::Empty,
        DataType::Int(value) => RawCell::Number(*value as f64),
        DataType::Float(value) | DataType::DateTime(value) => RawCell::Number(*value),
        DataType::String(text) if text.trim().is_empty() => RawCell::Empty,
        DataType::String(text) => RawCell::Text(text.clone()),
        other => RawCell::Text(other.to_string()),
    }
}

/// Serialize a selection as an xlsx workbook with a single data sheet.
///
/// Numbers are written as numeric cells, dates and times as text in the
/// same format the CSV export uses.
pub fn to_workbook(selection: &Selection<'_>, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::create_in_memory();
    let mut sheet = workbook.create_sheet(sheet_name);

    let schema = selection.schema();
    workbook
        .write_sheet(&mut sheet, |sheet_writer| {
            let mut header = Row::new();
            for name in schema.column_names() {
                header.add_cell(name);
            }
            sheet_writer.append_row(header)?;

            for record in selection.iter() {
                let mut row = Row::new();
                for (_, field) in schema.columns() {
                    match record.cell(*field) {
                        CellValue::Number(value) => row.add_cell(value),
                        CellValue::Text(text) => row.add_cell(text.into_owned()),
                        CellValue::Empty => row.add_cell(""),
                    }
                }
                sheet_writer.append_row(row)?;
            }
            Ok(())
        })
        .map_err(|e| Error::Excel(format!("could not write sheet '{}': {}", sheet_name, e)))?;

    let bytes = workbook
        .close()
        .map_err(|e| Error::Excel(format!("could not finish workbook: {}", e)))?
        .ok_or_else(|| Error::Excel("in-memory workbook produced no data".to_string()))?;
    log::debug!(
        "exported {} rows to workbook ({} bytes)",
        selection.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Write a selection to an xlsx file
pub fn write_workbook<P: AsRef<Path>>(
    selection: &Selection<'_>,
    sheet_name: &str,
    path: P,
) -> Result<()> {
    let bytes = to_workbook(selection, sheet_name)?;
    fs::write(path.as_ref(), bytes).map_err(Error::Io)?;
    Ok(())
}
