use std::fs::{self, File};
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Writer};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::filter::Selection;
use crate::io::{RawCell, RawTable};

/// Read a CSV source into a raw table.
///
/// The header offset, column block and row cap from `source` apply to the
/// CSV grid exactly as they do to a worksheet.
pub fn read_csv(source: &SourceConfig) -> Result<RawTable> {
    let file = File::open(&source.path).map_err(Error::Io)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(Error::Csv)?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    RawTable::from_grid(grid, source)
}

/// Serialize a selection as UTF-8 CSV with a header row.
///
/// An empty selection produces a header-only document.
pub fn to_csv(selection: &Selection<'_>) -> Result<Vec<u8>> {
    let mut wtr = Writer::from_writer(Vec::new());

    wtr.write_record(selection.schema().column_names())
        .map_err(Error::Csv)?;

    let fields: Vec<_> = selection
        .schema()
        .columns()
        .iter()
        .map(|(_, field)| *field)
        .collect();
    for record in selection.iter() {
        let row: Vec<_> = fields.iter().map(|field| record.cell(*field).to_text()).collect();
        wtr.write_record(row.iter().map(|cell| cell.as_bytes()))
            .map_err(Error::Csv)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::new(e.error().kind(), e.to_string())))?;
    log::debug!(
        "exported {} rows to CSV ({} bytes)",
        selection.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Write a selection to a CSV file
pub fn write_csv<P: AsRef<Path>>(selection: &Selection<'_>, path: P) -> Result<()> {
    let bytes = to_csv(selection)?;
    fs::write(path.as_ref(), bytes).map_err(Error::Io)?;
    Ok(())
}

/// Row count and header of a CSV document
pub fn read_csv_shape(bytes: &[u8]) -> Result<(usize, Vec<String>)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let columns = rdr
        .headers()
        .map_err(Error::Csv)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = 0;
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record).map_err(Error::Csv)? {
        rows += 1;
    }
    Ok((rows, columns))
}
