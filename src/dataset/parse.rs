//! Cell parsing for the core columns

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::io::RawCell;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%H:%M:%S%.f"];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a calendar date from text or a spreadsheet serial number.
/// Any time-of-day component is dropped.
pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Number(serial) => date_from_serial(*serial),
        RawCell::Text(text) => {
            let text = text.trim();
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                        .map(|datetime| datetime.date())
                })
        }
        RawCell::Empty => None,
    }
}

/// Parse a time of day from text or a fractional-day serial
pub fn parse_time(cell: &RawCell) -> Option<NaiveTime> {
    match cell {
        RawCell::Number(serial) => time_from_serial(*serial),
        RawCell::Text(text) => {
            let text = text.trim();
            TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                        .map(|datetime| datetime.time())
                })
        }
        RawCell::Empty => None,
    }
}

/// Parse a finite number
pub fn parse_number(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(value) => *value,
        RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
        RawCell::Empty => return None,
    };
    value.is_finite().then_some(value)
}

/// Spreadsheet serial day numbers count from 1899-12-30
fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn time_from_serial(serial: f64) -> Option<NaiveTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let seconds = (serial.fract() * SECONDS_PER_DAY).round() as u32 % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}
