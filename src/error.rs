use thiserror::Error;

/// Error type for the sales dashboard
///
/// Only the ingestion boundary, configuration loading and the forecast model
/// fit produce errors. Degenerate filter input is handled with fallbacks.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[source] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Could not parse {column} value '{value}' on data row {row}")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("No data: {0}")]
    EmptyData(String),

    #[error("Forecast failed: {0}")]
    Forecast(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
