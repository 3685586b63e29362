use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacingError {
    #[error("Table not found: {0}")]
    MissingTable(String),

    #[error("Malformed row {row} in table '{table}': {details}")]
    MalformedRow {
        table: String,
        row: usize,
        details: String,
    },

    #[error("Spend for '{campaign}' on {date} is not a finite number: {amount}")]
    InvalidAmount {
        campaign: String,
        date: String,
        amount: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PacingError>;
