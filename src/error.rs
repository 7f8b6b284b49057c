use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("Statement has {0} non-blank line(s); a header and at least one row are required")]
    TooFewLines(usize),

    #[error("No transactions could be read from {data_lines} data line(s); check that the file has Date and Description columns")]
    NoTransactions { data_lines: usize },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("No rule with ID {0}")]
    UnknownRule(i64),

    #[error("No transaction matching ID {0}")]
    UnknownTransaction(String),

    #[error("Invalid match type: {0} (expected contains, starts_with or regex)")]
    InvalidMatchType(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
