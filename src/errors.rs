/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the simulation, analytics, export and chart layers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A simulation parameter is outside its domain (e.g. a zero horizon).
    #[error("Invalid parameter `{0}`: {1}")]
    InvalidParameter(&'static str, String),

    /// The input data cannot be processed (e.g. an empty table or unordered rows).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The candle prices do not bracket each other (`low <= open, close <= high`).
    #[error("Invalid candle: {0}")]
    InvalidCandle(String),

    /// A required field was not set on a builder.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization/deserialization error occurred.
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rendering failed.
    #[cfg(feature = "draws")]
    #[error("Plotters error: {0}")]
    Plotters(String),
}
