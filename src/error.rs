use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a race weekend or its reference data
#[derive(Debug, Error)]
pub enum PodiumError {
    /// Input file could not be read from disk
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate encoding failed to decode or parse the file
    #[error("failed to read CSV file {} with any encoding {tried:?}: {last_error}", path.display())]
    EncodingExhausted {
        path: PathBuf,
        tried: Vec<String>,
        last_error: String,
    },

    /// Tabular parse failure
    #[error("CSV parse error: {0}")]
    Csv(#[from] PolarsError),

    /// A column the table cannot be used without
    #[error("{table} data missing required {role} column")]
    MissingColumn { table: String, role: &'static str },

    /// Qualifying table produced no driver rows
    #[error("no drivers found in {table} data")]
    NoDrivers { table: String },

    /// Reference tables are inconsistent
    #[error("invalid reference data: {0}")]
    ReferenceData(String),

    /// Reference JSON could not be decoded
    #[error("reference data JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Probability outside [0, 1]
    #[error("Probability must be between 0 and 1, got {0}")]
    InvalidProbability(f64),
}

pub type Result<T> = std::result::Result<T, PodiumError>;

/// Validate a probability supplied by a caller
pub fn validate_probability(prob: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(PodiumError::InvalidProbability(prob));
    }
    Ok(())
}

/// Validate a rain percentage (0-100) and convert it to a probability
pub fn rain_percent_to_probability(percent: f64) -> Result<f64> {
    let prob = percent / 100.0;
    validate_probability(prob)?;
    Ok(prob)
}
