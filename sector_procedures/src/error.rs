use std::io;

use thiserror::Error;

pub type ProcedureResult<T> = Result<T, ProcedureError>;

#[derive(Debug, Error)]
pub enum ProcedureError {
    #[error("Table {table} is missing required column(s): {}", missing.join(", "))]
    MissingColumns {
        table: String,
        missing: Vec<String>,
    },
    #[error("Failed to read csv: {0}")]
    CsvError(#[from] csv::Error),
    #[error("System input/output error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse file in a known encoding: {0}")]
    EncodingError(String),
    #[error("Unknown procedure type: {0:?}")]
    InvalidProcType(String),
    #[error("Invalid draw coordinate {token:?} in procedure {proc_ident}")]
    InvalidDrawCoordinate { proc_ident: String, token: String },
    #[error("Invalid regex in column {column} for {icao} {proc_type}: {source}")]
    InvalidRegex {
        icao: String,
        proc_type: String,
        column: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("Failed to parse DMS coordinate: {0:?}")]
    InvalidDms(String),
}
