use std::io;

use config::ConfigError;
use sector_procedures::error::ProcedureError;
use thiserror::Error;
pub(crate) type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug, Error)]
pub(crate) enum ApplicationError {
    #[error("Error regarding config: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("System input/output error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to generate procedures: {0}")]
    ProcedureError(#[from] ProcedureError),
    #[error("Failed to serialize config: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("Could not determine the project config directory")]
    NoProjectDirectory,
    #[error("Table {0} has no rows")]
    EmptyTable(&'static str),
}
