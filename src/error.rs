//! Operation-level error taxonomy.

use std::path::PathBuf;

use crate::json_file::JsonFileError;
use crate::registry::RegistryError;
use crate::runner::RunError;

/// Every failure an operation can report. Converted into an
/// [`OperationResult`](crate::response::OperationResult) at the operation boundary.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("Server '{0}' not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{var} not set. Please set it to your LLM config file path.")]
    ConfigurationMissing { var: &'static str },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Config file error: {0}")]
    ConfigFile(#[from] JsonFileError),
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Install failed: {0}")]
    Subprocess(#[from] RunError),
}
