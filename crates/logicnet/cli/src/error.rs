//! CLI error types

use logicnet_circuit::CircuitError;
use logicnet_service::ServiceError;
use logicnet_types::NameError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Service setup error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Circuit operation error
    #[error("{0}")]
    Circuit(#[from] CircuitError),

    /// Invalid circuit name
    #[error("Invalid circuit name: {0}")]
    Name(#[from] NameError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
