use rxn_common::SmilesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error(transparent)]
    InvalidSmiles(#[from] SmilesError),

    #[error("Python interpreter '{0}' not found")]
    InterpreterNotFound(String),

    #[error("Failed to execute chemistry bridge: {0}")]
    BridgeExecution(std::io::Error),

    #[error("Chemistry bridge timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Failed to parse chemistry bridge output: {0}")]
    Parse(String),

    /// The chemistry package itself raised (bad reaction, missing data, ...).
    #[error("Chemistry engine error: {0}")]
    Engine(String),
}
