//! command error type

use super::exit_codes;
use crate::content::StoreError;

/// error returned by command execution
#[derive(Debug, Clone)]
pub struct CliError {
    /// exit code (maps to JSON-RPC error code via -32000 - code)
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(exit_codes::INVALID_ARGS, message)
    }

    pub fn config(e: anyhow::Error) -> Self {
        Self::new(exit_codes::CONFIG_ERROR, format!("{:#}", e))
    }

    pub fn content(message: impl Into<String>) -> Self {
        Self::new(exit_codes::CONTENT_ERROR, message)
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(exit_codes::ERROR, message)
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::general(format!("{:#}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::content(e.to_string())
    }
}
