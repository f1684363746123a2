use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EscSrvError>;

#[derive(Error, Debug)]
pub enum EscSrvError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Placement error: {0}")]
    PlacementError(String),

    #[error("Poll error: {0}")]
    PollError(String),

    #[error("Duplicate alert: {0}")]
    DuplicateAlert(String),
}

impl EscSrvError {
    /// Configuration error from anything printable
    pub fn config(msg: impl Into<String>) -> Self {
        EscSrvError::ConfigError(msg.into())
    }

    /// Placement error from anything printable
    pub fn placement(msg: impl Into<String>) -> Self {
        EscSrvError::PlacementError(msg.into())
    }

    /// Poll error from anything printable
    pub fn poll(msg: impl Into<String>) -> Self {
        EscSrvError::PollError(msg.into())
    }
}

impl From<figment::Error> for EscSrvError {
    fn from(err: figment::Error) -> Self {
        EscSrvError::ConfigError(err.to_string())
    }
}
