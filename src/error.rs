// Custodian — Top-level error types
//
// Aggregates errors from the handshake, configuration and protocol modules
// into a single error enum for the application boundary.

use thiserror::Error;

/// Process exit code when the module failed authentication.
pub const EXIT_NOT_AUTHENTIC: i32 = 3;

/// Top-level error type for all Custodian operations.
#[derive(Debug, Error)]
pub enum CustodianError {
    #[error("Handshake error: {0}")]
    Handshake(#[from] crate::handshake::HandshakeError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid argument: {0}")]
    Protocol(#[from] crate::protocol::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CustodianError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CustodianError::Handshake(e) if e.is_fatal() => EXIT_NOT_AUTHENTIC,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CustodianError>;
