// Custodian — Transport error types

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to start module proxy {}: {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write request to module proxy: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to read response from module proxy: {0}")]
    Read(#[source] std::io::Error),

    #[error("Module proxy did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Timeout of {0:?} is too large to schedule")]
    InvalidTimeout(Duration),
}

impl Clone for TransportError {
    fn clone(&self) -> Self {
        fn copy_io(e: &std::io::Error) -> std::io::Error {
            std::io::Error::new(e.kind(), e.to_string())
        }
        match self {
            Self::Spawn { executable, source } => Self::Spawn {
                executable: executable.clone(),
                source: copy_io(source),
            },
            Self::Write(e) => Self::Write(copy_io(e)),
            Self::Read(e) => Self::Read(copy_io(e)),
            Self::Timeout(d) => Self::Timeout(*d),
            Self::InvalidTimeout(d) => Self::InvalidTimeout(*d),
        }
    }
}
