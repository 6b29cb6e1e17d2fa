// Custodian — Configuration error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid protocol parameter in config: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("Timeout must be at least one second")]
    ZeroTimeout,

    #[error("Timeout of {secs}s exceeds the maximum of {max}s")]
    TimeoutTooLarge { secs: u64, max: u64 },
}
