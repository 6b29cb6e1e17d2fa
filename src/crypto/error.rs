// Custodian — Crypto error types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidParameter {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid group parameters: {0}")]
    InvalidGroup(String),

    #[error("Degenerate Diffie-Hellman peer value")]
    DegeneratePeerValue,

    #[error("Decryption failed: ciphertext length or padding is invalid")]
    Decrypt,

    #[error("Invalid trusted module key: {0}")]
    InvalidTrustedKey(String),

    #[error("Malformed signature envelope: {0}")]
    MalformedSignature(String),
}
