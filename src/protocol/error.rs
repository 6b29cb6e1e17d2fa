// Custodian — Protocol error types

use thiserror::Error;

use super::ResponseField;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Module response has {found} fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },

    #[error("Module response field '{field}' is not valid hex")]
    NonHex { field: ResponseField },

    #[error("Declared length of '{field}' is not an unsigned integer: {value:?}")]
    NonNumeric { field: ResponseField, value: String },

    #[error("Length mismatch in '{field}': declared {declared}, decoded {actual}")]
    LengthMismatch {
        field: ResponseField,
        declared: usize,
        actual: usize,
    },

    #[error("Vault slot {0} is outside [1, 999]")]
    VaultSlotOutOfRange(u64),

    #[error("Invalid vault identifier: {0}")]
    InvalidVaultIdentifier(String),
}
