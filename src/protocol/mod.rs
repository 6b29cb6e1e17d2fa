// Custodian — Protocol Module
//
// Line-oriented wire format spoken with the module proxy.
//
// Request (stdin): own DH public value as lowercase hex, then the vault slot
// as a decimal string.
//
// Response (stdout): nine lines at fixed positions, lengths in decimal and
// blobs in hex:
//
//   0 signature length    1 signature
//   2 MAC length          3 MAC
//   4 IV
//   5 ciphertext length   6 ciphertext
//   7 public value bits   8 module DH public value

mod codec;
mod error;
mod vault_id;

pub use codec::{decode, encode_request, ModuleResponse, ResponseField, RESPONSE_FIELDS};
pub use error::ParseError;
pub use vault_id::{VaultId, VAULT_ID_MAX, VAULT_ID_MIN};
