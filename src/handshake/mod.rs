// Custodian — Handshake Module
//
// Orchestrates one key exchange with the module:
//
//   Started → AwaitingModuleResponse → Authenticated → Decrypted → Verified
//
// with any failed check moving to Aborted. Only a failed authenticity check
// is fatal; every other abort can be retried by the caller.

mod error;
mod orchestrator;
mod state;

#[cfg(test)]
pub(crate) mod fake_module;

pub use error::HandshakeError;
pub use orchestrator::{Handshake, KeyRequest, VaultKey, VAULT_KEY_LEN};
pub use state::HandshakeState;
