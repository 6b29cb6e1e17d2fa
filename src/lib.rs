// Custodian — Library root
//
// Desktop side of the vault-key handshake with a hardware key custodian:
// transport to the module proxy, response codec, cryptographic primitives,
// the handshake state machine, configuration and the CLI.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handshake;
pub mod protocol;
pub mod transport;

pub use config::{HandshakeConfig, Settings};
pub use error::{CustodianError, Result};
pub use handshake::{Handshake, HandshakeError, HandshakeState, KeyRequest, VaultKey};
pub use protocol::VaultId;
pub use transport::{KeyMode, Pin, ProcessTransport, Transport};
