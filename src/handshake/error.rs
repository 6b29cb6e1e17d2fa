// Custodian — Handshake error types

use thiserror::Error;

use super::HandshakeState;
use crate::crypto::CryptoError;
use crate::protocol::ParseError;
use crate::transport::TransportError;

/// Why a handshake aborted. Each variant corresponds to one stage; see
/// [`HandshakeError::stage`].
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("Module transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed module response: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid parameter while {stage}: {source}")]
    InvalidParameter {
        stage: HandshakeState,
        #[source]
        source: CryptoError,
    },

    #[error("Failed to decrypt vault key: {0}")]
    Decrypt(#[source] CryptoError),

    #[error("Vault key failed its integrity check")]
    Integrity,

    /// The peer could not prove it holds the module authority key.
    #[error("Module is not authentic ({reason}); refusing to continue")]
    Authenticity { reason: String },
}

impl HandshakeError {
    /// The state the handshake was in when it aborted.
    pub fn stage(&self) -> HandshakeState {
        match self {
            HandshakeError::Transport(_) | HandshakeError::Parse(_) => {
                HandshakeState::AwaitingModuleResponse
            }
            HandshakeError::Authenticity { .. } => HandshakeState::Authenticated,
            HandshakeError::InvalidParameter { stage, .. } => *stage,
            HandshakeError::Decrypt(_) | HandshakeError::Integrity => HandshakeState::Decrypted,
        }
    }

    /// True when the peer failed authentication. Callers must not talk to
    /// that module instance again for the rest of the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandshakeError::Authenticity { .. })
    }
}
