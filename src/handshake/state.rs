// Custodian — Handshake state machine

use std::fmt;

/// Where a handshake is in its fixed sequence of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeState {
    /// Ephemeral secret drawn, own public value computed.
    Started,
    /// Request sent to the proxy; reading and decoding the reply.
    AwaitingModuleResponse,
    /// Shared secret derived; checking the module's signature.
    Authenticated,
    /// Signature accepted; decrypting and MAC-checking the payload.
    Decrypted,
    /// Payload authenticated. Terminal success.
    Verified,
    /// A check failed. Terminal failure.
    Aborted,
}

impl HandshakeState {
    /// The next state on the success path, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            HandshakeState::Started => Some(HandshakeState::AwaitingModuleResponse),
            HandshakeState::AwaitingModuleResponse => Some(HandshakeState::Authenticated),
            HandshakeState::Authenticated => Some(HandshakeState::Decrypted),
            HandshakeState::Decrypted => Some(HandshakeState::Verified),
            HandshakeState::Verified | HandshakeState::Aborted => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, HandshakeState::Verified | HandshakeState::Aborted)
    }

    /// Success transitions are strictly linear; `Aborted` is reachable from
    /// every non-terminal state.
    pub fn can_transition_to(self, to: HandshakeState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == HandshakeState::Aborted || self.next() == Some(to)
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeState::Started => "started",
            HandshakeState::AwaitingModuleResponse => "awaiting-module-response",
            HandshakeState::Authenticated => "authenticated",
            HandshakeState::Decrypted => "decrypted",
            HandshakeState::Verified => "verified",
            HandshakeState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
