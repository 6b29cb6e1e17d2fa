// Custodian — Handshake orchestrator
//
// Drives one exchange end to end. The derived key only ever lives inside a
// single `run` call; nothing is cached between handshakes, so concurrent
// runs over a shared `Handshake` are independent.

use std::fmt;

use zeroize::Zeroizing;

use super::{HandshakeError, HandshakeState};
use crate::config::HandshakeConfig;
use crate::crypto::{
    derive_key, hmac_sha256_verify, Aes256Cbc, CryptoError, EphemeralSecret, PayloadCipher,
    SignatureEnvelope,
};
use crate::protocol::{self, encode_request, VaultId};
use crate::transport::{KeyMode, Pin, Transport};

/// What to ask the module for.
#[derive(Debug, Clone)]
pub struct KeyRequest {
    pub mode: KeyMode,
    pub module_serial: String,
    pub pin: Pin,
    pub vault: VaultId,
}

impl KeyRequest {
    pub fn new(mode: KeyMode, module_serial: impl Into<String>, pin: Pin, vault: VaultId) -> Self {
        Self {
            mode,
            module_serial: module_serial.into(),
            pin,
            vault,
        }
    }
}

/// Length of the vault key the module releases.
pub const VAULT_KEY_LEN: usize = 32;

/// The authenticated vault key released by the module. Wiped on drop.
pub struct VaultKey(Zeroizing<Vec<u8>>);

impl VaultKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex, as handed to the vault layer.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VaultKey([REDACTED; {} bytes])", self.0.len())
    }
}

/// Runs handshakes against one module transport.
pub struct Handshake<T, C = Aes256Cbc> {
    config: HandshakeConfig,
    transport: T,
    cipher: C,
}

impl<T: Transport> Handshake<T> {
    pub fn new(config: HandshakeConfig, transport: T) -> Self {
        Self::with_cipher(config, transport, Aes256Cbc)
    }
}

impl<T: Transport, C: PayloadCipher> Handshake<T, C> {
    pub fn with_cipher(config: HandshakeConfig, transport: T, cipher: C) -> Self {
        Self {
            config,
            transport,
            cipher,
        }
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a handshake with a freshly drawn ephemeral secret.
    pub fn run(&self, request: &KeyRequest) -> Result<VaultKey, HandshakeError> {
        self.run_with_secret(request, EphemeralSecret::generate())
    }

    /// Run a handshake with a caller-supplied ephemeral secret. The secret is
    /// consumed; it must never be reused for another exchange.
    pub fn run_with_secret(
        &self,
        request: &KeyRequest,
        secret: EphemeralSecret,
    ) -> Result<VaultKey, HandshakeError> {
        let mut progress = Progress::new();
        tracing::debug!(
            mode = %request.mode,
            serial = %request.module_serial,
            vault = %request.vault,
            "Starting module handshake"
        );

        match self.drive(&mut progress, request, &secret) {
            Ok(key) => {
                tracing::info!(
                    mode = %request.mode,
                    serial = %request.module_serial,
                    vault = %request.vault,
                    "Vault key released by module"
                );
                Ok(key)
            }
            Err(e) => {
                debug_assert_eq!(progress.state, e.stage());
                progress.advance(HandshakeState::Aborted);
                if e.is_fatal() {
                    tracing::error!(
                        serial = %request.module_serial,
                        stage = %e.stage(),
                        "{}",
                        e
                    );
                } else {
                    tracing::warn!(
                        serial = %request.module_serial,
                        stage = %e.stage(),
                        "Handshake aborted: {}",
                        e
                    );
                }
                Err(e)
            }
        }
    }

    fn drive(
        &self,
        progress: &mut Progress,
        request: &KeyRequest,
        secret: &EphemeralSecret,
    ) -> Result<VaultKey, HandshakeError> {
        let group = self.config.group();
        let request_lines = encode_request(&secret.public_value(group), request.vault);

        progress.advance(HandshakeState::AwaitingModuleResponse);
        let raw = self.transport.exchange(
            request.mode,
            &request.module_serial,
            &request.pin,
            &request_lines,
        )?;
        let response = protocol::decode(&raw)?;
        tracing::debug!(?response, "Module response decoded");

        progress.advance(HandshakeState::Authenticated);
        let shared = secret
            .agree(response.module_public_value(), group)
            .map_err(|source| HandshakeError::InvalidParameter {
                stage: HandshakeState::Authenticated,
                source,
            })?;
        let key = derive_key(&shared);
        drop(shared);
        let envelope = SignatureEnvelope::decode(response.signature())
            .map_err(|e| HandshakeError::Authenticity { reason: e.to_string() })?;
        if !self.config.trusted_key().verify(key.as_bytes(), &envelope) {
            return Err(HandshakeError::Authenticity {
                reason: "signature does not match the module authority key".to_string(),
            });
        }

        progress.advance(HandshakeState::Decrypted);
        let plaintext = self
            .cipher
            .decrypt(response.ciphertext(), key.as_bytes(), response.iv())
            .map_err(|e| match e {
                CryptoError::InvalidParameter { .. } => HandshakeError::InvalidParameter {
                    stage: HandshakeState::Decrypted,
                    source: e,
                },
                other => HandshakeError::Decrypt(other),
            })?;
        if !hmac_sha256_verify(&plaintext, response.mac(), key.as_bytes()) {
            return Err(HandshakeError::Integrity);
        }
        if plaintext.len() != VAULT_KEY_LEN {
            return Err(HandshakeError::InvalidParameter {
                stage: HandshakeState::Decrypted,
                source: CryptoError::InvalidParameter {
                    what: "vault key",
                    expected: VAULT_KEY_LEN,
                    actual: plaintext.len(),
                },
            });
        }

        progress.advance(HandshakeState::Verified);
        Ok(VaultKey(plaintext))
    }
}

/// Tracks the current state of one run.
struct Progress {
    state: HandshakeState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: HandshakeState::Started,
        }
    }

    fn advance(&mut self, to: HandshakeState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "illegal handshake transition {} -> {}",
            self.state,
            to
        );
        tracing::trace!(from = %self.state, %to, "Handshake transition");
        self.state = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::fake_module::{FakeModule, Tamper, VAULT_KEY_HEX};
    use crate::protocol::ParseError;
    use crate::transport::mock::MockTransport;
    use crate::transport::TransportError;
    use num_bigint::BigUint;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts decrypt calls and delegates to AES-256-CBC.
    #[derive(Default)]
    struct CountingCipher {
        calls: AtomicUsize,
    }

    impl CountingCipher {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PayloadCipher for &CountingCipher {
        fn decrypt(
            &self,
            ciphertext: &[u8],
            key: &[u8],
            iv: &[u8],
        ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Aes256Cbc.decrypt(ciphertext, key, iv)
        }
    }

    fn request(mode: KeyMode) -> KeyRequest {
        KeyRequest::new(mode, "SN-0042", Pin::new("1234"), VaultId::new(17).unwrap())
    }

    fn seven() -> EphemeralSecret {
        EphemeralSecret::from_exponent(BigUint::from(7u8))
    }

    fn run_tampered(tamper: Tamper) -> (Result<VaultKey, HandshakeError>, usize) {
        let module = FakeModule::new(tamper);
        let cipher = CountingCipher::default();
        let handshake = Handshake::with_cipher(module.config(), &module, &cipher);
        let result = handshake.run_with_secret(&request(KeyMode::RetrieveKey), seven());
        (result, cipher.calls())
    }

    #[test]
    fn test_known_answer_with_fixed_secret() {
        let module = FakeModule::new(Tamper::None);
        let handshake = Handshake::new(module.config(), &module);

        let key = handshake
            .run_with_secret(&request(KeyMode::RetrieveKey), seven())
            .unwrap();

        assert_eq!(key.to_hex().as_str(), VAULT_KEY_HEX);
        assert_eq!(key.as_bytes(), FakeModule::vault_key().as_slice());
        // G^7 = 128 = 0x80, then the vault slot.
        assert_eq!(module.requests(), vec![vec!["80".to_string(), "17".to_string()]]);
    }

    #[test]
    fn test_fresh_secret_per_run_yields_same_key() {
        let module = FakeModule::new(Tamper::None);
        let handshake = Handshake::new(module.config(), &module);
        let req = request(KeyMode::CreateKey);

        let first = handshake.run(&req).unwrap();
        let second = handshake.run(&req).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
        let requests = module.requests();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0][0], requests[1][0], "public value must not repeat");
    }

    #[test]
    fn test_request_reaches_transport_unchanged() {
        let transport = MockTransport::replying("");
        let handshake = Handshake::new(FakeModule::new(Tamper::None).config(), &transport);
        let _ = handshake.run_with_secret(&request(KeyMode::CreateKey), seven());

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].mode, KeyMode::CreateKey);
        assert_eq!(calls[0].module_serial, "SN-0042");
        assert_eq!(calls[0].request_lines, vec!["80".to_string(), "17".to_string()]);
    }

    #[test]
    fn test_bad_signature_is_fatal_and_skips_decryption() {
        for tamper in [Tamper::Signature, Tamper::Impostor] {
            let (result, decrypt_calls) = run_tampered(tamper);
            let err = result.unwrap_err();
            assert!(matches!(err, HandshakeError::Authenticity { .. }), "{:?}", tamper);
            assert!(err.is_fatal());
            assert_eq!(err.stage(), HandshakeState::Authenticated);
            assert_eq!(decrypt_calls, 0, "decryption must not run for {:?}", tamper);
        }
    }

    #[test]
    fn test_corrupted_ciphertext_fails_integrity() {
        let (result, decrypt_calls) = run_tampered(Tamper::Ciphertext);
        let err = result.unwrap_err();
        assert!(matches!(err, HandshakeError::Integrity), "got {:?}", err);
        assert!(!err.is_fatal());
        assert_eq!(decrypt_calls, 1);
    }

    #[test]
    fn test_corrupted_mac_fails_integrity() {
        let (result, _) = run_tampered(Tamper::Mac);
        assert!(matches!(result, Err(HandshakeError::Integrity)));
    }

    #[test]
    fn test_short_iv_is_invalid_parameter() {
        let (result, _) = run_tampered(Tamper::ShortIv);
        match result {
            Err(HandshakeError::InvalidParameter { stage, source }) => {
                assert_eq!(stage, HandshakeState::Decrypted);
                assert!(matches!(source, CryptoError::InvalidParameter { what: "IV", .. }));
            }
            other => panic!("expected invalid IV, got {:?}", other),
        }
    }

    #[test]
    fn test_authentic_key_of_wrong_length_is_refused() {
        let (result, decrypt_calls) = run_tampered(Tamper::ShortVaultKey);
        match result {
            Err(HandshakeError::InvalidParameter { stage, source }) => {
                assert_eq!(stage, HandshakeState::Decrypted);
                assert_eq!(
                    source,
                    CryptoError::InvalidParameter {
                        what: "vault key",
                        expected: VAULT_KEY_LEN,
                        actual: 16
                    }
                );
            }
            other => panic!("expected wrong-length rejection, got {:?}", other),
        }
        assert_eq!(decrypt_calls, 1);
    }

    #[test]
    fn test_degenerate_module_value_is_refused() {
        let (result, decrypt_calls) = run_tampered(Tamper::DegeneratePublicValue);
        match result {
            Err(HandshakeError::InvalidParameter { stage, source }) => {
                assert_eq!(stage, HandshakeState::Authenticated);
                assert_eq!(source, CryptoError::DegeneratePeerValue);
            }
            other => panic!("expected degenerate value rejection, got {:?}", other),
        }
        assert_eq!(decrypt_calls, 0);
    }

    #[test]
    fn test_transport_failure_aborts_before_crypto() {
        let transport = MockTransport::failing(TransportError::Timeout(Duration::from_secs(30)));
        let cipher = CountingCipher::default();
        let handshake =
            Handshake::with_cipher(FakeModule::new(Tamper::None).config(), &transport, &cipher);

        let err = handshake.run(&request(KeyMode::RetrieveKey)).unwrap_err();
        assert!(matches!(err, HandshakeError::Transport(TransportError::Timeout(_))));
        assert_eq!(err.stage(), HandshakeState::AwaitingModuleResponse);
        assert!(!err.is_fatal());
        assert_eq!(cipher.calls(), 0);
    }

    #[test]
    fn test_malformed_response_is_parse_error() {
        let transport = MockTransport::replying("70\nabcd\n");
        let handshake = Handshake::new(FakeModule::new(Tamper::None).config(), &transport);

        let err = handshake.run(&request(KeyMode::RetrieveKey)).unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::Parse(ParseError::TooFewFields { found: 2, expected: 9 })
        ));
    }

    #[test]
    fn test_concurrent_handshakes_are_independent() {
        let module = FakeModule::new(Tamper::None);
        let handshake = Handshake::new(module.config(), &module);

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| handshake.run(&request(KeyMode::RetrieveKey))))
                .collect();
            for worker in workers {
                let key = worker.join().unwrap().unwrap();
                assert_eq!(key.to_hex().as_str(), VAULT_KEY_HEX);
            }
        });
        assert_eq!(module.requests().len(), 4);
    }

    #[test]
    fn test_vault_key_debug_is_redacted() {
        let key = VaultKey(Zeroizing::new(vec![0xAA; 32]));
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("aa") && !dbg.contains("170"));
        assert_eq!(key.len(), 32);
    }
}
