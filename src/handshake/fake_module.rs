// Custodian — Software stand-in for the module, used by handshake tests.
//
// Plays the device side of the exchange over a small DH group: reads the
// desktop public value from the request, derives the same key, signs it,
// encrypts and MACs a fixed vault key, and formats the nine response lines.
// `Tamper` switches corrupt one part of the reply.

use std::sync::Mutex;

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use num_bigint::BigUint;

use crate::config::HandshakeConfig;
use crate::crypto::{
    derive_key, dh_public_value, dh_shared_secret, encode_signed_be, hmac_sha256,
    GroupParameters, SignatureEnvelope, TrustedModuleKey,
};
use crate::transport::{KeyMode, Pin, Transport, TransportError};

/// 2^64 - 59.
pub const TEST_MODULUS: u64 = 18_446_744_073_709_551_557;

/// The key the fake module releases.
pub const VAULT_KEY_HEX: &str =
    "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

const MODULE_EXPONENT: u64 = 0x1234_5678_9abc_def1;
const MODULE_SIGNING_KEY: [u8; 32] = [0x42; 32];
const IMPOSTOR_SIGNING_KEY: [u8; 32] = [0x07; 32];
const RESPONSE_IV: [u8; 16] = [0x5a; 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    None,
    /// Flip a bit inside the `r` window of the signature.
    Signature,
    /// Sign with a key other than the pinned one.
    Impostor,
    /// Flip a bit in the first ciphertext block.
    Ciphertext,
    /// Flip a bit in the MAC.
    Mac,
    /// Reply with the public value 1.
    DegeneratePublicValue,
    /// Send an 8-byte IV.
    ShortIv,
    /// Release a correctly MAC'd 16-byte key.
    ShortVaultKey,
}

pub struct FakeModule {
    group: GroupParameters,
    signer: SigningKey,
    tamper: Tamper,
    requests: Mutex<Vec<Vec<String>>>,
}

impl FakeModule {
    pub fn new(tamper: Tamper) -> Self {
        Self {
            group: GroupParameters::new(BigUint::from(2u8), BigUint::from(TEST_MODULUS)).unwrap(),
            signer: SigningKey::from_slice(&MODULE_SIGNING_KEY).unwrap(),
            tamper,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A config that trusts this module and speaks its group.
    pub fn config(&self) -> HandshakeConfig {
        HandshakeConfig::new(
            self.group.clone(),
            TrustedModuleKey::from(*self.signer.verifying_key()),
        )
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn vault_key() -> Vec<u8> {
        hex::decode(VAULT_KEY_HEX).unwrap()
    }

    fn respond(&self, desktop_public_hex: &str) -> String {
        let exponent = BigUint::from(MODULE_EXPONENT);
        let desktop_public = BigUint::parse_bytes(desktop_public_hex.as_bytes(), 16).unwrap();
        let module_public = dh_public_value(&exponent, &self.group);
        let shared = dh_shared_secret(&desktop_public, &exponent, &self.group).unwrap();
        let key = derive_key(&shared);

        let signer = match self.tamper {
            Tamper::Impostor => SigningKey::from_slice(&IMPOSTOR_SIGNING_KEY).unwrap(),
            _ => self.signer.clone(),
        };
        let signature: Signature = signer.sign_prehash(key.as_bytes()).unwrap();
        let mut envelope = SignatureEnvelope::encode(&signature);

        let mut vault_key = Self::vault_key();
        if self.tamper == Tamper::ShortVaultKey {
            vault_key.truncate(16);
        }
        let mut ciphertext = cbc::Encryptor::<Aes256>::new_from_slices(key.as_bytes(), &RESPONSE_IV)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(&vault_key);
        let mut mac = hmac_sha256(key.as_bytes(), &vault_key).unwrap().to_vec();
        let mut iv = RESPONSE_IV.to_vec();
        let mut public_hex = module_public.to_str_radix(16);
        let mut public_bits = encode_signed_be(&module_public).len() * 8;

        match self.tamper {
            Tamper::Signature => envelope[10] ^= 0x01,
            Tamper::Ciphertext => ciphertext[0] ^= 0x01,
            Tamper::Mac => mac[0] ^= 0x01,
            Tamper::ShortIv => iv.truncate(8),
            Tamper::DegeneratePublicValue => {
                public_hex = "1".to_string();
                public_bits = 8;
            }
            Tamper::None | Tamper::Impostor | Tamper::ShortVaultKey => {}
        }

        [
            envelope.len().to_string(),
            hex::encode(&envelope),
            mac.len().to_string(),
            hex::encode(&mac),
            hex::encode(&iv),
            ciphertext.len().to_string(),
            hex::encode(&ciphertext),
            public_bits.to_string(),
            public_hex,
        ]
        .join("\n")
            + "\n"
    }
}

impl Transport for FakeModule {
    fn exchange(
        &self,
        _mode: KeyMode,
        _module_serial: &str,
        _pin: &Pin,
        request_lines: &[String],
    ) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request_lines.to_vec());
        Ok(self.respond(&request_lines[0]))
    }
}
