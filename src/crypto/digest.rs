// Custodian — Key derivation
//
// The symmetric key for both decryption and MAC verification is the SHA-256
// digest of the DH shared secret in its signed big-endian encoding.

use std::fmt;

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::dh::encode_signed_be;

/// Length of the derived AES/HMAC key in bytes.
pub const DERIVED_KEY_LEN: usize = 32;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// `SHA-256(shared secret)`, wiped on drop.
pub struct DerivedKey(Zeroizing<[u8; DERIVED_KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Hash the shared secret into the session key. The intermediate encoding is
/// wiped before returning.
pub fn derive_key(shared_secret: &BigUint) -> DerivedKey {
    let encoded = Zeroizing::new(encode_signed_be(shared_secret));
    DerivedKey(Zeroizing::new(sha256(&encoded)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
