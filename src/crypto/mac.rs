// Custodian — HMAC-SHA-256
//
// Integrity check over the decrypted vault key. Comparison against the
// module-supplied tag is constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::CryptoError;

/// Length of an HMAC-SHA-256 tag in bytes.
pub const MAC_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; MAC_LEN], CryptoError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| {
        CryptoError::InvalidParameter {
            what: "HMAC key",
            expected: MAC_LEN,
            actual: key.len(),
        }
    })?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Recompute the tag over `message` and compare it with `mac`.
///
/// A tag of the wrong length never matches.
pub fn hmac_sha256_verify(message: &[u8], mac: &[u8], key: &[u8]) -> bool {
    match hmac_sha256(key, message) {
        Ok(computed) => computed.as_slice().ct_eq(mac).into(),
        Err(_) => false,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
