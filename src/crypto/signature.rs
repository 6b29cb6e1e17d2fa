// Custodian — Module authenticity
//
// Every module response carries an ECDSA (secp256k1) signature over the
// derived key, checked against a single pinned module authority key.
//
// Signature envelope layout (70 bytes, as emitted by the module firmware):
//
//   offset  0..4    header   (30 44 02 20)
//   offset  4..36   r        32-byte big-endian integer
//   offset 36..38   marker   (02 20)
//   offset 38..70   s        32-byte big-endian integer
//
// Only the r and s windows are interpreted. Header and marker bytes are not
// validated and trailing bytes beyond offset 70 are ignored.

use std::fmt;
use std::ops::Range;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use super::CryptoError;

/// Minimum number of bytes a signature envelope must carry.
pub const ENVELOPE_MIN_LEN: usize = 70;

const R_WINDOW: Range<usize> = 4..36;
const S_WINDOW: Range<usize> = 38..70;
const ENVELOPE_HEADER: [u8; 4] = [0x30, 0x44, 0x02, 0x20];
const ENVELOPE_MARKER: [u8; 2] = [0x02, 0x20];

/// The fixed-layout `(r, s)` container the module signs with.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureEnvelope {
    r: [u8; 32],
    s: [u8; 32],
}

impl SignatureEnvelope {
    /// Extract `r` and `s` from their fixed windows.
    pub fn decode(blob: &[u8]) -> Result<Self, CryptoError> {
        if blob.len() < ENVELOPE_MIN_LEN {
            return Err(CryptoError::MalformedSignature(format!(
                "envelope is {} bytes, need at least {}",
                blob.len(),
                ENVELOPE_MIN_LEN
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&blob[R_WINDOW]);
        s.copy_from_slice(&blob[S_WINDOW]);
        Ok(Self { r, s })
    }

    /// Lay a signature out in the module's envelope format.
    pub fn encode(signature: &Signature) -> Vec<u8> {
        let (r, s) = signature.split_bytes();
        let mut blob = Vec::with_capacity(ENVELOPE_MIN_LEN);
        blob.extend_from_slice(&ENVELOPE_HEADER);
        blob.extend_from_slice(&r);
        blob.extend_from_slice(&ENVELOPE_MARKER);
        blob.extend_from_slice(&s);
        blob
    }

    /// Convert to a `k256` signature, normalising `s` into the lower half of
    /// the group order (the module does not guarantee low-S).
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&self.r);
        rs[32..].copy_from_slice(&self.s);
        let signature = Signature::from_slice(&rs).map_err(|_| {
            CryptoError::MalformedSignature("r or s is zero or exceeds the group order".to_string())
        })?;
        Ok(signature.normalize_s().unwrap_or(signature))
    }
}

impl fmt::Debug for SignatureEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureEnvelope")
            .field("r", &hex::encode(self.r))
            .field("s", &hex::encode(self.s))
            .finish()
    }
}

/// The pinned public key of the module authority (uncompressed SEC1 point).
#[derive(Clone, PartialEq, Eq)]
pub struct TrustedModuleKey(VerifyingKey);

impl TrustedModuleKey {
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidTrustedKey("not a point on secp256k1".to_string()))
    }

    pub fn from_sec1_hex(hex_point: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_point.trim())
            .map_err(|e| CryptoError::InvalidTrustedKey(format!("invalid hex: {}", e)))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Uncompressed SEC1 encoding, lowercase hex.
    pub fn to_sec1_hex(&self) -> String {
        let point = k256::PublicKey::from(&self.0).to_encoded_point(false);
        hex::encode(point.as_bytes())
    }

    /// Check `envelope` as a signature over the 32-byte `message_hash`.
    /// The hash is used directly as the ECDSA prehash; it is not hashed again.
    pub fn verify(&self, message_hash: &[u8], envelope: &SignatureEnvelope) -> bool {
        match envelope.to_signature() {
            Ok(signature) => self.0.verify_prehash(message_hash, &signature).is_ok(),
            Err(e) => {
                tracing::debug!("Rejecting signature: {}", e);
                false
            }
        }
    }
}

impl From<VerifyingKey> for TrustedModuleKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl fmt::Debug for TrustedModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrustedModuleKey({})", self.to_sec1_hex())
    }
}

/// Decode the envelope in `signature` and verify it over `message_hash`.
/// Any structural problem counts as a failed verification.
pub fn verify_ecdsa(message_hash: &[u8], signature: &[u8], key: &TrustedModuleKey) -> bool {
    match SignatureEnvelope::decode(signature) {
        Ok(envelope) => key.verify(message_hash, &envelope),
        Err(e) => {
            tracing::debug!("Rejecting signature: {}", e);
            false
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
