// Custodian — Payload decryption
//
// The module returns the vault key encrypted with AES-256 in CBC mode using
// PKCS#7 padding, keyed by the derived key and a per-response IV.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use zeroize::Zeroizing;

use super::CryptoError;

pub const AES_KEY_LEN: usize = 32;
pub const AES_IV_LEN: usize = 16;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Abstraction over payload decryption, so the orchestrator can be driven
/// with an instrumented cipher in tests.
pub trait PayloadCipher {
    fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &[u8],
        iv: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

/// Production cipher: AES-256-CBC with PKCS#7 padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256Cbc;

impl PayloadCipher for Aes256Cbc {
    fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &[u8],
        iv: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        aes256_cbc_decrypt(ciphertext, key, iv)
    }
}

/// Decrypt `ciphertext` and strip its padding.
///
/// Key and IV lengths are checked before any decryption is attempted.
pub fn aes256_cbc_decrypt(
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if key.len() != AES_KEY_LEN {
        return Err(CryptoError::InvalidParameter {
            what: "AES key",
            expected: AES_KEY_LEN,
            actual: key.len(),
        });
    }
    if iv.len() != AES_IV_LEN {
        return Err(CryptoError::InvalidParameter {
            what: "IV",
            expected: AES_IV_LEN,
            actual: iv.len(),
        });
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| {
        CryptoError::InvalidParameter {
            what: "AES key",
            expected: AES_KEY_LEN,
            actual: key.len(),
        }
    })?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Decrypt)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
