// Custodian — Crypto Module
//
// Stateless primitives used by the handshake: Diffie–Hellman over a fixed
// prime group, SHA-256 key derivation, ECDSA (secp256k1) verification of the
// module's signature, AES-256-CBC payload decryption and HMAC-SHA-256.

mod cipher;
mod dh;
mod digest;
mod error;
mod mac;
mod signature;

pub use cipher::{aes256_cbc_decrypt, Aes256Cbc, PayloadCipher, AES_IV_LEN, AES_KEY_LEN};
pub use dh::{
    dh_public_value, dh_shared_secret, encode_signed_be, EphemeralSecret, GroupParameters,
    EPHEMERAL_SECRET_BITS,
};
pub use digest::{derive_key, sha256, DerivedKey, DERIVED_KEY_LEN};
pub use error::CryptoError;
pub use mac::{hmac_sha256, hmac_sha256_verify, MAC_LEN};
pub use signature::{verify_ecdsa, SignatureEnvelope, TrustedModuleKey, ENVELOPE_MIN_LEN};
